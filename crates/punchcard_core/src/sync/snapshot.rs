//! Strict JSON snapshot codecs for boundary payloads.
//!
//! # Responsibility
//! - Decode published entry payloads, local entry-set snapshots and the
//!   legacy `{ punched, logs }` draft grid.
//! - Fail closed with a typed error; never substitute an empty collection.
//!
//! # Invariants
//! - A decoded draft grid satisfies the punch/log invariant.
//! - A decoded undo slot never points at an entry for another day.

use crate::model::coordinate::{
    days_in_month, CalendarCoordinate, JOURNAL_YEAR, MAX_DAYS_PER_MONTH, MONTHS_PER_YEAR,
};
use crate::model::draft::DraftBuffer;
use crate::model::entry::EntrySet;
use crate::store::entry_store::UndoSlot;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Current version written by [`encode_entry_set_snapshot`].
pub const ENTRY_SET_SNAPSHOT_VERSION: u32 = 1;

/// Snapshot decoding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Payload does not match the expected schema.
    MalformedSnapshot(String),
    /// Snapshot was written by an unknown format version.
    UnsupportedVersion { found: u32, supported: u32 },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedSnapshot(reason) => write!(f, "malformed snapshot: {reason}"),
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "snapshot version {found} is not supported (expected {supported})"
            ),
        }
    }
}

impl Error for SnapshotError {}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedSnapshot(value.to_string())
    }
}

/// Published payload shape: `{ "entries": [Entry] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntriesPayload {
    pub entries: EntrySet,
}

/// Decodes a published `{ "entries": [...] }` payload.
pub fn decode_entries_payload(json: &str) -> Result<EntrySet, SnapshotError> {
    let payload: EntriesPayload = serde_json::from_str(json)?;
    Ok(payload.entries)
}

/// Local draft persistence: entries plus the pending undo slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySetSnapshot {
    pub version: u32,
    pub entries: EntrySet,
    #[serde(default)]
    pub undo: Option<UndoSlot>,
}

/// Encodes entries and undo slot as pretty JSON.
pub fn encode_entry_set_snapshot(
    entries: &EntrySet,
    undo: Option<&UndoSlot>,
) -> Result<String, SnapshotError> {
    let snapshot = EntrySetSnapshot {
        version: ENTRY_SET_SNAPSHOT_VERSION,
        entries: entries.clone(),
        undo: undo.cloned(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Decodes an entry-set snapshot written by [`encode_entry_set_snapshot`].
pub fn decode_entry_set_snapshot(
    json: &str,
) -> Result<(EntrySet, Option<UndoSlot>), SnapshotError> {
    let snapshot: EntrySetSnapshot = serde_json::from_str(json)?;
    if snapshot.version != ENTRY_SET_SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.version,
            supported: ENTRY_SET_SNAPSHOT_VERSION,
        });
    }
    if let Some(slot) = snapshot.undo.as_ref() {
        if let Some(previous) = slot.previous.as_ref() {
            if previous.id != slot.id {
                return Err(SnapshotError::MalformedSnapshot(format!(
                    "undo slot for {} holds entry {}",
                    slot.id, previous.id
                )));
            }
        }
    }
    Ok((snapshot.entries, snapshot.undo))
}

#[derive(Deserialize)]
struct DraftMatrixWire {
    punched: Vec<Vec<bool>>,
    logs: Vec<Vec<String>>,
}

/// Decodes the legacy `{ punched, logs }` browser grid.
///
/// Both matrices must be 12 rows of 31 cells. Text in a cell beyond the
/// month's length is rejected. Cell text is kept verbatim, whitespace
/// included, and `punched` is recomputed from `logs`.
pub fn decode_draft_matrix(json: &str) -> Result<DraftBuffer, SnapshotError> {
    let wire: DraftMatrixWire = serde_json::from_str(json)?;
    check_grid_shape("punched", &wire.punched)?;
    check_grid_shape("logs", &wire.logs)?;

    let mut draft = DraftBuffer::new();
    for (month, row) in wire.logs.iter().enumerate() {
        let month_days = days_in_month(month, JOURNAL_YEAR).unwrap_or(0);
        for (day, text) in row.iter().enumerate() {
            if day >= month_days {
                if text.trim().is_empty() {
                    continue;
                }
                return Err(SnapshotError::MalformedSnapshot(format!(
                    "logs[{month}][{day}] holds text for a day that does not exist"
                )));
            }
            let coord = CalendarCoordinate::new(month as i32, day as i32)
                .map_err(|err| SnapshotError::MalformedSnapshot(err.to_string()))?;
            draft.set_log(coord, text);
        }
    }
    Ok(draft)
}

fn check_grid_shape<T>(name: &str, grid: &[Vec<T>]) -> Result<(), SnapshotError> {
    if grid.len() != MONTHS_PER_YEAR {
        return Err(SnapshotError::MalformedSnapshot(format!(
            "{name} has {} rows, expected {MONTHS_PER_YEAR}",
            grid.len()
        )));
    }
    if let Some((index, row)) = grid
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != MAX_DAYS_PER_MONTH)
    {
        return Err(SnapshotError::MalformedSnapshot(format!(
            "{name}[{index}] has {} cells, expected {MAX_DAYS_PER_MONTH}",
            row.len()
        )));
    }
    Ok(())
}
