//! Downloadable JSON exports of the journal.
//!
//! Two shapes exist: the full memory export (raw grid plus a flat list of
//! logged days) and the publish snapshot (titled entries, latest day first).

use crate::model::coordinate::{JOURNAL_YEAR, MONTH_ABBREVIATIONS};
use crate::model::draft::{DraftBuffer, DraftMatrix};
use crate::model::entry::EntrySet;
use crate::view::preview::entry_title;
use crate::view::query::sorted_by_calendar_label;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

pub const MEMORY_EXPORT_VERSION: u32 = 2;
pub const PUBLISH_SNAPSHOT_VERSION: u32 = 3;

/// One logged day in the memory export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryExportEntry {
    pub month_index: usize,
    pub day_index: usize,
    pub month: &'static str,
    pub day: usize,
    pub date: String,
    pub text: String,
}

/// Full memory export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryExport {
    pub version: u32,
    pub exported_at: String,
    pub raw: DraftMatrix,
    pub entries: Vec<MemoryExportEntry>,
}

/// One titled entry in the publish snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub id: String,
    pub month_index: usize,
    pub day_index: usize,
    pub label: String,
    pub title: String,
    pub text: String,
}

/// Publish snapshot, latest calendar day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSnapshot {
    pub version: u32,
    pub exported_at: String,
    pub entries: Vec<SnapshotEntry>,
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds the memory export from a draft grid.
pub fn build_memory_export(draft: &DraftBuffer, exported_at: DateTime<Utc>) -> MemoryExport {
    let raw = draft.to_matrix();
    let mut entries = Vec::new();
    for (month, row) in raw.logs.iter().enumerate() {
        for (day, text) in row.iter().enumerate() {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            entries.push(MemoryExportEntry {
                month_index: month,
                day_index: day,
                month: MONTH_ABBREVIATIONS[month],
                day: day + 1,
                date: format!("{JOURNAL_YEAR}-{:02}-{:02}", month + 1, day + 1),
                text: text.to_string(),
            });
        }
    }
    MemoryExport {
        version: MEMORY_EXPORT_VERSION,
        exported_at: format_timestamp(exported_at),
        raw,
        entries,
    }
}

/// Builds the publish snapshot from an entry set.
pub fn build_publish_snapshot(set: &EntrySet, exported_at: DateTime<Utc>) -> PublishSnapshot {
    let entries = sorted_by_calendar_label(set)
        .into_iter()
        .map(|entry| {
            let coord = entry.coordinate();
            SnapshotEntry {
                id: entry.id.to_string(),
                month_index: coord.month(),
                day_index: coord.day(),
                title: entry_title(&entry.text),
                label: entry.label,
                text: entry.text,
            }
        })
        .collect();
    PublishSnapshot {
        version: PUBLISH_SNAPSHOT_VERSION,
        exported_at: format_timestamp(exported_at),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_memory_export, build_publish_snapshot};
    use crate::model::coordinate::CalendarCoordinate;
    use crate::model::draft::DraftBuffer;
    use chrono::{TimeZone, Utc};

    fn sample_draft() -> DraftBuffer {
        let mut draft = DraftBuffer::new();
        draft.set_log(CalendarCoordinate::new(0, 13).unwrap(), " met with advisor. ok ");
        draft.set_log(CalendarCoordinate::new(2, 0).unwrap(), "studio");
        draft
    }

    #[test]
    fn memory_export_lists_logged_days() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let export = build_memory_export(&sample_draft(), at);
        assert_eq!(export.version, 2);
        assert_eq!(export.exported_at, "2026-03-01T12:00:00.000Z");
        assert_eq!(export.entries.len(), 2);
        assert_eq!(export.entries[0].date, "2026-01-14");
        assert_eq!(export.entries[0].month, "jan");
        assert_eq!(export.entries[0].day, 14);
        assert_eq!(export.entries[0].text, "met with advisor. ok");

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["raw"]["punched"][0][13].as_bool().unwrap());
        assert_eq!(json["entries"][1]["monthIndex"], 2);
    }

    #[test]
    fn publish_snapshot_is_latest_day_first_with_titles() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let set = sample_draft().to_entry_set(1).unwrap();
        let snapshot = build_publish_snapshot(&set, at);
        assert_eq!(snapshot.version, 3);
        assert_eq!(snapshot.entries[0].id, "2026-03-01");
        assert_eq!(snapshot.entries[1].title, "met with advisor.");
        assert_eq!(snapshot.entries[1].label, "jan 14");
    }
}
