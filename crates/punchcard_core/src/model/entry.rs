//! Journal entry model and the id-keyed entry set.
//!
//! # Responsibility
//! - Define the canonical `Entry` record and its wire shape.
//! - Keep an `EntrySet` that can only hold valid, non-empty entries.
//!
//! # Invariants
//! - `text` is stored trimmed and is never empty.
//! - `label` always names the same calendar day as `id`.
//! - `image_url` is `None` rather than an empty string.
//! - Deserialization validates and fails closed.

use crate::model::coordinate::{label_to_coordinate, CalendarCoordinate, CodecError, EntryId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures for entries and entry sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Text is empty after trimming.
    EmptyText(EntryId),
    /// Label does not name the day identified by `id`.
    LabelMismatch { id: EntryId, label: String },
    /// `createdAt` is negative.
    InvalidCreatedAt { id: EntryId, created_at: i64 },
    /// Same id appears twice in one collection.
    DuplicateId(EntryId),
    /// Id or label failed to decode.
    Codec(CodecError),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText(id) => write!(f, "entry {id} has empty text"),
            Self::LabelMismatch { id, label } => {
                write!(f, "entry {id} has label `{label}` naming a different day")
            }
            Self::InvalidCreatedAt { id, created_at } => {
                write!(f, "entry {id} has invalid createdAt {created_at}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate entry id: {id}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for EntryValidationError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// One recorded memory attached to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EntryWire")]
pub struct Entry {
    /// Stable `2026-MM-DD` identifier.
    pub id: EntryId,
    /// Human label such as `jan 14`.
    pub label: String,
    /// Trimmed, non-empty memory text.
    pub text: String,
    /// Last write time in epoch milliseconds.
    pub created_at: i64,
    /// Optional attached image location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Entry {
    /// Builds a validated entry for `coord`.
    ///
    /// Text and image url are trimmed; a blank image url becomes `None`.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank.
    /// - `InvalidCreatedAt` when `created_at` is negative.
    pub fn new(
        coord: CalendarCoordinate,
        text: &str,
        created_at: i64,
        image_url: Option<&str>,
    ) -> Result<Self, EntryValidationError> {
        let entry = Self {
            id: coord.to_id(),
            label: coord.label(),
            text: text.trim().to_string(),
            created_at,
            image_url: normalize_image_url(image_url),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Checks entry invariants.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.text.trim().is_empty() {
            return Err(EntryValidationError::EmptyText(self.id));
        }
        if self.created_at < 0 {
            return Err(EntryValidationError::InvalidCreatedAt {
                id: self.id,
                created_at: self.created_at,
            });
        }
        if self.label != self.id.label() {
            return Err(EntryValidationError::LabelMismatch {
                id: self.id,
                label: self.label.clone(),
            });
        }
        Ok(())
    }

    /// Calendar cell this entry is attached to.
    pub fn coordinate(&self) -> CalendarCoordinate {
        self.id.coordinate()
    }
}

fn normalize_image_url(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(ToString::to_string)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryWire {
    id: EntryId,
    label: String,
    text: String,
    created_at: i64,
    #[serde(default)]
    image_url: Option<String>,
}

impl TryFrom<EntryWire> for Entry {
    type Error = EntryValidationError;

    /// Accepts any label spelling that names the id's day and stores the
    /// canonical form.
    fn try_from(value: EntryWire) -> Result<Self, Self::Error> {
        if label_to_coordinate(&value.label)? != value.id.coordinate() {
            return Err(EntryValidationError::LabelMismatch {
                id: value.id,
                label: value.label,
            });
        }
        let entry = Entry {
            id: value.id,
            label: value.id.label(),
            text: value.text.trim().to_string(),
            created_at: value.created_at,
            image_url: normalize_image_url(value.image_url.as_deref()),
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// Id-keyed collection of valid entries.
///
/// Iteration follows id order, which is chronological. Callers that need a
/// presentation order go through `view::query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Entry>", try_from = "Vec<Entry>")]
pub struct EntrySet {
    entries: BTreeMap<EntryId, Entry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from entries, rejecting duplicates and invalid entries.
    pub fn try_from_entries(
        entries: impl IntoIterator<Item = Entry>,
    ) -> Result<Self, EntryValidationError> {
        let mut set = Self::new();
        for entry in entries {
            entry.validate()?;
            let id = entry.id;
            if set.entries.insert(id, entry).is_some() {
                return Err(EntryValidationError::DuplicateId(id));
            }
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates entries in chronological id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Returns ids in chronological order.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.keys().copied()
    }

    /// Inserts or replaces one entry after validation.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, entry: Entry) -> Result<Option<Entry>, EntryValidationError> {
        entry.validate()?;
        Ok(self.entries.insert(entry.id, entry))
    }

    /// Inserts an entry already validated as a member of another set.
    pub(crate) fn insert_validated(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.id, entry)
    }

    /// Removes one entry by id.
    pub fn remove(&mut self, id: &EntryId) -> Option<Entry> {
        self.entries.remove(id)
    }

    /// Copies entries into a vector in chronological id order.
    pub fn to_vec(&self) -> Vec<Entry> {
        self.entries.values().cloned().collect()
    }
}

impl From<EntrySet> for Vec<Entry> {
    fn from(value: EntrySet) -> Self {
        value.entries.into_values().collect()
    }
}

impl TryFrom<Vec<Entry>> for EntrySet {
    type Error = EntryValidationError;

    fn try_from(value: Vec<Entry>) -> Result<Self, Self::Error> {
        Self::try_from_entries(value)
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::collections::btree_map::Values<'a, EntryId, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntrySet, EntryValidationError};
    use crate::model::coordinate::CalendarCoordinate;

    fn coord(month: i32, day: i32) -> CalendarCoordinate {
        CalendarCoordinate::new(month, day).expect("valid coordinate")
    }

    #[test]
    fn new_trims_text_and_derives_id_and_label() {
        let entry = Entry::new(coord(1, 2), "  studio day \n", 10, Some("  ")).unwrap();
        assert_eq!(entry.id.to_string(), "2026-02-03");
        assert_eq!(entry.label, "feb 3");
        assert_eq!(entry.text, "studio day");
        assert_eq!(entry.image_url, None);
    }

    #[test]
    fn new_rejects_blank_text() {
        let err = Entry::new(coord(0, 0), "   \t", 10, None).unwrap_err();
        assert!(matches!(err, EntryValidationError::EmptyText(_)));
    }

    #[test]
    fn validate_rejects_label_drift() {
        let mut entry = Entry::new(coord(0, 13), "met with advisor", 1_000, None).unwrap();
        entry.label = "jan 15".to_string();
        assert!(matches!(
            entry.validate(),
            Err(EntryValidationError::LabelMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_canonical_label_for_same_day() {
        let mut entry = Entry::new(coord(0, 0), "new year", 1, None).unwrap();
        entry.label = "jan 01".to_string();
        assert!(matches!(
            entry.validate(),
            Err(EntryValidationError::LabelMismatch { .. })
        ));
    }

    #[test]
    fn wire_labels_are_canonicalized() {
        for (id, label, canonical) in [
            ("2026-01-01", "jan 01", "jan 1"),
            ("2026-01-14", "jan   14", "jan 14"),
            ("2026-01-14", "JAN\\t14", "jan 14"),
        ] {
            let json = format!(
                r#"{{"id":"{id}","label":"{label}","text":"x","createdAt":1}}"#
            );
            let entry: Entry = serde_json::from_str(&json).expect("label should decode");
            assert_eq!(entry.label, canonical);
            let wire = serde_json::to_value(&entry).expect("entry should encode");
            assert_eq!(wire["label"], canonical);
        }
    }

    #[test]
    fn set_rejects_duplicate_ids() {
        let first = Entry::new(coord(0, 0), "a", 1, None).unwrap();
        let second = Entry::new(coord(0, 0), "b", 2, None).unwrap();
        let err = EntrySet::try_from_entries(vec![first, second]).unwrap_err();
        assert!(matches!(err, EntryValidationError::DuplicateId(_)));
    }

    #[test]
    fn set_iterates_in_chronological_order() {
        let set = EntrySet::try_from_entries(vec![
            Entry::new(coord(3, 1), "later", 1, None).unwrap(),
            Entry::new(coord(0, 5), "earlier", 2, None).unwrap(),
        ])
        .unwrap();
        let labels = set.iter().map(|e| e.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["jan 6", "apr 2"]);
    }
}
