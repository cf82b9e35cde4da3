//! Dense local draft grid mirroring the browser punch card.
//!
//! # Invariants
//! - `punched[m][d] == !logs[m][d].trim().is_empty()` after every mutation.
//! - Cells beyond a month's length are never written.
//! - Conversion to and from `EntrySet` is lossless for non-empty cells.

use crate::model::coordinate::{CalendarCoordinate, MAX_DAYS_PER_MONTH, MONTHS_PER_YEAR};
use crate::model::entry::{Entry, EntrySet, EntryValidationError};
use serde::Serialize;

type Grid<T> = [[T; MAX_DAYS_PER_MONTH]; MONTHS_PER_YEAR];

/// Local draft buffer: one text cell and one punch flag per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftBuffer {
    logs: Grid<String>,
    punched: Grid<bool>,
}

/// Serializable `{ punched, logs }` matrix shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftMatrix {
    pub punched: Vec<Vec<bool>>,
    pub logs: Vec<Vec<String>>,
}

impl DraftBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes text to one cell and recomputes its punch flag.
    pub fn set_log(&mut self, coord: CalendarCoordinate, text: &str) {
        let (m, d) = (coord.month(), coord.day());
        self.logs[m][d] = text.to_string();
        self.punched[m][d] = !text.trim().is_empty();
    }

    /// Empties one cell.
    pub fn clear(&mut self, coord: CalendarCoordinate) {
        self.set_log(coord, "");
    }

    pub fn log(&self, coord: CalendarCoordinate) -> &str {
        &self.logs[coord.month()][coord.day()]
    }

    pub fn is_punched(&self, coord: CalendarCoordinate) -> bool {
        self.punched[coord.month()][coord.day()]
    }

    /// Number of punched cells.
    pub fn punched_count(&self) -> usize {
        self.punched.iter().flatten().filter(|p| **p).count()
    }

    /// Builds an entry set from punched cells, stamping every entry with
    /// `created_at`.
    pub fn to_entry_set(&self, created_at: i64) -> Result<EntrySet, EntryValidationError> {
        let mut set = EntrySet::new();
        for coord in CalendarCoordinate::all_in_year() {
            if !self.is_punched(coord) {
                continue;
            }
            set.insert(Entry::new(coord, self.log(coord), created_at, None)?)?;
        }
        Ok(set)
    }

    /// Builds a draft grid holding the text of every entry in `set`.
    pub fn from_entry_set(set: &EntrySet) -> Self {
        let mut draft = Self::new();
        for entry in set {
            draft.set_log(entry.coordinate(), &entry.text);
        }
        draft
    }

    /// Returns the `{ punched, logs }` matrix shape.
    pub fn to_matrix(&self) -> DraftMatrix {
        DraftMatrix {
            punched: self.punched.iter().map(|row| row.to_vec()).collect(),
            logs: self.logs.iter().map(|row| row.to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DraftBuffer;
    use crate::model::coordinate::CalendarCoordinate;

    #[test]
    fn punch_flag_tracks_text() {
        let mut draft = DraftBuffer::new();
        let coord = CalendarCoordinate::new(4, 9).unwrap();

        draft.set_log(coord, "kiln firing");
        assert!(draft.is_punched(coord));

        draft.set_log(coord, "   ");
        assert!(!draft.is_punched(coord));
        assert_eq!(draft.log(coord), "   ");

        draft.set_log(coord, "again");
        draft.clear(coord);
        assert!(!draft.is_punched(coord));
        assert_eq!(draft.punched_count(), 0);
    }

    #[test]
    fn entry_set_round_trip_keeps_non_empty_cells() {
        let mut draft = DraftBuffer::new();
        draft.set_log(CalendarCoordinate::new(0, 0).unwrap(), "first");
        draft.set_log(CalendarCoordinate::new(11, 30).unwrap(), "last");
        draft.set_log(CalendarCoordinate::new(6, 6).unwrap(), "  ");

        let set = draft.to_entry_set(500).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|entry| entry.created_at == 500));

        let rebuilt = DraftBuffer::from_entry_set(&set);
        assert_eq!(rebuilt.to_entry_set(500).unwrap(), set);
        assert_eq!(rebuilt.punched_count(), 2);
    }

    #[test]
    fn matrix_has_full_grid_dimensions() {
        let matrix = DraftBuffer::new().to_matrix();
        assert_eq!(matrix.logs.len(), 12);
        assert!(matrix.logs.iter().all(|row| row.len() == 31));
        assert!(matrix.punched.iter().flatten().all(|p| !p));
    }
}
