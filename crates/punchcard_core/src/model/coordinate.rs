//! Calendar codec for the 2026 punch card grid.
//!
//! # Responsibility
//! - Convert between calendar coordinates, stable entry ids and labels.
//! - Reject out-of-range coordinates instead of clamping them.
//!
//! # Invariants
//! - `EntryId` text is always `2026-MM-DD`, zero-padded and 1-indexed.
//! - `EntryId` ordering equals chronological ordering of the coordinate.
//! - Labels render as `"{mon} {day}"` with a lowercase 3-letter month.
//! - The codec never substitutes a fallback value for malformed input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The single calendar year covered by the journal grid.
pub const JOURNAL_YEAR: i32 = 2026;
/// Number of rows in the punch card grid.
pub const MONTHS_PER_YEAR: usize = 12;
/// Number of columns in the punch card grid (longest month).
pub const MAX_DAYS_PER_MONTH: usize = 31;

/// Lowercase month abbreviations used by labels, indexed by month.
pub const MONTH_ABBREVIATIONS: [&str; MONTHS_PER_YEAR] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static ENTRY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid entry id regex"));
static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]{3})\s+(\d{1,2})$").expect("valid label regex"));

/// Codec failures for coordinates, ids and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Month or day index outside the 2026 calendar.
    InvalidCoordinate { month: i32, day: i32 },
    /// Identifier does not have the `2026-MM-DD` shape or names no real day.
    MalformedId(String),
    /// Label is not a month abbreviation followed by a day number.
    UnparseableLabel(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCoordinate { month, day } => write!(
                f,
                "invalid calendar coordinate: month index {month}, day index {day}"
            ),
            Self::MalformedId(value) => write!(f, "malformed entry id: `{value}`"),
            Self::UnparseableLabel(value) => write!(f, "unparseable entry label: `{value}`"),
        }
    }
}

impl Error for CodecError {}

/// Returns whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in a zero-based `month` of `year`.
///
/// Returns `None` for month indices outside `0..12`.
pub fn days_in_month(month: usize, year: i32) -> Option<usize> {
    let days = match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => return None,
    };
    Some(days)
}

/// A validated cell in the 2026 punch card grid.
///
/// Fields are zero-based. Construction is the only validation point, so a
/// value of this type always names a real calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarCoordinate {
    month: u8,
    day: u8,
}

impl CalendarCoordinate {
    /// Builds a coordinate from zero-based month and day indices.
    ///
    /// # Errors
    /// - `CodecError::InvalidCoordinate` when `month` is outside `0..=11` or
    ///   `day` is outside `0..days_in_month(month)`.
    pub fn new(month: i32, day: i32) -> Result<Self, CodecError> {
        let invalid = CodecError::InvalidCoordinate { month, day };
        let month_index = usize::try_from(month).map_err(|_| invalid.clone())?;
        let day_index = usize::try_from(day).map_err(|_| invalid.clone())?;
        let max_days = days_in_month(month_index, JOURNAL_YEAR).ok_or_else(|| invalid.clone())?;
        if day_index >= max_days {
            return Err(invalid);
        }
        Ok(Self {
            month: month_index as u8,
            day: day_index as u8,
        })
    }

    /// Zero-based month index.
    pub fn month(self) -> usize {
        usize::from(self.month)
    }

    /// Zero-based day index.
    pub fn day(self) -> usize {
        usize::from(self.day)
    }

    /// Stable identifier for this cell.
    pub fn to_id(self) -> EntryId {
        EntryId(self)
    }

    /// Human label, e.g. `jan 14`.
    pub fn label(self) -> String {
        format!("{} {}", MONTH_ABBREVIATIONS[self.month()], self.day() + 1)
    }

    /// Iterates every valid cell of the year in chronological order.
    pub fn all_in_year() -> impl Iterator<Item = CalendarCoordinate> {
        (0..MONTHS_PER_YEAR).flat_map(|month| {
            let days = days_in_month(month, JOURNAL_YEAR).unwrap_or(0);
            (0..days).map(move |day| CalendarCoordinate {
                month: month as u8,
                day: day as u8,
            })
        })
    }
}

/// Stable identifier for one journal day, rendered as `2026-MM-DD`.
///
/// Backed by its coordinate, so id and coordinate can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(CalendarCoordinate);

impl EntryId {
    /// Parses the fixed `YYYY-MM-DD` identifier shape.
    ///
    /// # Errors
    /// - `CodecError::MalformedId` when the shape does not match, the year is
    ///   not 2026, or the date does not exist in 2026.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        let malformed = || CodecError::MalformedId(value.to_string());
        let caps = ENTRY_ID_RE.captures(value).ok_or_else(malformed)?;
        let year: i32 = caps[1].parse().map_err(|_| malformed())?;
        if year != JOURNAL_YEAR {
            return Err(malformed());
        }
        let month: i32 = caps[2].parse().map_err(|_| malformed())?;
        let day: i32 = caps[3].parse().map_err(|_| malformed())?;
        let coord = CalendarCoordinate::new(month - 1, day - 1).map_err(|_| malformed())?;
        Ok(Self(coord))
    }

    /// Calendar cell named by this id.
    pub fn coordinate(self) -> CalendarCoordinate {
        self.0
    }

    /// Label naming the same calendar day.
    pub fn label(self) -> String {
        self.0.label()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{JOURNAL_YEAR}-{:02}-{:02}",
            self.0.month() + 1,
            self.0.day() + 1
        )
    }
}

impl FromStr for EntryId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntryId {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntryId> for String {
    fn from(value: EntryId) -> Self {
        value.to_string()
    }
}

/// Maps a coordinate to its stable identifier.
///
/// Total over constructed coordinates; bound violations surface from
/// [`CalendarCoordinate::new`] or [`id_for`].
pub fn coordinate_to_id(coord: CalendarCoordinate) -> EntryId {
    coord.to_id()
}

/// Validates raw indices and maps them to an identifier in one step.
pub fn id_for(month: i32, day: i32) -> Result<EntryId, CodecError> {
    CalendarCoordinate::new(month, day).map(coordinate_to_id)
}

/// Parses an identifier back into its coordinate.
pub fn id_to_coordinate(id: &str) -> Result<CalendarCoordinate, CodecError> {
    EntryId::parse(id).map(EntryId::coordinate)
}

/// Renders the canonical label for a coordinate.
pub fn coordinate_to_label(coord: CalendarCoordinate) -> String {
    coord.label()
}

/// Parses a human label such as `"Jan 14"` or `"  feb   3 "`.
///
/// Matching is case-insensitive and tolerant of surrounding and repeated
/// whitespace. The month must be a 3-letter abbreviation and the day one or
/// two digits.
///
/// # Errors
/// - `CodecError::UnparseableLabel` when the shape does not match or the
///   month abbreviation is unknown.
/// - `CodecError::InvalidCoordinate` when the label names a day the month
///   does not have (e.g. `feb 29`).
pub fn label_to_coordinate(label: &str) -> Result<CalendarCoordinate, CodecError> {
    let normalized = label.trim().to_lowercase();
    let unparseable = || CodecError::UnparseableLabel(label.to_string());
    let caps = LABEL_RE.captures(&normalized).ok_or_else(unparseable)?;
    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == &caps[1])
        .ok_or_else(unparseable)?;
    let day: i32 = caps[2].parse().map_err(|_| unparseable())?;
    CalendarCoordinate::new(month as i32, day - 1)
}
