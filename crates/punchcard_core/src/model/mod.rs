//! Journal domain model.
//!
//! # Responsibility
//! - Define the calendar codec, the entry record and the draft grid.
//! - Keep a single day-keyed identity shared by draft and published views.
//!
//! # Invariants
//! - Every entry is identified by the `EntryId` of its calendar day.
//! - Empty text is absence, never a stored tombstone.

pub mod coordinate;
pub mod draft;
pub mod entry;
