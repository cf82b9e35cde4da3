//! Presentation projections over entry sets.
//!
//! # Responsibility
//! - Order, filter and page entries without mutating the store (`query`).
//! - Derive titles, excerpts and preview images (`preview`).
//! - Build downloadable JSON exports (`export`).

pub mod export;
pub mod preview;
pub mod query;
