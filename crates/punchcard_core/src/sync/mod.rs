//! Draft/published synchronization.
//!
//! # Responsibility
//! - Merge local and remote entry sets (`reconcile`).
//! - Define the publish/fetch boundary contracts (`boundary`).
//! - Validate snapshot payloads at the boundary (`snapshot`).
//!
//! # Invariants
//! - Reconciliation is pure and total over valid sets.
//! - Malformed payloads fail closed; they are never read as empty sets.

pub mod boundary;
pub mod reconcile;
pub mod snapshot;
