//! Persistence implementations behind the publish/fetch boundaries.
//!
//! # Responsibility
//! - Keep SQL details out of service orchestration.
//! - Return semantic errors (`Unauthorized`) alongside transport errors.
//!
//! # Invariants
//! - Every write validates entries before SQL mutation.

pub mod entry_repo;
