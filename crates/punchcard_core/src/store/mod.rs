//! Entry store owning the authoritative journal set.
//!
//! # See also
//! - `sync::reconcile` for the only ownership-transfer boundary.

pub mod entry_store;
