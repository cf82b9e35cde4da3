//! Use-case services for the journal.
//!
//! # Responsibility
//! - Orchestrate store, reconciliation and boundary calls.
//! - Keep callers (CLI) free of merge and publish ordering details.

pub mod journal_service;
