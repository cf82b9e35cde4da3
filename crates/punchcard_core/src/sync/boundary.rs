//! Publish/fetch boundary contracts.
//!
//! The core never stores secrets or decides trust. Implementations of these
//! traits own durability and validate the opaque authorization token.

use crate::model::entry::{Entry, EntrySet};
use crate::sync::snapshot::SnapshotError;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Opaque write credential forwarded to the boundary unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationToken(String);

impl AuthorizationToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value, for boundary implementations only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for AuthorizationToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthorizationToken(***)")
    }
}

/// Boundary-reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// Caller lacks write credentials. Nothing was mutated.
    Unauthorized,
    /// Durable storage failed.
    Storage(String),
    /// Stored or transmitted payload failed schema validation.
    Snapshot(SnapshotError),
}

impl Display for BoundaryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Storage(message) => write!(f, "storage failure: {message}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoundaryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SnapshotError> for BoundaryError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Whether a fetch produced real data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Entries reflect the durable record set (possibly empty).
    Loaded,
    /// Fetch failed; entries are empty and must not be read as "no entries".
    Failed(String),
}

/// Fetch result pairing entries with a status flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub entries: EntrySet,
}

impl FetchOutcome {
    pub fn loaded(entries: EntrySet) -> Self {
        Self {
            status: FetchStatus::Loaded,
            entries,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Failed(reason.into()),
            entries: EntrySet::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == FetchStatus::Loaded
    }
}

/// Durable sink for a full published record set.
pub trait PublishBoundary {
    /// Persists `entries` as the complete published set.
    ///
    /// Returns the number of entries stored, or `Unauthorized` without
    /// mutating anything when `token` is rejected.
    fn publish(&self, entries: &[Entry], token: &AuthorizationToken)
        -> Result<usize, BoundaryError>;
}

/// Source of the currently published record set.
pub trait FetchBoundary {
    /// Loads the published set. Never retries; failures are reported through
    /// `FetchStatus::Failed`.
    fn fetch_entries(&self) -> FetchOutcome;
}

#[cfg(test)]
mod tests {
    use super::{AuthorizationToken, FetchOutcome, FetchStatus};

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthorizationToken::new("hunter2");
        assert_eq!(format!("{token:?}"), "AuthorizationToken(***)");
        assert_eq!(token.expose(), "hunter2");
    }

    #[test]
    fn failed_fetch_is_distinct_from_empty_load() {
        let failed = FetchOutcome::failed("timeout");
        let empty = FetchOutcome::loaded(Default::default());
        assert!(failed.entries.is_empty() && empty.entries.is_empty());
        assert_ne!(failed, empty);
        assert!(!failed.is_loaded());
        assert_eq!(failed.status, FetchStatus::Failed("timeout".to_string()));
    }
}
