//! Last-writer-wins reconciliation of local and remote entry sets.
//!
//! Pure functions only: no I/O, no clocks, no store access.

use crate::model::entry::{Entry, EntrySet};

/// Which side survived a merge of one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResult {
    /// Local copy is strictly newer.
    LocalWins(Entry),
    /// Remote copy is newer or the timestamps tie.
    RemoteWins(Entry),
}

impl MergeResult {
    pub fn entry(&self) -> &Entry {
        match self {
            Self::LocalWins(entry) | Self::RemoteWins(entry) => entry,
        }
    }

    pub fn into_entry(self) -> Entry {
        match self {
            Self::LocalWins(entry) | Self::RemoteWins(entry) => entry,
        }
    }

    pub fn is_local_win(&self) -> bool {
        matches!(self, Self::LocalWins(_))
    }
}

/// Merges two copies of the same id. Ties go to `remote`.
pub fn merge_entry(local: &Entry, remote: &Entry) -> MergeResult {
    if local.created_at > remote.created_at {
        MergeResult::LocalWins(local.clone())
    } else {
        MergeResult::RemoteWins(remote.clone())
    }
}

/// Counters describing one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub local_only: usize,
    pub remote_only: usize,
    pub local_wins: usize,
    pub remote_wins: usize,
}

impl ReconcileSummary {
    /// Number of entries in the merged output.
    pub fn total(&self) -> usize {
        self.local_only + self.remote_only + self.local_wins + self.remote_wins
    }
}

/// Merges `local` into `remote` with last-writer-wins semantics.
///
/// Ids present on one side are kept. Ids present on both keep the copy with
/// the larger `created_at`; ties keep the remote copy.
pub fn reconcile(local: &EntrySet, remote: &EntrySet) -> EntrySet {
    reconcile_with_summary(local, remote).0
}

/// Same as [`reconcile`], also returning merge counters.
pub fn reconcile_with_summary(local: &EntrySet, remote: &EntrySet) -> (EntrySet, ReconcileSummary) {
    let mut summary = ReconcileSummary::default();
    let mut merged = remote.clone();

    for local_entry in local {
        match remote.get(&local_entry.id) {
            Some(remote_entry) => match merge_entry(local_entry, remote_entry) {
                MergeResult::LocalWins(winner) => {
                    summary.local_wins += 1;
                    merged.insert_validated(winner);
                }
                MergeResult::RemoteWins(_) => summary.remote_wins += 1,
            },
            None => {
                summary.local_only += 1;
                merged.insert_validated(local_entry.clone());
            }
        }
    }
    summary.remote_only = remote.len() - summary.local_wins - summary.remote_wins;

    (merged, summary)
}
