//! Journal use-case service.
//!
//! # Responsibility
//! - Address the local store by human-readable labels.
//! - Reconcile local drafts with the published set on refresh and publish.
//! - Serve filtered, ordered and paged list views.
//!
//! # Invariants
//! - A failed fetch never replaces local entries.
//! - Remote sets are merged into the store atomically; concurrent local
//!   writes are never overwritten.
//! - A rejected publish leaves the local store untouched.
//! - Published payloads are ordered newest write first.

use crate::model::coordinate::{label_to_coordinate, CodecError};
use crate::model::entry::Entry;
use crate::store::entry_store::{EntryStore, StoreError};
use crate::sync::boundary::{
    AuthorizationToken, BoundaryError, FetchBoundary, FetchStatus, PublishBoundary,
};
use crate::sync::reconcile::{reconcile_with_summary, ReconcileSummary};
use crate::view::query::{filter_by_query, paginate, sort_entries, EntryOrder, PageWindow};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Label could not be mapped to a 2026 day.
    Codec(CodecError),
    Store(StoreError),
    Boundary(BoundaryError),
    /// Fetch failed; the published set is unknown.
    RemoteUnavailable(String),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Boundary(err) => write!(f, "{err}"),
            Self::RemoteUnavailable(reason) => {
                write!(f, "published entries unavailable: {reason}")
            }
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Boundary(err) => Some(err),
            Self::RemoteUnavailable(_) => None,
        }
    }
}

impl From<CodecError> for JournalServiceError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<StoreError> for JournalServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BoundaryError> for JournalServiceError {
    fn from(value: BoundaryError) -> Self {
        Self::Boundary(value)
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Entries accepted by the boundary.
    pub published: usize,
    pub merge: ReconcileSummary,
}

/// One page of a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPage {
    pub items: Vec<Entry>,
    pub window: PageWindow,
}

/// Journal facade over the local store and a publish/fetch boundary.
pub struct JournalService<B: PublishBoundary + FetchBoundary> {
    store: EntryStore,
    boundary: B,
}

impl<B: PublishBoundary + FetchBoundary> JournalService<B> {
    pub fn new(store: EntryStore, boundary: B) -> Self {
        Self { store, boundary }
    }

    /// Local draft store.
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    /// Writes `text` on the day named by `label`; blank text erases.
    pub fn write(
        &self,
        label: &str,
        text: &str,
        now: i64,
    ) -> Result<Option<Entry>, JournalServiceError> {
        let coord = label_to_coordinate(label)?;
        Ok(self.store.upsert(coord, text, now)?)
    }

    /// Erases the day named by `label`, keeping it for undo.
    pub fn erase(&self, label: &str) -> Result<Option<Entry>, JournalServiceError> {
        let coord = label_to_coordinate(label)?;
        Ok(self.store.remove(coord))
    }

    pub fn undo(&self) -> Option<Entry> {
        self.store.undo_last_removal()
    }

    /// Merges the published set into the local store.
    ///
    /// # Errors
    /// - `RemoteUnavailable` when the fetch failed; local entries are kept.
    pub fn refresh_from_remote(&self) -> Result<ReconcileSummary, JournalServiceError> {
        let outcome = self.boundary.fetch_entries();
        if let FetchStatus::Failed(reason) = outcome.status {
            warn!("event=journal_refresh module=service status=error error_code=fetch_failed");
            return Err(JournalServiceError::RemoteUnavailable(reason));
        }

        let summary = self.store.merge_remote(&outcome.entries);
        info!(
            "event=journal_refresh module=service status=ok total={} local_wins={} remote_wins={}",
            summary.total(),
            summary.local_wins,
            summary.remote_wins
        );
        Ok(summary)
    }

    /// Reconciles with the published set and publishes the merged result.
    ///
    /// The local store merges the published set only after the boundary
    /// accepts it; local writes made in the meantime are kept.
    pub fn publish(
        &self,
        token: &AuthorizationToken,
    ) -> Result<PublishReport, JournalServiceError> {
        let outcome = self.boundary.fetch_entries();
        if let FetchStatus::Failed(reason) = outcome.status {
            warn!("event=journal_publish module=service status=error error_code=fetch_failed");
            return Err(JournalServiceError::RemoteUnavailable(reason));
        }

        let (merged, merge) = reconcile_with_summary(&self.store.all(), &outcome.entries);
        let payload = sort_entries(&merged, EntryOrder::Written);
        let published = self.boundary.publish(&payload, token).map_err(|err| {
            error!(
                "event=journal_publish module=service status=error error_code=publish_rejected error={}",
                err
            );
            JournalServiceError::from(err)
        })?;

        // Writes that landed while publishing survive this merge.
        self.store.merge_remote(&merged);
        info!(
            "event=journal_publish module=service status=ok published={} local_only={} remote_only={}",
            published, merge.local_only, merge.remote_only
        );
        Ok(PublishReport { published, merge })
    }

    /// Filters, orders and pages the local entries.
    ///
    /// The requested page is clamped to the last page, so an out-of-range
    /// request shows the final page of results.
    pub fn page(
        &self,
        query: &str,
        order: EntryOrder,
        page_size: usize,
        requested_page: usize,
    ) -> EntryPage {
        let ordered = sort_entries(&self.store.all(), order);
        let filtered = filter_by_query(&ordered, query);
        let window = PageWindow::new(filtered.len(), page_size, requested_page);
        let items = paginate(&filtered, page_size, window.page_index);
        EntryPage { items, window }
    }
}
