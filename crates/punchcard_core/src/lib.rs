//! Core domain logic for the 2026 punch-card journal.
//! This crate is the single source of truth for journal invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;
pub mod view;

pub use config::JournalConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::coordinate::{
    coordinate_to_id, coordinate_to_label, id_to_coordinate, label_to_coordinate,
    CalendarCoordinate, CodecError, EntryId, JOURNAL_YEAR,
};
pub use model::draft::{DraftBuffer, DraftMatrix};
pub use model::entry::{Entry, EntrySet, EntryValidationError};
pub use repo::entry_repo::{AdminGate, RepoError, RepoResult, SqliteEntryRepository};
pub use service::journal_service::{EntryPage, JournalService, JournalServiceError, PublishReport};
pub use store::entry_store::{EntryStore, StoreError, StoreEvent, UndoSlot};
pub use sync::boundary::{
    AuthorizationToken, BoundaryError, FetchBoundary, FetchOutcome, FetchStatus, PublishBoundary,
};
pub use sync::reconcile::{reconcile, ReconcileSummary};
pub use sync::snapshot::SnapshotError;
pub use view::query::{
    filter_by_query, paginate, sorted_by_calendar_label, sorted_descending, EntryOrder,
    PageWindow, NOTEBOOK_PAGE_SIZE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
