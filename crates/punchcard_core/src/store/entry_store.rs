//! Authoritative in-process entry store.
//!
//! # Responsibility
//! - Own the `EntrySet` for whichever actor currently holds write authority.
//! - Provide upsert/remove/undo semantics and snapshot reads.
//! - Notify subscribers after every committed mutation.
//! - Merge remote sets into the live set without losing concurrent writes.
//!
//! # Invariants
//! - Mutations are serialized behind one mutex and run to completion.
//! - Events are sent before the state lock is released, so every subscriber
//!   sees them in commit order.
//! - The set never holds an entry with blank text.
//! - The undo slot is written only by `remove` and consumed only by undo;
//!   a replace or a merge that supersedes its day clears it.
//! - `upsert` refreshes `created_at` to the caller-provided `now`.

use crate::model::coordinate::{CalendarCoordinate, EntryId};
use crate::model::entry::{Entry, EntrySet, EntryValidationError};
use crate::sync::reconcile::{reconcile_with_summary, ReconcileSummary};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

/// Store-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(EntryValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<EntryValidationError> for StoreError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

/// The last destructive removal.
///
/// `previous` is `None` when the removed coordinate held no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoSlot {
    pub id: EntryId,
    pub previous: Option<Entry>,
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Entry created or replaced.
    Upserted(EntryId),
    /// Entry removed (explicitly or by a blank write).
    Removed(EntryId),
    /// Entry restored by undo.
    Restored(EntryId),
    /// Whole set replaced or merged at an ownership boundary.
    Replaced { count: usize },
}

#[derive(Debug, Default)]
struct StoreState {
    entries: EntrySet,
    undo: Option<UndoSlot>,
}

/// Mutex-guarded entry store with snapshot reads and change subscriptions.
#[derive(Debug, Default)]
pub struct EntryStore {
    state: Mutex<StoreState>,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a store from persisted parts.
    pub fn from_parts(entries: EntrySet, undo: Option<UndoSlot>) -> Self {
        Self {
            state: Mutex::new(StoreState { entries, undo }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Writes `text` at `coord`.
    ///
    /// Blank text behaves exactly like [`EntryStore::remove`] and returns
    /// `Ok(None)`. Otherwise the entry is created or fully replaced with
    /// `created_at = now` and returned.
    pub fn upsert(
        &self,
        coord: CalendarCoordinate,
        text: &str,
        now: i64,
    ) -> Result<Option<Entry>, StoreError> {
        self.upsert_with_image(coord, text, None, now)
    }

    /// Same as [`EntryStore::upsert`] with an attached image url.
    pub fn upsert_with_image(
        &self,
        coord: CalendarCoordinate,
        text: &str,
        image_url: Option<&str>,
        now: i64,
    ) -> Result<Option<Entry>, StoreError> {
        if text.trim().is_empty() {
            self.remove(coord);
            return Ok(None);
        }

        let entry = Entry::new(coord, text, now, image_url)?;
        let mut state = self.lock_state();
        state.entries.insert(entry.clone())?;
        self.notify(StoreEvent::Upserted(entry.id));
        drop(state);
        debug!(
            "event=entry_upsert module=store status=ok id={} created_at={}",
            entry.id, entry.created_at
        );
        Ok(Some(entry))
    }

    /// Removes the entry at `coord`, remembering it for undo.
    ///
    /// The undo slot is overwritten even when nothing was stored, so a
    /// following undo becomes a no-op.
    pub fn remove(&self, coord: CalendarCoordinate) -> Option<Entry> {
        let id = coord.to_id();
        let mut state = self.lock_state();
        let previous = state.entries.remove(&id);
        state.undo = Some(UndoSlot {
            id,
            previous: previous.clone(),
        });
        if previous.is_some() {
            self.notify(StoreEvent::Removed(id));
        }
        drop(state);
        debug!(
            "event=entry_remove module=store status=ok id={} existed={}",
            id,
            previous.is_some()
        );
        previous
    }

    /// Re-inserts the last removed entry unchanged.
    ///
    /// Returns `None` without side effects when the slot is empty or held
    /// nothing, so repeated calls are safe.
    pub fn undo_last_removal(&self) -> Option<Entry> {
        let mut state = self.lock_state();
        let slot = state.undo.take()?;
        let restored = slot.previous?;
        state.entries.insert(restored.clone()).ok()?;
        self.notify(StoreEvent::Restored(restored.id));
        drop(state);
        debug!(
            "event=entry_undo module=store status=ok id={}",
            restored.id
        );
        Some(restored)
    }

    pub fn get(&self, id: &EntryId) -> Option<Entry> {
        self.lock_state().entries.get(id).cloned()
    }

    /// Returns a snapshot copy of the whole set.
    pub fn all(&self) -> EntrySet {
        self.lock_state().entries.clone()
    }

    /// Returns a copy of the pending undo slot.
    pub fn undo_slot(&self) -> Option<UndoSlot> {
        self.lock_state().undo.clone()
    }

    /// Returns entries and undo slot captured under one lock.
    pub fn snapshot(&self) -> (EntrySet, Option<UndoSlot>) {
        let state = self.lock_state();
        (state.entries.clone(), state.undo.clone())
    }

    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().entries.is_empty()
    }

    /// Replaces the whole set, e.g. after reconciliation.
    ///
    /// The undo slot is cleared because it may reference a superseded entry.
    pub fn replace_all(&self, entries: EntrySet) {
        let count = entries.len();
        let mut state = self.lock_state();
        state.entries = entries;
        state.undo = None;
        self.notify(StoreEvent::Replaced { count });
        drop(state);
        info!(
            "event=store_replace module=store status=ok count={}",
            count
        );
    }

    /// Reconciles the current set with `remote` and swaps in the result
    /// under one lock, so writes committed while `remote` was being
    /// fetched or published are merged rather than overwritten.
    ///
    /// The undo slot survives unless `remote` holds an entry for its day.
    pub fn merge_remote(&self, remote: &EntrySet) -> ReconcileSummary {
        let mut state = self.lock_state();
        let (merged, summary) = reconcile_with_summary(&state.entries, remote);
        state.entries = merged;
        if state
            .undo
            .as_ref()
            .is_some_and(|slot| remote.contains(&slot.id))
        {
            state.undo = None;
        }
        let count = state.entries.len();
        self.notify(StoreEvent::Replaced { count });
        drop(state);
        info!(
            "event=store_merge module=store status=ok count={} local_wins={} remote_wins={}",
            count, summary.local_wins, summary.remote_wins
        );
        summary
    }

    /// Registers a new change subscriber.
    ///
    /// Dropping the receiver unsubscribes on the next notification.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (sender, receiver) = channel();
        self.lock_subscribers().push(sender);
        receiver
    }

    fn notify(&self, event: StoreEvent) {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        // State is only mutated after validation succeeds, so a poisoned
        // guard still holds a consistent set.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Sender<StoreEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
