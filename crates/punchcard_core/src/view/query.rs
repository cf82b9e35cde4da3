//! Read-only ordering, filtering and paging projections.
//!
//! # Invariants
//! - No function here mutates or re-validates its input.
//! - Write-time order (`sorted_descending`) and calendar order
//!   (`sorted_by_calendar_label`) are separate projections; callers pick one.
//! - Paging past the last page yields an empty page, never the last page.

use crate::model::coordinate::{label_to_coordinate, EntryId};
use crate::model::entry::{Entry, EntrySet};
use std::cmp::Reverse;

/// Page size of the public notebook view.
pub const NOTEBOOK_PAGE_SIZE: usize = 8;

/// Presentation ordering for entry lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryOrder {
    /// Newest write first.
    #[default]
    Written,
    /// Latest calendar day first.
    Calendar,
}

/// Orders entries by descending `created_at`, ties by descending id.
pub fn sorted_descending(set: &EntrySet) -> Vec<Entry> {
    let mut entries = set.to_vec();
    entries.sort_by_key(|entry| Reverse((entry.created_at, entry.id)));
    entries
}

/// Orders entries by descending calendar day parsed from each label.
pub fn sorted_by_calendar_label(set: &EntrySet) -> Vec<Entry> {
    let mut entries = set.to_vec();
    entries.sort_by_key(|entry| {
        // Set members passed validation, so the label always parses; the id
        // names the same day.
        let coord = label_to_coordinate(&entry.label).unwrap_or_else(|_| entry.coordinate());
        Reverse(coord)
    });
    entries
}

/// Applies one of the two orderings.
pub fn sort_entries(set: &EntrySet, order: EntryOrder) -> Vec<Entry> {
    match order {
        EntryOrder::Written => sorted_descending(set),
        EntryOrder::Calendar => sorted_by_calendar_label(set),
    }
}

/// Keeps entries whose label or text contains `query`, case-insensitively.
///
/// A blank query keeps every entry. Input order is preserved.
pub fn filter_by_query<'a>(entries: impl IntoIterator<Item = &'a Entry>, query: &str) -> Vec<Entry> {
    let needle = query.trim().to_lowercase();
    entries
        .into_iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.label.to_lowercase().contains(&needle)
                || entry.text.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Returns `entries[page_index*page_size .. page_index*page_size+page_size]`,
/// clamped to bounds.
pub fn paginate(entries: &[Entry], page_size: usize, page_index: usize) -> Vec<Entry> {
    let Some(start) = page_index.checked_mul(page_size) else {
        return Vec::new();
    };
    if page_size == 0 || start >= entries.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(entries.len());
    entries[start..end].to_vec()
}

/// Page bookkeeping for "page x / y, showing a-b of n" displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total_items: usize,
    pub page_size: usize,
    /// Always at least 1.
    pub total_pages: usize,
    /// Requested page clamped to the last valid page.
    pub page_index: usize,
    /// 1-based index of the first item shown, 0 when nothing is shown.
    pub first_item: usize,
    /// 1-based index of the last item shown, 0 when nothing is shown.
    pub last_item: usize,
}

impl PageWindow {
    pub fn new(total_items: usize, page_size: usize, requested_page: usize) -> Self {
        let total_pages = if page_size == 0 {
            1
        } else {
            total_items.div_ceil(page_size).max(1)
        };
        let page_index = requested_page.min(total_pages - 1);
        let start = page_index * page_size;
        let (first_item, last_item) = if page_size == 0 || start >= total_items {
            (0, 0)
        } else {
            (start + 1, (start + page_size).min(total_items))
        };
        Self {
            total_items,
            page_size,
            total_pages,
            page_index,
            first_item,
            last_item,
        }
    }

    /// Whether more than one page exists.
    pub fn is_paged(&self) -> bool {
        self.total_pages > 1
    }
}

/// Returns the page holding `id`, for focusing a specific entry.
pub fn page_containing(entries: &[Entry], id: &EntryId, page_size: usize) -> Option<usize> {
    if page_size == 0 {
        return None;
    }
    entries
        .iter()
        .position(|entry| entry.id == *id)
        .map(|index| index / page_size)
}
