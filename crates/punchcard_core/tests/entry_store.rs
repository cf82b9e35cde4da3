use punchcard_core::{CalendarCoordinate, EntryId, EntryStore, StoreEvent, UndoSlot};
use std::sync::Arc;
use std::thread;

fn coord(month: i32, day: i32) -> CalendarCoordinate {
    CalendarCoordinate::new(month, day).unwrap()
}

#[test]
fn rewriting_a_day_keeps_one_entry_with_latest_text_and_time() {
    let store = EntryStore::new();

    store.upsert(coord(0, 13), "first draft", 1_000).unwrap();
    store.upsert(coord(0, 13), "second draft", 2_000).unwrap();

    let all = store.all();
    assert_eq!(all.len(), 1);
    let id: EntryId = "2026-01-14".parse().unwrap();
    let entry = all.get(&id).unwrap();
    assert_eq!(entry.text, "second draft");
    assert_eq!(entry.created_at, 2_000);
    assert_eq!(entry.label, "jan 14");
}

#[test]
fn upsert_then_get_returns_trimmed_entry() {
    let store = EntryStore::new();

    let written = store
        .upsert(coord(4, 19), "  throwing session \n", 42)
        .unwrap()
        .unwrap();
    assert_eq!(written.text, "throwing session");

    let loaded = store.get(&coord(4, 19).to_id()).unwrap();
    assert_eq!(loaded, written);
}

#[test]
fn whitespace_upsert_on_empty_day_creates_nothing() {
    let store = EntryStore::new();

    let result = store.upsert(coord(2, 2), " \t\n ", 10).unwrap();

    assert!(result.is_none());
    assert!(store.is_empty());
}

#[test]
fn whitespace_upsert_on_written_day_removes_it_and_allows_undo() {
    let store = EntryStore::new();
    let original = store.upsert(coord(2, 2), "kiln", 10).unwrap().unwrap();

    assert!(store.upsert(coord(2, 2), "   ", 20).unwrap().is_none());
    assert!(store.get(&original.id).is_none());

    assert_eq!(store.undo_last_removal(), Some(original));
}

#[test]
fn remove_then_undo_restores_exactly_once() {
    let store = EntryStore::new();
    let original = store.upsert(coord(6, 3), "fireworks", 500).unwrap().unwrap();

    let removed = store.remove(coord(6, 3)).unwrap();
    assert_eq!(removed, original);
    assert!(store.get(&original.id).is_none());

    let restored = store.undo_last_removal().unwrap();
    assert_eq!(restored, original);
    assert_eq!(store.get(&original.id), Some(original));

    assert!(store.undo_last_removal().is_none());
}

#[test]
fn removing_an_empty_day_overwrites_the_undo_slot() {
    let store = EntryStore::new();
    store.upsert(coord(6, 3), "fireworks", 500).unwrap();
    store.remove(coord(6, 3));

    assert!(store.remove(coord(6, 4)).is_none());
    assert_eq!(
        store.undo_slot(),
        Some(UndoSlot {
            id: coord(6, 4).to_id(),
            previous: None,
        })
    );

    assert!(store.undo_last_removal().is_none());
    assert!(store.get(&coord(6, 3).to_id()).is_none());
}

#[test]
fn upsert_does_not_touch_the_undo_slot() {
    let store = EntryStore::new();
    let original = store.upsert(coord(9, 0), "october", 1).unwrap().unwrap();
    store.remove(coord(9, 0));

    store.upsert(coord(9, 1), "another day", 2).unwrap();

    assert_eq!(store.undo_last_removal(), Some(original));
}

#[test]
fn subscribers_see_committed_mutations_in_order() {
    let store = EntryStore::new();
    let events = store.subscribe();

    store.upsert(coord(0, 0), "new year", 1).unwrap();
    store.remove(coord(0, 0));
    store.undo_last_removal();
    store.remove(coord(0, 1));

    let received = events.try_iter().collect::<Vec<_>>();
    let id = coord(0, 0).to_id();
    assert_eq!(
        received,
        vec![
            StoreEvent::Upserted(id),
            StoreEvent::Removed(id),
            StoreEvent::Restored(id),
        ]
    );
}

#[test]
fn dropped_subscribers_do_not_block_writes() {
    let store = EntryStore::new();
    drop(store.subscribe());

    assert!(store.upsert(coord(3, 3), "april", 1).unwrap().is_some());
}

#[test]
fn concurrent_writers_to_distinct_days_all_land() {
    let store = Arc::new(EntryStore::new());

    let handles = (0..12)
        .map(|month| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for day in 0..28 {
                    store
                        .upsert(coord(month, day), "entry", i64::from(day))
                        .unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 12 * 28);
}
