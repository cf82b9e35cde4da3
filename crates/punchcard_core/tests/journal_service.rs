use punchcard_core::{
    open_db_in_memory, AdminGate, AuthorizationToken, BoundaryError, CalendarCoordinate,
    CodecError, Entry, EntryOrder, EntrySet, EntryStore, FetchBoundary, FetchOutcome,
    JournalService, JournalServiceError, PublishBoundary, SqliteEntryRepository,
};
use std::cell::RefCell;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

const SECRET: &str = "kiln-key";

/// In-memory boundary with a switchable fetch failure.
#[derive(Default)]
struct MemoryBoundary {
    published: RefCell<EntrySet>,
    fail_fetch: bool,
    publish_calls: RefCell<Vec<Vec<String>>>,
}

impl PublishBoundary for MemoryBoundary {
    fn publish(
        &self,
        entries: &[Entry],
        token: &AuthorizationToken,
    ) -> Result<usize, BoundaryError> {
        if token.expose() != SECRET {
            return Err(BoundaryError::Unauthorized);
        }
        self.publish_calls
            .borrow_mut()
            .push(entries.iter().map(|entry| entry.id.to_string()).collect());
        *self.published.borrow_mut() = EntrySet::try_from_entries(entries.to_vec())
            .map_err(|err| BoundaryError::Storage(err.to_string()))?;
        Ok(entries.len())
    }
}

impl FetchBoundary for MemoryBoundary {
    fn fetch_entries(&self) -> FetchOutcome {
        if self.fail_fetch {
            return FetchOutcome::failed("offline");
        }
        FetchOutcome::loaded(self.published.borrow().clone())
    }
}

/// Boundary that parks inside `publish` until the test lets it finish.
struct GatedBoundary {
    published: Mutex<EntrySet>,
    entered: Mutex<Sender<()>>,
    resume: Mutex<Receiver<()>>,
}

impl GatedBoundary {
    fn new(remote: Vec<Entry>) -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = channel();
        let (resume_tx, resume_rx) = channel();
        let boundary = Self {
            published: Mutex::new(EntrySet::try_from_entries(remote).unwrap()),
            entered: Mutex::new(entered_tx),
            resume: Mutex::new(resume_rx),
        };
        (boundary, entered_rx, resume_tx)
    }

    fn park(&self) {
        self.entered.lock().unwrap().send(()).unwrap();
        self.resume.lock().unwrap().recv().unwrap();
    }
}

impl PublishBoundary for GatedBoundary {
    fn publish(
        &self,
        entries: &[Entry],
        _token: &AuthorizationToken,
    ) -> Result<usize, BoundaryError> {
        self.park();
        *self.published.lock().unwrap() = EntrySet::try_from_entries(entries.to_vec())
            .map_err(|err| BoundaryError::Storage(err.to_string()))?;
        Ok(entries.len())
    }
}

impl FetchBoundary for GatedBoundary {
    fn fetch_entries(&self) -> FetchOutcome {
        FetchOutcome::loaded(self.published.lock().unwrap().clone())
    }
}

fn entry(month: i32, day: i32, text: &str, created_at: i64) -> Entry {
    Entry::new(
        CalendarCoordinate::new(month, day).unwrap(),
        text,
        created_at,
        None,
    )
    .unwrap()
}

fn service_with_remote(remote: Vec<Entry>, fail_fetch: bool) -> JournalService<MemoryBoundary> {
    let boundary = MemoryBoundary {
        published: RefCell::new(EntrySet::try_from_entries(remote).unwrap()),
        fail_fetch,
        ..MemoryBoundary::default()
    };
    JournalService::new(EntryStore::new(), boundary)
}

#[test]
fn write_and_erase_by_label() {
    let service = service_with_remote(vec![], false);

    let written = service.write("Jan 14", "met with advisor", 1_000).unwrap();
    assert_eq!(written.unwrap().id.to_string(), "2026-01-14");

    let erased = service.erase("jan 14").unwrap();
    assert!(erased.is_some());
    assert!(service.store().is_empty());

    assert_eq!(service.undo().unwrap().text, "met with advisor");
}

#[test]
fn unknown_labels_surface_codec_errors() {
    let service = service_with_remote(vec![], false);

    assert!(matches!(
        service.write("smarch 3", "x", 1),
        Err(JournalServiceError::Codec(CodecError::UnparseableLabel(_)))
    ));
    assert!(matches!(
        service.erase("feb 30"),
        Err(JournalServiceError::Codec(CodecError::InvalidCoordinate { .. }))
    ));
}

#[test]
fn refresh_merges_remote_entries() {
    let service = service_with_remote(
        vec![entry(0, 0, "remote newer", 50), entry(0, 1, "remote only", 5)],
        false,
    );
    service.write("jan 1", "local older", 10).unwrap();
    service.write("jan 3", "local only", 20).unwrap();

    let summary = service.refresh_from_remote().unwrap();

    assert_eq!(summary.total(), 3);
    let all = service.store().all();
    assert_eq!(all.len(), 3);
    let jan_1 = CalendarCoordinate::new(0, 0).unwrap().to_id();
    assert_eq!(all.get(&jan_1).unwrap().text, "remote newer");
}

#[test]
fn failed_fetch_keeps_local_entries() {
    let service = service_with_remote(vec![], true);
    service.write("mar 3", "studio", 10).unwrap();

    let err = service.refresh_from_remote().unwrap_err();

    assert!(matches!(err, JournalServiceError::RemoteUnavailable(_)));
    assert_eq!(service.store().len(), 1);
}

#[test]
fn publish_sends_merged_set_newest_first_and_adopts_it() {
    let service = service_with_remote(vec![entry(5, 0, "remote", 15)], false);
    service.write("jan 2", "older local", 10).unwrap();
    service.write("dec 31", "newest local", 30).unwrap();

    let report = service
        .publish(&AuthorizationToken::new(SECRET))
        .unwrap();

    assert_eq!(report.published, 3);
    assert_eq!(report.merge.remote_only, 1);
    let calls = service.boundary().publish_calls.borrow();
    assert_eq!(
        calls[0],
        vec!["2026-12-31", "2026-06-01", "2026-01-02"]
    );
    assert_eq!(service.store().len(), 3);
}

#[test]
fn rejected_publish_leaves_local_store_untouched() {
    let service = service_with_remote(vec![entry(5, 0, "remote", 15)], false);
    service.write("jan 2", "local", 10).unwrap();

    let err = service
        .publish(&AuthorizationToken::new("wrong"))
        .unwrap_err();

    assert!(matches!(
        err,
        JournalServiceError::Boundary(BoundaryError::Unauthorized)
    ));
    assert_eq!(service.store().len(), 1);
    assert!(service.boundary().publish_calls.borrow().is_empty());
}

#[test]
fn publish_refuses_to_run_without_remote_state() {
    let service = service_with_remote(vec![], true);
    service.write("jan 2", "local", 10).unwrap();

    assert!(matches!(
        service.publish(&AuthorizationToken::new(SECRET)),
        Err(JournalServiceError::RemoteUnavailable(_))
    ));
}

#[test]
fn page_filters_orders_and_clamps() {
    let service = service_with_remote(vec![], false);
    for day in 1..=10 {
        service
            .write(&format!("apr {day}"), "wheel practice", i64::from(day))
            .unwrap();
    }
    service.write("may 1", "glaze day", 100).unwrap();

    let first = service.page("wheel", EntryOrder::Written, 4, 0);
    assert_eq!(first.window.total_items, 10);
    assert_eq!(first.window.total_pages, 3);
    assert_eq!(first.items[0].label, "apr 10");

    let clamped = service.page("wheel", EntryOrder::Calendar, 4, 99);
    assert_eq!(clamped.window.page_index, 2);
    assert_eq!((clamped.window.first_item, clamped.window.last_item), (9, 10));
    assert_eq!(clamped.items.len(), 2);
    assert_eq!(clamped.items[1].label, "apr 1");
}

#[test]
fn sqlite_backed_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn, AdminGate::new(Some(SECRET)));
    let author = JournalService::new(EntryStore::new(), repo);
    author.write("oct 31", "costume kiln", 500).unwrap();
    author
        .publish(&AuthorizationToken::new(format!(" {SECRET} ")))
        .unwrap();

    let reader_repo = SqliteEntryRepository::new(&conn, AdminGate::disabled());
    let reader = JournalService::new(EntryStore::new(), reader_repo);
    reader.refresh_from_remote().unwrap();

    let all = reader.store().all();
    assert_eq!(all.len(), 1);
    assert_eq!(all.iter().next().unwrap().label, "oct 31");
}

#[test]
fn writes_made_during_publish_survive_adoption() {
    let (boundary, entered, resume) = GatedBoundary::new(vec![entry(5, 0, "remote", 15)]);
    let service = JournalService::new(EntryStore::new(), boundary);
    service.write("jan 2", "local", 10).unwrap();

    let report = thread::scope(|scope| {
        let publisher = scope.spawn(|| service.publish(&AuthorizationToken::new(SECRET)));
        entered.recv().unwrap();
        service.write("mar 3", "glaze", 50).unwrap();
        service.write("jan 2", "local rewrite", 60).unwrap();
        resume.send(()).unwrap();
        publisher.join().unwrap()
    })
    .unwrap();

    assert_eq!(report.published, 2);
    let all = service.store().all();
    assert_eq!(all.len(), 3);
    let mar_3 = CalendarCoordinate::new(2, 2).unwrap().to_id();
    assert_eq!(all.get(&mar_3).unwrap().text, "glaze");
    let jan_2 = CalendarCoordinate::new(0, 1).unwrap().to_id();
    assert_eq!(all.get(&jan_2).unwrap().text, "local rewrite");
}

#[test]
fn refresh_keeps_newer_local_writes_and_the_undo_slot() {
    let service = service_with_remote(vec![entry(0, 0, "remote stale", 5)], false);
    service.write("jan 1", "local fresh", 40).unwrap();
    service.write("jul 4", "fireworks", 20).unwrap();
    service.erase("jul 4").unwrap();

    let summary = service.refresh_from_remote().unwrap();

    assert_eq!(summary.local_wins, 1);
    let jan_1 = CalendarCoordinate::new(0, 0).unwrap().to_id();
    assert_eq!(service.store().get(&jan_1).unwrap().text, "local fresh");
    assert_eq!(service.undo().unwrap().text, "fireworks");
}
