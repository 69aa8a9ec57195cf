//! Change event tests
//!
//! Events are synchronous and post-commit: by the time a listener runs,
//! the write is durable and visible to any other connection.

use std::sync::{Arc, Mutex};

use marchkit_core::events::ChangeEvent;
use marchkit_core::ids::EntityKind;
use marchkit_core::model::{MarcherPageUpdate, MarcherUpdate, NewMarcher, NewPage};
use marchkit_store::ShowStore;
use tempfile::TempDir;

fn marcher_draft(prefix: &str, order: i64) -> NewMarcher {
    NewMarcher {
        name: None,
        section: "Mellophone".to_string(),
        year: None,
        notes: None,
        drill_prefix: prefix.to_string(),
        drill_order: order,
    }
}

fn page_draft(name: &str) -> NewPage {
    NewPage {
        name: name.to_string(),
        notes: None,
        tempo: 120.0,
        time_signature: None,
        counts: 8,
    }
}

/// Record every event the store publishes.
fn record_events(store: &ShowStore) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store
        .events()
        .subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}

#[test]
fn test_create_marcher_publishes_marcher_then_matrix() {
    let mut store = ShowStore::open_in_memory().unwrap();
    let page = store.create_page(&page_draft("Page 1")).unwrap();
    let seen = record_events(&store);

    let marcher = store.create_marcher(&marcher_draft("M", 1)).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, EntityKind::Marcher);
    assert_eq!(seen[0].affected_ids, vec![marcher.id]);
    assert_eq!(seen[0].page_id, None);

    assert_eq!(seen[1].kind, EntityKind::MarcherPage);
    assert_eq!(seen[1].affected_ids.len(), 1);
    // Completion rows from a marcher create may span many pages
    assert_eq!(seen[1].page_id, None);

    let row = store.marcher_page(marcher.id, page.id).unwrap();
    assert_eq!(seen[1].affected_ids, vec![row.id]);
}

#[test]
fn test_create_marcher_in_empty_show_publishes_once() {
    let mut store = ShowStore::open_in_memory().unwrap();
    let seen = record_events(&store);

    store.create_marcher(&marcher_draft("M", 1)).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, EntityKind::Marcher);
}

#[test]
fn test_create_page_completion_carries_page_id() {
    let mut store = ShowStore::open_in_memory().unwrap();
    store.create_marcher(&marcher_draft("M", 1)).unwrap();
    store.create_marcher(&marcher_draft("M", 2)).unwrap();
    let seen = record_events(&store);

    let page = store.create_page(&page_draft("Page 1")).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, EntityKind::Page);
    assert_eq!(seen[0].affected_ids, vec![page.id]);

    assert_eq!(seen[1].kind, EntityKind::MarcherPage);
    assert_eq!(seen[1].affected_ids.len(), 2);
    assert_eq!(seen[1].page_id, Some(page.id));
}

#[test]
fn test_coordinate_update_event() {
    let mut store = ShowStore::open_in_memory().unwrap();
    let marcher = store.create_marcher(&marcher_draft("M", 1)).unwrap();
    let page = store.create_page(&page_draft("Page 1")).unwrap();
    let row = store.marcher_page(marcher.id, page.id).unwrap();
    let seen = record_events(&store);

    let update = MarcherPageUpdate {
        x: Some(2.0),
        y: Some(3.0),
        notes: None,
    };
    store
        .update_marcher_page(marcher.id, page.id, &update)
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, EntityKind::MarcherPage);
    assert_eq!(seen[0].affected_ids, vec![row.id]);
    assert_eq!(seen[0].page_id, Some(page.id));
}

#[test]
fn test_delete_events_name_cascaded_rows() {
    let mut store = ShowStore::open_in_memory().unwrap();
    let marcher = store.create_marcher(&marcher_draft("M", 1)).unwrap();
    let page_a = store.create_page(&page_draft("Page 1")).unwrap();
    let page_b = store.create_page(&page_draft("Page 2")).unwrap();
    let row_a = store.marcher_page(marcher.id, page_a.id).unwrap();
    let row_b = store.marcher_page(marcher.id, page_b.id).unwrap();
    let seen = record_events(&store);

    store.delete_marcher(marcher.id).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, EntityKind::Marcher);
    assert_eq!(seen[0].affected_ids, vec![marcher.id]);
    assert_eq!(seen[1].kind, EntityKind::MarcherPage);
    assert_eq!(seen[1].affected_ids, vec![row_a.id, row_b.id]);
    assert_eq!(seen[1].page_id, None);
}

#[test]
fn test_delete_page_cascade_carries_page_id() {
    let mut store = ShowStore::open_in_memory().unwrap();
    store.create_marcher(&marcher_draft("M", 1)).unwrap();
    let page = store.create_page(&page_draft("Page 1")).unwrap();
    let seen = record_events(&store);

    store.delete_page(page.id).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, EntityKind::Page);
    assert_eq!(seen[1].kind, EntityKind::MarcherPage);
    assert_eq!(seen[1].page_id, Some(page.id));
}

#[test]
fn test_failed_mutation_publishes_nothing() {
    let mut store = ShowStore::open_in_memory().unwrap();
    store.create_marcher(&marcher_draft("M", 1)).unwrap();
    let seen = record_events(&store);

    store
        .create_marcher(&marcher_draft("M", 1))
        .expect_err("duplicate drill number");
    store
        .update_marcher(9999, &MarcherUpdate::default())
        .expect_err("empty update");

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_same_kind_events_arrive_in_commit_order() {
    let mut store = ShowStore::open_in_memory().unwrap();
    let seen = record_events(&store);

    let ids: Vec<i64> = (1..=3)
        .map(|n| store.create_marcher(&marcher_draft("M", n)).unwrap().id)
        .collect();

    let seen = seen.lock().unwrap();
    let marcher_ids: Vec<i64> = seen
        .iter()
        .filter(|e| e.kind == EntityKind::Marcher)
        .flat_map(|e| e.affected_ids.clone())
        .collect();
    assert_eq!(marcher_ids, ids);
}

#[test]
fn test_listener_observes_committed_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("show.db");
    let mut store = ShowStore::open(&path).unwrap();

    // The listener reads through its own connection: if publication ever
    // ran before commit, the count would still be zero here.
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    let probe_path = path.clone();
    store.events().subscribe(move |event| {
        if event.kind != EntityKind::Marcher {
            return;
        }
        let conn = rusqlite::Connection::open(&probe_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM marchers", [], |row| row.get(0))
            .unwrap();
        sink.lock().unwrap().push(count);
    });

    store.create_marcher(&marcher_draft("M", 1)).unwrap();
    store.create_marcher(&marcher_draft("M", 2)).unwrap();

    assert_eq!(*observed.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_unsubscribed_listener_stops_receiving() {
    let mut store = ShowStore::open_in_memory().unwrap();
    let bus = store.events();

    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    let subscription = bus.subscribe(move |_| *sink.lock().unwrap() += 1);

    store.create_marcher(&marcher_draft("M", 1)).unwrap();
    assert!(bus.unsubscribe(subscription));
    store.create_marcher(&marcher_draft("M", 2)).unwrap();

    assert_eq!(*seen.lock().unwrap(), 1);
}
