//! Matrix completion and cascade tests
//!
//! The marcher_pages table is a dense matrix: one row per (marcher, page)
//! pair, created with whichever parent arrives second and removed with
//! whichever parent leaves first.

use std::collections::HashSet;

use marchkit_core::model::{MarcherPageFilter, NewMarcher, NewPage};
use marchkit_core::MarchkitError;
use marchkit_store::ShowStore;

fn store() -> ShowStore {
    ShowStore::open_in_memory().unwrap()
}

fn marcher_draft(prefix: &str, order: i64) -> NewMarcher {
    NewMarcher {
        name: None,
        section: "Trumpet".to_string(),
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
        tempo: 132.0,
        time_signature: None,
        counts: 16,
    }
}

#[test]
fn test_first_marcher_in_empty_show_has_no_rows() {
    let mut store = store();
    let marcher = store.create_marcher(&marcher_draft("T", 1)).unwrap();
    assert!(store
        .marcher_pages(MarcherPageFilter::ByMarcher(marcher.id))
        .unwrap()
        .is_empty());
}

#[test]
fn test_marcher_create_completes_existing_pages() {
    let mut store = store();
    let page_a = store.create_page(&page_draft("Page 1")).unwrap();
    let page_b = store.create_page(&page_draft("Page 2")).unwrap();

    let marcher = store.create_marcher(&marcher_draft("T", 1)).unwrap();

    let rows = store
        .marcher_pages(MarcherPageFilter::ByMarcher(marcher.id))
        .unwrap();
    let covered: HashSet<i64> = rows.iter().map(|r| r.page_id).collect();
    assert_eq!(covered, HashSet::from([page_a.id, page_b.id]));
    assert!(rows.iter().all(|r| r.x.is_none() && r.y.is_none()));
}

#[test]
fn test_page_create_completes_existing_marchers() {
    let mut store = store();
    let marcher_a = store.create_marcher(&marcher_draft("T", 1)).unwrap();
    let marcher_b = store.create_marcher(&marcher_draft("T", 2)).unwrap();

    let page = store.create_page(&page_draft("Page 1")).unwrap();

    let rows = store
        .marcher_pages(MarcherPageFilter::ByPage(page.id))
        .unwrap();
    let covered: HashSet<i64> = rows.iter().map(|r| r.marcher_id).collect();
    assert_eq!(covered, HashSet::from([marcher_a.id, marcher_b.id]));
}

#[test]
fn test_matrix_stays_dense() {
    let mut store = store();
    let marchers = [
        store.create_marcher(&marcher_draft("T", 1)).unwrap(),
        store.create_marcher(&marcher_draft("T", 2)).unwrap(),
    ];
    let pages = [
        store.create_page(&page_draft("Page 1")).unwrap(),
        store.create_page(&page_draft("Page 2")).unwrap(),
    ];

    assert_eq!(store.marcher_pages(MarcherPageFilter::All).unwrap().len(), 4);
    for marcher in &marchers {
        for page in &pages {
            store.marcher_page(marcher.id, page.id).unwrap();
        }
    }
}

#[test]
fn test_delete_marcher_cascades() {
    let mut store = store();
    let marcher_a = store.create_marcher(&marcher_draft("T", 1)).unwrap();
    let marcher_b = store.create_marcher(&marcher_draft("T", 2)).unwrap();
    let page = store.create_page(&page_draft("Page 1")).unwrap();

    store.delete_marcher(marcher_a.id).unwrap();

    let remaining = store.marcher_pages(MarcherPageFilter::All).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].marcher_id, marcher_b.id);
    assert_eq!(
        store.marcher_page(marcher_a.id, page.id),
        Err(MarchkitError::MarcherPageNotFound {
            marcher_id: marcher_a.id,
            page_id: page.id,
        })
    );
}

#[test]
fn test_delete_page_cascades() {
    let mut store = store();
    let marcher = store.create_marcher(&marcher_draft("T", 1)).unwrap();
    let page_a = store.create_page(&page_draft("Page 1")).unwrap();
    let page_b = store.create_page(&page_draft("Page 2")).unwrap();

    store.delete_page(page_a.id).unwrap();

    let remaining = store
        .marcher_pages(MarcherPageFilter::ByMarcher(marcher.id))
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].page_id, page_b.id);
}

#[test]
fn test_recreated_marcher_gets_fresh_rows() {
    let mut store = store();
    let page = store.create_page(&page_draft("Page 1")).unwrap();
    let first = store.create_marcher(&marcher_draft("T", 1)).unwrap();

    store
        .update_marcher_page(
            first.id,
            page.id,
            &marchkit_core::model::MarcherPageUpdate {
                x: Some(10.0),
                y: Some(10.0),
                notes: None,
            },
        )
        .unwrap();
    store.delete_marcher(first.id).unwrap();

    // The drill number is free again, and the new rows start unplaced
    let second = store.create_marcher(&marcher_draft("T", 1)).unwrap();
    assert_eq!(second.drill_number, "T1");
    assert_ne!(second.id, first.id);

    let row = store.marcher_page(second.id, page.id).unwrap();
    assert_eq!(row.x, None);
    assert_eq!(row.y, None);
}

#[test]
fn test_filter_from_display_id() {
    let mut store = store();
    let marcher = store.create_marcher(&marcher_draft("T", 1)).unwrap();
    store.create_page(&page_draft("Page 1")).unwrap();
    store.create_page(&page_draft("Page 2")).unwrap();

    let filter = MarcherPageFilter::from_display_id(&marcher.id_for_html).unwrap();
    assert_eq!(store.marcher_pages(filter).unwrap().len(), 2);

    // A marcherPage display id does not name a filterable parent
    assert_eq!(MarcherPageFilter::from_display_id("marcherPage_1"), None);
}
