//! Tests for the displayed-page store and navigation.

mod common;

use std::sync::Arc;

use common::{FakeSource, ids};
use folio::{BrowserConfig, BrowserController, Error, PageInfo, PageStore};
use parking_lot::Mutex;

#[tokio::test]
async fn test_store_starts_not_fetched() {
    let source = FakeSource::new(133, 12);
    let store = PageStore::new(Arc::clone(&source), 12);

    assert!(!store.is_loaded());
    assert_eq!(store.info(), None);
    assert_eq!(store.current_page(), None);
    assert_eq!(store.total_pages(), None);
    assert!(store.items().is_empty());
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_load_initial_fetches_first_page() {
    let source = FakeSource::new(133, 12);
    let store = PageStore::new(Arc::clone(&source), 12);

    let info = store.load_initial().await.expect("initial load");
    assert_eq!(
        info,
        PageInfo {
            number: 1,
            total_pages: 12,
            page_size: 12
        }
    );
    assert_eq!(source.started(), vec![1]);
    assert_eq!(ids(&store.items()), (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_navigation_replaces_page_and_refetches() {
    let source = FakeSource::new(133, 12);
    let store = PageStore::new(Arc::clone(&source), 12);
    store.load_initial().await.expect("initial load");

    let info = store.go_to_page(12).await.expect("last page");
    assert_eq!(info.number, 12);
    assert!(!info.has_next());
    assert_eq!(info.first_row(), 132);
    assert_eq!(ids(&store.items()), vec![133]);

    // No cache: revisiting a page fetches it again
    store.go_to_page(1).await.expect("first page");
    assert_eq!(source.started(), vec![1, 12, 1]);
}

#[tokio::test]
async fn test_failed_navigation_keeps_displayed_page() {
    let source = FakeSource::new(133, 12);
    let store = PageStore::new(Arc::clone(&source), 12);
    store.go_to_page(3).await.expect("page 3");
    let before = store.page().expect("loaded");

    source.fail_page(4);
    let err = store.go_to_page(4).await.expect_err("page 4 fails");

    assert_eq!(err.failed_page(), Some(4));
    assert_eq!(store.page(), Some(before));
    assert_eq!(store.current_page(), Some(3));
}

#[tokio::test]
async fn test_failed_initial_load_stays_not_fetched() {
    let source = FakeSource::new(133, 12);
    let store = PageStore::new(Arc::clone(&source), 12);
    source.fail_page(1);

    assert!(store.load_initial().await.is_err());
    assert!(!store.is_loaded());
    assert_eq!(store.total_pages(), None);

    source.heal_page(1);
    store.load_initial().await.expect("retry");
    assert_eq!(store.total_pages(), Some(12));
}

#[tokio::test]
async fn test_page_zero_is_rejected_without_fetching() {
    let source = FakeSource::new(133, 12);
    let store = PageStore::new(Arc::clone(&source), 12);

    let result = store.go_to_page(0).await;
    assert!(matches!(result, Err(Error::InvalidPage(0))));
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_empty_collection_has_one_page() {
    let source = FakeSource::new(0, 12);
    let store = PageStore::new(Arc::clone(&source), 12);

    let info = store.load_initial().await.expect("initial load");
    assert_eq!(info.total_pages, 1);
    assert!(store.items().is_empty());
    assert!(!info.has_next());
    assert!(!info.has_previous());
}

#[tokio::test]
async fn test_controller_reports_navigation() {
    let source = FakeSource::new(133, 12);
    let browser = BrowserController::new(Arc::clone(&source), &BrowserConfig::default());

    let pages = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&pages);
    browser
        .page_changed
        .connect(move |info: &PageInfo| recorded.lock().push(info.number));
    let recorded = Arc::clone(&failures);
    browser
        .fetch_failed
        .connect(move |message: &String| recorded.lock().push(message.clone()));

    browser.load_initial().await.expect("initial load");
    browser.go_to_page(2).await.expect("page 2");
    source.fail_page(3);
    assert!(browser.go_to_page(3).await.is_err());

    assert_eq!(*pages.lock(), vec![1, 2]);
    assert_eq!(failures.lock().len(), 1);
    assert_eq!(browser.store().current_page(), Some(2));
}
