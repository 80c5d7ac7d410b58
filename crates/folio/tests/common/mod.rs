//! Shared fixtures for browser tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use folio::{Error, Item, Page, PageSource, Result};
use folio_net::NetworkError;
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// In-memory collection of `total_items` items served in pages of
/// `page_size`, in remote order. Item ids are 1-based positions.
///
/// Records which pages were requested and in which order fetches finished.
/// Individual pages can be made to fail, or gated so they only complete when
/// the test releases them.
pub struct FakeSource {
    total_items: usize,
    page_size: usize,
    started: Mutex<Vec<u32>>,
    completed: Mutex<Vec<u32>>,
    failing: Mutex<HashSet<u32>>,
    gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    releases: Mutex<HashMap<u32, oneshot::Sender<()>>>,
}

impl FakeSource {
    pub fn new(total_items: usize, page_size: usize) -> Arc<Self> {
        Arc::new(Self {
            total_items,
            page_size,
            started: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            gates: Mutex::new(HashMap::new()),
            releases: Mutex::new(HashMap::new()),
        })
    }

    pub fn total_pages(&self) -> u32 {
        self.total_items.div_ceil(self.page_size) as u32
    }

    /// Make every fetch of `page` fail with a 503.
    pub fn fail_page(&self, page: u32) {
        self.failing.lock().insert(page);
    }

    /// Let fetches of `page` succeed again.
    pub fn heal_page(&self, page: u32) {
        self.failing.lock().remove(&page);
    }

    /// Hold the next fetch of `page` until [`release`](Self::release) is called.
    pub fn gate(&self, page: u32) {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(page, rx);
        self.releases.lock().insert(page, tx);
    }

    /// Let a gated fetch of `page` complete.
    pub fn release(&self, page: u32) {
        if let Some(tx) = self.releases.lock().remove(&page) {
            let _ = tx.send(());
        }
    }

    /// Pages requested so far, in request order.
    pub fn started(&self) -> Vec<u32> {
        self.started.lock().clone()
    }

    /// Pages whose fetch finished, in completion order.
    pub fn completed(&self) -> Vec<u32> {
        self.completed.lock().clone()
    }

    /// Requested pages, sorted.
    pub fn started_sorted(&self) -> Vec<u32> {
        let mut pages = self.started();
        pages.sort_unstable();
        pages
    }

    pub fn fetch_count(&self) -> usize {
        self.started.lock().len()
    }

    pub fn reset_log(&self) {
        self.started.lock().clear();
        self.completed.lock().clear();
    }

    /// Wait until at least `count` fetches have started.
    pub async fn wait_for_started(&self, count: usize) {
        wait_until(|| self.started.lock().len() >= count).await;
    }

    /// Wait until at least `count` fetches have finished.
    pub async fn wait_for_completed(&self, count: usize) {
        wait_until(|| self.completed.lock().len() >= count).await;
    }

    fn page_items(&self, page: u32) -> Vec<Item> {
        let start = (page as usize - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_items);
        (start..end)
            .map(|index| {
                let id = index as u64 + 1;
                Item::new(id).with_title(format!("Artwork {id}"))
            })
            .collect()
    }
}

impl PageSource for FakeSource {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        self.started.lock().push(page);

        let gate = self.gates.lock().remove(&page);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.completed.lock().push(page);

        if self.failing.lock().contains(&page) {
            return Err(Error::fetch(
                page,
                NetworkError::HttpStatus {
                    status: 503,
                    message: Some("Service Unavailable".to_string()),
                },
            ));
        }

        Ok(Page::new(page, self.total_pages(), self.page_items(page)))
    }
}

/// Ids `1..=count`, the first `count` items of any fake collection.
pub fn first_ids(count: u64) -> Vec<u64> {
    (1..=count).collect()
}

pub fn ids(items: &[Item]) -> Vec<u64> {
    items.iter().map(|item| item.id).collect()
}

/// Yield to other futures until `condition` holds.
///
/// Panics after a second so a broken test fails instead of hanging.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
