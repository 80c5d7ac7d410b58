//! Cross-page selection.
//!
//! Selecting `N` rows always means "the first `N` items of the whole
//! collection in remote order", regardless of which page is displayed. The
//! [`SelectionResolver`] works out which pages hold those items, fetches them
//! concurrently, and reassembles them by page index. Completion order of the
//! fetches never affects the result.
//!
//! The fan-out is bounded. Under [`PageCap::KnownTotal`] it never exceeds the
//! collection's page count, learning it from page 1 when no page has been
//! displayed yet. Under either policy a plan longer than the resolver's
//! page limit fails with [`Error::SelectionTooLarge`] before anything is
//! fetched.
//!
//! The active selection lives in [`Selection`], which only ever changes by
//! whole replacement.

use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

use folio_core::logging::targets;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use parking_lot::Mutex;

use crate::config::{DEFAULT_MAX_SELECTION_PAGES, PageCap};
use crate::error::{Error, Result};
use crate::model::{Item, Page};
use crate::source::PageSource;

/// Number of pages of `page_size` items needed to cover `count` items.
///
/// Saturates at `u32::MAX` pages.
///
/// # Panics
///
/// Panics if `page_size` is zero.
pub fn pages_needed(count: usize, page_size: usize) -> u32 {
    assert!(page_size > 0, "page size must be non-zero");
    u32::try_from(count.div_ceil(page_size)).unwrap_or(u32::MAX)
}

/// A request to select the first `count` rows of the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRequest {
    count: NonZeroUsize,
}

impl SelectionRequest {
    /// Create a request from user input.
    ///
    /// Returns `None` when `requested <= 0`: such a request is a no-op, not
    /// an error.
    pub fn new(requested: i64) -> Option<Self> {
        usize::try_from(requested)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(|count| Self { count })
    }

    /// Number of rows requested.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Number of pages of `page_size` items needed to cover the request.
    pub fn pages_needed(&self, page_size: usize) -> u32 {
        pages_needed(self.count(), page_size)
    }
}

/// The outcome of one resolution: the first `min(N, T)` items of the
/// collection, in remote order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionResult {
    items: Vec<Item>,
    requested: usize,
    pages_fetched: u32,
}

impl SelectionResult {
    /// The selected items.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consume the result, returning the selected items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was selected (the collection is empty).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of rows that were requested.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Number of pages that were fetched to build the result.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

/// Resolves selection requests against a page source.
///
/// The resolver holds no state between resolutions.
pub struct SelectionResolver<S> {
    source: S,
    page_size: usize,
    cap: PageCap,
    max_pages: u32,
}

impl<S: PageSource> SelectionResolver<S> {
    /// Create a resolver for a collection with a fixed page size, allowing
    /// up to [`DEFAULT_MAX_SELECTION_PAGES`] pages per selection.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn new(source: S, page_size: usize, cap: PageCap) -> Self {
        assert!(page_size > 0, "page size must be non-zero");
        Self {
            source,
            page_size,
            cap,
            max_pages: DEFAULT_MAX_SELECTION_PAGES,
        }
    }

    /// Set the most pages one selection may fetch.
    ///
    /// # Panics
    ///
    /// Panics if `max_pages` is zero.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        assert!(max_pages > 0, "page limit must be non-zero");
        self.max_pages = max_pages;
        self
    }

    /// Fixed number of items per remote page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page cap policy.
    pub fn cap(&self) -> PageCap {
        self.cap
    }

    /// The most pages one selection may fetch.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// The page indices a request will fetch, given what is known of the
    /// collection's size.
    ///
    /// Always starts at page 1. `known_total_pages` only matters under
    /// [`PageCap::KnownTotal`]. Fails with [`Error::SelectionTooLarge`] if
    /// the plan is longer than [`max_pages`](Self::max_pages).
    pub fn plan(
        &self,
        request: &SelectionRequest,
        known_total_pages: Option<u32>,
    ) -> Result<RangeInclusive<u32>> {
        let needed = request.pages_needed(self.page_size);
        let last = match (self.cap, known_total_pages) {
            (PageCap::KnownTotal, Some(total)) => needed.min(total.max(1)),
            _ => needed,
        };
        if last > self.max_pages {
            return Err(Error::SelectionTooLarge {
                pages: last,
                limit: self.max_pages,
            });
        }
        Ok(1..=last)
    }

    /// Fetch every planned page and return the first `N` items.
    ///
    /// Under [`PageCap::KnownTotal`] with no known total and more than one
    /// page needed, page 1 is fetched alone first and its reported total
    /// caps the plan. The remaining pages are fetched concurrently.
    ///
    /// All concurrent fetches run to completion even when one fails. If any
    /// fetch fails, the error for the lowest failing page index is returned
    /// and no result is produced.
    #[tracing::instrument(
        skip(self, request),
        target = "folio::selection",
        level = "debug",
        fields(count = request.count())
    )]
    pub async fn resolve(
        &self,
        request: SelectionRequest,
        known_total_pages: Option<u32>,
    ) -> Result<SelectionResult> {
        let needed = request.pages_needed(self.page_size);
        let mut fetched: Vec<(u32, Page)> = Vec::new();

        let known_total_pages = match (self.cap, known_total_pages) {
            (PageCap::KnownTotal, None) if needed > 1 => {
                tracing::debug!(target: targets::SELECTION, "total unknown, fetching page 1 first");
                let first = self.source.fetch_page(1).await.inspect_err(|e| {
                    tracing::warn!(
                        target: targets::SELECTION,
                        page = 1,
                        error = %e,
                        "selection aborted, page fetch failed"
                    );
                })?;
                let total = first.total_pages;
                fetched.push((1, first));
                Some(total)
            }
            (_, known) => known,
        };

        let pages = self.plan(&request, known_total_pages)?;
        let pages_fetched = *pages.end();
        let first_unfetched = if fetched.is_empty() { 1 } else { 2 };
        tracing::debug!(
            target: targets::SELECTION,
            needed,
            fetching = pages_fetched,
            "fanning out page fetches"
        );

        let source = &self.source;
        let mut in_flight: FuturesUnordered<_> = (first_unfetched..=pages_fetched)
            .map(move |page| async move { (page, source.fetch_page(page).await) })
            .collect();

        // Fan-in: results arrive in completion order.
        fetched.reserve(in_flight.len());
        let mut failures: Vec<(u32, Error)> = Vec::new();
        while let Some((page, result)) = in_flight.next().await {
            match result {
                Ok(fetched_page) => fetched.push((page, fetched_page)),
                Err(e) => failures.push((page, e)),
            }
        }

        if let Some((page, error)) = failures.into_iter().min_by_key(|(page, _)| *page) {
            tracing::warn!(
                target: targets::SELECTION,
                page,
                error = %error,
                "selection aborted, page fetch failed"
            );
            return Err(error);
        }

        let items = assemble(fetched, request.count());
        tracing::debug!(target: targets::SELECTION, selected = items.len(), "selection resolved");

        Ok(SelectionResult {
            items,
            requested: request.count(),
            pages_fetched,
        })
    }
}

/// Order pages by the index they were requested for, concatenate their
/// items, and keep the first `count`.
fn assemble(mut pages: Vec<(u32, Page)>, count: usize) -> Vec<Item> {
    pages.sort_by_key(|(index, _)| *index);
    pages
        .into_iter()
        .flat_map(|(_, page)| page.items)
        .take(count)
        .collect()
}

impl<S> std::fmt::Debug for SelectionResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionResolver")
            .field("page_size", &self.page_size)
            .field("cap", &self.cap)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

/// Identifies one attempt to replace the selection.
///
/// Tickets are ordered by issue time; a later ticket supersedes an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectionTicket(u64);

#[derive(Debug, Default)]
struct SelectionInner {
    items: Vec<Item>,
    issued: u64,
    committed: u64,
}

/// The active selection.
///
/// Replacement is atomic: readers see either the previous selection or the
/// new one in full. Each replacement attempt takes a [`SelectionTicket`] when
/// it starts; a commit is refused if a newer ticket has already committed,
/// so a slow resolution cannot overwrite a newer selection.
#[derive(Debug, Default)]
pub struct Selection {
    inner: Mutex<SelectionInner>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a replacement attempt.
    pub fn begin(&self) -> SelectionTicket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        SelectionTicket(inner.issued)
    }

    /// Replace the selection if no newer attempt has committed.
    ///
    /// Returns `true` if the selection was replaced.
    pub fn commit(&self, ticket: SelectionTicket, items: Vec<Item>) -> bool {
        let mut inner = self.inner.lock();
        if ticket.0 <= inner.committed {
            return false;
        }
        inner.items = items;
        inner.committed = ticket.0;
        true
    }

    /// Replace the selection unconditionally, superseding any attempt in flight.
    pub fn replace(&self, items: Vec<Item>) {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.committed = inner.issued;
        inner.items = items;
    }

    /// Add the item if it is not selected, remove it otherwise.
    ///
    /// Supersedes any attempt in flight. Returns `true` if the item is
    /// selected afterwards.
    pub fn toggle(&self, item: &Item) -> bool {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.committed = inner.issued;

        if let Some(pos) = inner.items.iter().position(|i| i.id == item.id) {
            inner.items.remove(pos);
            false
        } else {
            inner.items.push(item.clone());
            true
        }
    }

    /// A copy of the selected items, in selection order.
    pub fn items(&self) -> Vec<Item> {
        self.inner.lock().items.clone()
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Whether the item with the given id is selected.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.lock().items.iter().any(|item| item.id == id)
    }
}
