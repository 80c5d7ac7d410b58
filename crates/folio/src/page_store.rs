//! The page currently on screen.

use folio_core::logging::targets;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::model::{Item, Page, PageInfo};
use crate::source::PageSource;

/// Load state of the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum PageState {
    /// Nothing has been fetched yet. Distinct from any real page.
    #[default]
    NotFetched,
    /// The displayed page.
    Loaded(Page),
}

/// Holds the currently displayed page and its pagination metadata.
///
/// Every navigation re-fetches; there is no page cache. The displayed page is
/// replaced only after a fetch succeeds, so a failed navigation leaves the
/// previous page (or the not-fetched state) in place. No lock is held while a
/// fetch is in flight.
pub struct PageStore<S> {
    source: S,
    page_size: usize,
    state: RwLock<PageState>,
}

impl<S: PageSource> PageStore<S> {
    /// Create an empty store over a page source.
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            source,
            page_size,
            state: RwLock::new(PageState::NotFetched),
        }
    }

    /// Fetch page 1 and display it.
    pub async fn load_initial(&self) -> Result<PageInfo> {
        self.fetch_and_replace(1).await
    }

    /// Fetch the given 1-based page and display it.
    ///
    /// The caller is responsible for not requesting pages beyond
    /// [`total_pages`](Self::total_pages).
    pub async fn go_to_page(&self, index: u32) -> Result<PageInfo> {
        if index == 0 {
            return Err(Error::InvalidPage(index));
        }
        self.fetch_and_replace(index).await
    }

    async fn fetch_and_replace(&self, index: u32) -> Result<PageInfo> {
        tracing::debug!(target: targets::PAGE_STORE, page = index, "loading page");

        let page = match self.source.fetch_page(index).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    target: targets::PAGE_STORE,
                    page = index,
                    error = %e,
                    "page load failed, keeping previous page"
                );
                return Err(e);
            }
        };

        let info = self.info_for(&page);
        *self.state.write() = PageState::Loaded(page);

        tracing::debug!(
            target: targets::PAGE_STORE,
            page = info.number,
            total_pages = info.total_pages,
            "page displayed"
        );
        Ok(info)
    }

    fn info_for(&self, page: &Page) -> PageInfo {
        PageInfo {
            number: page.number,
            total_pages: page.total_pages,
            page_size: self.page_size,
        }
    }

    /// Whether a page has been loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.read(), PageState::Loaded(_))
    }

    /// Pagination metadata of the displayed page.
    pub fn info(&self) -> Option<PageInfo> {
        match &*self.state.read() {
            PageState::Loaded(page) => Some(self.info_for(page)),
            PageState::NotFetched => None,
        }
    }

    /// 1-based index of the displayed page.
    pub fn current_page(&self) -> Option<u32> {
        self.info().map(|info| info.number)
    }

    /// Total number of pages reported with the displayed page.
    pub fn total_pages(&self) -> Option<u32> {
        self.info().map(|info| info.total_pages)
    }

    /// Items of the displayed page; empty before the first load.
    pub fn items(&self) -> Vec<Item> {
        match &*self.state.read() {
            PageState::Loaded(page) => page.items.clone(),
            PageState::NotFetched => Vec::new(),
        }
    }

    /// A copy of the displayed page.
    pub fn page(&self) -> Option<Page> {
        match &*self.state.read() {
            PageState::Loaded(page) => Some(page.clone()),
            PageState::NotFetched => None,
        }
    }

    /// Fixed number of items per remote page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The underlying page source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S> std::fmt::Debug for PageStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        let (number, total_pages) = match &*state {
            PageState::Loaded(page) => (Some(page.number), Some(page.total_pages)),
            PageState::NotFetched => (None, None),
        };
        f.debug_struct("PageStore")
            .field("page_size", &self.page_size)
            .field("current_page", &number)
            .field("total_pages", &total_pages)
            .finish()
    }
}
