//! Browser controller composing the page store and the selection resolver.

use folio_core::Signal;
use folio_core::logging::targets;

use crate::config::BrowserConfig;
use crate::error::Result;
use crate::model::{Item, PageInfo};
use crate::page_store::PageStore;
use crate::selection::{Selection, SelectionRequest, SelectionResolver};
use crate::source::{ArtworksApi, PageSource};

/// What a selection submission did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The requested count was zero or negative; nothing was fetched.
    Ignored,
    /// The selection was replaced.
    Applied {
        /// Number of selected items.
        selected: usize,
        /// Number of pages fetched.
        pages_fetched: u32,
    },
    /// The resolution finished after a newer selection had been committed,
    /// and was discarded.
    Superseded,
}

/// Drives a paginated collection view and its cross-page selection.
///
/// Page navigation only touches the [`PageStore`]; selection only touches the
/// [`Selection`]. The two are independent: the selection is always the first
/// `N` rows of the whole collection, whatever page is displayed.
///
/// All operations take `&self`, so a controller can be shared (for example
/// behind an `Arc`) between the UI and the tasks it spawns.
///
/// # Signals
///
/// - `page_changed` - a new page is displayed
/// - `selection_changed` - the selection was replaced; carries its new size
/// - `fetch_failed` - a navigation or selection failed, either on a fetch or
///   because the selection exceeds the page limit; carries a
///   user-presentable message. The error is also returned to the caller.
pub struct BrowserController<S> {
    store: PageStore<S>,
    resolver: SelectionResolver<S>,
    selection: Selection,
    /// Emitted when a new page is displayed.
    pub page_changed: Signal<PageInfo>,
    /// Emitted when the selection is replaced, with the new selection size.
    pub selection_changed: Signal<usize>,
    /// Emitted when a fetch fails, with a user-presentable message.
    pub fetch_failed: Signal<String>,
}

impl BrowserController<ArtworksApi> {
    /// Create a controller talking to the configured artworks API.
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        let api = ArtworksApi::from_config(config)?;
        Ok(Self::new(api, config))
    }
}

impl<S: PageSource + Clone> BrowserController<S> {
    /// Create a controller over a page source.
    ///
    /// # Panics
    ///
    /// Panics if `config.page_size` or `config.max_selection_pages` is zero;
    /// use [`BrowserConfig::validate`] first for untrusted configuration.
    pub fn new(source: S, config: &BrowserConfig) -> Self {
        let resolver = SelectionResolver::new(source.clone(), config.page_size, config.page_cap())
            .with_max_pages(config.max_selection_pages);
        Self {
            store: PageStore::new(source, config.page_size),
            resolver,
            selection: Selection::new(),
            page_changed: Signal::new(),
            selection_changed: Signal::new(),
            fetch_failed: Signal::new(),
        }
    }
}

impl<S: PageSource> BrowserController<S> {
    /// Load and display the first page.
    pub async fn load_initial(&self) -> Result<PageInfo> {
        let result = self.store.load_initial().await;
        self.report_navigation(result)
    }

    /// Display the given 1-based page.
    pub async fn go_to_page(&self, index: u32) -> Result<PageInfo> {
        let result = self.store.go_to_page(index).await;
        self.report_navigation(result)
    }

    fn report_navigation(&self, result: Result<PageInfo>) -> Result<PageInfo> {
        match result {
            Ok(info) => {
                self.page_changed.emit(info);
                Ok(info)
            }
            Err(e) => {
                self.fetch_failed.emit(e.to_string());
                Err(e)
            }
        }
    }

    /// Select the first `requested` rows of the whole collection.
    ///
    /// A request of zero or fewer rows is ignored without fetching. On
    /// failure the previous selection is left untouched and the error is
    /// returned. If a newer selection is committed while this one is in
    /// flight, this one is discarded.
    pub async fn submit_selection(&self, requested: i64) -> Result<SubmitOutcome> {
        let Some(request) = SelectionRequest::new(requested) else {
            tracing::debug!(target: targets::CONTROLLER, requested, "ignoring non-positive selection request");
            return Ok(SubmitOutcome::Ignored);
        };

        let ticket = self.selection.begin();
        let result = match self
            .resolver
            .resolve(request, self.store.total_pages())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                self.fetch_failed.emit(e.to_string());
                return Err(e);
            }
        };

        let selected = result.len();
        let pages_fetched = result.pages_fetched();
        if !self.selection.commit(ticket, result.into_items()) {
            tracing::debug!(
                target: targets::CONTROLLER,
                requested,
                "discarding superseded selection"
            );
            return Ok(SubmitOutcome::Superseded);
        }

        tracing::info!(
            target: targets::CONTROLLER,
            requested,
            selected,
            pages_fetched,
            "selection replaced"
        );
        self.selection_changed.emit(selected);
        Ok(SubmitOutcome::Applied {
            selected,
            pages_fetched,
        })
    }

    /// Replace the selection with rows the user picked by hand.
    pub fn set_selection(&self, items: Vec<Item>) {
        let selected = items.len();
        self.selection.replace(items);
        self.selection_changed.emit(selected);
    }

    /// Toggle one row in the selection. Returns `true` if it is now selected.
    pub fn toggle_item(&self, item: &Item) -> bool {
        let selected = self.selection.toggle(item);
        self.selection_changed.emit(self.selection.len());
        selected
    }

    /// The selected items, in selection order.
    pub fn selection(&self) -> Vec<Item> {
        self.selection.items()
    }

    /// Whether the item with the given id is selected.
    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.contains(id)
    }

    /// Ids of the displayed page's rows that are selected, in display order.
    pub fn selected_on_current_page(&self) -> Vec<u64> {
        self.store
            .items()
            .iter()
            .map(|item| item.id)
            .filter(|id| self.selection.contains(*id))
            .collect()
    }

    /// The page store backing the displayed page.
    pub fn store(&self) -> &PageStore<S> {
        &self.store
    }

    /// The resolver used for selections.
    pub fn resolver(&self) -> &SelectionResolver<S> {
        &self.resolver
    }
}

impl<S> std::fmt::Debug for BrowserController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserController")
            .field("store", &self.store)
            .field("resolver", &self.resolver)
            .field("selection", &self.selection)
            .finish()
    }
}
