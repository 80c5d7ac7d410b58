//! Paginated collection browser with cross-page row selection.
//!
//! Folio lists records from a remote, fixed-page-size collection API and lets
//! a user select the first `N` rows of the whole collection, even when `N`
//! spans pages that were never displayed.
//!
//! - [`PageStore`] holds the page currently on screen and its pagination
//!   metadata. It is replaced wholesale by every navigation.
//! - [`SelectionResolver`] turns a requested row count into the pages that
//!   must be fetched, fetches them concurrently, and reassembles them in page
//!   order before truncating to exactly `N` items.
//! - [`BrowserController`] composes the two and owns the active
//!   [`Selection`], emitting [`Signal`](folio_core::Signal)s a presentation
//!   layer can render from.
//!
//! # Example
//!
//! ```ignore
//! use folio::{BrowserConfig, BrowserController};
//!
//! let config = BrowserConfig::default();
//! let browser = BrowserController::from_config(&config)?;
//!
//! browser.load_initial().await?;
//! browser.go_to_page(4).await?;
//!
//! // Selects the first 30 artworks of the collection, not of page 4
//! browser.submit_selection(30).await?;
//! assert_eq!(browser.selection().len(), 30);
//! ```

pub mod config;
mod controller;
mod error;
mod model;
mod page_store;
mod selection;
mod source;

pub use config::{BrowserConfig, HttpSettings, PageCap};
pub use controller::{BrowserController, SubmitOutcome};
pub use error::{Error, Result};
pub use model::{Column, Item, Page, PageInfo};
pub use page_store::PageStore;
pub use selection::{
    Selection, SelectionRequest, SelectionResolver, SelectionResult, SelectionTicket,
    pages_needed,
};
pub use source::{ArtworksApi, PageSource};
