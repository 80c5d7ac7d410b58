//! Error types for the browser.

use std::path::PathBuf;

use folio_net::NetworkError;

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while browsing the collection.
///
/// A selection request of zero or fewer rows is deliberately not an error;
/// see [`SelectionRequest::new`](crate::SelectionRequest::new).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page could not be fetched or decoded from the remote collection.
    #[error("failed to fetch page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: NetworkError,
    },

    /// A selection would need more page fetches than the configured limit.
    #[error("selection needs {pages} pages, more than the limit of {limit}")]
    SelectionTooLarge { pages: u32, limit: u32 },

    /// Navigation to a page index below 1.
    #[error("invalid page index {0}: pages are numbered from 1")]
    InvalidPage(u32),

    /// The HTTP client could not be constructed.
    #[error("failed to set up HTTP client: {0}")]
    Client(#[source] NetworkError),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file is not valid TOML for [`BrowserConfig`](crate::BrowserConfig).
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a fetch error for the given 1-based page index.
    pub fn fetch(page: u32, source: NetworkError) -> Self {
        Self::Fetch { page, source }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this is a remote fetch failure.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// The page whose fetch failed, if this is a fetch failure.
    pub fn failed_page(&self) -> Option<u32> {
        match self {
            Self::Fetch { page, .. } => Some(*page),
            _ => None,
        }
    }
}
