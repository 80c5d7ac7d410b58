//! Browser configuration.
//!
//! The configuration is an explicit value handed to the page source and the
//! controller at construction. It can be built in code or loaded from TOML:
//!
//! ```toml
//! api_base = "https://api.artic.edu/api/v1"
//! page_size = 12
//! cap_to_total_pages = true
//! max_selection_pages = 1000
//!
//! [http]
//! timeout_secs = 30
//! max_retries = 0
//! rate_limit_per_second = 10
//! ```

use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default collection API base address.
pub const DEFAULT_API_BASE: &str = "https://api.artic.edu/api/v1";

/// Default number of items per remote page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Default upper bound on the pages one selection may fetch.
pub const DEFAULT_MAX_SELECTION_PAGES: u32 = 1000;

/// How many pages a selection may fetch when it asks for more rows than the
/// collection is known to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageCap {
    /// Never fetch beyond the collection's total page count. Before any
    /// page has loaded, page 1 is fetched first to learn it.
    KnownTotal,
    /// Always fetch `ceil(N / page_size)` pages and let the remote's empty
    /// pages end the collection.
    Uncapped,
}

/// Transport settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    /// Request timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: Option<String>,
    /// Transport-level retries of transient failures.
    pub max_retries: u32,
    /// Client-side cap on requests per second. Zero is rejected when parsing.
    pub rate_limit_per_second: Option<NonZeroU32>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
            max_retries: 0,
            rate_limit_per_second: None,
        }
    }
}

impl HttpSettings {
    /// The request timeout, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Configuration for a [`BrowserController`](crate::BrowserController).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Base address of the collection API. Pages are requested from
    /// `<api_base>/artworks?page=<n>`.
    pub api_base: String,
    /// Fixed number of items per remote page. Must match the remote API.
    pub page_size: usize,
    /// Cap selection fan-out at the known total page count.
    pub cap_to_total_pages: bool,
    /// A selection needing more pages than this fails without fetching.
    pub max_selection_pages: u32,
    /// Transport settings.
    pub http: HttpSettings,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            cap_to_total_pages: true,
            max_selection_pages: DEFAULT_MAX_SELECTION_PAGES,
            http: HttpSettings::default(),
        }
    }
}

impl BrowserConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the API base address.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the page cap policy.
    pub fn with_page_cap(mut self, cap: PageCap) -> Self {
        self.cap_to_total_pages = cap == PageCap::KnownTotal;
        self
    }

    /// Set the most pages one selection may fetch.
    pub fn with_max_selection_pages(mut self, max_pages: u32) -> Self {
        self.max_selection_pages = max_pages;
        self
    }

    /// The page cap policy.
    pub fn page_cap(&self) -> PageCap {
        if self.cap_to_total_pages {
            PageCap::KnownTotal
        } else {
            PageCap::Uncapped
        }
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than 0"));
        }
        if self.max_selection_pages == 0 {
            return Err(Error::config("max_selection_pages must be greater than 0"));
        }

        let url = url::Url::parse(&self.api_base)
            .map_err(|e| Error::config(format!("api_base '{}': {e}", self.api_base)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "api_base '{}' must be an http(s) address",
                self.api_base
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.page_size, 12);
        assert_eq!(config.page_cap(), PageCap::KnownTotal);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.http.timeout(), Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BrowserConfig::from_toml_str(
            r#"
            api_base = "http://localhost:8080/api"
            cap_to_total_pages = false

            [http]
            timeout_secs = 0
            rate_limit_per_second = 5
            "#,
        )
        .expect("valid config");

        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.page_cap(), PageCap::Uncapped);
        assert_eq!(config.http.timeout(), None);
        assert_eq!(config.http.rate_limit_per_second, NonZeroU32::new(5));
        assert_eq!(config.max_selection_pages, DEFAULT_MAX_SELECTION_PAGES);
    }

    #[test]
    fn test_rejects_zero_rate_limit() {
        let result = BrowserConfig::from_toml_str("[http]\nrate_limit_per_second = 0");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_rejects_zero_selection_page_limit() {
        let result = BrowserConfig::from_toml_str("max_selection_pages = 0");
        assert!(matches!(result, Err(Error::Config(_))));

        let config = BrowserConfig::default().with_max_selection_pages(50);
        assert_eq!(config.max_selection_pages, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let result = BrowserConfig::from_toml_str("page_size = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_base() {
        let config = BrowserConfig::default().with_api_base("ftp://example.com");
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = BrowserConfig::default().with_api_base("not a url");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = BrowserConfig::from_toml_str("page_sise = 10");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "page_size = 25\n").expect("write config");

        let config = BrowserConfig::load(&path).expect("valid config");
        assert_eq!(config.page_size, 25);

        let missing = BrowserConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Io { .. })));
    }

    #[test]
    fn test_page_cap_round_trip() {
        let config = BrowserConfig::default().with_page_cap(PageCap::Uncapped);
        assert!(!config.cap_to_total_pages);
        assert_eq!(config.page_cap(), PageCap::Uncapped);
    }
}
