//! Remote page sources.
//!
//! A [`PageSource`] fetches one 1-based page of the collection. The browser
//! only depends on this trait; [`ArtworksApi`] is the HTTP implementation
//! for the collection API contract:
//!
//! ```text
//! GET <api_base>/artworks?page=<n>
//! -> { "data": [Item, ...], "pagination": { "total_pages": <n>, ... } }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use folio_core::logging::targets;
use folio_net::http::{HttpClient, RestApiClient, RetryConfig};
use serde::Deserialize;

use crate::config::BrowserConfig;
use crate::error::{Error, Result};
use crate::model::{Item, Page};

/// Something that can fetch a page of the collection.
///
/// Implementations must be safe to call concurrently: a selection issues all
/// of its page fetches at once. A failed fetch is reported as
/// [`Error::Fetch`] naming the requested page.
pub trait PageSource: Send + Sync {
    /// Fetch the given 1-based page.
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Page>> + Send;
}

impl<S: PageSource> PageSource for Arc<S> {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Page>> + Send {
        (**self).fetch_page(page)
    }
}

/// Wire shape of a page response.
#[derive(Debug, Deserialize)]
struct ArtworksResponse {
    data: Vec<Item>,
    pagination: Pagination,
}

/// Wire shape of the pagination block. Only `total_pages` is required.
#[derive(Debug, Deserialize)]
struct Pagination {
    total_pages: u32,
    #[serde(default)]
    current_page: Option<u32>,
}

/// HTTP page source for the artworks collection API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct ArtworksApi {
    client: RestApiClient,
}

impl ArtworksApi {
    /// Path of the collection endpoint, relative to the API base.
    pub const PATH: &'static str = "/artworks";

    /// Create a source over an existing REST client.
    pub fn new(client: RestApiClient) -> Self {
        Self { client }
    }

    /// Create a source from the browser configuration.
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        config.validate()?;

        let mut http = HttpClient::builder();
        http = match config.http.timeout() {
            Some(timeout) => http.timeout(timeout),
            None => http.no_timeout(),
        };
        if let Some(ref user_agent) = config.http.user_agent {
            http = http.user_agent(user_agent);
        }
        let http = http
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(Error::Client)?;

        let mut builder = RestApiClient::builder(config.api_base.as_str())
            .http_client(http)
            .accept_json()
            .retry(RetryConfig {
                max_retries: config.http.max_retries,
                ..RetryConfig::default()
            });
        if let Some(rps) = config.http.rate_limit_per_second {
            builder = builder.rate_limit_per_second(rps);
        }

        Ok(Self::new(builder.build().map_err(Error::Client)?))
    }

    /// The base address requests are sent to.
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

impl PageSource for ArtworksApi {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        tracing::debug!(target: targets::SOURCE, page, "fetching page");

        let response: ArtworksResponse = self
            .client
            .get(Self::PATH)
            .query("page", page.to_string())
            .json_response()
            .await
            .map_err(|source| {
                tracing::warn!(target: targets::SOURCE, page, error = %source, "page fetch failed");
                Error::fetch(page, source)
            })?;

        if let Some(current) = response.pagination.current_page
            && current != page
        {
            tracing::warn!(
                target: targets::SOURCE,
                requested = page,
                reported = current,
                "remote reported a different page number"
            );
        }

        tracing::debug!(
            target: targets::SOURCE,
            page,
            items = response.data.len(),
            total_pages = response.pagination.total_pages,
            "fetched page"
        );
        Ok(Page::new(page, response.pagination.total_pages, response.data))
    }
}
