//! HTTP client implementation.

use std::sync::Arc;
use std::time::Duration;

use folio_core::logging::targets;

use super::request::{HttpMethod, HttpRequestBuilder};
use crate::error::{NetworkError, Result};

/// How redirects are handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Never follow redirects; 3xx responses are returned as-is.
    None,
    /// Follow up to this many redirects.
    Limited(usize),
}

impl RedirectPolicy {
    fn to_reqwest(self) -> reqwest::redirect::Policy {
        match self {
            Self::None => reqwest::redirect::Policy::none(),
            Self::Limited(max) => reqwest::redirect::Policy::limited(max),
        }
    }
}

/// Configuration for the HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Timeout for a whole request, including reading the body.
    pub timeout: Option<Duration>,
    /// Timeout for establishing a connection.
    pub connect_timeout: Option<Duration>,
    /// Redirect handling.
    pub redirects: RedirectPolicy,
    /// User agent sent with every request.
    pub user_agent: Option<String>,
    /// Idle connections kept open per host.
    ///
    /// A selection fans out one request per page to the same host; keeping
    /// that many connections warm lets the next selection reuse them.
    pub pool_max_idle_per_host: usize,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            redirects: RedirectPolicy::Limited(10),
            user_agent: Some(format!("folio/{}", env!("CARGO_PKG_VERSION"))),
            pool_max_idle_per_host: 16,
            pool_idle_timeout: Some(Duration::from_secs(90)),
        }
    }
}

/// Builder for an [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
}

impl HttpClientBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the redirect policy.
    pub fn redirects(mut self, policy: RedirectPolicy) -> Self {
        self.config.redirects = policy;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set how many idle connections are kept per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("invalid header name".to_string()))?;
        let value = value
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("invalid header value".to_string()))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient> {
        let config = self.config;
        let mut builder = reqwest::Client::builder()
            .redirect(config.redirects.to_reqwest())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .default_headers(self.default_headers);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build()?;
        tracing::debug!(
            target: targets::HTTP,
            timeout = ?config.timeout,
            redirects = ?config.redirects,
            pool_max_idle_per_host = config.pool_max_idle_per_host,
            "http client created"
        );

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner { client, config }),
        })
    }
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// A cloneable HTTP client.
///
/// Clones share one connection pool and configuration.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a builder.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    /// The client's configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> HttpRequestBuilder {
        self.request(HttpMethod::Get, url)
    }

    /// Create a request builder for any supported method.
    pub fn request(&self, method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(self.clone(), method, url.into())
    }

    pub(crate) fn reqwest_client(&self) -> &reqwest::Client {
        &self.inner.client
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
