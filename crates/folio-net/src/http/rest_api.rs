//! Client for a JSON collection API rooted at one base URL.
//!
//! [`RestApiClient`] prefixes every path with its base URL, attaches its
//! default headers, and can pace and retry requests:
//!
//! - a [`RateLimiter`] spaces out the burst a multi-page selection produces
//! - a [`RetryConfig`] resends requests that failed transiently or came back
//!   429 / 5xx, honouring `Retry-After`
//!
//! ```ignore
//! use std::num::NonZeroU32;
//! use folio_net::http::RestApiClient;
//!
//! let client = RestApiClient::builder("https://api.artic.edu/api/v1")
//!     .accept_json()
//!     .rate_limit_per_second(NonZeroU32::new(10).unwrap())
//!     .build()?;
//!
//! let page: ArtworksPage = client.get("/artworks").query("page", "1").json_response().await?;
//! ```

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use folio_core::logging::targets;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use super::client::HttpClient;
use super::request::{HttpMethod, HttpRequest, HttpRequestBuilder, execute};
use super::response::HttpResponse;
use crate::error::Result;

/// Exponential backoff between resends of a failed request.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Resends after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay.
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Never resend.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current
            .mul_f64(self.backoff_multiplier)
            .min(Duration::from_millis(self.max_delay_ms))
    }
}

/// Token bucket pacing requests to the API.
///
/// Up to `burst` requests go out back to back; after that a request is
/// released every `1 / per_second` seconds. Both are non-zero, so a limiter
/// always lets requests through eventually.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    burst: f64,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    /// `per_second` requests per second, with a burst of the same size.
    pub fn new(per_second: NonZeroU32) -> Self {
        Self::with_burst(per_second, per_second)
    }

    pub fn with_burst(per_second: NonZeroU32, burst: NonZeroU32) -> Self {
        let burst = f64::from(burst.get());
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(per_second.get())),
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        while let Some(wait) = self.take() {
            tracing::trace!(target: targets::REST_API, ?wait, "rate limited");
            tokio::time::sleep(wait).await;
        }
    }

    /// Take a token, or report how long until one is available.
    fn take(&self) -> Option<Duration> {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let earned = now.duration_since(bucket.refilled_at).as_secs_f64()
            / self.interval.as_secs_f64();
        bucket.tokens = (bucket.tokens + earned).min(self.burst);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            None
        } else {
            Some(self.interval.mul_f64(1.0 - bucket.tokens))
        }
    }
}

/// Configures a [`RestApiClient`].
pub struct RestApiClientBuilder {
    base_url: String,
    http_client: Option<HttpClient>,
    default_headers: http::HeaderMap,
    rate_limiter: Option<RateLimiter>,
    retry_config: RetryConfig,
}

impl RestApiClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: None,
            default_headers: http::HeaderMap::new(),
            rate_limiter: None,
            retry_config: RetryConfig::default(),
        }
    }

    /// Send through `client` instead of a default one.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Attach a header to every request. Invalid names or values are skipped.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.default_headers.insert(name, value);
        }
        self
    }

    /// `Accept: application/json`
    pub fn accept_json(self) -> Self {
        self.default_header("Accept", "application/json")
    }

    /// Pace requests to at most `per_second`, shared by all clones.
    pub fn rate_limit_per_second(mut self, per_second: NonZeroU32) -> Self {
        self.rate_limiter = Some(RateLimiter::new(per_second));
        self
    }

    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn no_retry(self) -> Self {
        self.retry(RetryConfig::none())
    }

    /// Build the client. Fails if the base URL does not parse.
    pub fn build(self) -> Result<RestApiClient> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpClient::with_defaults()?,
        };

        let base_url = self.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;

        Ok(RestApiClient {
            inner: Arc::new(RestApiClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                rate_limiter: self.rate_limiter,
                retry_config: self.retry_config,
            }),
        })
    }
}

struct RestApiClientInner {
    http_client: HttpClient,
    base_url: String,
    default_headers: http::HeaderMap,
    rate_limiter: Option<RateLimiter>,
    retry_config: RetryConfig,
}

/// Client for one API root. Clones share the connection pool and the
/// rate limiter.
#[derive(Clone)]
pub struct RestApiClient {
    inner: Arc<RestApiClientInner>,
}

impl RestApiClient {
    pub fn builder(base_url: impl Into<String>) -> RestApiClientBuilder {
        RestApiClientBuilder::new(base_url)
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry_config
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.inner.http_client
    }

    /// Start a GET request for `path`, relative to the base URL.
    pub fn get(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Get, path)
    }

    pub fn request(&self, method: HttpMethod, path: &str) -> RestApiRequestBuilder {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        RestApiRequestBuilder {
            client: self.clone(),
            request: self
                .inner
                .http_client
                .request(method, url)
                .headers(&self.inner.default_headers),
        }
    }
}

impl std::fmt::Debug for RestApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestApiClient")
            .field("base_url", &self.inner.base_url)
            .field("rate_limiter", &self.inner.rate_limiter)
            .field("max_retries", &self.inner.retry_config.max_retries)
            .finish()
    }
}

/// A request against a [`RestApiClient`], sent with its pacing and retries.
pub struct RestApiRequestBuilder {
    client: RestApiClient,
    request: HttpRequestBuilder,
}

impl RestApiRequestBuilder {
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.timeout(timeout);
        self
    }

    /// Resolve the request without sending it.
    pub fn build(self) -> Result<HttpRequest> {
        self.request.build()
    }

    /// Send, waiting for the rate limiter first and retrying per the
    /// client's [`RetryConfig`].
    ///
    /// A non-2xx status that survives the retries is returned as a response;
    /// [`json_response`](Self::json_response) turns it into an error.
    pub async fn send(self) -> Result<HttpResponse> {
        let request = self.request.build()?;
        let inner = &self.client.inner;

        if let Some(limiter) = &inner.rate_limiter {
            limiter.acquire().await;
        }
        send_with_retry(&inner.http_client, request, &inner.retry_config).await
    }

    /// Send, fail on a non-2xx status, and decode the body as JSON.
    pub async fn json_response<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.ensure_success().await?.json().await
    }
}

async fn send_with_retry(
    client: &HttpClient,
    request: HttpRequest,
    retry: &RetryConfig,
) -> Result<HttpResponse> {
    let mut delay = Duration::from_millis(retry.initial_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let outcome = execute(client, request.clone()).await;
        if attempt > retry.max_retries {
            return outcome;
        }

        let wait = match &outcome {
            Ok(response) if response.is_retryable() => {
                tracing::debug!(
                    target: targets::REST_API,
                    status = response.status(),
                    attempt,
                    "retryable status"
                );
                response.retry_after().unwrap_or(delay)
            }
            Err(e) if e.is_transient() => {
                tracing::debug!(target: targets::REST_API, error = %e, attempt, "transient failure");
                delay
            }
            _ => return outcome,
        };

        tokio::time::sleep(wait).await;
        delay = retry.next_delay(delay);
    }
}
