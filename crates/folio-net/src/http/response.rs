//! HTTP response wrapper.

use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{NetworkError, Result};

/// A received HTTP response whose body has not been read yet.
pub struct HttpResponse {
    inner: reqwest::Response,
}

impl HttpResponse {
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self { inner: response }
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Whether the status signals a condition worth retrying: 429 or any 5xx.
    pub fn is_retryable(&self) -> bool {
        let status = self.inner.status();
        status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// All response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.inner
            .headers()
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// The `Retry-After` delay, when given in whole seconds.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("Retry-After")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
    }

    /// The final URL, after any redirects.
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    /// Read the body as text.
    pub async fn text(self) -> Result<String> {
        Ok(self.inner.text().await?)
    }

    /// Read the raw body.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.inner.bytes().await?)
    }

    /// Read the body and decode it as JSON.
    ///
    /// The body is read fully before decoding, so a malformed payload is a
    /// [`NetworkError::Json`] carrying serde's message rather than a transport
    /// error.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Turn a non-2xx response into [`NetworkError::HttpStatus`].
    ///
    /// The body of a failed response is consumed and kept as the error
    /// message when it is non-empty.
    pub async fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = self.text().await.ok().filter(|body| !body.trim().is_empty());
        Err(NetworkError::HttpStatus { status, message })
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.url())
            .finish()
    }
}
