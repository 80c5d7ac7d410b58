//! Outgoing requests.
//!
//! A request is assembled with [`HttpRequestBuilder`] and resolved into an
//! [`HttpRequest`] whose URL already carries its query string. Resolution is
//! where a malformed URL is reported, before anything touches the network.

use std::time::Duration;

use folio_core::logging::targets;
use url::Url;

use super::client::HttpClient;
use super::response::HttpResponse;
use crate::error::Result;

/// Methods the client can issue. The browser only reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
}

impl HttpMethod {
    /// The method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
        }
    }
}

/// A resolved request: method, final URL, headers and an optional timeout.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Target URL with the query string applied.
    pub url: Url,
    pub headers: http::HeaderMap,
    /// Overrides the client-wide timeout for this request only.
    pub timeout: Option<Duration>,
}

/// Send a resolved request through `client`.
pub(crate) async fn execute(client: &HttpClient, request: HttpRequest) -> Result<HttpResponse> {
    let HttpRequest {
        method,
        url,
        headers,
        timeout,
    } = request;
    tracing::debug!(target: targets::HTTP, method = method.as_str(), %url, "sending request");

    let mut outgoing = client
        .reqwest_client()
        .request(method.to_reqwest(), url)
        .headers(headers);
    if let Some(timeout) = timeout {
        outgoing = outgoing.timeout(timeout);
    }

    let response = outgoing.send().await?;
    tracing::debug!(target: targets::HTTP, status = response.status().as_u16(), "received response");
    Ok(HttpResponse::from_reqwest(response))
}

/// Assembles a request against a client.
pub struct HttpRequestBuilder {
    client: HttpClient,
    method: HttpMethod,
    url: String,
    headers: http::HeaderMap,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl HttpRequestBuilder {
    pub(crate) fn new(client: HttpClient, method: HttpMethod, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: http::HeaderMap::new(),
            query: Vec::new(),
            timeout: None,
        }
    }

    pub(crate) fn headers(mut self, headers: &http::HeaderMap) -> Self {
        self.headers.extend(headers.clone());
        self
    }

    /// Set a header, replacing any earlier value. A name or value that is
    /// not valid HTTP is skipped.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Append a query pair. Pairs keep the order they were added in.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the URL and query into an [`HttpRequest`].
    ///
    /// Fails with [`NetworkError::InvalidUrl`](crate::NetworkError::InvalidUrl)
    /// when the URL does not parse.
    pub fn build(self) -> Result<HttpRequest> {
        let mut url = Url::parse(&self.url)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(HttpRequest {
            method: self.method,
            url,
            headers: self.headers,
            timeout: self.timeout,
        })
    }

    /// Resolve and send.
    pub async fn send(self) -> Result<HttpResponse> {
        let client = self.client.clone();
        execute(&client, self.build()?).await
    }
}
