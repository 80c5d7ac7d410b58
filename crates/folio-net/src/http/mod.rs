//! HTTP client for Folio.
//!
//! # Example
//!
//! ```ignore
//! use folio_net::http::HttpClient;
//!
//! // Create a client with default settings
//! let client = HttpClient::with_defaults()?;
//!
//! // Make a GET request
//! let response = client.get("https://api.example.com/users").send().await?;
//! println!("Status: {}", response.status());
//! println!("Body: {}", response.text().await?);
//! ```

mod client;
mod request;
mod response;
mod rest_api;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig, RedirectPolicy};
pub use request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use response::HttpResponse;
pub use rest_api::{
    RateLimiter, RestApiClient, RestApiClientBuilder, RestApiRequestBuilder, RetryConfig,
};
