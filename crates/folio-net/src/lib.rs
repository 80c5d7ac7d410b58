//! Networking module for Folio.
//!
//! This crate provides the HTTP transport the data browser talks to its
//! remote collection API through:
//!
//! - **HTTP Client**: A thin, cloneable wrapper over `reqwest` with timeouts,
//!   user agent and default headers
//! - **REST API Client**: Base URL handling, JSON defaults, optional
//!   client-side rate limiting and transport-level retry
//!
//! # HTTP Client
//!
//! ```ignore
//! use folio_net::http::HttpClient;
//!
//! // Create a client
//! let client = HttpClient::with_defaults()?;
//!
//! // Make a request
//! let response = client.get("https://api.example.com/data")
//!     .header("Accept", "application/json")
//!     .send()
//!     .await?;
//!
//! // Read the response
//! let data: MyData = response.json().await?;
//! ```
//!
//! ## Configuration
//!
//! ```ignore
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(60))
//!     .user_agent("MyApp/1.0")
//!     .build()?;
//! ```
//!
//! # REST API Client
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
//! let page: serde_json::Value = client
//!     .get("/artworks")
//!     .query("page", "2")
//!     .json_response()
//!     .await?;
//! ```

mod error;
pub mod http;

pub use error::{NetworkError, Result};

// Re-export commonly used types at the crate root
pub use http::{
    HttpClient, HttpClientBuilder, HttpClientConfig, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, RateLimiter, RedirectPolicy, RestApiClient, RestApiClientBuilder,
    RestApiRequestBuilder, RetryConfig,
};
