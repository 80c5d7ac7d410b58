//! Logging facilities for Folio.
//!
//! Folio uses the `tracing` crate for instrumentation. The library crates
//! never install a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::from_default_env())
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted with one of the [`targets`] below, so a filter such
//! as `RUST_LOG=folio::selection=debug` isolates a single subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "folio_core::signal";
    /// HTTP transport target.
    pub const HTTP: &str = "folio_net::http";
    /// REST API client target.
    pub const REST_API: &str = "folio_net::rest_api";
    /// Remote page source target.
    pub const SOURCE: &str = "folio::source";
    /// Displayed page store target.
    pub const PAGE_STORE: &str = "folio::page_store";
    /// Cross-page selection target.
    pub const SELECTION: &str = "folio::selection";
    /// Browser controller target.
    pub const CONTROLLER: &str = "folio::controller";
}
