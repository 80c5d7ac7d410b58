//! Core primitives for Folio.
//!
//! This crate provides the small set of building blocks shared by the rest of
//! the workspace:
//!
//! - **Signal/Slot System**: Type-safe change notification between the
//!   browser controller and whatever presentation layer renders it
//! - **Logging**: `tracing` target names used throughout the workspace
//!
//! # Signal/Slot Example
//!
//! ```
//! use folio_core::Signal;
//!
//! // Create a signal that notifies when the selection size changes
//! let selection_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = selection_changed.connect(|count| {
//!     println!("{} rows selected", count);
//! });
//!
//! // Emit the signal
//! selection_changed.emit(30);
//!
//! // Disconnect when done
//! selection_changed.disconnect(conn_id);
//! ```

pub mod logging;
mod signal;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
