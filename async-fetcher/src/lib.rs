//! Async Fetcher Library
//!
//! A callback-style asynchronous interface: a producer performs simulated
//! delayed work on a background execution context and invokes a
//! caller-supplied callback exactly once when the work completes.
//!
//! # Architecture
//!
//! - [`Callback`] is the single-operation contract that receives the result
//! - [`DataFetcher`] accepts a callback, schedules the background unit and
//!   returns immediately
//! - [`RequestHandle`] lets the caller wait for delivery or interrupt the delay
//!
//! Background units run either on a bounded worker pool (default) or on one
//! OS thread per request. Interrupting a request never cancels it: the
//! callback still fires with the same payload, only earlier.
//!
//! # Example Usage
//!
//! ```no_run
//! use async_fetcher::DataFetcher;
//!
//! let fetcher = DataFetcher::new().unwrap();
//! let handle = fetcher
//!     .request(|data: String| println!("Got: {}", data))
//!     .unwrap();
//!
//! // request() has already returned; the callback fires about a second later
//! let delivery = handle.wait();
//! assert!(!delivery.callback_panicked);
//! ```

// Public modules
pub mod callback;
pub mod config;
pub mod fetcher;
pub mod handle;
pub mod types;

// Re-export main types for convenience
pub use callback::{Callback, ChannelCallback};
pub use config::{DispatchMode, FetcherConfig};
pub use fetcher::DataFetcher;
pub use handle::RequestHandle;
pub use types::{DelayOutcome, Delivery, FetchError, RequestId, Result, ASYNC_DATA};

// Internal modules (not exposed in public API)
mod dispatch;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
