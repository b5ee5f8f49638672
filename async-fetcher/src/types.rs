//! Core types for the async fetcher library
//!
//! This module defines the payload, the error type and the delivery record
//! reported back through a request handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed payload delivered by [`DataFetcher::request`](crate::DataFetcher::request)
pub const ASYNC_DATA: &str = "Async Data";

/// Result type for fetcher operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Identifier assigned to each dispatched request
pub type RequestId = u64;

/// Errors that can occur while dispatching a request
///
/// Nothing in here ever reaches a callback. Once a request is dispatched the
/// callback fires exactly once no matter what happens in the background unit.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to spawn background thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("Invalid fetcher configuration: {0}")]
    InvalidConfig(String),
}

/// How the simulated delay of a background unit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayOutcome {
    /// The full delay elapsed
    Elapsed,
    /// The unit was interrupted before the delay elapsed
    Interrupted,
}

impl fmt::Display for DelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayOutcome::Elapsed => write!(f, "elapsed"),
            DelayOutcome::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Record of a completed delivery, available once the callback has returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Request this delivery belongs to
    pub id: RequestId,
    /// How the delay ended
    pub delay: DelayOutcome,
    /// True if the callback body panicked (the panic was logged and swallowed)
    pub callback_panicked: bool,
}

impl Delivery {
    /// True if the delay was cut short by an interrupt
    pub fn was_interrupted(&self) -> bool {
        self.delay == DelayOutcome::Interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_literal() {
        assert_eq!(ASYNC_DATA, "Async Data");
    }

    #[test]
    fn test_delay_outcome_display() {
        assert_eq!(DelayOutcome::Elapsed.to_string(), "elapsed");
        assert_eq!(DelayOutcome::Interrupted.to_string(), "interrupted");
    }

    #[test]
    fn test_spawn_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads left");
        let err: FetchError = io.into();
        assert!(matches!(err, FetchError::Spawn(_)));
        assert!(err.to_string().contains("no threads left"));
    }
}
