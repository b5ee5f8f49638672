//! Callback contract
//!
//! A callback is a single-use capability that receives one result value.
//! `on_data_received` takes `self` by value, so a callback can be invoked at
//! most once. There is no return value and no error channel: delivery is
//! fire-and-forget.

use std::sync::mpsc::{Sender, SyncSender};

/// Deliver a result asynchronously
///
/// Implemented for every `FnOnce(T) + Send + 'static` closure, and for the
/// sending half of a standard channel so a caller can read the result from a
/// receiver instead of running code on the background context.
///
/// # Example
/// ```
/// use async_fetcher::Callback;
///
/// let cb = |data: String| println!("Got: {}", data);
/// cb.on_data_received("Async Data".to_string());
/// ```
pub trait Callback<T = String>: Send + 'static {
    /// Called exactly once, on the background execution context
    fn on_data_received(self, data: T);
}

impl<T, F> Callback<T> for F
where
    F: FnOnce(T) + Send + 'static,
{
    fn on_data_received(self, data: T) {
        self(data)
    }
}

/// Channel-backed callback wrapper
///
/// Sending into a channel whose receiver is gone is not an error for the
/// producer; the value is simply dropped.
pub struct ChannelCallback<T> {
    sender: ChannelSender<T>,
}

enum ChannelSender<T> {
    Bounded(SyncSender<T>),
    Unbounded(Sender<T>),
}

impl<T> From<SyncSender<T>> for ChannelCallback<T> {
    fn from(sender: SyncSender<T>) -> Self {
        Self {
            sender: ChannelSender::Bounded(sender),
        }
    }
}

impl<T> From<Sender<T>> for ChannelCallback<T> {
    fn from(sender: Sender<T>) -> Self {
        Self {
            sender: ChannelSender::Unbounded(sender),
        }
    }
}

impl<T: Send + 'static> Callback<T> for ChannelCallback<T> {
    fn on_data_received(self, data: T) {
        let sent = match self.sender {
            ChannelSender::Bounded(tx) => tx.send(data).is_ok(),
            ChannelSender::Unbounded(tx) => tx.send(data).is_ok(),
        };
        if !sent {
            log::debug!("Result receiver dropped before delivery, discarding value");
        }
    }
}
