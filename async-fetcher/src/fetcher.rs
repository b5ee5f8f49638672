//! Main fetcher API
//!
//! `DataFetcher` is the producer: it accepts a callback, runs the simulated
//! work on a background execution context and invokes the callback exactly
//! once with the result. `request` returns as soon as the work is scheduled.

use crate::callback::{Callback, ChannelCallback};
use crate::config::{DispatchMode, FetcherConfig};
use crate::dispatch::Dispatcher;
use crate::handle::{RequestHandle, Shared};
use crate::types::{DelayOutcome, Delivery, RequestId, Result, ASYNC_DATA};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

/// The asynchronous producer - entry point for all requests
///
/// Cloning is cheap; clones share the same worker pool and request counter,
/// so a callback can capture a clone and issue the next request itself.
#[derive(Clone)]
pub struct DataFetcher {
    inner: Arc<Inner>,
}

struct Inner {
    config: FetcherConfig,
    dispatcher: Dispatcher,
    next_id: AtomicU64,
}

impl DataFetcher {
    /// Create a fetcher with the default configuration (1s delay, pooled dispatch)
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a fetcher from an explicit configuration
    ///
    /// # Example
    /// ```no_run
    /// use async_fetcher::{DataFetcher, DispatchMode, FetcherConfig};
    ///
    /// let config = FetcherConfig::new()
    ///     .with_dispatch(DispatchMode::Thread)
    ///     .with_delay_ms(250);
    /// let fetcher = DataFetcher::with_config(config).unwrap();
    /// ```
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::from_config(&config)?;
        log::debug!(
            "Fetcher created: delay={}ms dispatch={}",
            config.delay_ms,
            config.dispatch
        );
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                dispatcher,
                next_id: AtomicU64::new(0),
            }),
        })
    }

    /// The configuration this fetcher was built with
    pub fn config(&self) -> &FetcherConfig {
        &self.inner.config
    }

    /// The dispatch mode in effect
    pub fn dispatch_mode(&self) -> DispatchMode {
        self.inner.dispatcher.mode()
    }

    /// Request the data; `callback` receives `"Async Data"` after the delay
    ///
    /// Returns immediately. The callback runs on the background execution
    /// context, never on the caller's thread.
    ///
    /// # Example
    /// ```no_run
    /// use async_fetcher::DataFetcher;
    ///
    /// let fetcher = DataFetcher::new().unwrap();
    /// let handle = fetcher
    ///     .request(|data: String| println!("Got: {}", data))
    ///     .unwrap();
    /// handle.wait();
    /// ```
    pub fn request<C>(&self, callback: C) -> Result<RequestHandle>
    where
        C: Callback<String>,
    {
        self.submit(|| ASYNC_DATA.to_string(), callback)
    }

    /// Channel form of [`request`](Self::request)
    ///
    /// The receiver yields exactly one value once the delay is over.
    pub fn request_channel(&self) -> Result<(RequestHandle, Receiver<String>)> {
        let (tx, rx) = mpsc::sync_channel(1);
        let handle = self.request(ChannelCallback::from(tx))?;
        Ok((handle, rx))
    }

    /// Run `work` on the background context after the delay and hand its
    /// value to `callback`
    ///
    /// If `work` itself panics the callback is never invoked; the panic is
    /// logged and recorded in the [`Delivery`] like a callback panic.
    pub fn submit<T, W, C>(&self, work: W, callback: C) -> Result<RequestHandle>
    where
        T: Send + 'static,
        W: FnOnce() -> T + Send + 'static,
        C: Callback<T>,
    {
        self.submit_with_delay(self.inner.config.delay(), work, callback)
    }

    /// Like [`submit`](Self::submit), with a per-request delay instead of the
    /// configured one
    pub fn submit_with_delay<T, W, C>(
        &self,
        delay: Duration,
        work: W,
        callback: C,
    ) -> Result<RequestHandle>
    where
        T: Send + 'static,
        W: FnOnce() -> T + Send + 'static,
        C: Callback<T>,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let shared = Shared::new();
        let handle = RequestHandle::new(id, Arc::clone(&shared));

        log::debug!(
            "Dispatching request #{} ({}, {}ms)",
            id,
            self.inner.dispatcher.mode(),
            delay.as_millis()
        );

        self.inner.dispatcher.spawn(
            id,
            Box::new(move || run_request(id, delay, &shared, work, callback)),
        )?;

        Ok(handle)
    }
}

/// Body of one background unit
fn run_request<T, W, C>(id: RequestId, delay: Duration, shared: &Shared, work: W, callback: C)
where
    W: FnOnce() -> T,
    C: Callback<T>,
{
    log::trace!("Request #{} waiting {:?}", id, delay);
    let outcome = shared.sleep(delay);
    if outcome == DelayOutcome::Interrupted {
        log::warn!(
            "Request #{} interrupted before its delay elapsed, delivering anyway",
            id
        );
    }

    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        let data = work();
        callback.on_data_received(data);
    }));

    let callback_panicked = match result {
        Ok(()) => {
            log::debug!("Request #{} delivered ({})", id, outcome);
            false
        }
        Err(payload) => {
            log::error!(
                "Request #{} callback panicked: {}",
                id,
                panic_message(payload.as_ref())
            );
            true
        }
    };

    shared.complete(Delivery {
        id,
        delay: outcome,
        callback_panicked,
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}
