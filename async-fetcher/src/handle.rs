//! Per-request handle
//!
//! Each request owns one `Mutex<RequestState>` + `Condvar` pair shared
//! between the caller's handle and the background unit. The condvar serves
//! both the interruptible delay and completion notification.

use crate::types::{DelayOutcome, Delivery, RequestId};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct RequestState {
    interrupted: bool,
    delivery: Option<Delivery>,
}

#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: Mutex<RequestState>,
    signal: Condvar,
}

impl Shared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // Callbacks never run under this lock.
    fn lock(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Block for `delay`, returning early if the request is interrupted
    ///
    /// A delay too large to represent as an `Instant` only ends on interrupt.
    pub(crate) fn sleep(&self, delay: Duration) -> DelayOutcome {
        let deadline = Instant::now().checked_add(delay);
        let mut state = self.lock();
        loop {
            if state.interrupted {
                return DelayOutcome::Interrupted;
            }
            let Some(deadline) = deadline else {
                state = self
                    .signal
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return DelayOutcome::Elapsed;
            }
            state = self
                .signal
                .wait_timeout(state, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    pub(crate) fn complete(&self, delivery: Delivery) {
        let mut state = self.lock();
        state.delivery = Some(delivery);
        self.signal.notify_all();
    }
}

/// Handle to a dispatched request
///
/// Dropping the handle detaches from the request; the callback still fires.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    id: RequestId,
    shared: Arc<Shared>,
}

impl RequestHandle {
    pub(crate) fn new(id: RequestId, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    /// Identifier of this request (unique per fetcher)
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Signal the background unit to stop waiting
    ///
    /// Cancellation is not supported: the unit logs the interruption and
    /// still delivers the result, only earlier. Has no effect once the delay
    /// has already ended.
    pub fn interrupt(&self) {
        let mut state = self.shared.lock();
        if state.interrupted || state.delivery.is_some() {
            return;
        }
        state.interrupted = true;
        self.shared.signal.notify_all();
    }

    /// True once the callback has returned
    pub fn is_finished(&self) -> bool {
        self.shared.lock().delivery.is_some()
    }

    /// Block until the callback has returned
    pub fn wait(&self) -> Delivery {
        let mut state = self.shared.lock();
        loop {
            if let Some(delivery) = state.delivery {
                return delivery;
            }
            state = self
                .shared
                .signal
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Block until the callback has returned or `timeout` elapses
    ///
    /// A timeout too large to represent (e.g. `Duration::MAX`) waits like
    /// [`wait`](Self::wait).
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Delivery> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut state = self.shared.lock();
        loop {
            if let Some(delivery) = state.delivery {
                return Some(delivery);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            state = self
                .shared
                .signal
                .wait_timeout(state, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sleep_elapses_without_interrupt() {
        let shared = Shared::new();
        let started = Instant::now();
        assert_eq!(shared.sleep(Duration::from_millis(30)), DelayOutcome::Elapsed);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_interrupt_cuts_sleep_short() {
        let shared = Shared::new();
        let handle = RequestHandle::new(7, Arc::clone(&shared));

        let sleeper = thread::spawn(move || {
            let started = Instant::now();
            (shared.sleep(Duration::from_secs(10)), started.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        handle.interrupt();

        let (outcome, slept) = sleeper.join().unwrap();
        assert_eq!(outcome, DelayOutcome::Interrupted);
        assert!(slept < Duration::from_secs(5));
    }

    #[test]
    fn test_wait_returns_delivery() {
        let shared = Shared::new();
        let handle = RequestHandle::new(3, Arc::clone(&shared));
        assert!(!handle.is_finished());
        assert!(handle.wait_timeout(Duration::from_millis(10)).is_none());

        let delivery = Delivery {
            id: 3,
            delay: DelayOutcome::Elapsed,
            callback_panicked: false,
        };
        let worker = thread::spawn(move || shared.complete(delivery));

        assert_eq!(handle.wait(), delivery);
        assert!(handle.is_finished());
        worker.join().unwrap();
    }

    #[test]
    fn test_wait_timeout_with_unbounded_timeout() {
        let shared = Shared::new();
        let handle = RequestHandle::new(4, Arc::clone(&shared));
        let delivery = Delivery {
            id: 4,
            delay: DelayOutcome::Elapsed,
            callback_panicked: false,
        };
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            shared.complete(delivery);
        });

        assert_eq!(handle.wait_timeout(Duration::MAX), Some(delivery));
        worker.join().unwrap();
    }

    #[test]
    fn test_unbounded_sleep_ends_on_interrupt() {
        let shared = Shared::new();
        let handle = RequestHandle::new(5, Arc::clone(&shared));
        let sleeper = thread::spawn(move || shared.sleep(Duration::MAX));

        thread::sleep(Duration::from_millis(20));
        handle.interrupt();
        assert_eq!(sleeper.join().unwrap(), DelayOutcome::Interrupted);
    }

    #[test]
    fn test_interrupt_after_completion_is_noop() {
        let shared = Shared::new();
        let handle = RequestHandle::new(1, Arc::clone(&shared));
        shared.complete(Delivery {
            id: 1,
            delay: DelayOutcome::Elapsed,
            callback_panicked: false,
        });
        handle.interrupt();
        assert!(!handle.wait().was_interrupted());
    }
}
