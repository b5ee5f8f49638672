//! Demo scenarios driven by the CLI
//!
//! `fetch` issues independent requests and prints every delivery.
//! `square` chains requests: each callback submits the next one, and every
//! level waits one base delay longer than the previous level.

use crate::report::{ReportEntry, RunReport};
use anyhow::{Context, Result};
use async_fetcher::{DataFetcher, RequestHandle};
use chrono::Utc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Number of chained squaring steps in the square scenario
pub const SQUARE_DEPTH: u32 = 3;

/// Issue `requests` independent requests and wait for all of them
pub fn run_fetch(
    fetcher: &DataFetcher,
    requests: usize,
    interrupt_after: Option<Duration>,
) -> Result<RunReport> {
    let mut report = RunReport::new(
        "fetch",
        Utc::now(),
        fetcher.dispatch_mode(),
        fetcher.config().delay_ms,
    );
    report.requested = requests;

    let started = Instant::now();
    let (tx, rx) = mpsc::channel();

    let mut handles: Vec<RequestHandle> = Vec::with_capacity(requests);
    for index in 0..requests {
        let tx = tx.clone();
        let handle = fetcher
            .request(move |data: String| {
                println!("Got: {}", data);
                let _ = tx.send((index, data, started.elapsed()));
            })
            .with_context(|| format!("Failed to dispatch request {}", index))?;
        handles.push(handle);
    }
    drop(tx);
    log::info!("{} request(s) dispatched, waiting for callbacks", requests);

    if let Some(after) = interrupt_after {
        thread::sleep(after);
        log::info!("Interrupting {} request(s)", handles.len());
        for handle in &handles {
            handle.interrupt();
        }
    }

    let deliveries: Vec<_> = handles.iter().map(|h| h.wait()).collect();
    let mut results: Vec<(usize, String, Duration)> = rx.iter().collect();
    results.sort_by_key(|(_, _, latency)| *latency);

    for (index, payload, latency) in results {
        let delivery = deliveries[index];
        report.entries.push(ReportEntry {
            label: format!("#{}", delivery.id),
            payload,
            latency_ms: latency.as_millis() as u64,
            delay: Some(delivery.delay),
            callback_panicked: delivery.callback_panicked,
        });
    }

    Ok(report)
}

/// Square `start` repeatedly, each step issued from the previous callback
pub fn run_square_chain(fetcher: &DataFetcher, start: u64) -> Result<RunReport> {
    let mut report = RunReport::new(
        "square",
        Utc::now(),
        fetcher.dispatch_mode(),
        fetcher.config().delay_ms,
    );
    report.requested = SQUARE_DEPTH as usize;

    let started = Instant::now();
    let (tx, rx) = mpsc::channel();
    square_step(fetcher, start, 1, started, tx)
        .context("Failed to dispatch first square request")?;

    // The chain ends when the last step drops its sender
    for (value, square, latency) in rx {
        report.entries.push(ReportEntry {
            label: format!("{}^2", value),
            payload: square.to_string(),
            latency_ms: latency.as_millis() as u64,
            delay: None,
            callback_panicked: false,
        });
    }

    Ok(report)
}

/// Delay of chain level `level` (1-based): `level` times the base delay
fn square_delay(base: Duration, level: u32) -> Duration {
    base.saturating_mul(level)
}

fn square_step(
    fetcher: &DataFetcher,
    value: u64,
    level: u32,
    started: Instant,
    tx: Sender<(u64, u64, Duration)>,
) -> async_fetcher::Result<RequestHandle> {
    let next = fetcher.clone();
    fetcher.submit_with_delay(
        square_delay(fetcher.config().delay(), level),
        move || value.checked_mul(value),
        move |square: Option<u64>| {
            let Some(square) = square else {
                log::warn!("Square of {} overflows u64, stopping chain", value);
                return;
            };
            println!("Square of {} is : {}", value, square);
            let _ = tx.send((value, square, started.elapsed()));

            if level < SQUARE_DEPTH {
                if let Err(e) = square_step(&next, square, level + 1, started, tx) {
                    log::error!("Failed to dispatch next square request: {}", e);
                }
            }
        },
    )
}
