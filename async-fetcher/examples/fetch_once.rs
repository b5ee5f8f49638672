//! Minimal callback demo
//!
//! Requests the data once and prints it from the callback.
//!
//! Usage:
//!   cargo run -p async-fetcher --example fetch_once

use async_fetcher::DataFetcher;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let fetcher = DataFetcher::new()?;
    let handle = fetcher.request(|data: String| {
        println!("Got: {}", data);
    })?;

    println!("Request #{} dispatched, main thread is free", handle.id());

    // Keep the process alive until the callback has run
    let delivery = handle.wait();
    println!("Delivery finished ({})", delivery.delay);

    Ok(())
}
