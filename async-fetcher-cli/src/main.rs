//! Async Fetcher CLI Application
//!
//! Runs the callback demo on top of the async-fetcher library:
//! - Issue one or more independent requests and print each delivery
//! - Optionally interrupt them mid-delay (the callbacks still fire)
//! - Chain requests from inside callbacks (square demo)
//! - Print a TXT/JSON run summary

use anyhow::Result;
use async_fetcher::{DataFetcher, DispatchMode};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod report;
mod scenario;

use config::{AppConfig, ReportFormat};

/// Async Fetcher - callback-style asynchronous request demo
#[derive(Parser, Debug)]
#[command(name = "async-fetcher")]
#[command(about = "Request data asynchronously and receive it through a callback", long_about = None)]
#[command(version)]
struct Args {
    /// Number of independent requests to issue
    #[arg(short = 'n', long, value_name = "COUNT")]
    requests: Option<usize>,

    /// Simulated work delay in milliseconds (default: 1000)
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Scheduling model for background work
    #[arg(long, value_enum)]
    dispatch: Option<DispatchArg>,

    /// Worker pool size (pool dispatch only)
    #[arg(long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Interrupt every request after this many milliseconds
    #[arg(long, value_name = "MS")]
    interrupt_after_ms: Option<u64>,

    /// Run the chained-square demo starting from NUM
    #[arg(long, value_name = "NUM")]
    square: Option<u64>,

    /// Format of the run summary
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DispatchArg {
    Thread,
    Pool,
}

impl From<DispatchArg> for DispatchMode {
    fn from(arg: DispatchArg) -> Self {
        match arg {
            DispatchArg::Thread => DispatchMode::Thread,
            DispatchArg::Pool => DispatchMode::Pool,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Async Fetcher CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using fetcher library v{}", async_fetcher::VERSION);

    let config = resolve_config(&args)?;
    let fetcher = DataFetcher::with_config(config.fetcher.clone())?;

    let report = match config.scenario.square {
        Some(start) => scenario::run_square_chain(&fetcher, start)?,
        None => scenario::run_fetch(
            &fetcher,
            config.scenario.requests,
            config.scenario.interrupt_after_ms.map(Duration::from_millis),
        )?,
    };

    if !args.quiet {
        println!();
        print!("{}", report.render(config.report.format)?);
    }

    Ok(())
}

/// Merge the optional config file with command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let config = config::load_config(path)?;
            log::debug!("Configuration loaded successfully");
            config
        }
        None => AppConfig::default(),
    };

    if let Some(requests) = args.requests {
        config.scenario.requests = requests;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.fetcher.delay_ms = delay_ms;
    }
    if let Some(dispatch) = args.dispatch {
        config.fetcher.dispatch = dispatch.into();
    }
    if let Some(workers) = args.workers {
        config.fetcher.worker_threads = workers;
    }
    if args.interrupt_after_ms.is_some() {
        config.scenario.interrupt_after_ms = args.interrupt_after_ms;
    }
    if args.square.is_some() {
        config.scenario.square = args.square;
    }
    if let Some(format) = args.report {
        config.report.format = format;
    }

    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_runs_fixed_scenario() {
        let args = Args::parse_from(["async-fetcher"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.scenario.requests, 1);
        assert_eq!(config.fetcher.delay_ms, 1000);
        assert!(config.scenario.square.is_none());
        assert!(config.scenario.interrupt_after_ms.is_none());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "async-fetcher",
            "-n",
            "4",
            "--delay-ms",
            "50",
            "--dispatch",
            "thread",
            "--interrupt-after-ms",
            "10",
            "--report",
            "json",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.scenario.requests, 4);
        assert_eq!(config.fetcher.delay_ms, 50);
        assert_eq!(config.fetcher.dispatch, DispatchMode::Thread);
        assert_eq!(config.scenario.interrupt_after_ms, Some(10));
        assert_eq!(config.report.format, ReportFormat::Json);
    }
}
