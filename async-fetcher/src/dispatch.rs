//! Background unit scheduling
//!
//! Either one named OS thread per request, or a bounded rayon pool owned by
//! the fetcher. Jobs queued on a busy pool wait for a free worker.

use crate::config::{DispatchMode, FetcherConfig};
use crate::types::{FetchError, RequestId, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::thread;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) enum Dispatcher {
    Thread { name: String },
    Pool(ThreadPool),
}

impl Dispatcher {
    pub(crate) fn from_config(config: &FetcherConfig) -> Result<Self> {
        match config.dispatch {
            DispatchMode::Thread => Ok(Dispatcher::Thread {
                name: config.thread_name.clone(),
            }),
            DispatchMode::Pool => {
                let prefix = config.thread_name.clone();
                let pool = ThreadPoolBuilder::new()
                    .num_threads(config.worker_threads)
                    .thread_name(move |index| format!("{}-worker-{}", prefix, index))
                    // Callback panics are caught per job; anything reaching here
                    // would otherwise abort the process.
                    .panic_handler(|_| log::error!("Panic escaped a background job"))
                    .build()
                    .map_err(|e| FetchError::PoolBuild(e.to_string()))?;
                log::debug!(
                    "Worker pool ready with {} threads",
                    pool.current_num_threads()
                );
                Ok(Dispatcher::Pool(pool))
            }
        }
    }

    /// Hand a job to its background execution context without waiting for it
    pub(crate) fn spawn(&self, id: RequestId, job: Job) -> Result<()> {
        match self {
            Dispatcher::Thread { name } => {
                thread::Builder::new()
                    .name(format!("{}-{}", name, id))
                    .spawn(job)?;
                Ok(())
            }
            Dispatcher::Pool(pool) => {
                pool.spawn(job);
                Ok(())
            }
        }
    }

    pub(crate) fn mode(&self) -> DispatchMode {
        match self {
            Dispatcher::Thread { .. } => DispatchMode::Thread,
            Dispatcher::Pool(_) => DispatchMode::Pool,
        }
    }
}
