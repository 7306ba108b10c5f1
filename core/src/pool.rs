//! Bounded worker pool.
//!
//! `workers` tokio tasks share one FIFO queue of addresses. Each task takes the
//! next address, probes it, hands the outcome to the result callback and loops
//! until the queue is empty or the cancel flag is raised. The flag is only
//! checked between probes, so in-flight probes always run to their own
//! timeout.

use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pingmap_common::error::ScanError;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::probe::{ProbeClient, ProbeOutcome};

/// Summary of one pool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    /// Addresses handed to a probe, each of which produced one callback.
    pub dispatched: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, ScanError> {
        if workers == 0 {
            return Err(ScanError::InvalidWorkerCount);
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Probes every address with at most `workers` probes in flight.
    ///
    /// `on_result` is called exactly once per dispatched address, from any
    /// worker task and in completion order.
    pub async fn run<F>(
        &self,
        addresses: Vec<Ipv4Addr>,
        probe: Arc<dyn ProbeClient>,
        timeout: Duration,
        cancel: Arc<AtomicBool>,
        on_result: F,
    ) -> PoolReport
    where
        F: Fn(Ipv4Addr, ProbeOutcome) + Send + Sync + 'static,
    {
        let spawned = self.workers.min(addresses.len());
        let queue: Arc<Mutex<VecDeque<Ipv4Addr>>> = Arc::new(Mutex::new(addresses.into()));
        let dispatched = Arc::new(AtomicUsize::new(0));
        let on_result = Arc::new(on_result);

        debug!("Starting {spawned} workers");

        let mut set = JoinSet::new();
        for _ in 0..spawned {
            let queue = queue.clone();
            let probe = probe.clone();
            let cancel = cancel.clone();
            let dispatched = dispatched.clone();
            let on_result = on_result.clone();

            set.spawn(async move {
                loop {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    let Some(addr) = next_address(&queue) else {
                        break;
                    };
                    dispatched.fetch_add(1, Ordering::Relaxed);

                    let outcome = probe.probe(addr, timeout).await;
                    on_result(addr, outcome);
                }
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                error!("Worker task failed: {e}");
            }
        }

        PoolReport {
            dispatched: dispatched.load(Ordering::Relaxed),
        }
    }
}

fn next_address(queue: &Mutex<VecDeque<Ipv4Addr>>) -> Option<Ipv4Addr> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
