//! # Scan Coordinator
//!
//! Owns the lifecycle of a sweep and its status table.
//!
//! ```text
//!            start()                 last result
//!   Idle ───────────────▶ Running ───────────────▶ Completed
//!                            │
//!                            │ cancel(), pool drained
//!                            ▼
//!                        Cancelled
//! ```
//!
//! Workers never touch the table. They push `(address, outcome)` pairs into a
//! channel consumed by a single aggregator task, which is the only writer of
//! the job state and the only caller of the [`ResultSink`]. Readers take
//! snapshots through [`ScanCoordinator::progress`] under the same lock, so a
//! snapshot never shows a half-applied update.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use pingmap_common::config::{self, DEFAULT_WORKERS};
use pingmap_common::error::ScanError;
use pingmap_common::network::subnet::{AddressPolicy, Subnet};
use pingmap_common::status::{ScanStatus, StatusTable};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::pool::{PoolReport, WorkerPool};
use crate::probe::{ProbeClient, ProbeOutcome};
use crate::sink::{ResultSink, ScanSummary, StatusUpdate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScanPhase {
    /// No sweep has been started yet.
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl ScanPhase {
    pub fn is_finished(self) -> bool {
        matches!(self, ScanPhase::Completed | ScanPhase::Cancelled)
    }
}

/// Parameters of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub cidr: String,
    pub workers: usize,
    pub timeout: Duration,
    pub policy: AddressPolicy,
}

impl ScanRequest {
    /// A sweep of `cidr` with the default worker count and timeout.
    pub fn new(cidr: impl Into<String>) -> Self {
        Self {
            cidr: cidr.into(),
            workers: DEFAULT_WORKERS,
            timeout: config::default_timeout(),
            policy: AddressPolicy::All,
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(mut self, policy: AddressPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Point-in-time copy of the coordinator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// Id of the current or last job, 0 before the first sweep.
    pub job_id: u64,
    pub phase: ScanPhase,
    pub completed: usize,
    pub total: usize,
    pub table: StatusTable,
}

struct ScanJob {
    id: u64,
    cidr: String,
    table: StatusTable,
    completed: usize,
    total: usize,
    cancel: Arc<AtomicBool>,
    started: Instant,
}

impl ScanJob {
    fn summary(&self, phase: ScanPhase) -> ScanSummary {
        ScanSummary {
            job_id: self.id,
            cidr: self.cidr.clone(),
            phase,
            completed: self.completed,
            total: self.total,
            table: self.table.clone(),
            elapsed: self.started.elapsed(),
        }
    }
}

#[derive(Default)]
struct State {
    phase: ScanPhase,
    job: Option<ScanJob>,
    last_id: u64,
}

impl State {
    fn job_mut(&mut self, id: u64) -> Option<&mut ScanJob> {
        self.job.as_mut().filter(|job| job.id == id)
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives sweeps and keeps the authoritative status table.
///
/// Cloning is cheap and every clone controls the same sweeps, which lets a
/// key listener cancel a sweep started elsewhere.
#[derive(Clone)]
pub struct ScanCoordinator {
    probe: Arc<dyn ProbeClient>,
    sink: Arc<dyn ResultSink>,
    state: Arc<Mutex<State>>,
}

impl ScanCoordinator {
    pub fn new(probe: Arc<dyn ProbeClient>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            probe,
            sink,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        lock(&self.state).phase
    }

    /// Starts sweeping `request.cidr` and returns immediately.
    ///
    /// # Errors
    /// * [`ScanError::AlreadyRunning`] while another sweep is running.
    /// * [`ScanError::InvalidWorkerCount`] for zero workers.
    /// * [`ScanError::InvalidCidr`] for a malformed or oversized block.
    /// * [`ScanError::ProbeSetup`] when the probe cannot be used.
    ///
    /// On error no job is created and the previous snapshot is untouched.
    pub async fn start(&self, request: ScanRequest) -> Result<ScanHandle, ScanError> {
        if self.phase() == ScanPhase::Running {
            return Err(ScanError::AlreadyRunning);
        }

        let pool = WorkerPool::new(request.workers)?;
        let subnet: Subnet = request.cidr.parse()?;
        let addresses: Vec<Ipv4Addr> = subnet.addresses(request.policy);
        self.probe.ensure_ready().await?;

        let cancel = Arc::new(AtomicBool::new(false));
        let job_id = {
            let mut state = lock(&self.state);
            // Another start may have slipped in while the probe was checked.
            if state.phase == ScanPhase::Running {
                return Err(ScanError::AlreadyRunning);
            }
            state.last_id += 1;
            let id = state.last_id;
            state.job = Some(ScanJob {
                id,
                cidr: subnet.to_string(),
                table: StatusTable::new(addresses.iter().copied()),
                completed: 0,
                total: addresses.len(),
                cancel: cancel.clone(),
                started: Instant::now(),
            });
            state.phase = ScanPhase::Running;
            id
        };

        info!(
            "Sweeping {subnet}: {} addresses, {} workers, {}ms timeout, {} probe",
            addresses.len(),
            pool.workers(),
            request.timeout.as_millis(),
            self.probe.name()
        );

        let (tx, rx) = mpsc::unbounded_channel::<(Ipv4Addr, ProbeOutcome)>();
        let probe = self.probe.clone();
        let timeout = request.timeout;
        let pool_task: JoinHandle<PoolReport> = tokio::spawn(async move {
            pool.run(addresses, probe, timeout, cancel, move |addr, outcome| {
                // A closed channel means the aggregator is gone; nothing left to report to.
                let _ = tx.send((addr, outcome));
            })
            .await
        });

        let aggregator = Aggregator {
            job_id,
            state: self.state.clone(),
            sink: self.sink.clone(),
        };
        let task = tokio::spawn(aggregator.run(rx, pool_task));

        Ok(ScanHandle { job_id, task })
    }

    /// Stops dispatching new probes for the running sweep.
    ///
    /// Probes already in flight finish and still update the table. The phase
    /// moves to `Cancelled` once they have drained.
    pub fn cancel(&self) -> Result<(), ScanError> {
        let state = lock(&self.state);
        match (&state.phase, &state.job) {
            (ScanPhase::Running, Some(job)) => {
                if !job.cancel.swap(true, Ordering::Relaxed) {
                    info!("Cancelling sweep of {} after {}/{} probes", job.cidr, job.completed, job.total);
                }
                Ok(())
            }
            _ => Err(ScanError::NotRunning),
        }
    }

    /// Consistent copy of the current (or last) sweep.
    pub fn progress(&self) -> ScanProgress {
        let state = lock(&self.state);
        match &state.job {
            Some(job) => ScanProgress {
                job_id: job.id,
                phase: state.phase,
                completed: job.completed,
                total: job.total,
                table: job.table.clone(),
            },
            None => ScanProgress {
                phase: state.phase,
                ..ScanProgress::default()
            },
        }
    }
}

/// Handle to a started sweep.
#[derive(Debug)]
pub struct ScanHandle {
    job_id: u64,
    task: JoinHandle<Result<ScanSummary, ScanError>>,
}

impl ScanHandle {
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    /// Waits for the sweep to complete or finish cancelling.
    pub async fn wait(self) -> Result<ScanSummary, ScanError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ScanError::Aborted(e.to_string())),
        }
    }
}

/// Single writer of one job's state.
struct Aggregator {
    job_id: u64,
    state: Arc<Mutex<State>>,
    sink: Arc<dyn ResultSink>,
}

impl Aggregator {
    async fn run(
        self,
        mut rx: UnboundedReceiver<(Ipv4Addr, ProbeOutcome)>,
        pool_task: JoinHandle<PoolReport>,
    ) -> Result<ScanSummary, ScanError> {
        let mut finished: Option<ScanSummary> = None;

        while let Some((addr, outcome)) = rx.recv().await {
            let Some((update, summary)) = self.apply(addr, outcome) else {
                continue;
            };
            self.sink.on_status_changed(&update);
            if summary.is_some() {
                finished = summary;
                break;
            }
        }

        match pool_task.await {
            Ok(report) => debug!("Pool drained after {} probes", report.dispatched),
            Err(e) => error!("Worker pool failed: {e}"),
        }

        let summary = match finished {
            Some(summary) => summary,
            None => self
                .finish_cancelled()
                .ok_or_else(|| ScanError::Aborted(format!("job {} was superseded", self.job_id)))?,
        };

        self.sink.on_finished(&summary);
        info!(
            "Sweep of {} {}: {}/{} probed, {} active in {:.2}s",
            summary.cidr,
            if summary.is_cancelled() { "cancelled" } else { "complete" },
            summary.completed,
            summary.total,
            summary.table.count(ScanStatus::Active),
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }

    /// Records one result. Returns the sink update, plus the summary when
    /// this result was the last one.
    fn apply(&self, addr: Ipv4Addr, outcome: ProbeOutcome) -> Option<(StatusUpdate, Option<ScanSummary>)> {
        let mut state = lock(&self.state);
        let job = state.job_mut(self.job_id)?;

        let status = ScanStatus::from_reachable(outcome.reachable);
        if !job.table.resolve(addr, status) {
            warn!("Ignoring duplicate or unknown result for {addr}");
            return None;
        }
        job.completed += 1;

        let update = StatusUpdate {
            address: addr,
            status,
            elapsed: outcome.elapsed,
            completed: job.completed,
            total: job.total,
        };

        let summary = (job.completed == job.total).then(|| job.summary(ScanPhase::Completed));
        if summary.is_some() {
            state.phase = ScanPhase::Completed;
        }
        Some((update, summary))
    }

    fn finish_cancelled(&self) -> Option<ScanSummary> {
        let mut state = lock(&self.state);
        if state.phase != ScanPhase::Running {
            return None;
        }
        let job = state.job_mut(self.job_id)?;
        if !job.cancel.load(Ordering::Relaxed) {
            error!("Workers stopped before finishing the sweep of {}", job.cidr);
        }
        let summary = job.summary(ScanPhase::Cancelled);
        state.phase = ScanPhase::Cancelled;
        Some(summary)
    }
}

impl Drop for Aggregator {
    // Keeps the coordinator usable if a sink panics mid-sweep.
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        let owns_job = state.job.as_ref().is_some_and(|job| job.id == self.job_id);
        if owns_job && state.phase == ScanPhase::Running {
            if let Some(job) = state.job.as_ref() {
                job.cancel.store(true, Ordering::Relaxed);
            }
            state.phase = ScanPhase::Cancelled;
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
