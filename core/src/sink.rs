//! Observers of a sweep.
//!
//! The coordinator reports to a [`ResultSink`] without knowing whether the
//! other side draws a matrix, moves a progress bar or writes a file.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use pingmap_common::status::{ScanStatus, StatusTable};

use crate::coordinator::ScanPhase;

/// One address reached its terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub address: Ipv4Addr,
    pub status: ScanStatus,
    /// Time the probe took.
    pub elapsed: Duration,
    pub completed: usize,
    pub total: usize,
}

/// Final state of a sweep, delivered once it completes or is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub job_id: u64,
    pub cidr: String,
    /// Either [`ScanPhase::Completed`] or [`ScanPhase::Cancelled`].
    pub phase: ScanPhase,
    pub completed: usize,
    pub total: usize,
    pub table: StatusTable,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn is_cancelled(&self) -> bool {
        self.phase == ScanPhase::Cancelled
    }

    /// `Active` addresses in ascending order.
    pub fn active(&self) -> Vec<Ipv4Addr> {
        self.table.active()
    }

    /// Text written to the report file, see [`StatusTable::report`].
    pub fn report(&self) -> String {
        self.table.report()
    }
}

/// Receives the events of a sweep.
///
/// Every call for one sweep comes from the same task, one at a time, with
/// `on_finished` last. Implementations must return quickly: workers keep
/// producing results while a sink runs.
pub trait ResultSink: Send + Sync {
    fn on_status_changed(&self, update: &StatusUpdate);

    fn on_finished(&self, summary: &ScanSummary);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn on_status_changed(&self, _update: &StatusUpdate) {}

    fn on_finished(&self, _summary: &ScanSummary) {}
}

/// Forwards each event to several sinks, in insertion order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for FanoutSink {
    fn on_status_changed(&self, update: &StatusUpdate) {
        for sink in &self.sinks {
            sink.on_status_changed(update);
        }
    }

    fn on_finished(&self, summary: &ScanSummary) {
        for sink in &self.sinks {
            sink.on_finished(summary);
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
