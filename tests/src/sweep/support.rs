use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pingmap_core::probe::{ProbeClient, ProbeOutcome};
use pingmap_core::sink::{ResultSink, ScanSummary, StatusUpdate};

/// Answers only for a fixed set of addresses, after a random delay.
pub struct SimulatedProbe {
    up: HashSet<Ipv4Addr>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl SimulatedProbe {
    pub fn new(up: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            up: up.into_iter().collect(),
            min_delay_ms: 0,
            max_delay_ms: 2,
        }
    }

    pub fn delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms;
        self
    }
}

#[async_trait]
impl ProbeClient for SimulatedProbe {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> ProbeOutcome {
        let delay = Duration::from_millis(rand::random_range(self.min_delay_ms..=self.max_delay_ms));
        tokio::time::sleep(delay).await;
        ProbeOutcome {
            reachable: self.up.contains(&addr),
            elapsed: delay,
        }
    }
}

/// Keeps every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub updates: Mutex<Vec<StatusUpdate>>,
    pub finished: Mutex<Vec<ScanSummary>>,
}

impl RecordingSink {
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<ScanSummary> {
        self.finished.lock().unwrap().clone()
    }
}

impl ResultSink for RecordingSink {
    fn on_status_changed(&self, update: &StatusUpdate) {
        self.updates.lock().unwrap().push(*update);
    }

    fn on_finished(&self, summary: &ScanSummary) {
        self.finished.lock().unwrap().push(summary.clone());
    }
}

pub fn lan(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, last)
}
