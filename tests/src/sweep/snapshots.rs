use std::sync::Arc;
use std::time::Duration;

use pingmap_common::status::ScanStatus;
use pingmap_core::coordinator::{ScanCoordinator, ScanPhase, ScanRequest};
use pingmap_core::sink::NullSink;

use super::support::{SimulatedProbe, lan};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn snapshots_stay_consistent_while_running() {
    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([lan(1), lan(128), lan(254)]).delay(0, 4)),
        Arc::new(NullSink),
    );
    let handle = coordinator
        .start(ScanRequest::new("192.168.1.0/24").workers(16))
        .await
        .unwrap();

    let mut polls = 0;
    let mut last_completed = 0;
    loop {
        let p = coordinator.progress();
        assert_eq!(p.table.scanned(), p.completed);
        assert!(p.completed <= p.total);
        assert_eq!(p.total, 256);
        assert_eq!(
            p.table.count(ScanStatus::Unscanned),
            p.total - p.completed
        );
        assert!(p.completed >= last_completed, "completions went backwards");
        last_completed = p.completed;
        polls += 1;

        if p.phase != ScanPhase::Running {
            assert_eq!(p.phase, ScanPhase::Completed);
            break;
        }
        tokio::time::sleep(Duration::from_micros(200)).await;
    }

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.completed, 256);
    assert!(polls > 1);
}
