use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use pingmap_common::error::ScanError;
use pingmap_common::status::ScanStatus;
use pingmap_core::coordinator::{ScanCoordinator, ScanPhase, ScanRequest};

use super::support::{RecordingSink, SimulatedProbe, lan};

async fn wait_for_completed(coordinator: &ScanCoordinator, at_least: usize) {
    for _ in 0..1_000 {
        if coordinator.progress().completed >= at_least {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("sweep never reached {at_least} results");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_keeps_finished_results_and_skips_the_rest() {
    let sink = Arc::new(RecordingSink::default());
    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([lan(1), lan(2), lan(3)]).delay(10, 20)),
        sink.clone(),
    );

    let handle = coordinator
        .start(ScanRequest::new("192.168.1.0/24").workers(4))
        .await
        .unwrap();
    wait_for_completed(&coordinator, 10).await;
    coordinator.cancel().unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.phase, ScanPhase::Cancelled);
    assert!(summary.completed >= 10, "only {} probed", summary.completed);
    assert!(summary.completed < 256);
    assert_eq!(summary.table.scanned(), summary.completed);
    assert_eq!(
        summary.table.count(ScanStatus::Unscanned),
        summary.total - summary.completed
    );

    let updates = sink.updates();
    assert_eq!(updates.len(), summary.completed);
    let reported: HashSet<Ipv4Addr> = updates.iter().map(|u| u.address).collect();
    for (addr, status) in summary.table.iter() {
        assert_eq!(reported.contains(&addr), status != ScanStatus::Unscanned, "{addr}");
    }

    assert_eq!(sink.finished().len(), 1);
    assert_eq!(coordinator.phase(), ScanPhase::Cancelled);
    assert_eq!(coordinator.cancel(), Err(ScanError::NotRunning));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_twice_is_harmless() {
    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([]).delay(20, 30)),
        Arc::new(RecordingSink::default()),
    );
    let handle = coordinator
        .start(ScanRequest::new("192.168.1.0/24").workers(2))
        .await
        .unwrap();

    assert_eq!(coordinator.cancel(), Ok(()));
    let second = coordinator.cancel();
    assert!(second == Ok(()) || second == Err(ScanError::NotRunning));

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.phase, ScanPhase::Cancelled);
    assert!(summary.completed <= 2);
}
