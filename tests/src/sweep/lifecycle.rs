use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pingmap_common::error::ScanError;
use pingmap_common::status::ScanStatus;
use pingmap_core::coordinator::{ScanCoordinator, ScanPhase, ScanProgress, ScanRequest};
use pingmap_core::sink::NullSink;

use super::support::{RecordingSink, SimulatedProbe, lan};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn full_subnet_marks_only_answering_hosts() {
    let sink = Arc::new(RecordingSink::default());
    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([lan(1), lan(254)])),
        sink.clone(),
    );

    let handle = coordinator
        .start(ScanRequest::new("192.168.1.0/24").workers(50))
        .await
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.phase, ScanPhase::Completed);
    assert_eq!(summary.table.count(ScanStatus::Active), 2);
    assert_eq!(summary.table.count(ScanStatus::Free), 254);
    assert_eq!(summary.table.count(ScanStatus::Unscanned), 0);
    assert_eq!(summary.report(), "192.168.1.1\n192.168.1.254\n");

    let updates = sink.updates();
    assert_eq!(updates.len(), 256);
    let distinct: HashSet<_> = updates.iter().map(|u| u.address).collect();
    assert_eq!(distinct.len(), 256);
    assert!(updates.windows(2).all(|w| w[0].completed + 1 == w[1].completed));
    assert_eq!(updates.last().map(|u| u.completed), Some(256));

    let finished = sink.finished();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0], summary);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_count_does_not_change_the_table() {
    let up = [lan(3), lan(64), lan(65), lan(200)];
    let mut tables = Vec::new();

    for workers in [1, 200] {
        let coordinator = ScanCoordinator::new(
            Arc::new(SimulatedProbe::new(up).delay(0, 1)),
            Arc::new(NullSink),
        );
        let summary = coordinator
            .start(ScanRequest::new("192.168.1.0/24").workers(workers))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        tables.push(summary.table);
    }

    assert_eq!(tables[0], tables[1]);
    assert_eq!(tables[0].active(), up.to_vec());
}

#[tokio::test]
async fn progress_reads_do_not_change_state() {
    let coordinator = ScanCoordinator::new(Arc::new(SimulatedProbe::new([lan(5)])), Arc::new(NullSink));
    assert_eq!(coordinator.progress(), ScanProgress::default());
    assert_eq!(coordinator.progress(), coordinator.progress());

    coordinator
        .start(ScanRequest::new("192.168.1.0/28"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let first = coordinator.progress();
    let second = coordinator.progress();
    assert_eq!(first, second);
    assert_eq!(first.phase, ScanPhase::Completed);
    assert_eq!(first.completed, first.total);
    assert_eq!(first.table.scanned(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn second_start_is_rejected_while_running() {
    let sink = Arc::new(RecordingSink::default());
    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([lan(10)]).delay(5, 15)),
        sink.clone(),
    );

    let first = coordinator
        .start(ScanRequest::new("192.168.1.0/24").workers(8))
        .await
        .unwrap();
    let first_id = first.job_id();

    let second = coordinator.start(ScanRequest::new("192.168.1.0/28")).await;
    assert_eq!(second.unwrap_err(), ScanError::AlreadyRunning);
    assert_eq!(coordinator.progress().job_id, first_id);
    assert_eq!(coordinator.progress().total, 256);

    let summary = first.wait().await.unwrap();
    assert_eq!(summary.job_id, first_id);
    assert_eq!(summary.phase, ScanPhase::Completed);
    assert_eq!(sink.finished().len(), 1);

    // Finished jobs do not block the next one.
    let third = coordinator.start(ScanRequest::new("192.168.1.0/30")).await.unwrap();
    assert_ne!(third.job_id(), first_id);
    assert_eq!(third.wait().await.unwrap().total, 4);
}

#[tokio::test]
async fn completed_sweep_has_no_unscanned_addresses() {
    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([lan(1), lan(2), lan(3)])),
        Arc::new(NullSink),
    );
    let summary = coordinator
        .start(ScanRequest::new("192.168.1.0/27").workers(4))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.completed, summary.total);
    assert_eq!(summary.total, 32);
    assert_eq!(summary.table.count(ScanStatus::Unscanned), 0);
    assert_eq!(
        summary.table.count(ScanStatus::Active) + summary.table.count(ScanStatus::Free),
        summary.total
    );
    assert_eq!(coordinator.phase(), ScanPhase::Completed);
    assert!(coordinator.phase().is_finished());
}

#[tokio::test]
async fn rejected_request_leaves_state_untouched() {
    let coordinator = ScanCoordinator::new(Arc::new(SimulatedProbe::new([])), Arc::new(NullSink));

    let wide = coordinator.start(ScanRequest::new("10.0.0.0/16")).await;
    assert!(matches!(wide, Err(ScanError::InvalidCidr { .. })));

    let zero = coordinator.start(ScanRequest::new("10.0.0.0/24").workers(0)).await;
    assert_eq!(zero.unwrap_err(), ScanError::InvalidWorkerCount);

    assert_eq!(coordinator.phase(), ScanPhase::Idle);
    assert_eq!(coordinator.progress(), ScanProgress::default());
    assert_eq!(coordinator.cancel(), Err(ScanError::NotRunning));
}

#[tokio::test]
async fn hosts_only_skips_network_and_broadcast() {
    use pingmap_common::network::subnet::AddressPolicy;

    let coordinator = ScanCoordinator::new(
        Arc::new(SimulatedProbe::new([lan(0), lan(255), lan(7)])),
        Arc::new(NullSink),
    );
    let summary = coordinator
        .start(
            ScanRequest::new("192.168.1.0/24")
                .workers(64)
                .timeout(Duration::from_millis(100))
                .policy(AddressPolicy::HostsOnly),
        )
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.total, 254);
    assert_eq!(summary.active(), vec![lan(7)]);
    assert_eq!(summary.table.get(lan(0)), None);
}
