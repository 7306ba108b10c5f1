use std::sync::Arc;
use std::time::Duration;

use pingmap_common::status::ScanStatus;
use pingmap_core::coordinator::{ScanCoordinator, ScanRequest};
use pingmap_core::probe::TcpProbe;
use pingmap_core::sink::NullSink;
use tokio::net::TcpListener;

#[tokio::test]
async fn tcp_sweep_of_loopback_finds_listener() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let coordinator = ScanCoordinator::new(Arc::new(TcpProbe::new(port)), Arc::new(NullSink));
    let summary = coordinator
        .start(ScanRequest::new("127.0.0.1/32").timeout(Duration::from_millis(500)))
        .await?
        .wait()
        .await?;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.table.count(ScanStatus::Active), 1);
    Ok(())
}
