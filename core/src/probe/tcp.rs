//! Unprivileged reachability check through a TCP handshake.
//!
//! A host that completes the handshake or actively refuses it is alive;
//! anything else within the timeout counts as silence.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pingmap_common::config::DEFAULT_TCP_PORT;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use super::{ProbeClient, ProbeOutcome};

#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    port: u16,
}

impl TcpProbe {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_TCP_PORT)
    }
}

#[async_trait]
impl ProbeClient for TcpProbe {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn probe(&self, addr: Ipv4Addr, probe_timeout: Duration) -> ProbeOutcome {
        let socket_addr = SocketAddr::new(addr.into(), self.port);
        let started = Instant::now();

        let reachable = match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => true,
            Ok(Err(e)) => {
                trace!("{socket_addr}: {e}");
                false
            }
            Err(_elapsed) => false,
        };

        ProbeOutcome {
            reachable,
            elapsed: started.elapsed(),
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
