//! The **abstraction** over reachability checks.
//!
//! A [`ProbeClient`] answers one question: does a host respond at this address
//! within the timeout? Concrete strategies live in submodules:
//!
//! * [`system`]: the platform `ping` utility, one process per address.
//! * [`tcp`]: an unprivileged TCP handshake.
//!
//! High-level modules depend on the trait only.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use pingmap_common::error::ScanError;

pub mod system;
pub mod tcp;

pub use system::SystemPing;
pub use tcp::TcpProbe;

/// Normalized result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub reachable: bool,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    pub fn reachable(elapsed: Duration) -> Self {
        Self {
            reachable: true,
            elapsed,
        }
    }

    pub fn unreachable(elapsed: Duration) -> Self {
        Self {
            reachable: false,
            elapsed,
        }
    }
}

#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Verifies the probing capability can be used at all.
    ///
    /// Called once before any address is dispatched.
    async fn ensure_ready(&self) -> Result<(), ScanError> {
        Ok(())
    }

    /// Checks a single address.
    ///
    /// A silent or refusing host is not an error: it yields an unreachable
    /// outcome. Implementations hold no shared mutable state so calls against
    /// different addresses can run concurrently.
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> ProbeOutcome;
}
