//! Reachability through the platform `ping` utility.
//!
//! Sends a single echo request per address by spawning `ping`, which already
//! holds whatever privilege raw ICMP needs on the host system. A zero exit
//! status means the host answered.

use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pingmap_common::error::ScanError;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ProbeClient, ProbeOutcome};

/// Slack given to the child on top of its own wait time before it is killed.
/// Only used to reap the process; a reply counts only within the probe timeout.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SystemPing {
    program: OsString,
}

impl SystemPing {
    pub fn new() -> Self {
        Self {
            program: OsString::from("ping"),
        }
    }

    /// Uses another executable, either a bare name looked up in `PATH` or a path.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves the program to an executable file, through `PATH` for bare names.
    fn locate(&self) -> Result<PathBuf, which::Error> {
        which::which(&self.program)
    }
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbeClient for SystemPing {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn ensure_ready(&self) -> Result<(), ScanError> {
        match self.locate() {
            Ok(path) => {
                debug!("using {}", path.display());
                Ok(())
            }
            Err(e) => Err(ScanError::ProbeSetup(format!(
                "'{}' is not an executable in PATH: {e}",
                self.program.to_string_lossy()
            ))),
        }
    }

    async fn probe(&self, addr: Ipv4Addr, probe_timeout: Duration) -> ProbeOutcome {
        let started = Instant::now();

        let mut command = Command::new(&self.program);
        command
            .args(echo_args(addr, probe_timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let deadline = probe_timeout.saturating_add(PROCESS_GRACE);
        let answered = match tokio::time::timeout(deadline, command.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                warn!("Failed to run ping for {addr}: {e}");
                false
            }
            Err(_elapsed) => false,
        };

        let elapsed = started.elapsed();
        ProbeOutcome {
            reachable: answered && elapsed <= probe_timeout,
            elapsed,
        }
    }
}

#[cfg(windows)]
fn echo_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    let wait_ms = timeout.as_millis().max(1);
    vec!["-n".into(), "1".into(), "-w".into(), wait_ms.to_string(), addr.to_string()]
}

#[cfg(target_os = "macos")]
fn echo_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    let wait_ms = timeout.as_millis().max(1);
    vec!["-c".into(), "1".into(), "-W".into(), wait_ms.to_string(), addr.to_string()]
}

#[cfg(all(not(windows), not(target_os = "macos")))]
fn echo_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    // iputils only takes whole seconds for -W.
    let wait_secs = timeout.as_millis().div_ceil(1_000).max(1);
    vec!["-c".into(), "1".into(), "-W".into(), wait_secs.to_string(), addr.to_string()]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
