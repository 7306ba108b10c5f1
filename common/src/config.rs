use std::time::Duration;

/// Default number of concurrent probes.
pub const DEFAULT_WORKERS: usize = 50;

/// Upper bound accepted on the command line; one worker per matrix cell.
pub const MAX_WORKERS: usize = 256;

/// Default per-probe timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

/// Port used by the TCP handshake probe.
pub const DEFAULT_TCP_PORT: u16 = 443;

pub fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}

/// Presentation settings of the command line front end.
///
/// Scan parameters (workers, timeout) are passed explicitly on every sweep
/// and never live here.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub no_banner: bool,
    /// Skips rendering the occupancy matrix after the sweep.
    pub no_matrix: bool,
    /// Disables the `q` / Ctrl-C key listener.
    pub disable_input: bool,
    /// 0 prints everything, 1 drops decorations, 2 prints results only.
    pub quiet: u8,
}
