use thiserror::Error;

/// Errors surfaced by the sweep engine.
///
/// Only setup problems are errors. An address that never answers is a
/// normal outcome and ends up as [`crate::status::ScanStatus::Free`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Malformed or unsupported CIDR block.
    #[error("invalid CIDR '{input}': {reason}")]
    InvalidCidr { input: String, reason: String },

    /// The probing capability could not be initialized.
    #[error("probe setup failed: {0}")]
    ProbeSetup(String),

    /// A sweep is already running; cancel it or wait for it first.
    #[error("a sweep is already running")]
    AlreadyRunning,

    #[error("no sweep is running")]
    NotRunning,

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    /// The sweep ended without delivering its summary.
    #[error("sweep aborted: {0}")]
    Aborted(String),
}

impl ScanError {
    pub fn invalid_cidr(input: &str, reason: impl Into<String>) -> Self {
        ScanError::InvalidCidr {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
