//! Plain-text report of the active addresses, one per line, ascending.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use pingmap_core::sink::{ResultSink, ScanSummary, StatusUpdate};
use tracing::{error, warn};

/// Writes through a temporary file renamed into place, so readers never see
/// a half-written report. The temporary file is removed on failure.
pub fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let result = fill_and_move(file, &tmp, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn fill_and_move(file: File, tmp: &Path, path: &Path, contents: &str) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes())?;
    writer.flush()?;
    drop(writer);

    fs::rename(tmp, path).with_context(|| format!("moving report to {}", path.display()))?;
    Ok(())
}

/// Stores the final list of active addresses once the sweep ends.
pub struct ReportWriter {
    path: PathBuf,
    failure: Mutex<Option<String>>,
}

impl ReportWriter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            failure: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports whether the file was written.
    pub fn result(&self) -> anyhow::Result<()> {
        match self.failure.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(reason) => anyhow::bail!("failed to write {}: {reason}", self.path.display()),
            None => Ok(()),
        }
    }
}

impl ResultSink for ReportWriter {
    fn on_status_changed(&self, _update: &StatusUpdate) {}

    fn on_finished(&self, summary: &ScanSummary) {
        if summary.is_cancelled() {
            warn!(
                "Sweep was cancelled, {} only lists hosts found before that",
                self.path.display()
            );
        }

        if let Err(e) = write_atomic(&self.path, &summary.report()) {
            error!("{e:#}");
            *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(format!("{e:#}"));
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
