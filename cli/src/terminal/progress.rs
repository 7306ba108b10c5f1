use colored::*;
use indicatif::ProgressStyle;
use pingmap_common::status::ScanStatus;
use pingmap_core::sink::{ResultSink, ScanSummary, StatusUpdate};
use tracing::{Span, info};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TEMPLATE: &str = "{spinner:.blue} [{bar:32.green/bright_black}] {pos}/{len} {msg}";

/// Drives the progress bar attached to the sweep span and logs hosts as
/// they come up.
pub struct ProgressSink {
    span: Span,
}

impl ProgressSink {
    pub fn new(span: Span) -> Self {
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            span.pb_set_style(&style.progress_chars("█▆ ").tick_strings(&[
                "▁▁▁▁▁",
                "▁▂▂▂▁",
                "▁▄▂▄▁",
                "▂▄▆▄▂",
                "▄▆█▆▄",
                "▂▄▆▄▂",
                "▁▄▂▄▁",
                "▁▂▂▂▁",
            ]));
        }
        span.pb_set_message("probing...");
        Self { span }
    }
}

impl ResultSink for ProgressSink {
    fn on_status_changed(&self, update: &StatusUpdate) {
        self.span.pb_set_length(update.total as u64);
        self.span.pb_set_position(update.completed as u64);

        if update.status == ScanStatus::Active {
            let addr: ColoredString = update.address.to_string().color(colors::IPV4_ADDR);
            info!("{addr} is up ({}ms)", update.elapsed.as_millis());
        }
    }

    fn on_finished(&self, summary: &ScanSummary) {
        let label = if summary.is_cancelled() { "cancelled" } else { "done" };
        self.span.pb_set_message(label);
    }
}
