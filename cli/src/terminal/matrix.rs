//! Terminal occupancy matrix.
//!
//! A 16 x 16 grid where cell `row * 16 + col` is the address with that last
//! octet. Updates are indexed by address, never by arrival order, so the grid
//! is correct whatever order the workers finish in.
//!
//! With a live view attached, the grid is redrawn as the multi-line message of
//! a progress bar after every update, then printed once more when the sweep
//! ends.

use std::net::Ipv4Addr;
use std::sync::{Mutex, PoisonError};

use colored::*;
use indicatif::ProgressStyle;
use pingmap_common::status::ScanStatus;
use pingmap_core::sink::{ResultSink, ScanSummary, StatusUpdate};
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::{colors, print};

const SIDE: usize = 16;
const CELL_WIDTH: usize = 3;
const LABEL_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// First three octets shared by every address of the sweep.
    prefix: Option<[u8; 3]>,
    cells: [Option<ScanStatus>; SIDE * SIDE],
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            prefix: None,
            cells: [None; SIDE * SIDE],
        }
    }
}

impl Grid {
    pub fn set(&mut self, addr: Ipv4Addr, status: ScanStatus) {
        let [a, b, c, last] = addr.octets();
        self.prefix.get_or_insert([a, b, c]);
        self.cells[usize::from(last)] = Some(status);
    }

    pub fn get(&self, last_octet: u8) -> Option<ScanStatus> {
        self.cells[usize::from(last_octet)]
    }

    /// Rows of the rendered matrix, with ANSI colors.
    pub fn render(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::with_capacity(SIDE + 3);

        if let Some([a, b, c]) = self.prefix {
            lines.push(format!("{a}.{b}.{c}.x").color(colors::IPV4_ADDR).to_string());
        }

        let columns: String = (0..SIDE).map(|col| format!("{col:>CELL_WIDTH$}")).collect();
        lines.push(format!("{}{}", " ".repeat(LABEL_WIDTH), columns.color(colors::SEPARATOR)));

        for row in 0..SIDE {
            let label: String = format!("{:>LABEL_WIDTH$}", row * SIDE);
            let cells: String = (0..SIDE)
                .map(|col| cell(self.cells[row * SIDE + col]).to_string())
                .collect();
            lines.push(format!("{}{}", label.color(colors::SEPARATOR), cells));
        }

        lines.push(legend());
        lines
    }
}

fn glyph(status: Option<ScanStatus>) -> &'static str {
    match status {
        None => " ",
        Some(ScanStatus::Unscanned) => "·",
        Some(ScanStatus::Active) => "■",
        Some(ScanStatus::Free) => "□",
    }
}

fn cell(status: Option<ScanStatus>) -> ColoredString {
    let text = format!("{:>CELL_WIDTH$}", glyph(status));
    match status {
        None => text.normal(),
        Some(ScanStatus::Unscanned) => text.color(colors::UNSCANNED),
        Some(ScanStatus::Active) => text.color(colors::ACTIVE).bold(),
        Some(ScanStatus::Free) => text.color(colors::FREE),
    }
}

fn legend() -> String {
    [ScanStatus::Unscanned, ScanStatus::Active, ScanStatus::Free]
        .into_iter()
        .map(|status| format!("{} {}", cell(Some(status)), status.to_string().color(colors::TEXT_DEFAULT)))
        .collect::<Vec<String>>()
        .join("   ")
}

/// Keeps a grid in sync with the sweep and prints it when the sweep ends.
pub struct MatrixSink {
    grid: Mutex<Grid>,
    live: Option<Span>,
    quiet: u8,
}

impl MatrixSink {
    pub fn new(quiet: u8) -> Self {
        Self {
            grid: Mutex::new(Grid::default()),
            live: None,
            quiet,
        }
    }

    /// Redraws the grid on `span`'s progress bar after every update.
    pub fn with_live_view(mut self, span: Span) -> Self {
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            span.pb_set_style(&style);
        }
        span.pb_set_message(&Grid::default().render().join("\n"));
        self.live = Some(span);
        self
    }

    pub fn snapshot(&self) -> Grid {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ResultSink for MatrixSink {
    fn on_status_changed(&self, update: &StatusUpdate) {
        let frame = {
            let mut grid = self.grid.lock().unwrap_or_else(PoisonError::into_inner);
            grid.set(update.address, update.status);
            self.live.as_ref().map(|_| grid.render().join("\n"))
        };

        if let (Some(span), Some(frame)) = (&self.live, frame) {
            span.pb_set_message(&frame);
        }
    }

    fn on_finished(&self, summary: &ScanSummary) {
        let lines = {
            let mut grid = self.grid.lock().unwrap_or_else(PoisonError::into_inner);
            for (addr, status) in summary.table.iter() {
                grid.set(addr, status);
            }
            grid.render()
        };

        if self.quiet > 1 {
            return;
        }
        print::header("occupancy matrix", self.quiet);
        for line in lines {
            print::print(&line);
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
