//! Progress rendering for parse passes

use std::io::{self, Write};
use trace_log_parser::{ProgressReporter, ProgressSnapshot};

const BAR_WIDTH: usize = 30;

/// Single-line progress bar redrawn on stderr
pub struct ProgressBar {
    drawn: bool,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self { drawn: false }
    }

    /// Clear the bar line once parsing is over
    pub fn finish(&mut self) {
        if self.drawn {
            eprint!("\r{:width$}\r", "", width = BAR_WIDTH + 60);
            let _ = io::stderr().flush();
            self.drawn = false;
        }
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressBar {
    fn report(&mut self, snapshot: &ProgressSnapshot) {
        let percent = snapshot.percent() as usize;
        let filled = percent * BAR_WIDTH / 100;
        eprint!(
            "\r[{}{}] {:>3}% | line {} | blocks kept: {}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            percent,
            snapshot.lines_seen,
            snapshot.blocks_kept
        );
        let _ = io::stderr().flush();
        self.drawn = true;
    }
}

/// Reports progress through the log, for parses running side by side
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressReporter for LogProgress {
    fn report(&mut self, snapshot: &ProgressSnapshot) {
        log::debug!(
            "{}: {}% | line {} | blocks kept: {}",
            self.label,
            snapshot.percent(),
            snapshot.lines_seen,
            snapshot.blocks_kept
        );
    }
}
