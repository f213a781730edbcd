//! Progress reporting and cancellation
//!
//! Both are side channels of a parse pass: the parser hands a snapshot to a
//! [`ProgressReporter`] every `progress_interval_lines` lines and checks a
//! [`CancelFlag`] between line reads.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Point-in-time view of a running parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Raw bytes consumed so far
    pub bytes_read: u64,
    /// Size of the input, 0 if unknown
    pub total_bytes: u64,
    /// Lines read so far
    pub lines_seen: usize,
    /// Blocks that passed the exclusion filter so far
    pub blocks_kept: usize,
}

impl ProgressSnapshot {
    /// Fraction of the input consumed, in `0.0..=1.0`; 0 when the size is unknown
    pub fn ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.bytes_read as f64 / self.total_bytes as f64).min(1.0)
    }

    /// Whole percent consumed, capped at 100
    pub fn percent(&self) -> u8 {
        (self.ratio() * 100.0) as u8
    }
}

/// Receives periodic progress updates
pub trait ProgressReporter {
    fn report(&mut self, snapshot: &ProgressSnapshot);
}

/// Reporter that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _snapshot: &ProgressSnapshot) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(&ProgressSnapshot),
{
    fn report(&mut self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// Shared flag that asks a running parse to stop
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
