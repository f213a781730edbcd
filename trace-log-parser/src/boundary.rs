//! Block boundary detection
//!
//! Decides, from the text of a single line, whether that line opens a new
//! block. Detection never looks at what has been buffered so far.

use crate::config::{BoundaryMode, ParserConfig};
use regex::Regex;
use std::sync::OnceLock;

/// Leading numeric timestamp: digits, '.', digits, optional unit letter, whitespace
const TIMESTAMP_PATTERN: &str = r"^\d+\.\d+[A-Za-z]?\s+";

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("timestamp pattern is valid"))
}

/// Boundary predicate for one parse configuration
#[derive(Debug, Clone)]
pub enum BoundaryDetector {
    /// Leading numeric timestamp with optional unit suffix
    NumericTimestamp,
    /// Literal marker anywhere in the line
    Marker(String),
}

impl BoundaryDetector {
    /// Build the detector selected by the configuration
    pub fn from_config(config: &ParserConfig) -> Self {
        match config.boundary_mode {
            BoundaryMode::NumericTimestamp => BoundaryDetector::NumericTimestamp,
            BoundaryMode::MarkerSubstring => BoundaryDetector::Marker(config.marker.clone()),
        }
    }

    /// True if `line` opens a new block
    pub fn is_boundary(&self, line: &str) -> bool {
        match self {
            BoundaryDetector::NumericTimestamp => timestamp_regex().is_match(line),
            BoundaryDetector::Marker(marker) => line.contains(marker.as_str()),
        }
    }
}
