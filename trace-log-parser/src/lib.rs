//! Trace Log Parser Library
//!
//! A single-pass engine that turns free-form hardware/bus trace logs into a
//! uniformly shaped table. Records in these logs often span several physical
//! lines, so lines are first reassembled into blocks.
//!
//! # Architecture
//!
//! Each line flows through the same pipeline:
//! - Boundary detection decides whether the line opens a new block
//! - The block buffer groups lines until the next boundary or end of input
//! - The exclusion filter drops blocks mentioning a keyword (default `Ping`)
//! - The column splitter cuts each line on runs of two spaces or tabs
//! - The row reshaper turns a block into rows (raw, single-row, merged)
//! - The table builder pads rows to one width and names the columns
//!
//! The library does NOT:
//! - Render tables or progress bars
//! - Execute ad-hoc queries
//! - Choose files or decide how results are exported
//!
//! Those are handled by the application layer (trace-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use trace_log_parser::{CancelFlag, LogParser, ParserConfig, ProgressSnapshot, ReshapeMode};
//! use std::path::Path;
//!
//! let config = ParserConfig::new()
//!     .with_exclude_keyword("Ping")
//!     .with_reshape_mode(ReshapeMode::Raw);
//! let parser = LogParser::new(config).unwrap();
//!
//! let mut progress = |s: &ProgressSnapshot| println!("{}% ({} lines)", s.percent(), s.lines_seen);
//! let outcome = parser
//!     .parse_file(Path::new("trace.txt"), &mut progress, &CancelFlag::new())
//!     .unwrap();
//!
//! let acks = outcome.table.filter_rows("ACK");
//! print!("{}", acks.to_csv_string().unwrap());
//! ```

// Public modules
pub mod block;
pub mod boundary;
pub mod cache;
pub mod config;
pub mod filter;
pub mod parser;
pub mod progress;
pub mod reader;
pub mod reshape;
pub mod splitter;
pub mod table;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheStats, FileFingerprint, ParseCache};
pub use config::{BoundaryMode, ColumnNaming, DelimiterMode, ParserConfig, PreambleMode, ReshapeMode};
pub use parser::{LogParser, ParseOutcome, ParseStats};
pub use progress::{CancelFlag, NoProgress, ProgressReporter, ProgressSnapshot};
pub use table::{Table, TableBuilder, TableRow};
pub use types::{Block, BlockId, Field, LogLine, ParseError, Result, Row};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
