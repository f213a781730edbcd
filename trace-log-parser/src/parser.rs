//! Main parser API
//!
//! [`LogParser`] wires the pipeline together: lines are read one at a time,
//! grouped into blocks, filtered, split, reshaped and finally normalized
//! into a [`Table`]. A parse pass is single-threaded and owns its block
//! buffer; running several files at once means running several passes.

use crate::block::BlockBuffer;
use crate::boundary::BoundaryDetector;
use crate::config::{BoundaryMode, ParserConfig, ReshapeMode};
use crate::filter::ExclusionFilter;
use crate::progress::{CancelFlag, ProgressReporter, ProgressSnapshot};
use crate::reader::LineReader;
use crate::reshape::RowReshaper;
use crate::splitter::ColumnSplitter;
use crate::table::{Table, TableBuilder};
use crate::types::{Block, Field, ParseError, Result, Row};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;

/// Counters collected during one parse pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Lines read
    pub lines_seen: usize,
    /// Raw bytes read
    pub bytes_read: u64,
    /// Input size, 0 if unknown
    pub total_bytes: u64,
    /// Closed blocks handed to the exclusion filter
    pub blocks_seen: usize,
    /// Blocks that passed the exclusion filter
    pub blocks_kept: usize,
    /// Blocks rejected by the exclusion filter
    pub blocks_excluded: usize,
    /// Kept blocks that had content but no identifier pair (single-row mode)
    pub blocks_unidentified: usize,
    /// Lines dropped before the first boundary
    pub preamble_lines_discarded: usize,
    /// Provisional rows handed to the table builder
    pub rows_produced: usize,
    /// Lines that contained malformed UTF-8
    pub decode_faults: usize,
    /// Marker mode only: whether the first line carries the marker
    pub header_conforming: Option<bool>,
}

impl ParseStats {
    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            bytes_read: self.bytes_read,
            total_bytes: self.total_bytes,
            lines_seen: self.lines_seen,
            blocks_kept: self.blocks_kept,
        }
    }
}

/// Result of a completed parse pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub table: Table,
    pub stats: ParseStats,
}

/// The parsing engine for one configuration
#[derive(Debug, Clone)]
pub struct LogParser {
    config: ParserConfig,
    detector: BoundaryDetector,
    filter: ExclusionFilter,
    splitter: ColumnSplitter,
    reshaper: RowReshaper,
}

impl LogParser {
    /// Create a parser, validating the configuration
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            detector: BoundaryDetector::from_config(&config),
            filter: ExclusionFilter::new(&config.exclude_keyword)?,
            splitter: ColumnSplitter::new(config.delimiter_mode),
            reshaper: RowReshaper::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a text file into a table
    ///
    /// A missing file is an error and produces no table. The file handle is
    /// held only for the duration of this call.
    ///
    /// # Example
    /// ```no_run
    /// use trace_log_parser::{CancelFlag, LogParser, NoProgress, ParserConfig};
    /// use std::path::Path;
    ///
    /// let parser = LogParser::new(ParserConfig::new()).unwrap();
    /// let outcome = parser
    ///     .parse_file(Path::new("trace.txt"), &mut NoProgress, &CancelFlag::new())
    ///     .unwrap();
    /// println!("{} rows", outcome.table.len());
    /// ```
    pub fn parse_file(
        &self,
        path: &Path,
        progress: &mut dyn ProgressReporter,
        cancel: &CancelFlag,
    ) -> Result<ParseOutcome> {
        let (reader, total_bytes) = LineReader::open(path)?;
        log::info!("Parsing {:?} ({} bytes)", path, total_bytes);
        self.run(reader, total_bytes, progress, cancel)
    }

    /// Parse any buffered reader; `total_bytes` may be 0 when unknown
    pub fn parse_reader<R: BufRead>(
        &self,
        reader: R,
        total_bytes: u64,
        progress: &mut dyn ProgressReporter,
        cancel: &CancelFlag,
    ) -> Result<ParseOutcome> {
        self.run(LineReader::new(reader), total_bytes, progress, cancel)
    }

    fn run<R: BufRead>(
        &self,
        mut lines: LineReader<R>,
        total_bytes: u64,
        progress: &mut dyn ProgressReporter,
        cancel: &CancelFlag,
    ) -> Result<ParseOutcome> {
        let mut stats = ParseStats {
            total_bytes,
            ..ParseStats::default()
        };
        let mut buffer = BlockBuffer::new(self.detector.clone(), self.config.preamble_mode);
        let mut rows: Vec<Row> = Vec::new();
        let interval = self.config.progress_interval_lines;

        loop {
            if cancel.is_cancelled() {
                log::info!("Parse cancelled after {} lines", stats.lines_seen);
                return Err(ParseError::Cancelled {
                    lines_seen: stats.lines_seen,
                });
            }

            let Some(line) = lines.next().transpose()? else {
                break;
            };

            stats.lines_seen += 1;
            stats.bytes_read = lines.bytes_read();

            if stats.lines_seen == 1 && self.config.boundary_mode == BoundaryMode::MarkerSubstring {
                stats.header_conforming = Some(line.text.contains(self.config.marker.as_str()));
            }

            if let Some(block) = buffer.push(line) {
                self.process_block(block, &mut stats, &mut rows);
            }

            if stats.lines_seen % interval == 0 {
                progress.report(&stats.snapshot());
            }
        }

        if let Some(block) = buffer.finish() {
            self.process_block(block, &mut stats, &mut rows);
        }

        stats.preamble_lines_discarded = buffer.discarded_preamble_lines();
        stats.decode_faults = lines.decode_faults();
        progress.report(&stats.snapshot());

        let rows = self.reshaper.finalize(rows);
        stats.rows_produced = rows.len();

        let mut builder = TableBuilder::from_config(&self.config);
        for row in rows {
            builder.push(row);
        }
        let table = builder.finish();

        log::info!(
            "Parsed {} lines: {} blocks kept, {} excluded, {} table rows",
            stats.lines_seen,
            stats.blocks_kept,
            stats.blocks_excluded,
            table.len()
        );

        Ok(ParseOutcome { table, stats })
    }

    fn process_block(&self, block: Block, stats: &mut ParseStats, rows: &mut Vec<Row>) {
        stats.blocks_seen += 1;

        if !self.filter.accept(&block) {
            log::debug!(
                "Excluding block {} starting at line {:?}",
                block.id,
                block.first_line_number()
            );
            stats.blocks_excluded += 1;
            return;
        }
        stats.blocks_kept += 1;

        let fields_per_line: Vec<Vec<Field>> = block
            .lines
            .iter()
            .map(|line| self.splitter.split(&line.text))
            .collect();

        let produced = self.reshaper.reshape(&block, &fields_per_line);
        if produced.is_empty()
            && self.reshaper.mode() == ReshapeMode::SingleRow
            && fields_per_line.iter().any(|fields| !fields.is_empty())
        {
            stats.blocks_unidentified += 1;
        }

        rows.extend(produced);
    }
}
