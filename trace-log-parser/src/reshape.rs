//! Row reshaping
//!
//! Maps the split lines of an accepted block to zero or more provisional
//! rows. Rows may have different lengths here; the table builder pads them.
//!
//! ## Modes
//! - `raw`: one row per non-empty line
//! - `single-row`: one row per block, led by the identifier pair of its first line
//!   followed by the first line's split fields from position 2 onward
//! - `fixed-merge-6`: blocks of exactly six lines become two rows (0+3, 1+4)
//! - `global-chunk-6`: blocks pass through as raw; the 0+3, 1+4 pairing is then
//!   applied by [`RowReshaper::finalize`] over all rows in windows of six

use crate::config::{ParserConfig, ReshapeMode};
use crate::splitter::ColumnSplitter;
use crate::types::{Block, Field, Row};
use regex::Regex;
use std::sync::OnceLock;

/// Number of lines (or rows) that make up one mergeable record
const MERGE_WINDOW: usize = 6;

/// Offsets paired inside a merge window
const MERGE_PAIRS: [(usize, usize); 2] = [(0, 3), (1, 4)];

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?<first>\S+)\s+(?<second>\S+)")
            .expect("identifier pattern is valid")
    })
}

/// Converts blocks into provisional rows under one reshape mode
#[derive(Debug, Clone)]
pub struct RowReshaper {
    mode: ReshapeMode,
    fold_continuations: bool,
    splitter: ColumnSplitter,
}

impl RowReshaper {
    pub fn new(mode: ReshapeMode, fold_continuations: bool, splitter: ColumnSplitter) -> Self {
        Self {
            mode,
            fold_continuations,
            splitter,
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(
            config.reshape_mode,
            config.fold_continuations,
            ColumnSplitter::new(config.delimiter_mode),
        )
    }

    pub fn mode(&self) -> ReshapeMode {
        self.mode
    }

    /// Reshape one block; `fields_per_line` holds the split of every block line
    pub fn reshape(&self, block: &Block, fields_per_line: &[Vec<Field>]) -> Vec<Row> {
        match self.mode {
            ReshapeMode::Raw | ReshapeMode::GlobalChunk6 => raw_rows(block, fields_per_line),
            ReshapeMode::SingleRow => self.single_row(block, fields_per_line),
            ReshapeMode::FixedMerge6 => {
                let lines: Vec<&Vec<Field>> =
                    fields_per_line.iter().filter(|f| !f.is_empty()).collect();
                if lines.len() == MERGE_WINDOW {
                    merge_window(block.id, &lines)
                } else {
                    raw_rows(block, fields_per_line)
                }
            }
        }
    }

    /// Apply any cross-block pass to the full sequence of provisional rows
    ///
    /// Only `global-chunk-6` does anything here: rows are taken in windows
    /// of six and paired, and a trailing partial window is dropped.
    pub fn finalize(&self, rows: Vec<Row>) -> Vec<Row> {
        if self.mode != ReshapeMode::GlobalChunk6 {
            return rows;
        }

        let dropped = rows.len() % MERGE_WINDOW;
        if dropped > 0 {
            log::debug!("Dropping {} trailing rows outside a full chunk", dropped);
        }

        rows.chunks_exact(MERGE_WINDOW)
            .flat_map(|chunk| {
                MERGE_PAIRS.iter().map(move |&(a, b)| {
                    Row::new(chunk[a].block_id, concat(&chunk[a].fields, &chunk[b].fields))
                })
            })
            .collect()
    }

    fn single_row(&self, block: &Block, fields_per_line: &[Vec<Field>]) -> Vec<Row> {
        let Some(first_line) = block.lines.first() else {
            return Vec::new();
        };

        let Some(caps) = identifier_regex().captures(&first_line.text) else {
            log::debug!(
                "Block {} (line {}) has no identifier pair, skipping",
                block.id,
                first_line.number
            );
            return Vec::new();
        };

        let mut fields = vec![caps["first"].to_string(), caps["second"].to_string()];
        let first_fields = match fields_per_line.first() {
            Some(split) => split.clone(),
            None => self.splitter.split(&first_line.text),
        };
        fields.extend(first_fields.into_iter().skip(2));

        if self.fold_continuations {
            for continuation in fields_per_line.iter().skip(1) {
                fields.extend(continuation.iter().cloned());
            }
        }

        vec![Row::new(block.id, fields)]
    }
}

fn raw_rows(block: &Block, fields_per_line: &[Vec<Field>]) -> Vec<Row> {
    fields_per_line
        .iter()
        .filter(|fields| !fields.is_empty())
        .map(|fields| Row::new(block.id, fields.clone()))
        .collect()
}

fn merge_window(block_id: u64, lines: &[&Vec<Field>]) -> Vec<Row> {
    MERGE_PAIRS
        .iter()
        .map(|&(a, b)| Row::new(block_id, concat(lines[a], lines[b])))
        .collect()
}

fn concat(left: &[Field], right: &[Field]) -> Vec<Field> {
    left.iter().chain(right.iter()).cloned().collect()
}
