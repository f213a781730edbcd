//! Core types for the trace log parser
//!
//! This module defines the values that flow through the parsing pipeline:
//! lines read from the input, the blocks they are grouped into, and the
//! provisional rows handed to the table builder.

use serde::Serialize;
use std::path::PathBuf;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// A single field produced by splitting one line
pub type Field = String;

/// Identifier of a block within one parse pass (0 is reserved for the preamble)
pub type BlockId = u64;

/// One physical line of the input
///
/// Lines are immutable once read. The byte offset is the cumulative number of
/// raw bytes consumed before this line, so it stays meaningful even when the
/// line contained malformed UTF-8 that was replaced during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// 1-based line number
    pub number: usize,
    /// Byte offset of the first byte of this line
    pub byte_offset: u64,
    /// Line text without the trailing line terminator
    pub text: String,
}

impl LogLine {
    pub fn new(number: usize, byte_offset: u64, text: impl Into<String>) -> Self {
        Self {
            number,
            byte_offset,
            text: text.into(),
        }
    }
}

/// A closed run of lines that logically belong to one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block identifier, dense from 1 for boundary-opened blocks
    pub id: BlockId,
    /// Lines in input order; the first one is the boundary line unless this
    /// is the preamble block
    pub lines: Vec<LogLine>,
}

impl Block {
    /// Join all lines of the block, newline-separated, in line order
    pub fn joined_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True if the block holds no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines in the block
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Line number of the first line, if any
    pub fn first_line_number(&self) -> Option<usize> {
        self.lines.first().map(|line| line.number)
    }
}

/// A provisional row produced by the reshaper
///
/// The length of `fields` may differ between rows until the table builder
/// normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Block the row was derived from
    pub block_id: BlockId,
    /// Field values in column order
    pub fields: Vec<Field>,
}

impl Row {
    pub fn new(block_id: BlockId, fields: Vec<Field>) -> Self {
        Self { block_id, fields }
    }

    /// True if every field is an empty string (or there are no fields)
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|field| field.is_empty())
    }
}

/// Errors that can occur while parsing or operating on a table
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Input file not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse cancelled after {lines_seen} lines")]
    Cancelled { lines_seen: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column selected more than once: {0}")]
    DuplicateColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_joined_text() {
        let block = Block {
            id: 1,
            lines: vec![
                LogLine::new(1, 0, "0.001s DeviceA  ACK"),
                LogLine::new(2, 20, "  extra info"),
            ],
        };
        assert_eq!(block.joined_text(), "0.001s DeviceA  ACK\n  extra info");
        assert_eq!(block.len(), 2);
        assert_eq!(block.first_line_number(), Some(1));
    }

    #[test]
    fn test_row_is_blank() {
        assert!(Row::new(1, vec![]).is_blank());
        assert!(Row::new(1, vec![String::new(), String::new()]).is_blank());
        assert!(!Row::new(1, vec![String::new(), "x".to_string()]).is_blank());
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::Cancelled { lines_seen: 42 };
        assert_eq!(err.to_string(), "Parse cancelled after 42 lines");
    }
}
