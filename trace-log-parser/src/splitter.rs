//! Line tokenization into fields

use crate::config::DelimiterMode;
use crate::types::Field;
use regex::Regex;
use std::sync::OnceLock;

fn double_space_or_tab() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}|\t+").expect("delimiter pattern is valid"))
}

/// Splits a single line into fields
#[derive(Debug, Clone, Copy)]
pub struct ColumnSplitter {
    mode: DelimiterMode,
}

impl ColumnSplitter {
    pub fn new(mode: DelimiterMode) -> Self {
        Self { mode }
    }

    /// Trim the line and split it; blank lines yield no fields
    pub fn split(&self, line: &str) -> Vec<Field> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let delimiter = match self.mode {
            DelimiterMode::DoubleSpaceOrTab => double_space_or_tab(),
        };

        delimiter
            .split(trimmed)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for ColumnSplitter {
    fn default() -> Self {
        Self::new(DelimiterMode::default())
    }
}
