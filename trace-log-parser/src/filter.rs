//! Keyword-based block exclusion

use crate::types::{Block, ParseError, Result};
use regex::{Regex, RegexBuilder};

/// Rejects whole blocks that mention a keyword as a whole word, ignoring case
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    pattern: Option<Regex>,
}

impl ExclusionFilter {
    /// Build a filter for `keyword`; an empty keyword accepts every block
    pub fn new(keyword: &str) -> Result<Self> {
        if keyword.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword)))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                ParseError::InvalidConfig(format!("bad exclude keyword {:?}: {}", keyword, e))
            })?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Returns false when the block must be dropped
    pub fn accept(&self, block: &Block) -> bool {
        match &self.pattern {
            Some(pattern) => !pattern.is_match(&block.joined_text()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLine;

    fn block(texts: &[&str]) -> Block {
        Block {
            id: 1,
            lines: texts
                .iter()
                .enumerate()
                .map(|(i, t)| LogLine::new(i + 1, 0, *t))
                .collect(),
        }
    }

    #[test]
    fn test_rejects_whole_word_any_case() {
        let filter = ExclusionFilter::new("Ping").unwrap();

        assert!(!filter.accept(&block(&["0.005s DeviceB  Ping 0x20"])));
        assert!(!filter.accept(&block(&["0.005s DeviceB  PING"])));
        assert!(!filter.accept(&block(&["0.005s DeviceB", "  reply to ping"])));
        assert!(!filter.accept(&block(&["(ping)"])));
    }

    #[test]
    fn test_accepts_partial_word_matches() {
        let filter = ExclusionFilter::new("Ping").unwrap();

        assert!(filter.accept(&block(&["0.001s DeviceA  Pinging"])));
        assert!(filter.accept(&block(&["0.001s DeviceA  Mapping"])));
        assert!(filter.accept(&block(&["0.001s DeviceA  Ping_1"])));
        assert!(filter.accept(&block(&["0.001s DeviceA  ACK"])));
    }

    #[test]
    fn test_keyword_is_matched_literally() {
        let filter = ExclusionFilter::new("a.b").unwrap();
        assert!(!filter.accept(&block(&["x a.b y"])));
        assert!(filter.accept(&block(&["x axb y"])));
    }

    #[test]
    fn test_empty_keyword_accepts_everything() {
        let filter = ExclusionFilter::new("").unwrap();
        assert!(filter.accept(&block(&["Ping"])));
        assert!(filter.accept(&block(&[])));
    }
}
