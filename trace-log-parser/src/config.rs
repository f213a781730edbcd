//! Parser configuration types
//!
//! This module defines everything the parsing engine needs to know about the
//! input conventions and the desired table shape. Selecting files, rendering
//! and exporting are handled by the application layer.

use crate::types::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for one parse pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Blocks containing this word (case-insensitive, whole word) are dropped.
    /// An empty keyword disables exclusion.
    #[serde(default = "default_exclude_keyword")]
    pub exclude_keyword: String,

    /// How block boundaries are recognized
    #[serde(default)]
    pub boundary_mode: BoundaryMode,

    /// Literal marker used in `marker-substring` mode
    #[serde(default = "default_marker")]
    pub marker: String,

    /// How a block's split lines become rows
    #[serde(default)]
    pub reshape_mode: ReshapeMode,

    /// How a line is split into fields
    #[serde(default)]
    pub delimiter_mode: DelimiterMode,

    /// What happens to lines seen before the first boundary
    #[serde(default)]
    pub preamble_mode: PreambleMode,

    /// In `single-row` mode, append the fields of continuation lines
    #[serde(default)]
    pub fold_continuations: bool,

    /// Column naming scheme of the final table
    #[serde(default)]
    pub column_naming: ColumnNaming,

    /// Prefix for generic column names (`col0`, `col1`, ...)
    #[serde(default = "default_column_prefix")]
    pub column_prefix: String,

    /// Names of the two identifier columns in `identified` naming
    #[serde(default = "default_identifier_names")]
    pub identifier_names: [String; 2],

    /// Report progress every N lines (default: 500)
    #[serde(default = "default_progress_interval")]
    pub progress_interval_lines: usize,
}

fn default_exclude_keyword() -> String {
    "Ping".to_string()
}

fn default_marker() -> String {
    "TimeStamp".to_string()
}

fn default_column_prefix() -> String {
    "col".to_string()
}

fn default_identifier_names() -> [String; 2] {
    ["TimeStamp".to_string(), "Name".to_string()]
}

fn default_progress_interval() -> usize {
    500
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            exclude_keyword: default_exclude_keyword(),
            boundary_mode: BoundaryMode::default(),
            marker: default_marker(),
            reshape_mode: ReshapeMode::default(),
            delimiter_mode: DelimiterMode::default(),
            preamble_mode: PreambleMode::default(),
            fold_continuations: false,
            column_naming: ColumnNaming::default(),
            column_prefix: default_column_prefix(),
            identifier_names: default_identifier_names(),
            progress_interval_lines: default_progress_interval(),
        }
    }
}

/// Boundary recognition convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryMode {
    /// `^<digits>.<digits><optional unit letter><whitespace>` opens a block
    #[default]
    NumericTimestamp,
    /// A line containing the configured marker opens a block
    MarkerSubstring,
}

/// Strategy mapping a block's split lines to rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReshapeMode {
    /// Every non-empty line is its own row
    #[default]
    #[serde(rename = "raw")]
    Raw,
    /// One row per block, keyed by the identifier pair of the first line
    #[serde(rename = "single-row")]
    SingleRow,
    /// Six-line blocks are merged into two rows (0+3, 1+4)
    #[serde(rename = "fixed-merge-6")]
    FixedMerge6,
    /// The 0+3, 1+4 pairing applied over all rows in windows of six
    #[serde(rename = "global-chunk-6")]
    GlobalChunk6,
}

/// Field delimiter convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterMode {
    /// Runs of two or more whitespace characters, or runs of tabs
    #[default]
    DoubleSpaceOrTab,
}

/// Fate of lines appearing before the first boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreambleMode {
    /// Preamble lines are dropped
    #[default]
    Discard,
    /// Preamble lines form block 0
    BlockZero,
}

/// Column naming scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnNaming {
    /// `col0`, `col1`, ...
    #[default]
    Prefix,
    /// Two semantic identifier columns followed by `col0`, `col1`, ...
    Identified,
}

impl ParserConfig {
    /// Create a new parser configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the exclusion keyword (empty disables exclusion)
    pub fn with_exclude_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.exclude_keyword = keyword.into();
        self
    }

    /// Builder method: set the boundary mode
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary_mode = mode;
        self
    }

    /// Builder method: set the literal marker for `marker-substring` mode
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Builder method: set the reshape mode
    pub fn with_reshape_mode(mut self, mode: ReshapeMode) -> Self {
        self.reshape_mode = mode;
        self
    }

    /// Builder method: set the preamble mode
    pub fn with_preamble_mode(mut self, mode: PreambleMode) -> Self {
        self.preamble_mode = mode;
        self
    }

    /// Builder method: fold continuation lines into single-row records
    pub fn with_fold_continuations(mut self, enabled: bool) -> Self {
        self.fold_continuations = enabled;
        self
    }

    /// Builder method: set the column naming scheme
    pub fn with_column_naming(mut self, naming: ColumnNaming) -> Self {
        self.column_naming = naming;
        self
    }

    /// Builder method: set the names of the two identifier columns
    pub fn with_identifier_names(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.identifier_names = [first.into(), second.into()];
        self
    }

    /// Builder method: set the progress interval in lines
    pub fn with_progress_interval(mut self, lines: usize) -> Self {
        self.progress_interval_lines = lines;
        self
    }

    /// Check the configuration for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval_lines == 0 {
            return Err(ParseError::InvalidConfig(
                "progress_interval_lines must be greater than zero".to_string(),
            ));
        }

        if self.boundary_mode == BoundaryMode::MarkerSubstring && self.marker.is_empty() {
            return Err(ParseError::InvalidConfig(
                "marker-substring boundary mode needs a non-empty marker".to_string(),
            ));
        }

        if self.column_prefix.is_empty() {
            return Err(ParseError::InvalidConfig(
                "column_prefix must not be empty".to_string(),
            ));
        }

        if self.column_naming == ColumnNaming::Identified {
            let [first, second] = &self.identifier_names;
            if first.is_empty() || second.is_empty() {
                return Err(ParseError::InvalidConfig(
                    "identifier column names must not be empty".to_string(),
                ));
            }
            if first == second {
                return Err(ParseError::InvalidConfig(format!(
                    "identifier column names must differ, both are {:?}",
                    first
                )));
            }
            for name in &self.identifier_names {
                if self.is_generic_column_name(name) {
                    return Err(ParseError::InvalidConfig(format!(
                        "identifier column name {:?} collides with the {:?} prefix scheme",
                        name, self.column_prefix
                    )));
                }
            }
        }

        Ok(())
    }

    /// True if `name` looks like `<column_prefix><digits>`
    fn is_generic_column_name(&self, name: &str) -> bool {
        name.strip_prefix(self.column_prefix.as_str())
            .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false)
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryMode::NumericTimestamp => write!(f, "numeric-timestamp"),
            BoundaryMode::MarkerSubstring => write!(f, "marker-substring"),
        }
    }
}

impl FromStr for BoundaryMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "numeric-timestamp" => Ok(BoundaryMode::NumericTimestamp),
            "marker-substring" => Ok(BoundaryMode::MarkerSubstring),
            other => Err(ParseError::InvalidConfig(format!(
                "unknown boundary mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ReshapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReshapeMode::Raw => write!(f, "raw"),
            ReshapeMode::SingleRow => write!(f, "single-row"),
            ReshapeMode::FixedMerge6 => write!(f, "fixed-merge-6"),
            ReshapeMode::GlobalChunk6 => write!(f, "global-chunk-6"),
        }
    }
}

impl FromStr for ReshapeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" => Ok(ReshapeMode::Raw),
            "single-row" => Ok(ReshapeMode::SingleRow),
            "fixed-merge-6" => Ok(ReshapeMode::FixedMerge6),
            "global-chunk-6" => Ok(ReshapeMode::GlobalChunk6),
            other => Err(ParseError::InvalidConfig(format!(
                "unknown reshape mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PreambleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreambleMode::Discard => write!(f, "discard"),
            PreambleMode::BlockZero => write!(f, "block-zero"),
        }
    }
}

impl FromStr for PreambleMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "discard" => Ok(PreambleMode::Discard),
            "block-zero" => Ok(PreambleMode::BlockZero),
            other => Err(ParseError::InvalidConfig(format!(
                "unknown preamble mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ColumnNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnNaming::Prefix => write!(f, "prefix"),
            ColumnNaming::Identified => write!(f, "identified"),
        }
    }
}

impl FromStr for ColumnNaming {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prefix" => Ok(ColumnNaming::Prefix),
            "identified" => Ok(ColumnNaming::Identified),
            other => Err(ParseError::InvalidConfig(format!(
                "unknown column naming: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::new();
        assert_eq!(config.exclude_keyword, "Ping");
        assert_eq!(config.boundary_mode, BoundaryMode::NumericTimestamp);
        assert_eq!(config.reshape_mode, ReshapeMode::Raw);
        assert_eq!(config.preamble_mode, PreambleMode::Discard);
        assert_eq!(config.progress_interval_lines, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parser_config_builder() {
        let config = ParserConfig::new()
            .with_exclude_keyword("Heartbeat")
            .with_boundary_mode(BoundaryMode::MarkerSubstring)
            .with_reshape_mode(ReshapeMode::FixedMerge6)
            .with_preamble_mode(PreambleMode::BlockZero)
            .with_column_naming(ColumnNaming::Identified)
            .with_progress_interval(100);

        assert_eq!(config.exclude_keyword, "Heartbeat");
        assert_eq!(config.boundary_mode, BoundaryMode::MarkerSubstring);
        assert_eq!(config.reshape_mode, ReshapeMode::FixedMerge6);
        assert_eq!(config.preamble_mode, PreambleMode::BlockZero);
        assert_eq!(config.progress_interval_lines, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ParserConfig::new().with_progress_interval(0).validate().is_err());

        let config = ParserConfig::new()
            .with_boundary_mode(BoundaryMode::MarkerSubstring)
            .with_marker("");
        assert!(config.validate().is_err());

        let config = ParserConfig::new()
            .with_column_naming(ColumnNaming::Identified)
            .with_identifier_names("Name", "Name");
        assert!(config.validate().is_err());

        let config = ParserConfig::new()
            .with_column_naming(ColumnNaming::Identified)
            .with_identifier_names("col3", "Name");
        assert!(config.validate().is_err());

        // Only relevant for identified naming
        let config = ParserConfig::new().with_identifier_names("col3", "col3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_names_round_trip_through_strings() {
        for mode in [
            ReshapeMode::Raw,
            ReshapeMode::SingleRow,
            ReshapeMode::FixedMerge6,
            ReshapeMode::GlobalChunk6,
        ] {
            assert_eq!(mode.to_string().parse::<ReshapeMode>().unwrap(), mode);
        }
        assert!("fixed-merge-7".parse::<ReshapeMode>().is_err());
        assert_eq!(
            "marker-substring".parse::<BoundaryMode>().unwrap(),
            BoundaryMode::MarkerSubstring
        );
        assert_eq!("block-zero".parse::<PreambleMode>().unwrap(), PreambleMode::BlockZero);
        assert_eq!("identified".parse::<ColumnNaming>().unwrap(), ColumnNaming::Identified);
    }
}
