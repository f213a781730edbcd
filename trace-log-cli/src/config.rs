//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trace_log_parser::ParserConfig;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Single-file destination (stdout when absent)
    pub file: Option<PathBuf>,
    /// Directory for per-input reports when several files are parsed
    pub output_dir: Option<PathBuf>,
    /// Keep only rows containing this keyword (case-insensitive)
    pub filter: Option<String>,
    /// Keep only these columns, in this order
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Txt,
}

impl OutputFormat {
    /// File extension used for reports in this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .parser
        .validate()
        .with_context(|| format!("Invalid parser settings in {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use trace_log_parser::{BoundaryMode, PreambleMode, ReshapeMode};

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            files = ["bus_trace.txt"]

            [parser]
            exclude_keyword = "Heartbeat"
            boundary_mode = "marker-substring"
            reshape_mode = "fixed-merge-6"
            preamble_mode = "block-zero"
            progress_interval_lines = 1000

            [output]
            format = "json"
            filter = "ACK"
            columns = ["col0", "col2"]
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.files.len(), 1);
        assert_eq!(config.parser.exclude_keyword, "Heartbeat");
        assert_eq!(config.parser.boundary_mode, BoundaryMode::MarkerSubstring);
        assert_eq!(config.parser.reshape_mode, ReshapeMode::FixedMerge6);
        assert_eq!(config.parser.preamble_mode, PreambleMode::BlockZero);
        assert_eq!(config.parser.progress_interval_lines, 1000);
        assert_eq!(config.parser.marker, "TimeStamp");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.filter.as_deref(), Some("ACK"));
        assert_eq!(config.output.columns, Some(vec!["col0".to_string(), "col2".to_string()]));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.files.is_empty());
        assert_eq!(config.parser, ParserConfig::default());
        assert_eq!(config.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_load_config_rejects_invalid_parser_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\nprogress_interval_lines = 0").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("missing_config.toml")).is_err());
    }
}
