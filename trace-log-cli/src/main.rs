//! Trace Log Parser CLI Application
//!
//! This is the command-line interface for the trace log parser.
//! It uses the trace-log-parser library and adds:
//! - TOML configuration files with command-line overrides
//! - Parallel parsing of several input files
//! - Progress display and a parse timeout
//! - Row filtering, column selection and report output (CSV/JSON/TXT)

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use trace_log_parser::{
    BoundaryMode, CancelFlag, ColumnNaming, LogParser, ParseOutcome, PreambleMode, ReshapeMode,
    Table,
};

mod config;
mod progress;
mod report;

use config::{AppConfig, OutputFormat};
use progress::{LogProgress, ProgressBar};

/// Trace Log Parser - Turn multi-line bus trace logs into tables
#[derive(Parser, Debug)]
#[command(name = "trace-log-cli")]
#[command(about = "Parse multi-line hardware/bus trace logs into tables", long_about = None)]
#[command(version)]
struct Args {
    /// Path to trace log file(s) to parse (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    log: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Drop blocks containing this word (empty string disables exclusion)
    #[arg(long, value_name = "KEYWORD")]
    exclude: Option<String>,

    /// Boundary mode: numeric-timestamp | marker-substring
    #[arg(long, value_name = "MODE")]
    boundary: Option<BoundaryMode>,

    /// Literal marker for marker-substring mode
    #[arg(long, value_name = "TEXT")]
    marker: Option<String>,

    /// Reshape mode: raw | single-row | fixed-merge-6 | global-chunk-6
    #[arg(long, value_name = "MODE")]
    reshape: Option<ReshapeMode>,

    /// Preamble mode: discard | block-zero
    #[arg(long, value_name = "MODE")]
    preamble: Option<PreambleMode>,

    /// Column naming: prefix | identified
    #[arg(long, value_name = "SCHEME")]
    naming: Option<ColumnNaming>,

    /// Fold continuation lines into single-row records
    #[arg(long)]
    fold: bool,

    /// Report progress every N lines
    #[arg(long, value_name = "LINES")]
    progress_interval: Option<usize>,

    /// Keep only rows containing this keyword (case-insensitive)
    #[arg(short, long, value_name = "KEYWORD")]
    filter: Option<String>,

    /// Comma-separated list of columns to keep
    #[arg(long, value_name = "COLUMNS", value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Output format: csv | json | txt
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Output file for a single input (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output directory, one report per input file
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Abort parsing after this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Trace Log Parser CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using parser library v{}", trace_log_parser::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &args)?;

    if config.input.files.is_empty() {
        // No input - show help
        println!("Trace Log Parser - No input specified");
        println!("\nQuick Start:");
        println!("  trace-log-cli --log bus_trace.txt");
        println!("  trace-log-cli --log bus_trace.txt --reshape single-row --naming identified");
        println!("  trace-log-cli --log bus_trace.txt --filter ACK --format txt");
        println!("\nWith a configuration file:");
        println!("  trace-log-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    check_destinations(&config)?;

    let parser = LogParser::new(config.parser.clone())?;
    let cancel = CancelFlag::new();
    if let Some(secs) = args.timeout_secs {
        arm_timeout(cancel.clone(), Duration::from_secs(secs));
    }

    let inputs = &config.input.files;
    let results: Vec<(&PathBuf, Result<ParseOutcome>)> = if inputs.len() == 1 {
        let path = &inputs[0];
        let outcome = if args.quiet {
            parser.parse_file(path, &mut LogProgress::new(path.display().to_string()), &cancel)
        } else {
            let mut bar = ProgressBar::new();
            let outcome = parser.parse_file(path, &mut bar, &cancel);
            bar.finish();
            outcome
        };
        vec![(path, outcome.with_context(|| format!("Failed to parse {:?}", path)))]
    } else {
        inputs
            .par_iter()
            .map(|path| {
                let mut progress = LogProgress::new(path.display().to_string());
                let outcome = parser
                    .parse_file(path, &mut progress, &cancel)
                    .with_context(|| format!("Failed to parse {:?}", path));
                (path, outcome)
            })
            .collect()
    };

    let mut failures = 0;
    for (path, result) in results {
        match result.and_then(|outcome| emit(&config, path, &outcome)) {
            Ok(()) => {}
            Err(e) => {
                failures += 1;
                log::error!("{:#}", e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} input file(s) failed", failures, config.input.files.len());
    }

    Ok(())
}

/// Fold command-line flags into the loaded configuration
fn apply_overrides(config: &mut AppConfig, args: &Args) -> Result<()> {
    config.input.files.extend(args.log.iter().cloned());

    let parser = &mut config.parser;
    if let Some(keyword) = &args.exclude {
        parser.exclude_keyword = keyword.clone();
    }
    if let Some(mode) = args.boundary {
        parser.boundary_mode = mode;
    }
    if let Some(marker) = &args.marker {
        parser.marker = marker.clone();
    }
    if let Some(mode) = args.reshape {
        parser.reshape_mode = mode;
    }
    if let Some(mode) = args.preamble {
        parser.preamble_mode = mode;
    }
    if let Some(naming) = args.naming {
        parser.column_naming = naming;
    }
    if args.fold {
        parser.fold_continuations = true;
    }
    if let Some(lines) = args.progress_interval {
        parser.progress_interval_lines = lines;
    }

    let output = &mut config.output;
    if let Some(format) = &args.format {
        output.format = parse_format(format)?;
    }
    if let Some(keyword) = &args.filter {
        output.filter = Some(keyword.clone());
    }
    if let Some(columns) = &args.columns {
        output.columns = Some(columns.clone());
    }
    if let Some(file) = &args.output {
        output.file = Some(file.clone());
    }
    if let Some(dir) = &args.output_dir {
        output.output_dir = Some(dir.clone());
    }

    Ok(())
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value.to_ascii_lowercase().as_str() {
        "csv" => Ok(OutputFormat::Csv),
        "json" => Ok(OutputFormat::Json),
        "txt" => Ok(OutputFormat::Txt),
        other => bail!("Unknown output format: {}", other),
    }
}

/// Set the cancel flag once `limit` has elapsed
fn arm_timeout(cancel: CancelFlag, limit: Duration) {
    thread::spawn(move || {
        thread::sleep(limit);
        log::warn!("Parse timeout of {:?} reached, cancelling", limit);
        cancel.cancel();
    });
}

/// Summarize one parse and write its report
fn emit(config: &AppConfig, path: &Path, outcome: &ParseOutcome) -> Result<()> {
    let stats = &outcome.stats;

    if stats.header_conforming == Some(false) {
        log::warn!(
            "{:?} does not start with a {:?} header line; results may be incomplete",
            path,
            config.parser.marker
        );
    }

    log::info!(
        "{:?}: {} lines, {} blocks kept, {} excluded, {} rows x {} columns",
        path,
        stats.lines_seen,
        stats.blocks_kept,
        stats.blocks_excluded,
        outcome.table.len(),
        outcome.table.column_count()
    );
    if stats.blocks_unidentified > 0 {
        log::info!("{:?}: {} blocks had no identifier pair", path, stats.blocks_unidentified);
    }
    if stats.decode_faults > 0 {
        log::info!("{:?}: {} lines contained malformed UTF-8", path, stats.decode_faults);
    }

    let view = select_view(config, &outcome.table)?;
    let format = config.output.format;

    match output_path(config, path) {
        Some(target) => {
            let file = File::create(&target)
                .with_context(|| format!("Failed to create output file: {:?}", target))?;
            report::write_report(BufWriter::new(file), format, path, stats, &view)?;
            log::info!("Report written to {:?}", target);
        }
        None => {
            let stdout = io::stdout();
            report::write_report(stdout.lock(), format, path, stats, &view)?;
        }
    }

    Ok(())
}

/// Several inputs need one report file each, so they require an output directory
fn check_destinations(config: &AppConfig) -> Result<()> {
    if config.input.files.len() < 2 {
        return Ok(());
    }
    if config.output.file.is_some() {
        bail!("--output takes a single input; use --output-dir for several files");
    }
    if config.output.output_dir.is_none() {
        bail!("Several inputs need --output-dir; reports would otherwise share stdout");
    }
    Ok(())
}

/// Apply the configured row filter and column selection
fn select_view(config: &AppConfig, table: &Table) -> Result<Table> {
    let filtered = match &config.output.filter {
        Some(keyword) => {
            let filtered = table.filter_rows(keyword);
            log::info!("{} of {} rows contain {:?}", filtered.len(), table.len(), keyword);
            filtered
        }
        None => table.clone(),
    };

    match &config.output.columns {
        Some(columns) => filtered
            .select_columns(columns)
            .with_context(|| format!("Cannot select columns {:?}", columns)),
        None => Ok(filtered),
    }
}

/// Where the report for `input` goes; None means stdout
fn output_path(config: &AppConfig, input: &Path) -> Option<PathBuf> {
    if let Some(file) = &config.output.file {
        return Some(file.clone());
    }

    config.output.output_dir.as_ref().map(|dir| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trace".to_string());
        dir.join(format!("{}.{}", stem, config.output.format.extension()))
    })
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
