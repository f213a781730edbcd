//! Standalone trace summary tool
//!
//! Parses a text trace file and prints statistics plus the busiest record
//! names in the resulting table.
//!
//! Usage:
//!   summarize_trace <trace.txt> [--exclude <keyword>] [--mode <reshape-mode>] [--limit <rows>]
//!
//! Example:
//!   summarize_trace bus_trace.txt --exclude Ping --mode single-row --limit 20

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use trace_log_parser::{
    CancelFlag, ColumnNaming, LogParser, ParseStats, ParserConfig, ProgressSnapshot, ReshapeMode,
    Table,
};

fn print_summary(stats: &ParseStats, table: &Table) {
    println!("\n=== PARSE SUMMARY ===");
    println!("Lines read: {}", stats.lines_seen);
    println!("Bytes read: {}", stats.bytes_read);
    println!("Blocks seen: {}", stats.blocks_seen);
    println!("Blocks kept: {}", stats.blocks_kept);
    println!("Blocks excluded: {}", stats.blocks_excluded);
    println!("Blocks without identifier: {}", stats.blocks_unidentified);
    println!("Preamble lines discarded: {}", stats.preamble_lines_discarded);
    println!("Lines with decode faults: {}", stats.decode_faults);
    println!("Table: {} rows x {} columns", table.len(), table.column_count());

    // Second column holds the record name when identified naming is used
    if let Some(index) = table.column_index("Name") {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in table.rows() {
            *counts.entry(row.fields[index].as_str()).or_insert(0) += 1;
        }

        println!("\nTop 10 Most Frequent Names:");
        let mut sorted: Vec<_> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        for (name, count) in sorted.iter().take(10) {
            println!("  {}: {} rows", name, count);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <trace.txt> [--exclude <keyword>] [--mode <reshape-mode>] [--limit <rows>]",
            args[0]
        );
        eprintln!("\nExample:");
        eprintln!("  {} bus_trace.txt --exclude Ping --mode single-row --limit 20", args[0]);
        std::process::exit(1);
    }

    let trace_file = PathBuf::from(&args[1]);
    let mut config = ParserConfig::new();
    let mut limit: Option<usize> = None;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--exclude" => {
                i += 1;
                if i < args.len() {
                    config = config.with_exclude_keyword(args[i].as_str());
                }
            }
            "--mode" => {
                i += 1;
                if i < args.len() {
                    let mode: ReshapeMode = args[i].parse()?;
                    config = config.with_reshape_mode(mode);
                    if mode == ReshapeMode::SingleRow {
                        config = config.with_column_naming(ColumnNaming::Identified);
                    }
                }
            }
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    println!("=== Trace Log Parser ===");
    println!("Trace file: {:?}", trace_file);
    println!("Exclude keyword: {:?}", config.exclude_keyword);
    println!("Reshape mode: {}", config.reshape_mode);
    println!();

    let parser = LogParser::new(config)?;
    let mut progress = |s: &ProgressSnapshot| {
        eprintln!("  {:>3}% | line {} | {} blocks kept", s.percent(), s.lines_seen, s.blocks_kept);
    };
    let outcome = parser.parse_file(&trace_file, &mut progress, &CancelFlag::new())?;

    println!("{}", outcome.table.columns().join(" | "));
    for (shown, row) in outcome.table.rows().iter().enumerate() {
        if let Some(max) = limit {
            if shown >= max {
                println!("\n... (limit of {} rows reached)", max);
                break;
            }
        }
        println!("{}", row.fields.join(" | "));
    }

    print_summary(&outcome.stats, &outcome.table);

    Ok(())
}
