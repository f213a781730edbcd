//! Report generation
//!
//! Writes a parsed table as CSV, JSON or an aligned text table.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use trace_log_parser::{ParseStats, Table};

/// JSON document written for one input file
#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a Path,
    generated_at: String,
    stats: &'a ParseStats,
    table: &'a Table,
}

/// Write `table` to `writer` in the requested format
pub fn write_report<W: Write>(
    mut writer: W,
    format: OutputFormat,
    source: &Path,
    stats: &ParseStats,
    table: &Table,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            table
                .write_csv(&mut writer)
                .context("Failed to write CSV report")?;
        }
        OutputFormat::Json => {
            let report = JsonReport {
                source,
                generated_at: Utc::now().to_rfc3339(),
                stats,
                table,
            };
            serde_json::to_writer_pretty(&mut writer, &report)
                .context("Failed to write JSON report")?;
            writeln!(writer)?;
        }
        OutputFormat::Txt => write_text_table(&mut writer, table)?,
    }

    writer.flush()?;
    Ok(())
}

/// Render the table with padded columns and a header rule
fn write_text_table<W: Write>(writer: &mut W, table: &Table) -> Result<()> {
    if table.column_count() == 0 {
        writeln!(writer, "(empty table)")?;
        return Ok(());
    }

    let mut widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|c| c.chars().count())
        .collect();
    for row in table.rows() {
        for (width, field) in widths.iter_mut().zip(&row.fields) {
            *width = (*width).max(field.chars().count());
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    writeln!(writer, "{}", render(table.columns()))?;
    writeln!(
        writer,
        "{}",
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    )?;
    for row in table.rows() {
        writeln!(writer, "{}", render(row.fields.as_slice()))?;
    }
    writeln!(writer, "({} rows)", table.len())?;

    Ok(())
}
