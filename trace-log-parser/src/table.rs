//! Table building and table operations
//!
//! The table's width is only known once every row exists, so building is
//! split into two phases: [`TableBuilder::push`] collects provisional rows of
//! any length, and [`TableBuilder::finish`] fixes the schema in one pass.
//!
//! A finished [`Table`] is never modified. Filtering, projection and export
//! all borrow it and return new values.

use crate::config::{ColumnNaming, ParserConfig};
use crate::types::{BlockId, Field, ParseError, Result, Row};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;

/// One normalized table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Dense row identifier, starting at 1 in the built table
    pub id: usize,
    /// Block the row was derived from
    pub block_id: BlockId,
    /// Exactly one value per column
    pub fields: Vec<Field>,
}

/// A uniformly shaped table with named columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Empty table with no columns
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Rows where any field contains `keyword`, ignoring case
    ///
    /// Row identifiers are carried over from this table so filtered rows can
    /// be traced back. An empty keyword matches every row.
    pub fn filter_rows(&self, keyword: &str) -> Table {
        let needle = keyword.to_lowercase();
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.fields
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Restrict the table to the named columns, in the requested order
    ///
    /// Rows that become entirely empty are dropped.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut seen = HashSet::new();
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let index = self
                .column_index(name)
                .ok_or_else(|| ParseError::UnknownColumn(name.to_string()))?;
            if !seen.insert(index) {
                return Err(ParseError::DuplicateColumn(name.to_string()));
            }
            indices.push(index);
        }

        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| TableRow {
                id: row.id,
                block_id: row.block_id,
                fields: indices.iter().map(|&i| row.fields[i].clone()).collect(),
            })
            .filter(|row| row.fields.iter().any(|field| !field.is_empty()))
            .collect();

        Ok(Table { columns, rows })
    }

    /// Write the table as CSV: one header line, then one line per row
    ///
    /// No row-index column is written. A table without columns still writes
    /// its (empty) header line.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        if self.columns.is_empty() {
            writer.write_all(b"\n")?;
            writer.flush()?;
            return Ok(());
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(&row.fields)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Normalizes provisional rows into a [`Table`]
#[derive(Debug, Clone)]
pub struct TableBuilder {
    naming: ColumnNaming,
    column_prefix: String,
    identifier_names: [String; 2],
    pending: Vec<Row>,
}

impl TableBuilder {
    pub fn new(
        naming: ColumnNaming,
        column_prefix: impl Into<String>,
        identifier_names: [String; 2],
    ) -> Self {
        Self {
            naming,
            column_prefix: column_prefix.into(),
            identifier_names,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(
            config.column_naming,
            config.column_prefix.clone(),
            config.identifier_names.clone(),
        )
    }

    /// Queue a provisional row
    pub fn push(&mut self, row: Row) {
        self.pending.push(row);
    }

    /// Number of queued rows
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Build a table from `rows` in one go
    pub fn build(mut self, rows: impl IntoIterator<Item = Row>) -> Table {
        self.pending.extend(rows);
        self.finish()
    }

    /// Fix the schema: pad to the widest row, drop blank rows, name columns
    pub fn finish(self) -> Table {
        let max_columns = self
            .pending
            .iter()
            .map(|row| row.fields.len())
            .max()
            .unwrap_or(0);

        let columns = self.column_names(max_columns);

        let rows: Vec<TableRow> = self
            .pending
            .into_iter()
            .filter(|row| !row.is_blank())
            .enumerate()
            .map(|(index, mut row)| {
                row.fields.resize(max_columns, String::new());
                TableRow {
                    id: index + 1,
                    block_id: row.block_id,
                    fields: row.fields,
                }
            })
            .collect();

        log::debug!(
            "Built table with {} rows and {} columns",
            rows.len(),
            columns.len()
        );

        Table { columns, rows }
    }

    fn column_names(&self, count: usize) -> Vec<String> {
        let semantic: &[String] = match self.naming {
            ColumnNaming::Prefix => &[],
            ColumnNaming::Identified => &self.identifier_names,
        };

        let semantic_count = semantic.len().min(count);
        semantic[..semantic_count]
            .iter()
            .cloned()
            .chain((0..count - semantic_count).map(|i| format!("{}{}", self.column_prefix, i)))
            .collect()
    }
}
