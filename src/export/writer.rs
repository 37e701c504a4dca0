//! INSERT statement text generation.

use super::table_data::TableData;
use chrono::NaiveDateTime;
use dump_core::{quote_identifier, DumpError, Result};

/// Turns buffered rows into `INSERT INTO <table> (<columns>) VALUES (<values>);` lines
#[derive(Debug, Clone)]
pub struct StatementWriter {
    target_table: String,
    newline: String,
}

impl StatementWriter {
    pub fn new(target_table: impl Into<String>, newline: impl Into<String>) -> Result<Self> {
        let target_table = target_table.into();
        if target_table.is_empty() {
            return Err(DumpError::EmptyTargetTable);
        }
        Ok(Self {
            target_table,
            newline: newline.into(),
        })
    }

    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    /// Comma-joined column names in buffer order, quoted where the server needs it
    pub fn column_list(table: &TableData) -> String {
        table
            .column_names()
            .map(quote_identifier)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One terminated statement per buffered row
    pub fn emit(&self, table: &TableData) -> Vec<String> {
        let columns = Self::column_list(table);
        (0..table.row_count())
            .filter_map(|index| table.row(index))
            .map(|values| self.statement(&columns, &values))
            .collect()
    }

    fn statement(&self, columns: &str, values: &[&str]) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({});{}",
            self.target_table,
            columns,
            values.join(","),
            self.newline
        )
    }
}

/// Comment block written once at the top of every dump file
#[derive(Debug, Clone)]
pub struct FileHeader<'a> {
    pub query: &'a str,
    pub target_table: &'a str,
    pub generated_at: NaiveDateTime,
}

impl FileHeader<'_> {
    pub fn render(&self, newline: &str) -> String {
        // a multi-line query would otherwise leave uncommented lines in the header
        let query = self.query.split_whitespace().collect::<Vec<_>>().join(" ");
        let lines = [
            format!(
                "-- File generated by `sql-insert-dump` {}",
                env!("CARGO_PKG_VERSION")
            ),
            format!("-- Date: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S")),
            format!("-- Exported query: {query}"),
            format!("-- Target table: {}", self.target_table),
            "-- Literals follow PostgreSQL conventions - other database".to_string(),
            "-- technologies may or may not accept this file".to_string(),
        ];

        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push_str(newline);
        }
        out
    }
}
