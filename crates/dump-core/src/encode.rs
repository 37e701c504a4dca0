//! Value encoder: `(ColumnType, Value)` → SQL literal text.
//!
//! Encoding is total. Every category has a defined output for every value, so a
//! column type the exporter does not understand degrades to a placeholder or `NULL`
//! instead of failing the export.
//!
//! Temporal literals follow PostgreSQL's input format with a fixed four digit
//! fraction holding the zero-padded millisecond count: `'2024-03-07 09:05:02.0040'`.
//! Dates before year 1 carry a positive year and a trailing ` BC`.
//!
//! Character data is wrapped in single quotes without escaping embedded quotes. Text
//! containing `'` produces a statement the database will reject.

use crate::database::ColumnMeta;
use crate::types::ColumnType;
use crate::value::Value;
use crate::warnings::TypeWarningRegistry;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Literal for SQL NULL.
pub const NULL_LITERAL: &str = "NULL";

/// Literal written in place of byte payloads that are not exported.
pub const BINARY_PLACEHOLDER: &str = "'[BINARY_DATA_LOST_IN_EXPORT]'";

/// Encode a single value as a SQL literal for a column of the given category.
pub fn encode_literal(column_type: &ColumnType, value: &Value) -> String {
    if value.is_null() {
        return NULL_LITERAL.to_string();
    }

    match column_type {
        ColumnType::Integer | ColumnType::Decimal | ColumnType::Boolean => unquoted(value),
        ColumnType::Character => quote(&value.to_string()),
        ColumnType::Null => NULL_LITERAL.to_string(),
        ColumnType::Date => match value {
            Value::Date(date) => date_literal(date, None),
            Value::Timestamp(ts) => date_literal(&ts.date(), None),
            other => quote(&other.to_string()),
        },
        ColumnType::Time => match value {
            Value::Time(time) => quote(&format_time(time)),
            Value::Timestamp(ts) => quote(&format_time(&ts.time())),
            other => quote(&other.to_string()),
        },
        ColumnType::Timestamp => match value {
            Value::Timestamp(ts) => date_literal(&ts.date(), Some(&format_time(&ts.time()))),
            Value::Date(date) => date_literal(date, Some("00:00:00.0000")),
            other => quote(&other.to_string()),
        },
        ColumnType::Unsupported(kind) if kind.is_byte_payload() => BINARY_PLACEHOLDER.to_string(),
        ColumnType::Unsupported(_) | ColumnType::Unknown(_) => NULL_LITERAL.to_string(),
    }
}

/// Encoder bound to one export run.
///
/// Wraps [`encode_literal`] and reports each lossy column category once through the
/// run's [`TypeWarningRegistry`].
#[derive(Debug, Default)]
pub struct Encoder {
    warnings: TypeWarningRegistry,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, column: &ColumnMeta, value: &Value) -> String {
        if column.column_type.is_lossy() {
            self.warnings
                .warn_once(&column.column_type, &column.type_name);
        }
        encode_literal(&column.column_type, value)
    }

    pub fn warnings(&self) -> &TypeWarningRegistry {
        &self.warnings
    }

    /// Start a new run: categories warned about before will be reported again.
    pub fn reset(&mut self) {
        self.warnings.reset();
    }
}

fn quote(text: &str) -> String {
    format!("'{text}'")
}

fn unquoted(value: &Value) -> String {
    match value {
        Value::Float(f) if f.is_nan() => quote("NaN"),
        Value::Float(f) if f.is_infinite() && *f > 0.0 => quote("Infinity"),
        Value::Float(f) if f.is_infinite() => quote("-Infinity"),
        other => other.to_string(),
    }
}

/// Quoted date, optionally followed by a time of day
fn date_literal(date: &NaiveDate, time: Option<&str>) -> String {
    let mut text = format_date(date);
    if let Some(time) = time {
        text.push(' ');
        text.push_str(time);
    }
    // proleptic year 0 is 1 BC
    if date.year() < 1 {
        text.push_str(" BC");
    }
    quote(&text)
}

fn format_date(date: &NaiveDate) -> String {
    let year = match date.year() {
        year if year < 1 => 1 - year,
        year => year,
    };
    format!("{:04}-{:02}-{:02}", year, date.month(), date.day())
}

fn format_time(time: &NaiveTime) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:04}",
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / 1_000_000
    )
}
