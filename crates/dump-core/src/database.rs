//! The database collaborator the export and replay engines call into.

use crate::error::Result;
use crate::types::ColumnType;
use crate::value::Value;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Forward-only stream of decoded rows, one `Vec<Value>` per row in column order.
pub type RowStream = Pin<Box<dyn Stream<Item = Result<Vec<Value>>> + Send>>;

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column label as reported by the driver
    pub name: String,
    /// Category derived from the driver's type code
    pub column_type: ColumnType,
    /// The driver's own name for the type, used in warnings
    pub type_name: String,
}

impl ColumnMeta {
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            type_name: type_name.into(),
        }
    }
}

/// Result of a query: column metadata known up front, rows pulled lazily.
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: RowStream,
}

impl std::fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// A single database session.
///
/// The session is owned by one process for its whole lifetime; statements executed
/// through [`Database::execute_statement`] stay invisible to other sessions until
/// [`Database::commit`] is called.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a query; column metadata is available even when no row is returned.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Names of all non-system tables.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Name of the character encoding the session uses (e.g. `UTF8`, `WIN1252`).
    async fn detected_encoding_name(&self) -> Result<String>;

    /// Execute one data-modifying statement inside the open transaction.
    /// Returns the number of affected rows.
    async fn execute_statement(&mut self, sql: &str) -> Result<u64>;

    /// Commit everything executed since the last commit or rollback.
    async fn commit(&mut self) -> Result<()>;

    /// Discard everything executed since the last commit or rollback.
    async fn rollback(&mut self) -> Result<()>;
}
