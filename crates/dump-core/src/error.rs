//! Error types shared by the dump and replay engines.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for export and replay operations.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Only `SELECT` queries can be exported
    #[error("Query does not start with `SELECT`: {0}")]
    InvalidQueryKind(String),

    /// The INSERT target table name was empty
    #[error("Target table name may not be empty")]
    EmptyTargetTable,

    /// Unknown newline style in the configuration
    #[error("Invalid newline style '{0}' (expected LF, CRLF or auto)")]
    InvalidNewlineStyle(String),

    /// Reading or writing a file failed
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database driver reported an error
    #[error("Database error while {context}: {source}")]
    Database {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A replayed statement failed; nothing from the file was committed
    #[error("Statement {index} failed: {message}\n  Statement: {statement}")]
    Statement {
        index: usize,
        statement: String,
        message: String,
    },

    /// The replay engine only runs INSERT statements
    #[error("Refusing to run non-INSERT statement {index}: {statement}")]
    NotAnInsert { index: usize, statement: String },
}

impl DumpError {
    /// Create an Io error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DumpError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a driver error with a short description of what was being done
    pub fn database(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DumpError::Database {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create a Statement error
    pub fn statement(
        index: usize,
        statement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DumpError::Statement {
            index,
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {self}\n");

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {depth}: {err}"));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for export and replay operations.
pub type Result<T> = std::result::Result<T, DumpError>;
