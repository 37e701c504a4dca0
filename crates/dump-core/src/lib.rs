//! Core types for sql-insert-dump.
//!
//! This crate holds everything the dump and replay engines share and that is
//! independent of a concrete database driver:
//!
//! - [`ColumnType`]: the closed set of column categories a driver type code maps to
//! - [`Value`]: a decoded cell as handed over by the driver
//! - [`encode_literal`] / [`Encoder`]: turning a `(ColumnType, Value)` pair into SQL literal text
//! - [`TypeWarningRegistry`]: once-per-run warnings for columns that cannot be exported faithfully
//! - [`Database`]: the collaborator interface the engines call into
//! - [`quote_identifier`]: table and column names as they must appear in generated SQL
//!
//! Driver crates (e.g. `dump-postgresql`) implement [`Database`] and decide how their
//! native type codes map onto [`ColumnType`].

mod database;
mod encode;
mod error;
mod ident;
mod types;
mod value;
mod warnings;

pub use database::{ColumnMeta, Database, QueryResult, RowStream};
pub use encode::{encode_literal, Encoder, BINARY_PLACEHOLDER, NULL_LITERAL};
pub use error::{DumpError, Result};
pub use ident::quote_identifier;
pub use types::{ColumnType, UnsupportedKind};
pub use value::Value;
pub use warnings::TypeWarningRegistry;
