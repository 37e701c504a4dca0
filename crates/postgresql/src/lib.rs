//! PostgreSQL session for sql-insert-dump
//!
//! Implements the `dump_core::Database` collaborator on top of `tokio-postgres`:
//! connecting, listing user tables, streaming query results as `dump_core::Value`
//! rows, and running replayed statements inside one explicit transaction.

mod client;
mod database;
mod row;
mod typemap;

pub use client::new_postgresql_client;
pub use database::PgDatabase;
pub use row::decode_row;
pub use typemap::column_type_for;

/// PostgreSQL connection options
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Full connection string; when set, the individual fields below are ignored
    pub connection_string: Option<String>,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login user
    pub user: String,
    /// Login password
    pub password: Option<String>,
    /// Database name
    pub dbname: String,
    /// Encoding name that selects the newline style (e.g. `WIN1252`); the server's
    /// `server_encoding` when unset. The session itself always talks UTF-8.
    pub encoding: Option<String>,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            connection_string: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            dbname: "postgres".to_string(),
            encoding: None,
        }
    }
}

impl ConnectOpts {
    /// Short description of the target for log messages (never includes the password)
    pub fn display_target(&self) -> String {
        match &self.connection_string {
            Some(_) => "<connection string>".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.dbname),
        }
    }
}
