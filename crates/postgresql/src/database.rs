//! `Database` implementation backed by a single tokio-postgres session.

use crate::client::new_postgresql_client;
use crate::row::decode_row;
use crate::typemap::column_type_for;
use crate::ConnectOpts;
use async_trait::async_trait;
use dump_core::{quote_identifier, ColumnMeta, Database, DumpError, QueryResult, Result};
use futures::StreamExt;
use tokio_postgres::Client;
use tracing::{debug, info, trace, warn};

/// Oldest server major version the exporter is tested against
const MIN_SUPPORTED_MAJOR: u32 = 12;

/// One PostgreSQL session.
///
/// The driver always talks UTF-8 to the server, whatever the database encoding.
/// The encoding reported to the exporter is the configured name, or the server's
/// `server_encoding` when none is configured.
///
/// Replayed statements run in an explicit transaction that is opened by the first
/// [`Database::execute_statement`] call and closed by `commit` or `rollback`.
pub struct PgDatabase {
    client: Client,
    encoding: Option<String>,
    in_transaction: bool,
}

/// Where the reported encoding name comes from
#[derive(Debug, PartialEq, Eq)]
enum EncodingSource<'a> {
    Configured(&'a str),
    Setting(&'static str),
}

fn encoding_source(configured: Option<&str>) -> EncodingSource<'_> {
    match configured.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => EncodingSource::Configured(name),
        None => EncodingSource::Setting("server_encoding"),
    }
}

impl PgDatabase {
    /// Connect and check the server version
    pub async fn connect(opts: &ConnectOpts) -> Result<Self> {
        let client = new_postgresql_client(opts).await?;

        let database = Self::from_client(client, opts.encoding.clone());
        database.check_server_version().await?;
        Ok(database)
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client, encoding: Option<String>) -> Self {
        Self {
            client,
            encoding,
            in_transaction: false,
        }
    }

    async fn check_server_version(&self) -> Result<()> {
        let version = self.show("server_version").await?;
        info!("Detected PostgreSQL version: {version}");

        match parse_major_version(&version) {
            Some(major) if major >= MIN_SUPPORTED_MAJOR => {}
            _ => {
                warn!("Only PostgreSQL {MIN_SUPPORTED_MAJOR} and newer is currently supported!");
                warn!("Execution will continue, but things may break!");
            }
        }
        Ok(())
    }

    async fn show(&self, setting: &str) -> Result<String> {
        let row = self
            .client
            .query_one(&format!("SHOW {setting}"), &[])
            .await
            .map_err(|e| DumpError::database(format!("reading {setting}"), e))?;
        row.try_get::<_, String>(0)
            .map_err(|e| DumpError::database(format!("reading {setting}"), e))
    }

    async fn ensure_transaction(&mut self) -> Result<()> {
        if !self.in_transaction {
            self.client
                .batch_execute("BEGIN")
                .await
                .map_err(|e| DumpError::database("starting transaction", e))?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        debug!("Running SQL: {sql}");

        // Prepare first so column metadata is known even for empty results
        let statement = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| DumpError::database("preparing query", e))?;

        let columns: Vec<ColumnMeta> = statement
            .columns()
            .iter()
            .map(|column| {
                ColumnMeta::new(
                    column.name(),
                    column_type_for(column.type_()),
                    column.type_().name(),
                )
            })
            .collect();

        let rows = self
            .client
            .query_raw(&statement, Vec::<String>::new())
            .await
            .map_err(|e| DumpError::database("running query", e))?;

        let rows = rows.map(|row| {
            let row = row.map_err(|e| DumpError::database("fetching row", e))?;
            decode_row(&row)
        });

        Ok(QueryResult {
            columns,
            rows: Box::pin(rows),
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let query = "
            SELECT schemaname, tablename
            FROM pg_catalog.pg_tables
            WHERE schemaname NOT IN ('pg_catalog', 'information_schema')
            AND schemaname NOT LIKE 'pg_toast%'
            ORDER BY schemaname, tablename
        ";

        let rows = self
            .client
            .query(query, &[])
            .await
            .map_err(|e| DumpError::database("listing tables", e))?;

        let tables = rows
            .iter()
            .map(|row| {
                let schema: String = row.get("schemaname");
                let table: String = row.get("tablename");
                qualified_table_name(&schema, &table)
            })
            .collect();

        Ok(tables)
    }

    async fn detected_encoding_name(&self) -> Result<String> {
        match encoding_source(self.encoding.as_deref()) {
            EncodingSource::Configured(name) => Ok(name.to_string()),
            EncodingSource::Setting(setting) => self.show(setting).await,
        }
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        self.ensure_transaction().await?;
        trace!("Running SQL: {sql}");
        self.client
            .execute(sql, &[])
            .await
            .map_err(|e| DumpError::database("executing statement", e))
    }

    async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            debug!("Commit requested without open transaction");
            return Ok(());
        }
        self.in_transaction = false;
        self.client
            .batch_execute("COMMIT")
            .await
            .map_err(|e| DumpError::database("committing transaction", e))
    }

    async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.client
            .batch_execute("ROLLBACK")
            .await
            .map_err(|e| DumpError::database("rolling back transaction", e))
    }
}

/// Table reference usable in SQL; tables outside `public` keep their schema prefix
fn qualified_table_name(schema: &str, table: &str) -> String {
    if schema == "public" {
        quote_identifier(table)
    } else {
        format!("{}.{}", quote_identifier(schema), quote_identifier(table))
    }
}

/// Leading major number of a `server_version` string such as `16.2 (Debian 16.2-1)`
fn parse_major_version(version: &str) -> Option<u32> {
    let major: String = version
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    major.parse().ok()
}
