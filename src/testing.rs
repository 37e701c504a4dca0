//! In-memory database for exercising the export and replay engines
//!
//! [`MemoryDatabase`] serves canned query results and records executed statements
//! together with the commit/rollback state, so tests can check what a real session
//! would have made visible.

use async_trait::async_trait;
use dump_core::{ColumnMeta, Database, DumpError, QueryResult, Result, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

type FailurePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
struct CannedResult {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Value>>,
}

pub struct MemoryDatabase {
    tables: Vec<String>,
    results: HashMap<String, CannedResult>,
    encoding: String,
    queries_run: AtomicUsize,
    pending: Vec<String>,
    committed: Vec<String>,
    commits: usize,
    rollbacks: usize,
    fail_when: Option<FailurePredicate>,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            results: HashMap::new(),
            encoding: "UTF8".to_string(),
            queries_run: AtomicUsize::new(0),
            pending: Vec::new(),
            committed: Vec::new(),
            commits: 0,
            rollbacks: 0,
            fail_when: None,
        }
    }

    /// Report `encoding` as the session encoding
    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    /// Register a table; it is listed by `list_tables` and answers `SELECT * FROM <name>`
    pub fn add_table(&mut self, name: &str, columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) {
        self.tables.push(name.to_string());
        self.add_query(&format!("SELECT * FROM {name}"), columns, rows);
    }

    /// Register the result of an arbitrary query text
    pub fn add_query(&mut self, sql: &str, columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) {
        self.results
            .insert(sql.to_string(), CannedResult { columns, rows });
    }

    /// Make `execute_statement` fail for every statement matching `predicate`
    pub fn fail_when(&mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) {
        self.fail_when = Some(Box::new(predicate));
    }

    pub fn queries_run(&self) -> usize {
        self.queries_run.load(Ordering::SeqCst)
    }

    /// Statements executed since the last commit or rollback
    pub fn pending_statements(&self) -> &[String] {
        &self.pending
    }

    /// Statements made visible by a commit
    pub fn committed_statements(&self) -> &[String] {
        &self.committed
    }

    /// Committed INSERTs into `table`
    pub fn visible_rows(&self, table: &str) -> usize {
        let prefix = format!("INSERT INTO {table} ");
        self.committed
            .iter()
            .filter(|s| s.starts_with(&prefix))
            .count()
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn rollback_count(&self) -> usize {
        self.rollbacks
    }
}

/// Rough shape check standing in for the server's parser
fn is_well_formed_insert(sql: &str) -> bool {
    sql.starts_with("INSERT INTO ") && sql.contains(") VALUES (") && sql.ends_with(')')
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.queries_run.fetch_add(1, Ordering::SeqCst);
        let canned = self.results.get(sql).cloned().ok_or_else(|| {
            DumpError::database("running query", format!("no canned result for: {sql}"))
        })?;

        let rows = futures::stream::iter(canned.rows.into_iter().map(Ok));
        Ok(QueryResult {
            columns: canned.columns,
            rows: Box::pin(rows),
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn detected_encoding_name(&self) -> Result<String> {
        Ok(self.encoding.clone())
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        let rejected = self.fail_when.as_ref().is_some_and(|fail| fail(sql));
        if rejected || !is_well_formed_insert(sql) {
            return Err(DumpError::database(
                "executing statement",
                format!("syntax error in: {sql}"),
            ));
        }
        self.pending.push(sql.to_string());
        Ok(1)
    }

    async fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        self.committed.append(&mut self.pending);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.rollbacks += 1;
        self.pending.clear();
        Ok(())
    }
}
