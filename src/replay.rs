//! Replay of INSERT dump files.
//!
//! A dump is split on `;` followed by a line break and the `INSERT` keyword. Every
//! resulting statement runs in the session's open transaction; the transaction is
//! committed only after the last statement succeeded and rolled back otherwise.
//!
//! The split does not understand SQL. A string literal containing `;\nINSERT` ends
//! the statement early, and a comment line between two statements keeps them
//! together in one candidate.

use dump_core::{Database, DumpError, Result};
use std::path::Path;
use tracing::{debug, error, info, trace, warn};

const INSERT_KEYWORD: &str = "INSERT";

/// Statements between two progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Outcome of a committed replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Statements executed
    pub statements: usize,
    /// Rows reported as affected by the database
    pub rows_affected: u64,
}

/// Split a dump into INSERT statements without their terminating `;`.
///
/// Leading `--` comment lines are dropped from every candidate and candidates made
/// only of comments or whitespace are skipped.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut keyword_consumed = false;

    for (at, _) in script.match_indices(';') {
        if at < start {
            continue;
        }
        let rest = &script[at + 1..];
        let newline_len = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') {
            1
        } else {
            continue;
        };
        if !rest[newline_len..].starts_with(INSERT_KEYWORD) {
            continue;
        }

        push_candidate(&mut statements, &script[start..at], keyword_consumed);
        start = at + 1 + newline_len + INSERT_KEYWORD.len();
        keyword_consumed = true;
    }
    push_candidate(&mut statements, &script[start..], keyword_consumed);

    statements
}

fn push_candidate(statements: &mut Vec<String>, candidate: &str, keyword_consumed: bool) {
    let body = if keyword_consumed {
        format!("{INSERT_KEYWORD}{candidate}")
    } else {
        strip_leading_comments(candidate).to_string()
    };

    let body = body.trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    if !body.is_empty() {
        statements.push(body.to_string());
    }
}

fn strip_leading_comments(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if !text.starts_with("--") {
            return text;
        }
        match text.find('\n') {
            Some(end) => text = &text[end + 1..],
            None => return "",
        }
    }
}

fn is_insert(statement: &str) -> bool {
    statement
        .get(..INSERT_KEYWORD.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(INSERT_KEYWORD))
}

fn has_sql_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

/// Runs dump files against a database session
pub struct Replayer<'a, D: Database + ?Sized> {
    db: &'a mut D,
    progress_interval: usize,
}

impl<'a, D: Database + ?Sized> Replayer<'a, D> {
    pub fn new(db: &'a mut D) -> Self {
        Self {
            db,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Replay the file at `path` as one transaction
    pub async fn run_file(&mut self, path: impl AsRef<Path>) -> Result<ReplaySummary> {
        let path = path.as_ref();
        debug!("Running file: {}", path.display());
        if !has_sql_extension(path) {
            warn!("Trying to run non-.sql file: {}", path.display());
        }

        let script = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DumpError::io(path, e))?;

        let summary = self.run_script(&script).await.inspect_err(|_| {
            error!("Could not run file {}", path.display());
        })?;

        info!("Done running file {}", path.display());
        Ok(summary)
    }

    /// Replay an already loaded dump as one transaction
    pub async fn run_script(&mut self, script: &str) -> Result<ReplaySummary> {
        let statements = split_statements(script);
        debug!("Found {} statements", statements.len());

        match self.execute_all(&statements).await {
            Ok(summary) => {
                self.db.commit().await?;
                Ok(summary)
            }
            Err(e) => {
                if let Err(rollback_error) = self.db.rollback().await {
                    warn!("Rollback failed: {rollback_error}");
                }
                Err(e)
            }
        }
    }

    async fn execute_all(&mut self, statements: &[String]) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary {
            statements: 0,
            rows_affected: 0,
        };

        for (offset, statement) in statements.iter().enumerate() {
            let index = offset + 1;
            if !is_insert(statement) {
                return Err(DumpError::NotAnInsert {
                    index,
                    statement: statement.clone(),
                });
            }

            trace!("Running SQL: {statement}");
            let affected = self
                .db
                .execute_statement(statement)
                .await
                .map_err(|e| DumpError::statement(index, statement.as_str(), e.to_string()))?;

            summary.statements += 1;
            summary.rows_affected += affected;
            if summary.statements % self.progress_interval == 0 {
                info!("Statements processed: {}", summary.statements);
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "-- File generated by `sql-insert-dump`\n-- Target table: t\n";

    #[test]
    fn test_split_keeps_first_statement_after_header() {
        let script = format!(
            "{HEADER}INSERT INTO t (a) VALUES (1);\nINSERT INTO t (a) VALUES (2);\n"
        );
        assert_eq!(
            split_statements(&script),
            vec!["INSERT INTO t (a) VALUES (1)", "INSERT INTO t (a) VALUES (2)"]
        );
    }

    #[test]
    fn test_split_crlf() {
        let script = "-- header\r\nINSERT INTO t (a) VALUES (1);\r\nINSERT INTO t (a) VALUES (2);\r\n";
        assert_eq!(
            split_statements(script),
            vec!["INSERT INTO t (a) VALUES (1)", "INSERT INTO t (a) VALUES (2)"]
        );
    }

    #[test]
    fn test_split_ignores_semicolon_inside_values() {
        let script = "INSERT INTO t (a) VALUES ('x;y');\nINSERT INTO t (a) VALUES ('z');";
        assert_eq!(
            split_statements(script),
            vec![
                "INSERT INTO t (a) VALUES ('x;y')",
                "INSERT INTO t (a) VALUES ('z')"
            ]
        );
    }

    #[test]
    fn test_split_comment_only_and_empty() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("-- nothing here\n-- at all\n").is_empty());
        assert!(split_statements("   \n\n").is_empty());
    }

    #[test]
    fn test_split_keeps_non_insert_for_validation() {
        assert_eq!(
            split_statements("DELETE FROM t;\nINSERT INTO t (a) VALUES (1);"),
            vec!["DELETE FROM t", "INSERT INTO t (a) VALUES (1)"]
        );
    }

    #[test]
    fn test_is_insert() {
        assert!(is_insert("INSERT INTO t VALUES (1)"));
        assert!(is_insert("insert into t values (1)"));
        assert!(!is_insert("DROP TABLE t"));
        assert!(!is_insert("INS"));
    }

    #[test]
    fn test_sql_extension() {
        assert!(has_sql_extension(Path::new("dump.sql")));
        assert!(has_sql_extension(Path::new("out/2024 people.SQL")));
        assert!(!has_sql_extension(Path::new("dump.txt")));
        assert!(!has_sql_extension(Path::new("sql")));
    }
}
