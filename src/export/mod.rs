//! Export orchestration: query → encoded batches → INSERT file.
//!
//! One [`Exporter`] is one export run. It owns the run's [`Encoder`] (and with it the
//! set of column types already warned about) and the newline sequence resolved from
//! the connection encoding.

pub mod table_data;
pub mod writer;

use crate::ExportOpts;
use chrono::{Local, NaiveDateTime};
use dump_core::{Database, DumpError, Encoder, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

pub use table_data::{build_table_data, ensure_select, TableColumn, TableData};
pub use writer::{FileHeader, StatementWriter};

/// Directory used by [`Exporter::export_all_tables`] when none is given
pub const DEFAULT_EXPORT_DIR: &str = "out";

/// What one `export_query` call wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub target_table: String,
    pub rows: usize,
}

/// `<%Y-%m-%d_%H-%M-%S> <table>.sql`, with identifier quotes dropped from the name
pub fn default_file_name(table: &str, now: NaiveDateTime) -> String {
    format!(
        "{} {}.sql",
        now.format("%Y-%m-%d_%H-%M-%S"),
        table.replace('"', "")
    )
}

pub struct Exporter<'a, D: Database + ?Sized> {
    db: &'a D,
    opts: ExportOpts,
    newline: &'static str,
    encoder: Encoder,
}

impl<'a, D: Database + ?Sized> Exporter<'a, D> {
    /// Start an export run, resolving the newline style against the session encoding
    pub async fn new(db: &'a D, opts: ExportOpts) -> Result<Self> {
        let encoding = db.detected_encoding_name().await?;
        let newline = opts.newline.resolve(&encoding);
        debug!(
            "Encoding {encoding} with newline style {} uses {:?}",
            opts.newline, newline
        );

        Ok(Self {
            db,
            opts,
            newline,
            encoder: Encoder::new(),
        })
    }

    pub fn newline(&self) -> &str {
        self.newline
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    fn batch_limit(&self) -> Option<usize> {
        match self.opts.batch_size {
            0 => None,
            n => Some(n),
        }
    }

    /// Export the result of `query` as INSERTs into `target_table`.
    /// Without `file_name` the file is created in the working directory under a
    /// generated name.
    pub async fn export_query(
        &mut self,
        query: &str,
        target_table: &str,
        file_name: Option<&Path>,
    ) -> Result<ExportSummary> {
        let writer = StatementWriter::new(target_table, self.newline)?;
        ensure_select(query)?;

        let now = Local::now().naive_local();
        let path = match file_name {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(default_file_name(target_table, now)),
        };

        info!(
            "Starting export of query '{query}' to '{}'...",
            path.display()
        );

        let mut result = self.db.execute_query(query).await?;

        let file = File::create(&path)
            .await
            .map_err(|e| DumpError::io(&path, e))?;
        let mut out = BufWriter::new(file);

        let header = FileHeader {
            query,
            target_table,
            generated_at: now,
        };
        out.write_all(header.render(self.newline).as_bytes())
            .await
            .map_err(|e| DumpError::io(&path, e))?;

        let limit = self.batch_limit();
        let mut batch = TableData::new(result.columns);
        let mut rows = 0;
        loop {
            let read = batch
                .fill(&mut result.rows, limit, &mut self.encoder)
                .await?;
            for statement in writer.emit(&batch) {
                out.write_all(statement.as_bytes())
                    .await
                    .map_err(|e| DumpError::io(&path, e))?;
            }
            rows += read;

            if limit.map_or(true, |limit| read < limit) {
                break;
            }
            debug!("Wrote {rows} rows so far");
            batch.clear();
        }

        out.flush().await.map_err(|e| DumpError::io(&path, e))?;

        info!("Done exporting query '{query}' ({rows} rows)");
        Ok(ExportSummary {
            path,
            target_table: target_table.to_string(),
            rows,
        })
    }

    /// Export every row of `table` as INSERTs into a table of the same name
    pub async fn export_table(
        &mut self,
        table: &str,
        file_name: Option<&Path>,
    ) -> Result<ExportSummary> {
        let query = format!("SELECT * FROM {table}");
        self.export_query(&query, table, file_name).await
    }

    /// Export every table into its own file in `directory` (default `./out`).
    /// Stops at the first table that fails.
    pub async fn export_all_tables(
        &mut self,
        directory: Option<&Path>,
    ) -> Result<Vec<ExportSummary>> {
        let directory = match directory {
            Some(dir) => dir.to_path_buf(),
            None => Path::new(".").join(DEFAULT_EXPORT_DIR),
        };

        match tokio::fs::create_dir_all(&directory).await {
            Ok(()) => info!("Using output directory {}", directory.display()),
            Err(e) => warn!(
                "Directory {} cannot be created: {e}",
                directory.display()
            ),
        }

        let tables = self.db.list_tables().await?;
        info!("Found {} tables to export", tables.len());

        let mut summaries = Vec::with_capacity(tables.len());
        for table in &tables {
            let path = directory.join(default_file_name(table, Local::now().naive_local()));
            summaries.push(self.export_table(table, Some(&path)).await?);
        }

        Ok(summaries)
    }
}
