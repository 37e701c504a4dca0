//! Command-line interface for sql-insert-dump
//!
//! # Usage Examples
//!
//! ## Export
//! ```bash
//! # One table, generated file name in the working directory
//! sql-insert-dump table customers --host db --dbname shop
//!
//! # A query into a named file, CRLF line endings
//! sql-insert-dump query "SELECT * FROM customers WHERE active" \
//!   --target-table customers -o active.sql --newline CRLF
//!
//! # Every table into ./backup
//! sql-insert-dump all --directory backup
//! ```
//!
//! ## Replay
//! ```bash
//! sql-insert-dump run "backup/2024-03-07_09-05-02 customers.sql"
//! ```
//!
//! Connection options fall back to the usual `PGHOST`, `PGPORT`, `PGUSER`,
//! `PGPASSWORD` and `PGDATABASE` environment variables.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use dump_postgresql::{ConnectOpts, PgDatabase};
use sql_insert_dump::{ExportOpts, Exporter, Replayer, SourceOpts};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sql-insert-dump")]
#[command(about = "Dump PostgreSQL tables to SQL INSERT files and replay them")]
#[command(long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all rows of one table
    Table {
        /// Table to export
        table: String,

        /// Output file (default: "<datetime> <table>.sql")
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source_opts: SourceOpts,

        #[command(flatten)]
        export_opts: ExportOpts,
    },

    /// Export the result of a SELECT query
    Query {
        /// SELECT query to export
        query: String,

        /// Table name used in the generated INSERT statements
        #[arg(long)]
        target_table: String,

        /// Output file (default: "<datetime> <target table>.sql")
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source_opts: SourceOpts,

        #[command(flatten)]
        export_opts: ExportOpts,
    },

    /// Export every table into its own file
    All {
        /// Output directory (default: ./out)
        #[arg(long)]
        directory: Option<PathBuf>,

        #[command(flatten)]
        source_opts: SourceOpts,

        #[command(flatten)]
        export_opts: ExportOpts,
    },

    /// Replay a dump file in one transaction
    Run {
        /// Dump file to run
        file: PathBuf,

        #[command(flatten)]
        source_opts: SourceOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn connect(source_opts: &SourceOpts) -> anyhow::Result<PgDatabase> {
    let opts = ConnectOpts::from(source_opts);
    PgDatabase::connect(&opts)
        .await
        .with_context(|| format!("Failed to connect to {}", opts.display_target()))
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Table {
            table,
            output,
            source_opts,
            export_opts,
        } => {
            let db = connect(&source_opts).await?;
            let mut exporter = Exporter::new(&db, export_opts).await?;
            let summary = exporter
                .export_table(&table, output.as_deref())
                .await
                .with_context(|| format!("Failed to export table {table}"))?;
            info!(
                "Exported {} rows to {}",
                summary.rows,
                summary.path.display()
            );
        }
        Commands::Query {
            query,
            target_table,
            output,
            source_opts,
            export_opts,
        } => {
            let db = connect(&source_opts).await?;
            let mut exporter = Exporter::new(&db, export_opts).await?;
            let summary = exporter
                .export_query(&query, &target_table, output.as_deref())
                .await
                .with_context(|| format!("Failed to export query '{query}'"))?;
            info!(
                "Exported {} rows to {}",
                summary.rows,
                summary.path.display()
            );
        }
        Commands::All {
            directory,
            source_opts,
            export_opts,
        } => {
            let db = connect(&source_opts).await?;
            let mut exporter = Exporter::new(&db, export_opts).await?;
            let summaries = exporter
                .export_all_tables(directory.as_deref())
                .await
                .context("Failed to export all tables")?;
            let rows: usize = summaries.iter().map(|s| s.rows).sum();
            info!("Exported {} tables ({rows} rows)", summaries.len());
        }
        Commands::Run { file, source_opts } => {
            let mut db = connect(&source_opts).await?;
            let summary = Replayer::new(&mut db)
                .run_file(&file)
                .await
                .with_context(|| format!("Could not run file {}", file.display()))?;
            info!(
                "Committed {} statements ({} rows)",
                summary.statements, summary.rows_affected
            );
        }
    }

    Ok(())
}
