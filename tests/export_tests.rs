//! Export runs against the in-memory database, replayed back where it matters.

use chrono::NaiveDate;
use dump_core::{ColumnMeta, ColumnType, UnsupportedKind, Value, BINARY_PLACEHOLDER};
use sql_insert_dump::testing::MemoryDatabase;
use sql_insert_dump::{ExportOpts, Exporter, NewlineStyle, Replayer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts WARN events seen by the subscriber it is layered on
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn orders_columns() -> Vec<ColumnMeta> {
    vec![
        ColumnMeta::new("id", ColumnType::Integer, "int8"),
        ColumnMeta::new("customer", ColumnType::Character, "varchar"),
        ColumnMeta::new("placed_at", ColumnType::Timestamp, "timestamp"),
        ColumnMeta::new("paid", ColumnType::Boolean, "bool"),
    ]
}

fn order_row(id: i64) -> Vec<Value> {
    let placed_at = NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_milli_opt(9, 5, 2, 40)
        .unwrap();
    vec![
        Value::Int(id),
        Value::Text(format!("customer {id}")),
        Value::Timestamp(placed_at),
        Value::Bool(id % 2 == 0),
    ]
}

fn insert_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter(|line| line.starts_with("INSERT"))
        .collect()
}

#[tokio::test]
async fn test_export_then_replay_inserts_every_row() {
    let dir = TempDir::new().unwrap();
    let mut source = MemoryDatabase::new();
    source.add_table("orders", orders_columns(), (1..=25).map(order_row).collect());

    let path = dir.path().join("orders.sql");
    let opts = ExportOpts {
        batch_size: 10,
        ..Default::default()
    };
    let mut exporter = Exporter::new(&source, opts).await.unwrap();
    let summary = exporter.export_table("orders", Some(&path)).await.unwrap();
    assert_eq!(summary.rows, 25);
    assert_eq!(summary.target_table, "orders");

    let content = std::fs::read_to_string(&path).unwrap();
    let inserts = insert_lines(&content);
    assert_eq!(inserts.len(), 25);
    assert_eq!(
        inserts[0],
        "INSERT INTO orders (id,customer,placed_at,paid) \
         VALUES (1,'customer 1','2024-03-07 09:05:02.0040',false);"
    );

    let mut target = MemoryDatabase::new();
    let replayed = Replayer::new(&mut target).run_file(&path).await.unwrap();
    assert_eq!(replayed.statements, 25);
    assert_eq!(target.visible_rows("orders"), 25);
    assert_eq!(target.commit_count(), 1);
}

#[tokio::test]
async fn test_empty_result_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let mut db = MemoryDatabase::new();
    db.add_table("orders", orders_columns(), Vec::new());

    let path = dir.path().join("empty.sql");
    let mut exporter = Exporter::new(&db, ExportOpts::default()).await.unwrap();
    let summary = exporter.export_table("orders", Some(&path)).await.unwrap();
    assert_eq!(summary.rows, 0);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.is_empty());
    assert!(content.lines().all(|line| line.starts_with("-- ")));
    assert!(content.contains("-- Exported query: SELECT * FROM orders"));
}

#[tokio::test]
async fn test_query_export_keeps_column_order() {
    let dir = TempDir::new().unwrap();
    let query = "SELECT paid, id FROM orders";
    let mut db = MemoryDatabase::new();
    db.add_query(
        query,
        vec![
            ColumnMeta::new("paid", ColumnType::Boolean, "bool"),
            ColumnMeta::new("id", ColumnType::Integer, "int8"),
        ],
        vec![
            vec![Value::Bool(true), Value::Int(7)],
            vec![Value::Null, Value::Int(8)],
        ],
    );

    let path = dir.path().join("paid.sql");
    let mut exporter = Exporter::new(&db, ExportOpts::default()).await.unwrap();
    exporter
        .export_query(query, "orders_copy", Some(&path))
        .await
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        insert_lines(&content),
        vec![
            "INSERT INTO orders_copy (paid,id) VALUES (true,7);",
            "INSERT INTO orders_copy (paid,id) VALUES (NULL,8);",
        ]
    );
}

#[tokio::test]
async fn test_unsupported_column_warns_once() {
    let dir = TempDir::new().unwrap();
    let mut db = MemoryDatabase::new();
    db.add_table(
        "files",
        vec![
            ColumnMeta::new("id", ColumnType::Integer, "int4"),
            ColumnMeta::new(
                "payload",
                ColumnType::Unsupported(UnsupportedKind::Binary),
                "bytea",
            ),
        ],
        (0..100)
            .map(|i| vec![Value::Int(i), Value::Bytes(vec![0xde, 0xad])])
            .collect(),
    );

    let warnings = Arc::new(AtomicUsize::new(0));
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(WarnCounter(warnings.clone())),
    );

    let path = dir.path().join("files.sql");
    let opts = ExportOpts {
        batch_size: 7,
        ..Default::default()
    };
    let mut exporter = Exporter::new(&db, opts).await.unwrap();
    exporter.export_table("files", Some(&path)).await.unwrap();

    assert_eq!(warnings.load(Ordering::SeqCst), 1);
    assert_eq!(exporter.encoder().warnings().len(), 1);

    let content = std::fs::read_to_string(&path).unwrap();
    let inserts = insert_lines(&content);
    assert_eq!(inserts.len(), 100);
    assert!(inserts
        .iter()
        .all(|line| line.ends_with(&format!(",{BINARY_PLACEHOLDER});"))));
}

#[tokio::test]
async fn test_export_all_tables_into_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("out");
    let mut db = MemoryDatabase::new().with_encoding("WIN1252");
    db.add_table("orders", orders_columns(), (1..=3).map(order_row).collect());
    db.add_table(
        "tags",
        vec![ColumnMeta::new("name", ColumnType::Character, "text")],
        vec![vec![Value::from("red")], vec![Value::from("blue")]],
    );

    let mut exporter = Exporter::new(&db, ExportOpts::default()).await.unwrap();
    let summaries = exporter.export_all_tables(Some(&out)).await.unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].rows, 3);
    assert_eq!(summaries[1].rows, 2);
    for summary in &summaries {
        assert_eq!(summary.path.parent(), Some(out.as_path()));
        let name = summary.path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(&format!(" {}.sql", summary.target_table)));

        // WIN1252 resolves the automatic newline style to CRLF
        let content = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(
            content.matches("\r\n").count(),
            content.matches('\n').count()
        );
    }
}

#[tokio::test]
async fn test_export_all_tables_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let mut db = MemoryDatabase::new();
    db.add_table("orders", orders_columns(), vec![order_row(1)]);
    db.add_table("broken", orders_columns(), Vec::new());
    db.add_table("tags", orders_columns(), vec![order_row(2)]);
    // rows wider than the declared columns fail while buffering
    db.add_query("SELECT * FROM broken", Vec::new(), vec![vec![Value::Int(1)]]);

    let opts = ExportOpts {
        newline: NewlineStyle::Lf,
        ..Default::default()
    };
    let mut exporter = Exporter::new(&db, opts).await.unwrap();
    assert!(exporter
        .export_all_tables(Some(dir.path()))
        .await
        .is_err());

    let written: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(written.iter().any(|name| name.ends_with(" orders.sql")));
    assert!(!written.iter().any(|name| name.ends_with(" tags.sql")));
}

#[tokio::test]
async fn test_mixed_case_table_is_quoted() {
    let dir = TempDir::new().unwrap();
    let mut db = MemoryDatabase::new();
    db.add_table(
        "\"OrderLines\"",
        vec![
            ColumnMeta::new("OrderId", ColumnType::Integer, "int4"),
            ColumnMeta::new("qty", ColumnType::Integer, "int4"),
        ],
        vec![vec![Value::Int(1), Value::Int(3)]],
    );

    let mut exporter = Exporter::new(&db, ExportOpts::default()).await.unwrap();
    let summaries = exporter.export_all_tables(Some(dir.path())).await.unwrap();
    assert_eq!(summaries.len(), 1);

    let name = summaries[0].path.file_name().unwrap().to_str().unwrap();
    assert!(name.ends_with(" OrderLines.sql"), "{name}");

    let content = std::fs::read_to_string(&summaries[0].path).unwrap();
    assert!(content.contains("-- Exported query: SELECT * FROM \"OrderLines\""));
    assert_eq!(
        insert_lines(&content),
        vec!["INSERT INTO \"OrderLines\" (\"OrderId\",qty) VALUES (1,3);"]
    );

    let mut target = MemoryDatabase::new();
    Replayer::new(&mut target)
        .run_file(&summaries[0].path)
        .await
        .unwrap();
    assert_eq!(target.visible_rows("\"OrderLines\""), 1);
}
