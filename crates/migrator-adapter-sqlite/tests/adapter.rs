// migrator-adapter-sqlite/tests/adapter.rs
// ============================================================================
// Module: SQLite Adapter Tests
// Description: Validate SourceAdapter/TargetAdapter behavior against SQLite.
// Purpose: Ensure schema introspection, DDL emission, and batched data
//          read/write round-trip correctly.
// Dependencies: migrator-adapter-sqlite, migrator-core, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed adapter, exercising table
//! creation, introspection, and row round-tripping end to end.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use migrator_adapter_sqlite::SqliteAdapter;
use migrator_adapter_sqlite::SqliteAdapterConfig;
use migrator_core::ColumnIr;
use migrator_core::ColumnName;
use migrator_core::ConstraintIr;
use migrator_core::IrKind;
use migrator_core::Row;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeInfo;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_table() -> TableIr {
    TableIr {
        name: TableName::new("widgets"),
        columns: vec![
            ColumnIr {
                name: ColumnName::new("id"),
                type_info: TypeInfo {
                    raw: "INTEGER".to_string(),
                    ir_kind: IrKind::Int64,
                    nullable: false,
                },
                ordinal: 1,
                default_expr: None,
            },
            ColumnIr {
                name: ColumnName::new("label"),
                type_info: TypeInfo {
                    raw: "TEXT".to_string(),
                    ir_kind: IrKind::Text,
                    nullable: true,
                },
                ordinal: 2,
                default_expr: None,
            },
        ],
        constraints: vec![ConstraintIr::PrimaryKey {
            name: None,
            columns: vec![ColumnName::new("id")],
        }],
        estimated_row_count: None,
    }
}

fn open_adapter(dir: &TempDir) -> SqliteAdapter {
    let config = SqliteAdapterConfig::new(dir.path().join("test.db"));
    SqliteAdapter::open(&config).expect("open adapter")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn create_write_and_read_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter = open_adapter(&dir);
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    let rows = vec![Row::new(vec![
        ("id".to_string(), Value::from(1)),
        ("label".to_string(), Value::String("widget-a".to_string())),
    ])];
    TargetAdapter::write_batch(&mut adapter, &table, &rows)
        .await
        .expect("write batch");
    let read_back = TargetAdapter::read_batch(&mut adapter, &table, 0, 10)
        .await
        .expect("read batch");
    assert_eq!(read_back.len(), 1);
    assert_eq!(
        read_back[0].columns[1].1,
        Value::String("widget-a".to_string())
    );
}

#[tokio::test]
async fn introspection_discovers_primary_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter = open_adapter(&dir);
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    let schema = SourceAdapter::introspect_schema(&mut adapter)
        .await
        .expect("introspect");
    let introspected = schema
        .table(&TableName::new("widgets"))
        .expect("table present");
    assert!(introspected.constraints.iter().any(|constraint| matches!(
        constraint,
        ConstraintIr::PrimaryKey { columns, .. } if columns == &vec![ColumnName::new("id")]
    )));
}

#[tokio::test]
async fn pagination_partitions_rows_without_duplication() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter = open_adapter(&dir);
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    let rows: Vec<Row> = (1..=5)
        .map(|id| {
            Row::new(vec![
                ("id".to_string(), Value::from(id)),
                ("label".to_string(), Value::String(format!("widget-{id}"))),
            ])
        })
        .collect();
    TargetAdapter::write_batch(&mut adapter, &table, &rows)
        .await
        .expect("write batch");

    let first_page = TargetAdapter::read_batch(&mut adapter, &table, 0, 2)
        .await
        .expect("read first page");
    let second_page = TargetAdapter::read_batch(&mut adapter, &table, 2, 2)
        .await
        .expect("read second page");
    let last_page = TargetAdapter::read_batch(&mut adapter, &table, 4, 2)
        .await
        .expect("read last page");

    assert_eq!(first_page.len(), 2);
    assert_eq!(second_page.len(), 2);
    assert_eq!(last_page.len(), 1);
}

#[tokio::test]
async fn drop_tables_removes_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter = open_adapter(&dir);
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    TargetAdapter::drop_tables(&mut adapter, &[table.name.clone()])
        .await
        .expect("drop tables");
    let schema = SourceAdapter::introspect_schema(&mut adapter)
        .await
        .expect("introspect");
    assert!(schema.table(&TableName::new("widgets")).is_none());
}
