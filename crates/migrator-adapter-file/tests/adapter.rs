// migrator-adapter-file/tests/adapter.rs
// ============================================================================
// Module: File Adapter Tests
// Description: Validate SourceAdapter/TargetAdapter behavior against a CSV
//              directory.
// Purpose: Ensure schema introspection, header emission, and batched data
//          read/write round-trip correctly.
// Dependencies: migrator-adapter-file, migrator-core, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the CSV-directory-backed adapter.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use migrator_adapter_file::FileAdapter;
use migrator_adapter_file::FileAdapterConfig;
use migrator_core::ColumnIr;
use migrator_core::ColumnName;
use migrator_core::IrKind;
use migrator_core::Row;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeInfo;
use serde_json::Value;

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
                    raw: "TEXT".to_string(),
                    ir_kind: IrKind::Text,
                    nullable: true,
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
        constraints: Vec::new(),
        estimated_row_count: None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn create_write_and_read_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter =
        FileAdapter::open(FileAdapterConfig::new(dir.path())).expect("open adapter");
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    let rows = vec![Row::new(vec![
        ("id".to_string(), Value::String("1".to_string())),
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
async fn introspection_discovers_header_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter =
        FileAdapter::open(FileAdapterConfig::new(dir.path())).expect("open adapter");
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
    assert_eq!(introspected.columns.len(), 2);
    assert_eq!(introspected.columns[0].name, ColumnName::new("id"));
}

#[tokio::test]
async fn empty_field_round_trips_as_null() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter =
        FileAdapter::open(FileAdapterConfig::new(dir.path())).expect("open adapter");
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    let rows = vec![Row::new(vec![
        ("id".to_string(), Value::String("2".to_string())),
        ("label".to_string(), Value::Null),
    ])];
    TargetAdapter::write_batch(&mut adapter, &table, &rows)
        .await
        .expect("write batch");
    let read_back = TargetAdapter::read_batch(&mut adapter, &table, 0, 10)
        .await
        .expect("read batch");
    assert_eq!(read_back[0].columns[1].1, Value::Null);
}

#[tokio::test]
async fn drop_tables_removes_csv_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut adapter =
        FileAdapter::open(FileAdapterConfig::new(dir.path())).expect("open adapter");
    let table = sample_table();
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    TargetAdapter::drop_tables(&mut adapter, &[table.name.clone()])
        .await
        .expect("drop tables");
    assert!(!dir.path().join("widgets.csv").exists());
}
