// migrator-adapter-postgres/tests/adapter.rs
// ============================================================================
// Module: PostgreSQL Adapter Tests
// Description: Validate SourceAdapter/TargetAdapter behavior against a live
//              PostgreSQL database.
// Purpose: Ensure schema introspection, DDL emission, and batched data
//          read/write round-trip correctly.
// Dependencies: migrator-adapter-postgres, migrator-core, tokio
// ============================================================================

//! ## Overview
//! Conformance tests for the PostgreSQL-backed adapter. These require a
//! reachable server and are ignored by default; set
//! `MIGRATOR_TEST_POSTGRES_URL` and run with `--ignored` to exercise them.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use migrator_adapter_postgres::PostgresAdapter;
use migrator_adapter_postgres::PostgresAdapterConfig;
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

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_table() -> TableIr {
    TableIr {
        name: TableName::new("migrator_adapter_test_widgets"),
        columns: vec![
            ColumnIr {
                name: ColumnName::new("id"),
                type_info: TypeInfo {
                    raw: "integer".to_string(),
                    ir_kind: IrKind::Int32,
                    nullable: false,
                },
                ordinal: 1,
                default_expr: None,
            },
            ColumnIr {
                name: ColumnName::new("label"),
                type_info: TypeInfo {
                    raw: "text".to_string(),
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

async fn connect() -> Option<PostgresAdapter> {
    let url = std::env::var("MIGRATOR_TEST_POSTGRES_URL").ok()?;
    let config = PostgresAdapterConfig::new(url);
    Some(PostgresAdapter::connect(&config).await.expect("connect"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires MIGRATOR_TEST_POSTGRES_URL pointing at a live server"]
async fn create_write_and_read_round_trip() {
    let Some(mut adapter) = connect().await else {
        return;
    };
    let table = sample_table();
    TargetAdapter::drop_tables(&mut adapter, &[table.name.clone()])
        .await
        .expect("drop stale table");
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
    TargetAdapter::drop_tables(&mut adapter, &[table.name.clone()])
        .await
        .expect("drop table");
}

#[tokio::test]
#[ignore = "requires MIGRATOR_TEST_POSTGRES_URL pointing at a live server"]
async fn introspection_discovers_primary_key() {
    let Some(mut adapter) = connect().await else {
        return;
    };
    let table = sample_table();
    TargetAdapter::drop_tables(&mut adapter, &[table.name.clone()])
        .await
        .expect("drop stale table");
    TargetAdapter::create_table(&mut adapter, &table)
        .await
        .expect("create table");
    let schema = SourceAdapter::introspect_schema(&mut adapter)
        .await
        .expect("introspect");
    let introspected = schema
        .table(&TableName::new("migrator_adapter_test_widgets"))
        .expect("table present");
    assert!(introspected.constraints.iter().any(|constraint| matches!(
        constraint,
        ConstraintIr::PrimaryKey { columns, .. } if columns == &vec![ColumnName::new("id")]
    )));
    TargetAdapter::drop_tables(&mut adapter, &[table.name.clone()])
        .await
        .expect("drop table");
}
