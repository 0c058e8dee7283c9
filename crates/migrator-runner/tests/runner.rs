// migrator-runner/tests/runner.rs
// ============================================================================
// Integration tests: SQLite -> SQLite round trip and unknown-source-type
// preflight reporting, matching the two end-to-end scenarios that require
// no network fixture.
// ============================================================================

use std::path::PathBuf;

use migrator_config::MigrationConfig;
use migrator_config::OutputConfig;
use migrator_config::OutputMode;
use migrator_core::ColumnIr;
use migrator_core::ColumnName;
use migrator_core::ConstraintIr;
use migrator_core::IrKind;
use migrator_core::Row;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeInfo;
use migrator_adapter_sqlite::SqliteAdapter;
use migrator_adapter_sqlite::SqliteAdapterConfig;
use migrator_runner::MigrationRunner;
use migrator_runner::RunStatus;

fn widgets_table() -> TableIr {
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
                name: ColumnName::new("name"),
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

fn config(source_path: &PathBuf, target_path: &PathBuf) -> MigrationConfig {
    MigrationConfig {
        source: Some(format!("sqlite://{}", source_path.display())),
        target: Some(format!("sqlite://{}", target_path.display())),
        batch: migrator_config::BatchConfig::default(),
        output: OutputConfig {
            mode: OutputMode::Database,
            bundle_dir: None,
        },
        checkpoint_file: None,
        routines_mode: migrator_config::RoutinesMode::Skip,
        clean_on_failure: true,
        sampling: migrator_config::SamplingConfig::default(),
    }
}

#[tokio::test]
async fn sqlite_to_sqlite_round_trip_succeeds() {
    let source_dir = tempfile::tempdir().expect("tempdir");
    let target_dir = tempfile::tempdir().expect("tempdir");
    let runs_dir = tempfile::tempdir().expect("tempdir");

    let source_path = source_dir.path().join("source.db");
    let target_path = target_dir.path().join("target.db");

    let mut source = SqliteAdapter::open(&SqliteAdapterConfig::new(&source_path)).expect("open source");
    let table = widgets_table();
    TargetAdapter::create_table(&mut source, &table).await.expect("seed table");
    let rows = vec![
        Row::new(vec![
            ("id".to_string(), serde_json::json!(1)),
            ("name".to_string(), serde_json::json!("alpha")),
        ]),
        Row::new(vec![
            ("id".to_string(), serde_json::json!(2)),
            ("name".to_string(), serde_json::json!("beta")),
        ]),
    ];
    TargetAdapter::write_batch(&mut source, &table, &rows).await.expect("seed rows");

    let target = SqliteAdapter::open(&SqliteAdapterConfig::new(&target_path)).expect("open target");

    let cfg = config(&source_path, &target_path);
    let mut runner = MigrationRunner::new(source, target, cfg, runs_dir.path().to_path_buf());

    let outcome = runner.run().await.expect("run succeeds");
    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.exit_code(), 0);

    let report = outcome.report.expect("report present");
    assert!(report.is_match());
    let widgets_parity = report
        .summary
        .data_parity
        .get(&TableName::new("widgets"))
        .expect("widgets parity present");
    assert_eq!(widgets_parity.source_rows, 2);
    assert_eq!(widgets_parity.target_rows, 2);
}

#[tokio::test]
async fn dry_run_flags_unmappable_source_column_type() {
    let source_dir = tempfile::tempdir().expect("tempdir");
    let target_dir = tempfile::tempdir().expect("tempdir");

    let source_path = source_dir.path().join("source.db");
    let target_path = target_dir.path().join("target.db");

    let mut source = SqliteAdapter::open(&SqliteAdapterConfig::new(&source_path)).expect("open source");
    let mut table = widgets_table();
    table.columns.push(ColumnIr {
        name: ColumnName::new("geom"),
        type_info: TypeInfo {
            raw: "GEOMETRY".to_string(),
            ir_kind: IrKind::Unknown {
                raw: "GEOMETRY".to_string(),
            },
            nullable: true,
        },
        ordinal: 3,
        default_expr: None,
    });
    TargetAdapter::create_table(&mut source, &table).await.expect("seed table");

    let target = SqliteAdapter::open(&SqliteAdapterConfig::new(&target_path)).expect("open target");
    let cfg = config(&source_path, &target_path);
    let mut runner = MigrationRunner::new(source, target, cfg, target_dir.path().to_path_buf());

    let limitations = runner.dry_run().await.expect("dry run succeeds");
    assert!(
        limitations
            .iter()
            .any(|item| item.description.contains("no dialect-neutral mapping")),
        "expected a lossy-mapping limitation for the unrecognized column type, got {limitations:?}"
    );
}
