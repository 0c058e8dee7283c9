// migrator-runner/src/runner.rs
// ============================================================================
// Module: Migration Runner (C5)
// Description: Orchestrates introspection, preflight, DDL emission, batched
//              data copy, routine/trigger translation, and validation.
// Purpose: The single entry point that turns a configured source/target
//          adapter pair into a finished, checksummed run bundle.
// Dependencies: migrator-core, migrator-config, crate::{bundle, report,
//               routines}, thiserror, tracing
// ============================================================================

//! ## Overview
//! `MigrationRunner` drives the full algorithm described by the external
//! interface contract: allocate a run, connect, introspect, preflight,
//! plan table order, emit DDL, copy data in checkpointed batches,
//! translate routines and triggers, validate, and finalize the bundle.
//! Every step that can fail short-circuits the run; every step that
//! completes leaves the bundle in a state `resume` can pick back up from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::PathBuf;

use migrator_config::MigrationConfig;
use migrator_core::AdapterError;
use migrator_core::ConstraintIr;
use migrator_core::Dialect;
use migrator_core::FingerprintError;
use migrator_core::RunId;
use migrator_core::SchemaIr;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeInfo;
use migrator_core::TypeRegistry;
use thiserror::Error;

use crate::bundle::BundleError;
use crate::bundle::Checkpoint;
use crate::bundle::RunBundle;
use crate::bundle::RunManifest;
use crate::bundle::RunStatus;
use crate::report::Limitation;
use crate::report::LimitationCategory;
use crate::report::Severity;
use crate::report::ValidationError;
use crate::report::ValidationReport;
use crate::report::generate_report;
use crate::report::join_table_names;
use crate::report::render_limitations_text;
use crate::report::sorted_limitations;
use crate::routines::RoutineCapabilityMode;
use crate::routines::TranslationOutcome;
use crate::routines::classify_trigger;
use crate::routines::translate_routine;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the migration runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A source or target adapter operation failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// A run bundle operation failed.
    #[error(transparent)]
    Bundle(#[from] BundleError),
    /// Fingerprint computation failed.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    /// Validation report generation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Configuration was invalid for this run.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The run was requested to resume but no such run bundle exists.
    #[error("no run bundle found: {0}")]
    NoSuchRun(String),
}

impl RunnerError {
    /// Maps this error onto the external interface's exit code scheme.
    /// Every variant here represents a fatal failure before or during a
    /// run, so every variant maps to `1`; a completed run with a parity
    /// mismatch is reported through [`RunOutcome::exit_code`] instead,
    /// never through this type.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

// ============================================================================
// SECTION: Run outcome
// ============================================================================

/// Result of a completed (or cancelled) run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Identifier of the run this outcome describes.
    pub run_id: RunId,
    /// Final disposition recorded in the manifest.
    pub status: RunStatus,
    /// Finalized manifest.
    pub manifest: RunManifest,
    /// Validation report, present for every run that reached the
    /// validation stage.
    pub report: Option<ValidationReport>,
}

impl RunOutcome {
    /// Maps this outcome onto the external interface's exit code scheme:
    /// `0` success, `2` validation mismatch, `3` cancelled, `1` otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Success => 0,
            RunStatus::ValidationMismatch => 2,
            RunStatus::Cancelled => 3,
            RunStatus::Failed | RunStatus::Running => 1,
        }
    }
}

// ============================================================================
// SECTION: Migration Runner
// ============================================================================

/// Orchestrates one migration run between a source and a target adapter.
pub struct MigrationRunner<Src, Tgt> {
    source: Src,
    target: Tgt,
    config: MigrationConfig,
    runs_root: PathBuf,
    registry: TypeRegistry,
}

impl<Src, Tgt> MigrationRunner<Src, Tgt>
where
    Src: SourceAdapter,
    Tgt: TargetAdapter,
{
    /// Builds a runner over an already-connected source and target,
    /// writing run bundles under `runs_root`.
    pub const fn new(source: Src, target: Tgt, config: MigrationConfig, runs_root: PathBuf) -> Self {
        Self {
            source,
            target,
            config,
            runs_root,
            registry: TypeRegistry::new(),
        }
    }

    /// Runs the full migration algorithm: introspect, preflight, plan
    /// order, emit DDL, copy data, translate routines/triggers, validate,
    /// and finalize the bundle.
    ///
    /// A validation parity mismatch is not itself a fatal error; it is
    /// reported through the returned [`RunOutcome`]. Only a connection,
    /// I/O, or configuration failure returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when an adapter, bundle, or fingerprint
    /// operation fails.
    pub async fn run(&mut self) -> Result<RunOutcome, RunnerError> {
        let target_dialect = self.target_dialect()?;
        let run_id = generate_run_id();
        let bundle = RunBundle::create(&self.runs_root, &run_id)?;
        let started_at = now_rfc3339();
        bundle.append_log(&format!("run {run_id} started"))?;

        let source_schema = SourceAdapter::introspect_schema(&mut self.source).await?;
        bundle.append_log(&format!(
            "introspected {} source tables",
            source_schema.tables.len()
        ))?;

        let (order, had_cycle) = plan_table_order(&source_schema);
        let mut limitations = preflight(&source_schema, had_cycle, &self.registry, Some(&target_dialect));

        let ddl_result = self.emit_ddl(&source_schema, &order, &bundle).await;
        let created = match ddl_result {
            Ok(created) => created,
            Err(err) => {
                bundle.append_log(&format!("ddl emission failed: {err}"))?;
                if self.config.clean_on_failure {
                    self.rollback_created(&[]).await;
                }
                return Err(err);
            }
        };

        if let Err(err) = self.copy_all_tables(&source_schema, &order, &bundle).await {
            bundle.append_log(&format!("data copy failed: {err}"))?;
            if self.config.clean_on_failure {
                self.rollback_created(&created).await;
            }
            return Err(err);
        }

        bundle.write_atomic(
            "output/post_migration.sql",
            generate_post_migration_sql(&source_schema, &target_dialect).as_bytes(),
        )?;

        let mode = RoutineCapabilityMode::from(self.config.routines_mode);
        let (routines_sql, routine_report_md, routine_limitations) =
            translate_routines_and_triggers(&source_schema, mode, &target_dialect);
        limitations.extend(routine_limitations);
        bundle.write_atomic("output/routines.sql", routines_sql.as_bytes())?;
        bundle.write_atomic(
            "reports/routine_migration_report.md",
            routine_report_md.as_bytes(),
        )?;

        let target_schema = self.introspect_target_schema(&order).await?;
        let mut report = generate_report(
            &mut self.source,
            &mut self.target,
            &source_schema,
            &target_schema,
            &self.registry,
            &target_dialect,
            self.config.batch.size,
            &self.config.sampling,
        )
        .await?;
        report.limitations = sorted_limitations([report.limitations, limitations].concat());

        bundle.write_json_atomic("reports/validation_summary.json", &report.summary)?;
        bundle.write_atomic("reports/validation_report.txt", report.render_text().as_bytes())?;
        bundle.write_json_atomic("reports/limitations.json", &report.limitations)?;
        bundle.write_atomic(
            "reports/limitations.txt",
            render_limitations_text(&report.limitations).as_bytes(),
        )?;
        bundle.write_atomic(
            "reports/audit_report.md",
            render_audit_report(&run_id, &started_at, &report).as_bytes(),
        )?;

        let status = if report.is_match() {
            RunStatus::Success
        } else {
            RunStatus::ValidationMismatch
        };
        let ended_at = now_rfc3339();
        let source_dialect = self.config.source_dialect();
        let manifest = bundle.finalize(
            &started_at,
            &ended_at,
            source_dialect.as_ref().map_or("unknown", Dialect::as_str),
            target_dialect.as_str(),
            status,
            Some(report.summary.dataset_fingerprint.clone()),
        )?;
        bundle.append_log(&format!("run {run_id} finished with status {status:?}"))?;

        Ok(RunOutcome {
            run_id,
            status,
            manifest,
            report: Some(report),
        })
    }

    /// Reopens a previously started run, reads its checkpoint, and
    /// continues copying data from `(current_table, current_offset)`,
    /// skipping tables already in `completed_tables`. Tables and DDL are
    /// assumed already emitted by the original run.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::NoSuchRun`] when the bundle does not exist,
    /// or [`RunnerError::Adapter`] when the source or target is
    /// unreachable.
    pub async fn resume(&mut self, run_id: &RunId) -> Result<RunOutcome, RunnerError> {
        let target_dialect = self.target_dialect()?;
        let bundle = RunBundle::reopen(&self.runs_root, run_id)
            .map_err(|_| RunnerError::NoSuchRun(run_id.as_str().to_string()))?;
        let started_at = now_rfc3339();
        bundle.append_log(&format!("run {run_id} resumed"))?;

        let source_schema = SourceAdapter::introspect_schema(&mut self.source).await?;
        let (order, had_cycle) = plan_table_order(&source_schema);
        let mut limitations = preflight(&source_schema, had_cycle, &self.registry, Some(&target_dialect));

        let mut checkpoint = bundle.read_checkpoint()?.unwrap_or_default();
        self.copy_remaining_tables(&source_schema, &order, &bundle, &mut checkpoint).await?;

        let mode = RoutineCapabilityMode::from(self.config.routines_mode);
        let (routines_sql, routine_report_md, routine_limitations) =
            translate_routines_and_triggers(&source_schema, mode, &target_dialect);
        limitations.extend(routine_limitations);
        bundle.write_atomic("output/routines.sql", routines_sql.as_bytes())?;
        bundle.write_atomic(
            "reports/routine_migration_report.md",
            routine_report_md.as_bytes(),
        )?;

        let target_schema = self.introspect_target_schema(&order).await?;
        let mut report = generate_report(
            &mut self.source,
            &mut self.target,
            &source_schema,
            &target_schema,
            &self.registry,
            &target_dialect,
            self.config.batch.size,
            &self.config.sampling,
        )
        .await?;
        report.limitations = sorted_limitations([report.limitations, limitations].concat());

        bundle.write_json_atomic("reports/validation_summary.json", &report.summary)?;
        bundle.write_atomic("reports/validation_report.txt", report.render_text().as_bytes())?;
        bundle.write_json_atomic("reports/limitations.json", &report.limitations)?;
        bundle.write_atomic(
            "reports/limitations.txt",
            render_limitations_text(&report.limitations).as_bytes(),
        )?;
        bundle.write_atomic(
            "reports/audit_report.md",
            render_audit_report(run_id, &started_at, &report).as_bytes(),
        )?;

        let status = if report.is_match() {
            RunStatus::Success
        } else {
            RunStatus::ValidationMismatch
        };
        let ended_at = now_rfc3339();
        let source_dialect = self.config.source_dialect();
        let manifest = bundle.finalize(
            &started_at,
            &ended_at,
            source_dialect.as_ref().map_or("unknown", Dialect::as_str),
            target_dialect.as_str(),
            status,
            Some(report.summary.dataset_fingerprint.clone()),
        )?;

        Ok(RunOutcome {
            run_id: run_id.clone(),
            status,
            manifest,
            report: Some(report),
        })
    }

    /// Performs introspection and preflight only; writes no DDL and no
    /// data. Returns the validation report that would compare the source
    /// against its own schema, which is always a full match — `dry_run`
    /// exists to surface preflight limitations (lossy mappings, reserved
    /// words, deferred defaults) before a real run commits anything.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Adapter`] when the source cannot be
    /// introspected.
    pub async fn dry_run(&mut self) -> Result<Vec<Limitation>, RunnerError> {
        let target_dialect = self.config.target_dialect();
        let source_schema = SourceAdapter::introspect_schema(&mut self.source).await?;
        let (_, had_cycle) = plan_table_order(&source_schema);
        Ok(sorted_limitations(preflight(&source_schema, had_cycle, &self.registry, target_dialect.as_ref())))
    }

    fn target_dialect(&self) -> Result<Dialect, RunnerError> {
        self.config
            .target_dialect()
            .ok_or_else(|| RunnerError::Config("could not determine target dialect from target URL".to_string()))
    }

    async fn emit_ddl(
        &mut self,
        schema: &SchemaIr,
        order: &[TableName],
        bundle: &RunBundle,
    ) -> Result<Vec<TableName>, RunnerError> {
        let mut created = Vec::new();
        for table_name in order {
            let Some(table) = schema.table(table_name) else {
                continue;
            };
            TargetAdapter::create_table(&mut self.target, table).await?;
            created.push(table_name.clone());
        }
        bundle.append_log(&format!("emitted ddl for {} tables", created.len()))?;
        Ok(created)
    }

    /// Reads back the target's actual schema for every table named in
    /// `order`, once DDL emission has run. Tables the target has not
    /// created (or does not have yet) are simply absent from the result,
    /// which the report generator already treats as a `tables_only_source`
    /// limitation.
    async fn introspect_target_schema(&mut self, order: &[TableName]) -> Result<SchemaIr, RunnerError> {
        let mut tables = Vec::with_capacity(order.len());
        for table_name in order {
            if let Some(table) = TargetAdapter::get_table_schema(&mut self.target, table_name).await? {
                tables.push(table);
            }
        }
        Ok(SchemaIr {
            tables,
            views: Vec::new(),
            routines: Vec::new(),
            triggers: Vec::new(),
        })
    }

    async fn copy_all_tables(
        &mut self,
        schema: &SchemaIr,
        order: &[TableName],
        bundle: &RunBundle,
    ) -> Result<(), RunnerError> {
        let mut checkpoint = Checkpoint::default();
        self.copy_remaining_tables(schema, order, bundle, &mut checkpoint).await
    }

    async fn copy_remaining_tables(
        &mut self,
        schema: &SchemaIr,
        order: &[TableName],
        bundle: &RunBundle,
        checkpoint: &mut Checkpoint,
    ) -> Result<(), RunnerError> {
        if self.config.batch.parallelism > 1 {
            tracing::warn!(
                parallelism = self.config.batch.parallelism,
                "parallel data copy was requested but the adapter contract does not expose \
                 per-table connection cloning; degrading to sequential copy"
            );
        }
        for table_name in order {
            if checkpoint.is_completed(table_name) {
                continue;
            }
            let Some(table) = schema.table(table_name) else {
                continue;
            };
            self.copy_table(table, bundle, checkpoint).await?;
            checkpoint.completed_tables.push(table_name.clone());
            checkpoint.current_table = None;
            checkpoint.current_offset = 0;
            bundle.write_checkpoint(checkpoint)?;
        }
        Ok(())
    }

    async fn copy_table(
        &mut self,
        table: &TableIr,
        bundle: &RunBundle,
        checkpoint: &mut Checkpoint,
    ) -> Result<(), RunnerError> {
        let batch_size = self.config.batch.size;
        let mut offset = if checkpoint.current_table.as_ref() == Some(&table.name) {
            checkpoint.current_offset
        } else {
            0
        };

        loop {
            let rows = SourceAdapter::read_batch(&mut self.source, table, offset, batch_size).await?;
            if rows.is_empty() {
                break;
            }
            let fetched = u64::try_from(rows.len()).unwrap_or(u64::MAX);
            TargetAdapter::write_batch(&mut self.target, table, &rows).await?;
            offset += fetched;
            checkpoint.current_table = Some(table.name.clone());
            checkpoint.current_offset = offset;
            bundle.write_checkpoint(checkpoint)?;
        }
        bundle.append_log(&format!("copied table {} ({offset} rows)", table.name))?;
        Ok(())
    }

    async fn rollback_created(&mut self, created: &[TableName]) {
        if created.is_empty() {
            return;
        }
        let mut reversed = created.to_vec();
        reversed.reverse();
        if let Err(error) = TargetAdapter::drop_tables(&mut self.target, &reversed).await {
            tracing::warn!(%error, "clean_on_failure rollback could not drop every created table");
        }
    }
}

// ============================================================================
// SECTION: Run identifiers and timestamps
// ============================================================================

fn generate_run_id() -> RunId {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    RunId::new(format!("run-{nanos}-{}", std::process::id()))
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

// ============================================================================
// SECTION: Table ordering
// ============================================================================

/// Topologically sorts `schema`'s tables by foreign-key dependency, leaves
/// first, so a referenced table is always created before the table that
/// references it. When a cycle prevents a clean topological order, the
/// lexicographically smallest remaining table is force-placed and the
/// second return value is `true`, so the caller can record a limitation;
/// the adapter contract has no separate "add constraint" step, so a
/// cyclic pair may still fail DDL emission on a target that enforces FK
/// existence at creation time.
fn plan_table_order(schema: &SchemaIr) -> (Vec<TableName>, bool) {
    let names: BTreeSet<TableName> = schema.tables.iter().map(|table| table.name.clone()).collect();
    let dependencies: BTreeMap<TableName, BTreeSet<TableName>> = schema
        .tables
        .iter()
        .map(|table| {
            let deps = table
                .dependencies()
                .into_iter()
                .filter(|dep| names.contains(*dep) && *dep != &table.name)
                .cloned()
                .collect();
            (table.name.clone(), deps)
        })
        .collect();

    let mut placed: BTreeSet<TableName> = BTreeSet::new();
    let mut order = Vec::with_capacity(dependencies.len());
    let mut had_cycle = false;

    while order.len() < dependencies.len() {
        let mut ready: Vec<TableName> = dependencies
            .iter()
            .filter(|(name, deps)| !placed.contains(*name) && deps.iter().all(|dep| placed.contains(dep)))
            .map(|(name, _)| name.clone())
            .collect();
        ready.sort();

        if ready.is_empty() {
            had_cycle = true;
            if let Some(next) = dependencies.keys().find(|name| !placed.contains(*name)) {
                ready.push(next.clone());
            } else {
                break;
            }
        }

        for name in ready {
            if placed.insert(name.clone()) {
                order.push(name);
            }
        }
    }

    (order, had_cycle)
}

// ============================================================================
// SECTION: Preflight
// ============================================================================

const RESERVED_WORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "TABLE", "FROM", "WHERE", "ORDER", "GROUP", "USER",
    "INDEX", "VIEW", "TRIGGER", "PRIMARY", "FOREIGN", "KEY", "UNIQUE", "CHECK", "DEFAULT", "NULL",
    "VALUES", "INTO", "JOIN", "UNION", "LIMIT", "OFFSET", "GRANT", "REVOKE", "COLUMN", "CONSTRAINT",
];

fn is_reserved_word(identifier: &str) -> bool {
    RESERVED_WORDS.contains(&identifier.to_ascii_uppercase().as_str())
}

/// Runs the preflight checks described by the migration runner's
/// algorithm: cyclic FK warning, unmappable type detection, lossy-type-
/// conversion detection against the target dialect (when known),
/// reserved-word and case-insensitive collision detection, and
/// deferred-default reporting. Never fails; every finding is recorded as a
/// [`Limitation`]. `target_dialect` is `None` only for a dry run invoked
/// without a configured target, in which case the lossy-conversion check
/// is skipped since there is no target to check against.
fn preflight(schema: &SchemaIr, had_cycle: bool, registry: &TypeRegistry, target_dialect: Option<&Dialect>) -> Vec<Limitation> {
    let mut limitations = Vec::new();

    if had_cycle {
        limitations.push(Limitation {
            category: LimitationCategory::BehaviorDifferences,
            object_type: "schema".to_string(),
            object_name: "*".to_string(),
            description: "cyclic foreign-key dependencies detected; table creation order could \
                          not be fully topologically sorted"
                .to_string(),
            severity: Severity::Warning,
        });
    }

    let mut lower_table_names: BTreeMap<String, Vec<TableName>> = BTreeMap::new();
    for table in &schema.tables {
        lower_table_names
            .entry(table.name.as_str().to_ascii_lowercase())
            .or_default()
            .push(table.name.clone());

        if is_reserved_word(table.name.as_str()) {
            limitations.push(Limitation {
                category: LimitationCategory::ManualSteps,
                object_type: "table".to_string(),
                object_name: table.name.as_str().to_string(),
                description: "table name collides with a reserved SQL keyword; may require \
                              quoting on the target"
                    .to_string(),
                severity: Severity::Warning,
            });
        }

        let mut lower_column_names: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for column in &table.columns {
            lower_column_names
                .entry(column.name.as_str().to_ascii_lowercase())
                .or_default()
                .push(column.name.as_str().to_string());

            if column.type_info.ir_kind.is_unknown() {
                limitations.push(Limitation {
                    category: LimitationCategory::LossyMappings,
                    object_type: "column".to_string(),
                    object_name: format!("{}.{}", table.name, column.name),
                    description: format!(
                        "source type {} has no dialect-neutral mapping",
                        column.type_info.raw
                    ),
                    severity: Severity::Warning,
                });
            } else if let Some(target_dialect) = target_dialect {
                if let Some(target_raw) = registry.map_from_ir(target_dialect, &column.type_info.ir_kind) {
                    let hypothetical_target = TypeInfo {
                        raw: target_raw,
                        ir_kind: column.type_info.ir_kind.clone(),
                        nullable: column.type_info.nullable,
                    };
                    if let Some(reason) =
                        registry.is_lossy_conversion(&column.type_info, target_dialect, &hypothetical_target)
                    {
                        limitations.push(Limitation {
                            category: LimitationCategory::LossyMappings,
                            object_type: "column".to_string(),
                            object_name: format!("{}.{}", table.name, column.name),
                            description: format!(
                                "column {} converts from {} to {target_dialect} with loss: {reason:?}",
                                column.name, column.type_info.raw
                            ),
                            severity: Severity::Warning,
                        });
                    }
                }
            }

            if column.default_expr.is_some() {
                limitations.push(Limitation {
                    category: LimitationCategory::ManualSteps,
                    object_type: "column".to_string(),
                    object_name: format!("{}.{}", table.name, column.name),
                    description: "deferred: default expression not migrated".to_string(),
                    severity: Severity::Info,
                });
            }
        }
        for (lower, originals) in lower_column_names {
            if originals.len() > 1 {
                limitations.push(Limitation {
                    category: LimitationCategory::ManualSteps,
                    object_type: "column".to_string(),
                    object_name: format!("{}.{lower}", table.name),
                    description: format!(
                        "columns {} collide case-insensitively",
                        originals.join(", ")
                    ),
                    severity: Severity::Warning,
                });
            }
        }
    }
    for (lower, originals) in lower_table_names {
        if originals.len() > 1 {
            let names = originals
                .iter()
                .map(TableName::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            limitations.push(Limitation {
                category: LimitationCategory::ManualSteps,
                object_type: "table".to_string(),
                object_name: lower,
                description: format!("tables {names} collide case-insensitively"),
                severity: Severity::Warning,
            });
        }
    }

    limitations
}

// ============================================================================
// SECTION: Audit report
// ============================================================================

/// Renders the human-readable `reports/audit_report.md` artifact: a
/// narrative summary of the run meant for an operator or auditor who will
/// never open the machine-readable JSON, covering what was compared, what
/// matched, and what limitations were recorded.
fn render_audit_report(run_id: &RunId, started_at: &str, report: &ValidationReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    out.push_str(&format!("# Audit report: run {run_id}\n\n"));
    out.push_str(&format!("- Started: {started_at}\n"));
    out.push_str(&format!("- Report schema: {}\n", summary.schema_version));
    out.push_str(&format!(
        "- Overall result: **{}**\n\n",
        if report.is_match() { "MATCH" } else { "MISMATCH" }
    ));

    out.push_str("## Tables\n\n");
    out.push_str(&format!(
        "- Matched: {} of {}\n",
        summary.tables_matched,
        summary.data_parity.len()
    ));
    if !summary.tables_only_source.is_empty() {
        out.push_str(&format!(
            "- Only on source: {}\n",
            join_table_names(&summary.tables_only_source)
        ));
    }
    if !summary.tables_only_target.is_empty() {
        out.push_str(&format!(
            "- Only on target: {}\n",
            join_table_names(&summary.tables_only_target)
        ));
    }
    out.push('\n');

    out.push_str("## Data parity\n\n");
    out.push_str("| table | status | source rows | target rows |\n");
    out.push_str("|---|---|---|---|\n");
    for (table, parity) in &summary.data_parity {
        out.push_str(&format!(
            "| {table} | {:?} | {} | {} |\n",
            parity.status, parity.source_rows, parity.target_rows
        ));
    }
    out.push('\n');

    out.push_str("## Constraint parity\n\n");
    out.push_str("| table | primary key | unique | foreign key |\n");
    out.push_str("|---|---|---|---|\n");
    for (table, parity) in &summary.constraint_parity {
        out.push_str(&format!(
            "| {table} | {:?} | {:?} | {:?} |\n",
            parity.primary_key, parity.unique, parity.foreign_key
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "## Dataset fingerprint\n\n`{}`\n\n",
        summary.dataset_fingerprint.digest.value
    ));

    out.push_str(&format!("## Limitations ({})\n\n", report.limitations.len()));
    if report.limitations.is_empty() {
        out.push_str("None recorded.\n");
    } else {
        for category in [
            LimitationCategory::UnsupportedObjects,
            LimitationCategory::LossyMappings,
            LimitationCategory::BehaviorDifferences,
            LimitationCategory::ManualSteps,
        ] {
            let items: Vec<&Limitation> = report
                .limitations
                .iter()
                .filter(|item| item.category == category)
                .collect();
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("### {category:?}\n\n"));
            for item in items {
                out.push_str(&format!(
                    "- `[{:?}]` {}.{}: {}\n",
                    item.severity, item.object_type, item.object_name, item.description
                ));
            }
            out.push('\n');
        }
    }

    out
}

// ============================================================================
// SECTION: Post-migration SQL
// ============================================================================

/// Generates per-dialect sequence/identity reset statements for every
/// single-column primary key. This output is informational only; the
/// runner never executes it.
fn generate_post_migration_sql(schema: &SchemaIr, target_dialect: &Dialect) -> String {
    let mut out = String::from("-- informational post-migration statements; not executed by the runner\n");
    for table in &schema.tables {
        let Some(pk_column) = table.constraints.iter().find_map(|constraint| match constraint {
            ConstraintIr::PrimaryKey { columns, .. } if columns.len() == 1 => Some(&columns[0]),
            _ => None,
        }) else {
            continue;
        };
        let table_name = table.name.as_str();
        let column_name = pk_column.as_str();
        match target_dialect {
            Dialect::Postgresql => out.push_str(&format!(
                "SELECT setval(pg_get_serial_sequence('{table_name}', '{column_name}'), \
                 COALESCE((SELECT MAX({column_name}) FROM {table_name}), 1));\n"
            )),
            Dialect::Mysql => out.push_str(&format!(
                "ALTER TABLE {table_name} AUTO_INCREMENT = (SELECT MAX({column_name}) + 1 FROM {table_name});\n"
            )),
            Dialect::Sqlite => out.push_str(&format!(
                "UPDATE sqlite_sequence SET seq = (SELECT MAX({column_name}) FROM {table_name}) \
                 WHERE name = '{table_name}';\n"
            )),
            _ => out.push_str(&format!(
                "-- no identity reset statement known for {target_dialect} target table {table_name}\n"
            )),
        }
    }
    out
}

// ============================================================================
// SECTION: Routines and triggers
// ============================================================================

fn translate_routines_and_triggers(
    schema: &SchemaIr,
    mode: RoutineCapabilityMode,
    target_dialect: &Dialect,
) -> (String, String, Vec<Limitation>) {
    let mut routines_sql = String::new();
    let mut report = String::from("# routine migration report\n");
    let mut limitations = Vec::new();

    for routine in &schema.routines {
        let result = translate_routine(routine, mode, target_dialect);
        report.push_str(&format!("\n## {}\n\noutcome: {:?}\n", result.name, result.outcome));
        if !result.warnings.is_empty() {
            report.push_str(&format!("warnings:\n- {}\n", result.warnings.join("\n- ")));
        }
        if !result.errors.is_empty() {
            report.push_str(&format!("errors:\n- {}\n", result.errors.join("\n- ")));
        }
        if let Some(code) = &result.generated_code {
            routines_sql.push_str(code);
            routines_sql.push_str("\n\n");
        }
        match result.outcome {
            TranslationOutcome::Skipped => limitations.push(Limitation {
                category: LimitationCategory::UnsupportedObjects,
                object_type: "routine".to_string(),
                object_name: result.name.clone(),
                description: "routine skipped entirely per configured routine handling mode"
                    .to_string(),
                severity: Severity::Info,
            }),
            TranslationOutcome::Stubbed => limitations.push(Limitation {
                category: LimitationCategory::UnsupportedObjects,
                object_type: "routine".to_string(),
                object_name: result.name.clone(),
                description: format!(
                    "routine body was not translated and was replaced with a stub: {}",
                    result.errors.join("; ")
                ),
                severity: Severity::Warning,
            }),
            TranslationOutcome::AnalyzedOnly | TranslationOutcome::Translated => {}
        }
    }

    for trigger in &schema.triggers {
        let classified = classify_trigger(trigger.clone());
        if !classified.supported_subset {
            limitations.push(Limitation {
                category: LimitationCategory::UnsupportedObjects,
                object_type: "trigger".to_string(),
                object_name: classified.name.clone(),
                description: classified
                    .unsupported_reason
                    .clone()
                    .unwrap_or_else(|| "unsupported for an unspecified reason".to_string()),
                severity: Severity::Warning,
            });
        }
    }

    (routines_sql, report, limitations)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_core::ColumnIr;
    use migrator_core::ColumnName;
    use migrator_core::IrKind;
    use migrator_core::TypeInfo;

    fn table(name: &str, references: Option<&str>) -> TableIr {
        let mut constraints = vec![ConstraintIr::PrimaryKey {
            name: None,
            columns: vec![ColumnName::new("id")],
        }];
        if let Some(target) = references {
            constraints.push(ConstraintIr::ForeignKey {
                name: None,
                columns: vec![ColumnName::new("parent_id")],
                references_table: TableName::new(target),
                references_columns: vec![ColumnName::new("id")],
            });
        }
        TableIr {
            name: TableName::new(name),
            columns: vec![ColumnIr {
                name: ColumnName::new("id"),
                type_info: TypeInfo {
                    raw: "INTEGER".to_string(),
                    ir_kind: IrKind::Int64,
                    nullable: false,
                },
                ordinal: 1,
                default_expr: None,
            }],
            constraints,
            estimated_row_count: None,
        }
    }

    #[test]
    fn plan_table_order_places_dependencies_before_dependents() {
        let mut schema = SchemaIr::new();
        schema.tables.push(table("orders", Some("customers")));
        schema.tables.push(table("customers", None));

        let (order, had_cycle) = plan_table_order(&schema);
        assert!(!had_cycle);
        let customers_pos = order.iter().position(|name| name.as_str() == "customers").expect("present");
        let orders_pos = order.iter().position(|name| name.as_str() == "orders").expect("present");
        assert!(customers_pos < orders_pos);
    }

    #[test]
    fn plan_table_order_breaks_cycles_deterministically() {
        let mut schema = SchemaIr::new();
        schema.tables.push(table("a", Some("b")));
        schema.tables.push(table("b", Some("a")));

        let (order, had_cycle) = plan_table_order(&schema);
        assert!(had_cycle);
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn preflight_flags_unmappable_column_type() {
        let mut schema = SchemaIr::new();
        let mut widgets = table("widgets", None);
        widgets.columns[0].type_info.ir_kind = IrKind::Unknown {
            raw: "SOME_VENDOR_TYPE".to_string(),
        };
        schema.tables.push(widgets);

        let registry = TypeRegistry::new();
        let limitations = preflight(&schema, false, &registry, None);
        assert!(
            limitations
                .iter()
                .any(|item| item.category == LimitationCategory::LossyMappings
                    && item.description.contains("no dialect-neutral mapping"))
        );
    }

    #[test]
    fn preflight_flags_deferred_defaults() {
        let mut schema = SchemaIr::new();
        let mut widgets = table("widgets", None);
        widgets.columns[0].default_expr = Some("0".to_string());
        schema.tables.push(widgets);

        let registry = TypeRegistry::new();
        let limitations = preflight(&schema, false, &registry, None);
        assert!(limitations.iter().any(|item| item.description.contains("deferred")));
    }

    #[test]
    fn preflight_flags_case_insensitive_table_collisions() {
        let mut schema = SchemaIr::new();
        schema.tables.push(table("Widgets", None));
        schema.tables.push(table("widgets", None));

        let registry = TypeRegistry::new();
        let limitations = preflight(&schema, false, &registry, None);
        assert!(
            limitations
                .iter()
                .any(|item| item.description.contains("collide case-insensitively"))
        );
    }

    #[test]
    fn preflight_flags_lossy_conversion_against_target_dialect() {
        let mut schema = SchemaIr::new();
        let mut widgets = table("widgets", None);
        widgets.columns.push(ColumnIr {
            name: ColumnName::new("notes"),
            type_info: TypeInfo {
                raw: "TEXT".to_string(),
                ir_kind: IrKind::Text,
                nullable: true,
            },
            ordinal: 2,
            default_expr: None,
        });
        schema.tables.push(widgets);

        let registry = TypeRegistry::new();
        let limitations = preflight(&schema, false, &registry, Some(&Dialect::Oracle));
        assert!(
            limitations
                .iter()
                .any(|item| item.category == LimitationCategory::LossyMappings
                    && item.object_name == "widgets.notes")
        );
    }

    #[test]
    fn preflight_skips_lossy_conversion_check_without_a_target() {
        let mut schema = SchemaIr::new();
        let mut widgets = table("widgets", None);
        widgets.columns.push(ColumnIr {
            name: ColumnName::new("notes"),
            type_info: TypeInfo {
                raw: "TEXT".to_string(),
                ir_kind: IrKind::Text,
                nullable: true,
            },
            ordinal: 2,
            default_expr: None,
        });
        schema.tables.push(widgets);

        let registry = TypeRegistry::new();
        let limitations = preflight(&schema, false, &registry, None);
        assert!(
            !limitations
                .iter()
                .any(|item| item.object_name == "widgets.notes")
        );
    }

    #[test]
    fn post_migration_sql_emits_setval_for_postgres() {
        let mut schema = SchemaIr::new();
        schema.tables.push(table("widgets", None));
        let sql = generate_post_migration_sql(&schema, &Dialect::Postgresql);
        assert!(sql.contains("setval"));
        assert!(sql.contains("widgets"));
    }
}
