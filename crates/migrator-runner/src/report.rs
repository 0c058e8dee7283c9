// migrator-runner/src/report.rs
// ============================================================================
// Module: Validation Report Generator (C8)
// Description: Compares source vs. target through both adapters and
//              produces versioned parity and limitations reports.
// Purpose: Give the operator a deterministic, auditable proof that a
//          migration run agrees between source and target.
// Dependencies: migrator-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The report generator never mutates either adapter; it only reads. Every
//! comparison is driven by the dialect-neutral schema IR, never by a raw
//! SQL query, so the same code path covers every adapter pairing the
//! workspace ships.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use migrator_config::SamplingConfig;
use migrator_core::AdapterError;
use migrator_core::ColumnName;
use migrator_core::ConstraintIr;
use migrator_core::DatasetFingerprint;
use migrator_core::Dialect;
use migrator_core::FingerprintError;
use migrator_core::LossinessReason;
use migrator_core::SchemaIr;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeRegistry;
use migrator_core::combine_fingerprints;
use migrator_core::core::hashing::HashAlgorithm;
use migrator_core::core::hashing::canonical_json_bytes;
use migrator_core::fingerprint_table_default;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Schema versions
// ============================================================================

/// Semver of `validation_summary.json` / `validation_report.txt`.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";
/// Semver of `limitations.json` / `limitations.txt`.
pub const LIMITATIONS_SCHEMA_VERSION: &str = "1.0.0";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while generating a validation report.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Reading rows from an adapter failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// Computing a table fingerprint failed.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

// ============================================================================
// SECTION: Limitations
// ============================================================================

/// Severity of a recorded limitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; no action implied.
    Info,
    /// Worth reviewing but not necessarily actionable.
    Warning,
    /// Requires operator attention.
    Error,
}

/// Category a limitation falls under, matching the four groups the
/// specification names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitationCategory {
    /// An object the target cannot represent at all.
    UnsupportedObjects,
    /// A type conversion that drops information.
    LossyMappings,
    /// A structural difference between source and target (e.g. a table
    /// present on only one side).
    BehaviorDifferences,
    /// Something the operator must do by hand (e.g. a deferred default
    /// expression).
    ManualSteps,
}

/// One recorded limitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limitation {
    /// Which of the four groups this limitation belongs to.
    pub category: LimitationCategory,
    /// Kind of object the limitation concerns (`"table"`, `"column"`,
    /// `"routine"`, `"trigger"`, ...).
    pub object_type: String,
    /// Name of the affected object.
    pub object_name: String,
    /// Human-readable explanation.
    pub description: String,
    /// How serious this limitation is.
    pub severity: Severity,
}

/// Sorts limitations by category, then by `(object_type, object_name)`
/// within each category, matching the specification's stable ordering.
#[must_use]
pub fn sorted_limitations(mut limitations: Vec<Limitation>) -> Vec<Limitation> {
    limitations.sort_by(|left, right| {
        left.category
            .cmp(&right.category)
            .then_with(|| left.object_type.cmp(&right.object_type))
            .then_with(|| left.object_name.cmp(&right.object_name))
    });
    limitations
}

// ============================================================================
// SECTION: Data parity
// ============================================================================

/// Agreement status for one table's row data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataParityStatus {
    /// Row counts and content hashes agree.
    Match,
    /// Row counts or content hashes disagree.
    Mismatch,
}

/// Row-level comparison result for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataParity {
    /// Row count reported by the source (full count, never a sample size).
    pub source_rows: u64,
    /// Row count reported by the target.
    pub target_rows: u64,
    /// Source table content hash, in hex.
    pub source_hash: String,
    /// Target table content hash, in hex.
    pub target_hash: String,
    /// Match/mismatch status.
    pub status: DataParityStatus,
}

// ============================================================================
// SECTION: Type parity
// ============================================================================

/// One column's type mapping comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMapping {
    /// Column name.
    pub column: String,
    /// Raw source type string.
    pub source_type: String,
    /// Dialect-neutral IR kind, rendered for the report.
    pub ir_type: String,
    /// Raw target type string, or `"MISSING"` when the column does not
    /// exist on the target.
    pub target_type: String,
    /// Whether this mapping loses information.
    pub is_lossy: bool,
    /// Reason the mapping is lossy, when it is.
    pub lossy_reason: Option<LossinessReason>,
}

/// Column-by-column type comparison for one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeParity {
    /// One entry per source column.
    pub mappings: Vec<TypeMapping>,
}

// ============================================================================
// SECTION: Constraint parity
// ============================================================================

/// Agreement status for one constraint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintParityStatus {
    /// Both sides declare the same constraint.
    Match,
    /// Both sides declare the constraint, but it differs.
    Mismatch,
    /// Only the source declares the constraint.
    SourceOnly,
    /// Only the target declares the constraint.
    TargetOnly,
    /// Neither side declares the constraint, or this class is not tracked
    /// by the schema IR.
    NotApplicable,
}

/// Constraint-class comparison for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintParity {
    /// Primary key comparison.
    pub primary_key: ConstraintParityStatus,
    /// Unique constraint set comparison.
    pub unique: ConstraintParityStatus,
    /// Foreign key set comparison.
    pub foreign_key: ConstraintParityStatus,
    /// Index comparison; always [`ConstraintParityStatus::NotApplicable`]
    /// because the schema IR does not carry index metadata independent of
    /// `UNIQUE` constraints.
    pub indexes: ConstraintParityStatus,
    /// Identity-column comparison; always
    /// [`ConstraintParityStatus::NotApplicable`] for the same reason.
    pub identity: ConstraintParityStatus,
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Machine-readable validation summary (`validation_summary.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Schema version of this document.
    pub schema_version: String,
    /// Tables present on the source only.
    pub tables_only_source: Vec<TableName>,
    /// Tables present on the target only.
    pub tables_only_target: Vec<TableName>,
    /// Number of common tables whose data parity is
    /// [`DataParityStatus::Match`].
    pub tables_matched: usize,
    /// Per-table data parity, keyed by table name for deterministic
    /// ordering.
    pub data_parity: BTreeMap<TableName, DataParity>,
    /// Per-table type parity.
    pub type_parity: BTreeMap<TableName, TypeParity>,
    /// Per-table constraint parity.
    pub constraint_parity: BTreeMap<TableName, ConstraintParity>,
    /// Combined dataset fingerprint across every common table.
    pub dataset_fingerprint: DatasetFingerprint,
}

/// Full validation report: the summary plus every recorded limitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Machine-readable summary.
    pub summary: ValidationSummary,
    /// Limitations recorded while building the summary, sorted per
    /// [`sorted_limitations`].
    pub limitations: Vec<Limitation>,
}

impl ValidationReport {
    /// Returns `true` when every common table's data parity matched and no
    /// constraint class mismatched, regardless of recorded lossy-mapping
    /// limitations (a lossy type mapping alone never fails validation).
    #[must_use]
    pub fn is_match(&self) -> bool {
        let data_ok = self
            .summary
            .data_parity
            .values()
            .all(|parity| parity.status == DataParityStatus::Match);
        let constraints_ok = self.summary.constraint_parity.values().all(|parity| {
            [
                parity.primary_key,
                parity.unique,
                parity.foreign_key,
                parity.indexes,
                parity.identity,
            ]
            .iter()
            .all(|status| matches!(status, ConstraintParityStatus::Match | ConstraintParityStatus::NotApplicable))
        });
        data_ok && constraints_ok
    }

    /// Renders the human-readable `validation_report.txt` body.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "validation report (schema {})\n",
            self.summary.schema_version
        ));
        out.push_str(&format!("tables matched: {}\n", self.summary.tables_matched));
        if !self.summary.tables_only_source.is_empty() {
            out.push_str(&format!(
                "tables only on source: {}\n",
                join_table_names(&self.summary.tables_only_source)
            ));
        }
        if !self.summary.tables_only_target.is_empty() {
            out.push_str(&format!(
                "tables only on target: {}\n",
                join_table_names(&self.summary.tables_only_target)
            ));
        }
        out.push_str(&format!(
            "dataset fingerprint: {}\n",
            self.summary.dataset_fingerprint.digest.value
        ));
        out.push_str("\ndata parity:\n");
        for (table, parity) in &self.summary.data_parity {
            out.push_str(&format!(
                "  {table}: {:?} (source_rows={}, target_rows={})\n",
                parity.status, parity.source_rows, parity.target_rows
            ));
        }
        out.push_str("\nconstraint parity:\n");
        for (table, parity) in &self.summary.constraint_parity {
            out.push_str(&format!(
                "  {table}: pk={:?} unique={:?} fk={:?} indexes={:?} identity={:?}\n",
                parity.primary_key, parity.unique, parity.foreign_key, parity.indexes, parity.identity
            ));
        }
        out
    }
}

/// Renders the human-readable `limitations.txt` body: one section per
/// category, in the fixed order the specification names them, each sorted
/// by `(object_type, object_name)`.
#[must_use]
pub fn render_limitations_text(limitations: &[Limitation]) -> String {
    let mut out = String::new();
    for category in [
        LimitationCategory::UnsupportedObjects,
        LimitationCategory::LossyMappings,
        LimitationCategory::BehaviorDifferences,
        LimitationCategory::ManualSteps,
    ] {
        let items: Vec<&Limitation> = limitations.iter().filter(|item| item.category == category).collect();
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{category:?}:\n"));
        for item in items {
            out.push_str(&format!(
                "  [{:?}] {}.{}: {}\n",
                item.severity, item.object_type, item.object_name, item.description
            ));
        }
    }
    out
}

fn join_table_names(names: &[TableName]) -> String {
    names
        .iter()
        .map(TableName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// SECTION: Report generation
// ============================================================================

/// Builds a full validation report by reading both adapters and comparing
/// their schemas and data, table by table.
///
/// # Errors
///
/// Returns [`ValidationError`] when a batch read from either adapter
/// fails, or when a row fails canonicalization during fingerprinting.
#[allow(clippy::too_many_arguments, reason = "mirrors the report's fixed input contract; splitting it would scatter related parameters across an ad hoc struct with no other use")]
pub async fn generate_report<Src, Tgt>(
    source: &mut Src,
    target: &mut Tgt,
    source_schema: &SchemaIr,
    target_schema: &SchemaIr,
    registry: &TypeRegistry,
    target_dialect: &Dialect,
    batch_size: u32,
    sampling: &SamplingConfig,
) -> Result<ValidationReport, ValidationError>
where
    Src: SourceAdapter,
    Tgt: TargetAdapter,
{
    let source_names: BTreeSet<&TableName> = source_schema.tables.iter().map(|table| &table.name).collect();
    let target_names: BTreeSet<&TableName> = target_schema.tables.iter().map(|table| &table.name).collect();

    let tables_only_source: Vec<TableName> = source_names
        .difference(&target_names)
        .map(|name| (*name).clone())
        .collect();
    let tables_only_target: Vec<TableName> = target_names
        .difference(&source_names)
        .map(|name| (*name).clone())
        .collect();

    let mut limitations = Vec::new();
    for table in &tables_only_source {
        limitations.push(Limitation {
            category: LimitationCategory::BehaviorDifferences,
            object_type: "table".to_string(),
            object_name: table.as_str().to_string(),
            description: format!("table {table} exists on the source but not the target"),
            severity: Severity::Warning,
        });
    }
    for table in &tables_only_target {
        limitations.push(Limitation {
            category: LimitationCategory::BehaviorDifferences,
            object_type: "table".to_string(),
            object_name: table.as_str().to_string(),
            description: format!("table {table} exists on the target but not the source"),
            severity: Severity::Warning,
        });
    }

    let mut data_parity = BTreeMap::new();
    let mut type_parity = BTreeMap::new();
    let mut constraint_parity = BTreeMap::new();
    let mut table_fingerprints = Vec::new();

    for source_table in &source_schema.tables {
        let Some(target_table) = target_schema.table(&source_table.name) else {
            continue;
        };

        let source_rows = read_all_rows(source, source_table, batch_size).await?;
        let target_rows = read_all_rows_target(target, target_table, batch_size).await?;

        let source_columns: Vec<ColumnName> = source_table.columns.iter().map(|column| column.name.clone()).collect();
        let target_columns: Vec<ColumnName> = target_table.columns.iter().map(|column| column.name.clone()).collect();
        let (parity, fingerprint) = compute_data_parity(
            &source_table.name,
            source_rows,
            target_rows,
            &source_columns,
            &target_columns,
            sampling,
        )?;
        table_fingerprints.push(fingerprint);
        data_parity.insert(source_table.name.clone(), parity);

        type_parity.insert(
            source_table.name.clone(),
            compute_type_parity(source_table, target_table, registry, target_dialect, &mut limitations),
        );
        constraint_parity.insert(
            source_table.name.clone(),
            compute_constraint_parity(source_table, target_table),
        );
    }

    let tables_matched = data_parity
        .values()
        .filter(|parity| parity.status == DataParityStatus::Match)
        .count();
    let dataset_fingerprint = combine_fingerprints(table_fingerprints, HashAlgorithm::Sha256);

    let summary = ValidationSummary {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        tables_only_source,
        tables_only_target,
        tables_matched,
        data_parity,
        type_parity,
        constraint_parity,
        dataset_fingerprint,
    };

    Ok(ValidationReport {
        summary,
        limitations: sorted_limitations(limitations),
    })
}

async fn read_all_rows<Src: SourceAdapter>(
    source: &mut Src,
    table: &TableIr,
    batch_size: u32,
) -> Result<Vec<Value>, AdapterError> {
    let mut rows = Vec::new();
    let mut offset = 0u64;
    loop {
        let batch = SourceAdapter::read_batch(source, table, offset, batch_size).await?;
        if batch.is_empty() {
            break;
        }
        let fetched = u64::try_from(batch.len()).unwrap_or(u64::MAX);
        rows.extend(batch.into_iter().map(|row| row.to_json()));
        offset += fetched;
    }
    Ok(rows)
}

async fn read_all_rows_target<Tgt: TargetAdapter>(
    target: &mut Tgt,
    table: &TableIr,
    batch_size: u32,
) -> Result<Vec<Value>, AdapterError> {
    let mut rows = Vec::new();
    let mut offset = 0u64;
    loop {
        let batch = TargetAdapter::read_batch(target, table, offset, batch_size).await?;
        if batch.is_empty() {
            break;
        }
        let fetched = u64::try_from(batch.len()).unwrap_or(u64::MAX);
        rows.extend(batch.into_iter().map(|row| row.to_json()));
        offset += fetched;
    }
    Ok(rows)
}

fn compute_data_parity(
    table_name: &TableName,
    source_rows: Vec<Value>,
    target_rows: Vec<Value>,
    source_columns: &[ColumnName],
    target_columns: &[ColumnName],
    sampling: &SamplingConfig,
) -> Result<(DataParity, migrator_core::TableFingerprint), ValidationError> {
    let source_full_count = u64::try_from(source_rows.len()).unwrap_or(u64::MAX);
    let target_full_count = u64::try_from(target_rows.len()).unwrap_or(u64::MAX);

    let (source_sample, _source_sampled) = sample_rows(source_rows, sampling);
    let (target_sample, _target_sampled) = sample_rows(target_rows, sampling);

    let source_fp = fingerprint_table_default(table_name, &source_sample, source_columns, source_full_count)?;
    let target_fp = fingerprint_table_default(table_name, &target_sample, target_columns, target_full_count)?;

    let status = if source_full_count == target_full_count && source_fp.hash_hex == target_fp.hash_hex {
        DataParityStatus::Match
    } else {
        DataParityStatus::Mismatch
    };

    let parity = DataParity {
        source_rows: source_full_count,
        target_rows: target_full_count,
        source_hash: source_fp.hash_hex.clone(),
        target_hash: target_fp.hash_hex.clone(),
        status,
    };
    Ok((parity, source_fp))
}

/// Sorts rows by their canonical JSON bytes (so sampling never depends on
/// arrival order) and slices to `sampling.sample_size` once the full set
/// exceeds `sampling.threshold_rows`.
fn sample_rows(mut rows: Vec<Value>, sampling: &SamplingConfig) -> (Vec<Value>, bool) {
    let row_count = u64::try_from(rows.len()).unwrap_or(u64::MAX);
    if !sampling.enabled || row_count <= sampling.threshold_rows {
        return (rows, false);
    }
    rows.sort_by(|left, right| {
        let left_bytes = canonical_json_bytes(left).unwrap_or_default();
        let right_bytes = canonical_json_bytes(right).unwrap_or_default();
        left_bytes.cmp(&right_bytes)
    });
    let sample_size = usize::try_from(sampling.sample_size).unwrap_or(usize::MAX);
    rows.truncate(sample_size);
    (rows, true)
}

fn compute_type_parity(
    source_table: &TableIr,
    target_table: &TableIr,
    registry: &TypeRegistry,
    target_dialect: &Dialect,
    limitations: &mut Vec<Limitation>,
) -> TypeParity {
    let mut mappings = Vec::new();
    for column in &source_table.columns {
        let target_column = target_table
            .columns
            .iter()
            .find(|candidate| candidate.name == column.name);

        let (target_type, is_lossy, lossy_reason) = match target_column {
            Some(target_column) => {
                let reason = registry.is_lossy_conversion(&column.type_info, target_dialect, &target_column.type_info);
                (target_column.type_info.raw.clone(), reason.is_some(), reason)
            }
            None => {
                limitations.push(Limitation {
                    category: LimitationCategory::LossyMappings,
                    object_type: "column".to_string(),
                    object_name: format!("{}.{}", source_table.name, column.name),
                    description: format!(
                        "column {} has no counterpart on the target table",
                        column.name
                    ),
                    severity: Severity::Error,
                });
                ("MISSING".to_string(), true, None)
            }
        };

        if let Some(reason) = &lossy_reason {
            limitations.push(Limitation {
                category: LimitationCategory::LossyMappings,
                object_type: "column".to_string(),
                object_name: format!("{}.{}", source_table.name, column.name),
                description: format!(
                    "column {} converts with loss: {reason:?}",
                    column.name
                ),
                severity: Severity::Warning,
            });
        }

        mappings.push(TypeMapping {
            column: column.name.as_str().to_string(),
            source_type: column.type_info.raw.clone(),
            ir_type: format!("{:?}", column.type_info.ir_kind),
            target_type,
            is_lossy,
            lossy_reason,
        });
    }
    TypeParity { mappings }
}

fn compute_constraint_parity(source_table: &TableIr, target_table: &TableIr) -> ConstraintParity {
    ConstraintParity {
        primary_key: classify_option(
            pk_columns(&source_table.constraints),
            pk_columns(&target_table.constraints),
        ),
        unique: classify_set(
            unique_set(&source_table.constraints),
            unique_set(&target_table.constraints),
        ),
        foreign_key: classify_set(
            fk_set(&source_table.constraints),
            fk_set(&target_table.constraints),
        ),
        indexes: ConstraintParityStatus::NotApplicable,
        identity: ConstraintParityStatus::NotApplicable,
    }
}

fn pk_columns(constraints: &[ConstraintIr]) -> Option<Vec<ColumnName>> {
    constraints.iter().find_map(|constraint| match constraint {
        ConstraintIr::PrimaryKey { columns, .. } => Some(columns.clone()),
        _ => None,
    })
}

fn unique_set(constraints: &[ConstraintIr]) -> BTreeSet<Vec<ColumnName>> {
    constraints
        .iter()
        .filter_map(|constraint| match constraint {
            ConstraintIr::Unique { columns, .. } => Some(columns.clone()),
            _ => None,
        })
        .collect()
}

type ForeignKeyTuple = (Vec<ColumnName>, TableName, Vec<ColumnName>);

fn fk_set(constraints: &[ConstraintIr]) -> BTreeSet<ForeignKeyTuple> {
    constraints
        .iter()
        .filter_map(|constraint| match constraint {
            ConstraintIr::ForeignKey {
                columns,
                references_table,
                references_columns,
                ..
            } => Some((columns.clone(), references_table.clone(), references_columns.clone())),
            _ => None,
        })
        .collect()
}

fn classify_option<T: PartialEq>(source: Option<T>, target: Option<T>) -> ConstraintParityStatus {
    match (source, target) {
        (None, None) => ConstraintParityStatus::NotApplicable,
        (Some(_), None) => ConstraintParityStatus::SourceOnly,
        (None, Some(_)) => ConstraintParityStatus::TargetOnly,
        (Some(source), Some(target)) if source == target => ConstraintParityStatus::Match,
        (Some(_), Some(_)) => ConstraintParityStatus::Mismatch,
    }
}

fn classify_set<T: Eq + Ord>(source: BTreeSet<T>, target: BTreeSet<T>) -> ConstraintParityStatus {
    match (source.is_empty(), target.is_empty()) {
        (true, true) => ConstraintParityStatus::NotApplicable,
        (false, true) => ConstraintParityStatus::SourceOnly,
        (true, false) => ConstraintParityStatus::TargetOnly,
        (false, false) if source == target => ConstraintParityStatus::Match,
        (false, false) => ConstraintParityStatus::Mismatch,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_core::ColumnIr;
    use migrator_core::IrKind;
    use migrator_core::TypeInfo;

    fn column(name: &str, ir_kind: IrKind, raw: &str) -> ColumnIr {
        ColumnIr {
            name: ColumnName::new(name),
            type_info: TypeInfo {
                raw: raw.to_string(),
                ir_kind,
                nullable: true,
            },
            ordinal: 1,
            default_expr: None,
        }
    }

    #[test]
    fn limitations_sort_by_category_then_object() {
        let items = vec![
            Limitation {
                category: LimitationCategory::ManualSteps,
                object_type: "column".to_string(),
                object_name: "b".to_string(),
                description: String::new(),
                severity: Severity::Info,
            },
            Limitation {
                category: LimitationCategory::LossyMappings,
                object_type: "column".to_string(),
                object_name: "a".to_string(),
                description: String::new(),
                severity: Severity::Warning,
            },
        ];
        let sorted = sorted_limitations(items);
        assert_eq!(sorted[0].category, LimitationCategory::LossyMappings);
        assert_eq!(sorted[1].category, LimitationCategory::ManualSteps);
    }

    #[test]
    fn sample_rows_is_noop_below_threshold() {
        let sampling = SamplingConfig {
            enabled: true,
            threshold_rows: 100,
            sample_size: 10,
        };
        let rows = vec![serde_json::json!({"id": 1}), serde_json::json!({"id": 2})];
        let (sampled, was_sampled) = sample_rows(rows.clone(), &sampling);
        assert!(!was_sampled);
        assert_eq!(sampled.len(), rows.len());
    }

    #[test]
    fn sample_rows_truncates_deterministically() {
        let sampling = SamplingConfig {
            enabled: true,
            threshold_rows: 1,
            sample_size: 1,
        };
        let rows = vec![serde_json::json!({"id": 2}), serde_json::json!({"id": 1})];
        let (sampled, was_sampled) = sample_rows(rows, &sampling);
        assert!(was_sampled);
        assert_eq!(sampled.len(), 1);
        assert_eq!(sampled[0]["id"], 1);
    }

    #[test]
    fn missing_target_column_is_lossy_with_limitation() {
        let source_table = TableIr {
            name: TableName::new("widgets"),
            columns: vec![column("id", IrKind::Int64, "INTEGER")],
            constraints: Vec::new(),
            estimated_row_count: None,
        };
        let target_table = TableIr {
            name: TableName::new("widgets"),
            columns: Vec::new(),
            constraints: Vec::new(),
            estimated_row_count: None,
        };
        let mut limitations = Vec::new();
        let registry = TypeRegistry::new();
        let parity = compute_type_parity(
            &source_table,
            &target_table,
            &registry,
            &Dialect::Sqlite,
            &mut limitations,
        );
        assert!(parity.mappings[0].is_lossy);
        assert_eq!(parity.mappings[0].target_type, "MISSING");
        assert!(!limitations.is_empty());
    }

    #[test]
    fn constraint_parity_is_not_applicable_when_both_sides_lack_pk() {
        let table = TableIr {
            name: TableName::new("widgets"),
            columns: Vec::new(),
            constraints: Vec::new(),
            estimated_row_count: None,
        };
        let parity = compute_constraint_parity(&table, &table);
        assert_eq!(parity.primary_key, ConstraintParityStatus::NotApplicable);
        assert_eq!(parity.indexes, ConstraintParityStatus::NotApplicable);
    }
}
