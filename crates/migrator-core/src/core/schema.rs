// migrator-core/src/core/schema.rs
// ============================================================================
// Module: Migrator Schema IR
// Description: Dialect-neutral schema representation produced by introspection.
// Purpose: Give the runner, translator, and report generator one shared view
//          of tables, columns, constraints, routines, and triggers.
// Dependencies: serde, crate::core::{identifiers, type_info}
// ============================================================================

//! ## Overview
//! The schema IR is what introspection (C4) produces and what the runner
//! (C5), routine translator (C6), and report generator (C8) all consume.
//! It never carries a live connection or dialect-specific handle; everything
//! here is plain data so it can be diffed, hashed, and serialized into a run
//! bundle manifest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ColumnName;
use crate::core::identifiers::TableName;
use crate::core::type_info::TypeInfo;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// A single column as reported by introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnIr {
    /// Column name, preserving source case.
    pub name: ColumnName,
    /// Mapped type information.
    pub type_info: TypeInfo,
    /// Ordinal position within the table (1-based, as reported by the source).
    pub ordinal: u32,
    /// Default expression exactly as the source reports it, if any.
    pub default_expr: Option<String>,
}

// ============================================================================
// SECTION: Constraints
// ============================================================================

/// A constraint attached to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintIr {
    /// Primary key over one or more columns, in key order.
    PrimaryKey {
        /// Constraint name as reported by the source, if named.
        name: Option<String>,
        /// Key columns in declared order.
        columns: Vec<ColumnName>,
    },
    /// Foreign key referencing another table.
    ForeignKey {
        /// Constraint name as reported by the source, if named.
        name: Option<String>,
        /// Local columns participating in the key, in declared order.
        columns: Vec<ColumnName>,
        /// Referenced table.
        references_table: TableName,
        /// Referenced columns, in declared order matching `columns`.
        references_columns: Vec<ColumnName>,
    },
    /// Column or table-level uniqueness constraint.
    Unique {
        /// Constraint name as reported by the source, if named.
        name: Option<String>,
        /// Columns covered by the constraint.
        columns: Vec<ColumnName>,
    },
    /// `CHECK` constraint with its predicate expression.
    Check {
        /// Constraint name as reported by the source, if named.
        name: Option<String>,
        /// Predicate expression, exactly as the source reports it.
        expression: String,
    },
    /// `NOT NULL` constraint on a single column.
    NotNull {
        /// Column the constraint applies to.
        column: ColumnName,
    },
}

// ============================================================================
// SECTION: Tables
// ============================================================================

/// A table as reported by introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableIr {
    /// Table name.
    pub name: TableName,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnIr>,
    /// Constraints attached to the table.
    pub constraints: Vec<ConstraintIr>,
    /// Estimated row count at introspection time, when the source can
    /// report it cheaply (used for progress reporting, not validation).
    pub estimated_row_count: Option<u64>,
}

impl TableIr {
    /// Returns the tables this table's foreign keys depend on.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&TableName> {
        self.constraints
            .iter()
            .filter_map(|constraint| match constraint {
                ConstraintIr::ForeignKey {
                    references_table, ..
                } => Some(references_table),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Views
// ============================================================================

/// A view as reported by introspection (capability level `L2_VIEWS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewIr {
    /// View name.
    pub name: TableName,
    /// View query body exactly as the source reports it.
    pub definition: String,
}

// ============================================================================
// SECTION: Routines
// ============================================================================

/// Passing mode of a routine argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentMode {
    /// Input-only argument.
    In,
    /// Output-only argument.
    Out,
    /// Input and output argument.
    InOut,
}

/// A single routine argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineArgument {
    /// Argument name.
    pub name: String,
    /// Mapped type information.
    pub type_info: TypeInfo,
    /// Passing mode.
    pub mode: ArgumentMode,
    /// Default expression exactly as the source reports it, if any.
    pub default_expr: Option<String>,
}

/// A stored routine (procedure or function) as reported by introspection
/// (capability level `L3_ROUTINES`).
///
/// `risk_score` and `issues` start empty at introspection time; only the
/// routine translator (C6) ever mutates them, never the data-copy path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineIr {
    /// Routine name.
    pub name: String,
    /// `true` when the routine returns a value (function); `false` for a
    /// procedure.
    pub is_function: bool,
    /// Argument list in declared order.
    #[serde(default)]
    pub arguments: Vec<RoutineArgument>,
    /// Return type, present only for functions.
    #[serde(default)]
    pub return_type: Option<TypeInfo>,
    /// Routine body exactly as the source reports it.
    pub body: String,
    /// Source dialect tag the body is written in, used to select a
    /// translator rewrite table.
    pub source_dialect: String,
    /// Names of other routines or tables this routine's body references.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Risk score in `[0, 100]`, assigned by the translator's risk
    /// analysis pass; `0` until analyzed.
    #[serde(default)]
    pub risk_score: u8,
    /// Human-readable issues found during risk analysis or translation.
    #[serde(default)]
    pub issues: Vec<String>,
}

// ============================================================================
// SECTION: Triggers
// ============================================================================

/// Timing of a trigger relative to its triggering statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTiming {
    /// Fires before the triggering statement.
    Before,
    /// Fires after the triggering statement.
    After,
    /// Fires instead of the triggering statement (view triggers).
    InsteadOf,
}

/// The statement kind that fires a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// `INSERT`.
    Insert,
    /// `UPDATE`.
    Update,
    /// `DELETE`.
    Delete,
}

/// Granularity at which a trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerLevel {
    /// Fires once per affected row.
    Row,
    /// Fires once per triggering statement.
    Statement,
}

/// A trigger as reported by introspection (capability levels `L4_TRIGGERS`
/// and `L4_TRIGGER_SUBSET`).
///
/// `supported_subset` and `unsupported_reason` are fixed at introspection
/// time by the conservative classifier described in the routine translator
/// design; the data-copy path never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerIr {
    /// Trigger name.
    pub name: String,
    /// Table the trigger is attached to.
    pub table: TableName,
    /// When the trigger fires relative to its event.
    pub timing: TriggerTiming,
    /// Statement kind(s) that fire the trigger.
    pub events: Vec<TriggerEvent>,
    /// Row- or statement-level firing.
    pub level: TriggerLevel,
    /// Trigger body exactly as the source reports it.
    pub body: String,
    /// `true` when the trigger is enabled on the source.
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// `true` when the trigger falls within the documented safe-rewrite
    /// subset.
    #[serde(default)]
    pub supported_subset: bool,
    /// Reason the trigger was classified as unsupported, when it was.
    #[serde(default)]
    pub unsupported_reason: Option<String>,
}

const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// The complete dialect-neutral schema for one source or target database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaIr {
    /// Tables, in the order introspection discovered them.
    pub tables: Vec<TableIr>,
    /// Views, present only at capability level `L2_VIEWS` or above.
    pub views: Vec<ViewIr>,
    /// Routines, present only at capability level `L3_ROUTINES` or above.
    pub routines: Vec<RoutineIr>,
    /// Triggers, present only at capability level `L4_TRIGGERS` or above.
    pub triggers: Vec<TriggerIr>,
}

impl SchemaIr {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: Vec::new(),
            views: Vec::new(),
            routines: Vec::new(),
            triggers: Vec::new(),
        }
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &TableName) -> Option<&TableIr> {
        self.tables.iter().find(|table| &table.name == name)
    }
}

impl Default for SchemaIr {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::type_info::IrKind;

    fn sample_table(name: &str, references: Option<&str>) -> TableIr {
        let mut constraints = vec![ConstraintIr::PrimaryKey {
            name: Some(format!("{name}_pk")),
            columns: vec![ColumnName::new("id")],
        }];
        if let Some(target) = references {
            constraints.push(ConstraintIr::ForeignKey {
                name: Some(format!("{name}_fk")),
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
    fn dependencies_collects_foreign_key_targets() {
        let table = sample_table("orders", Some("customers"));
        let deps = table.dependencies();
        assert_eq!(deps, vec![&TableName::new("customers")]);
    }

    #[test]
    fn schema_table_lookup_finds_by_name() {
        let mut schema = SchemaIr::new();
        schema.tables.push(sample_table("customers", None));
        assert!(schema.table(&TableName::new("customers")).is_some());
        assert!(schema.table(&TableName::new("missing")).is_none());
    }
}
