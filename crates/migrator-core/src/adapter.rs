// migrator-core/src/adapter.rs
// ============================================================================
// Module: Migrator Adapter Contract
// Description: The trait boundary every source and target database backend
//              implements.
// Purpose: Let the runner, translator, and report generator stay entirely
//          dialect-agnostic by depending only on these traits.
// Dependencies: thiserror, crate::core::{identifiers, schema}
// ============================================================================

//! ## Overview
//! `SourceAdapter` and `TargetAdapter` are the only points of contact
//! between the dialect-neutral engine (`migrator-runner`) and a concrete
//! database backend. A backend crate (`migrator-adapter-sqlite`,
//! `migrator-adapter-postgres`, `migrator-adapter-file`) implements both
//! traits for its dialect and advertises which optional capabilities
//! (views, routines, triggers) it supports via [`Capability`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::TableName;
use crate::core::schema::SchemaIr;
use crate::core::schema::TableIr;

// ============================================================================
// SECTION: Capability
// ============================================================================

/// Optional capability levels an adapter may support beyond plain data
/// copy, matching the L0–L4 ladder used throughout the validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Row data only; no schema introspection or emission.
    DataOnly,
    /// Table and column schema alongside data.
    SchemaAndData,
    /// Views.
    Views,
    /// Stored routines (procedures and functions).
    Routines,
    /// Triggers, fully supported.
    Triggers,
    /// Triggers, with only a safe rewritable subset supported.
    TriggerSubset,
}

// ============================================================================
// SECTION: Row
// ============================================================================

/// A single row of data, represented as an ordered list of (column name,
/// value) pairs to preserve column order without requiring a `Map` with
/// guaranteed iteration order from every backend's driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Columns in source-reported order.
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Creates a row from column/value pairs.
    #[must_use]
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Converts the row into a `serde_json::Value` object, for hashing or
    /// report rendering.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.columns.iter().cloned().collect())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The adapter could not establish or maintain a connection.
    #[error("connection error for {dialect}: {message}")]
    Connection {
        /// Dialect tag of the adapter that failed.
        dialect: String,
        /// Human-readable detail, pre-redacted of credentials.
        message: String,
    },
    /// Introspection of the source or target schema failed.
    #[error("introspection error on table {table}: {message}")]
    Introspection {
        /// Table being introspected when the failure occurred.
        table: TableName,
        /// Human-readable detail.
        message: String,
    },
    /// Emitting DDL for a table failed.
    #[error("ddl emission error on table {table}: {message}")]
    DdlEmission {
        /// Table the DDL was being emitted for.
        table: TableName,
        /// Human-readable detail.
        message: String,
    },
    /// Reading or writing row data failed.
    #[error("data io error on table {table}: {message}")]
    DataIo {
        /// Table being read or written.
        table: TableName,
        /// Human-readable detail.
        message: String,
    },
    /// The requested capability is not supported by this adapter.
    #[error("adapter does not support capability {0:?}")]
    UnsupportedCapability(Capability),
}

// ============================================================================
// SECTION: Source Adapter
// ============================================================================

/// A database or file source that can be introspected and read from.
pub trait SourceAdapter: Send {
    /// Returns the capabilities this adapter supports.
    fn capabilities(&self) -> &[Capability];

    /// Introspects the full schema: tables, and views/routines/triggers
    /// when the corresponding capability is present.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Introspection`] when the source cannot be
    /// queried, or [`AdapterError::Connection`] when the connection is
    /// unusable.
    fn introspect_schema(
        &mut self,
    ) -> impl Future<Output = Result<SchemaIr, AdapterError>> + Send;

    /// Reads up to `batch_size` rows of `table` starting at `offset`,
    /// ordered by the table's primary key (or, lacking one, the source's
    /// natural row order) so repeated calls with increasing offsets
    /// partition the table without omission or duplication.
    ///
    /// Returns an empty vector once `offset` has passed the last row.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::DataIo`] when the read fails.
    fn read_batch(
        &mut self,
        table: &TableIr,
        offset: u64,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<Row>, AdapterError>> + Send;

    /// Returns a cheap row count estimate for progress reporting, when the
    /// source can provide one without a full scan.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Introspection`] when the estimate cannot be
    /// obtained.
    fn estimate_row_count(
        &mut self,
        table: &TableName,
    ) -> impl Future<Output = Result<Option<u64>, AdapterError>> + Send;
}

// ============================================================================
// SECTION: Target Adapter
// ============================================================================

/// A database or file target that can receive schema and data.
pub trait TargetAdapter: Send {
    /// Returns the capabilities this adapter supports.
    fn capabilities(&self) -> &[Capability];

    /// Emits DDL for `table` and executes it against the target,
    /// creating the table if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::DdlEmission`] when DDL generation or
    /// execution fails.
    fn create_table(
        &mut self,
        table: &TableIr,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Writes a batch of rows into `table` inside a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::DataIo`] when the write fails; the caller
    /// is responsible for checkpointing so a failed batch can be retried.
    fn write_batch(
        &mut self,
        table: &TableIr,
        rows: &[Row],
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Reads back up to `batch_size` rows of `table` starting at `offset`,
    /// used by the validation report generator to fingerprint the target
    /// independently of the source read path.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::DataIo`] when the read fails.
    fn read_batch(
        &mut self,
        table: &TableIr,
        offset: u64,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<Row>, AdapterError>> + Send;

    /// Drops all tables created by a failed run, when `clean_on_failure`
    /// is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::DdlEmission`] when cleanup fails.
    fn drop_tables(
        &mut self,
        tables: &[TableName],
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Introspects `table` on the target, returning `None` when it does not
    /// exist yet. Lets the validation report compare the target's actual,
    /// as-created schema against the source instead of a hypothetical one.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Introspection`] when the target cannot be
    /// queried.
    fn get_table_schema(
        &mut self,
        table: &TableName,
    ) -> impl Future<Output = Result<Option<TableIr>, AdapterError>> + Send;
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DataOnly => "L0_DATA_ONLY",
            Self::SchemaAndData => "L1_SCHEMA_AND_DATA",
            Self::Views => "L2_VIEWS",
            Self::Routines => "L3_ROUTINES",
            Self::Triggers => "L4_TRIGGERS",
            Self::TriggerSubset => "L4_TRIGGER_SUBSET",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_to_json_preserves_column_order() {
        let row = Row::new(vec![
            ("b".to_string(), Value::from(2)),
            ("a".to_string(), Value::from(1)),
        ]);
        let json = row.to_json();
        let Value::Object(map) = json else {
            panic!("expected object");
        };
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn capability_display_matches_spec_levels() {
        assert_eq!(Capability::TriggerSubset.to_string(), "L4_TRIGGER_SUBSET");
        assert_eq!(Capability::DataOnly.to_string(), "L0_DATA_ONLY");
    }
}
