// migrator-core/src/core/identifiers.rs
// ============================================================================
// Module: Migrator Identifiers
// Description: Canonical opaque identifiers used across the migration engine.
// Purpose: Provide strongly typed, serializable identifiers with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the string-based identifiers shared by every crate in
//! the migration engine: run identifiers, table/column names, and the
//! dialect tag that selects a source or target adapter. Identifiers are
//! opaque; validation (reserved words, case folding) happens at the
//! introspection and preflight boundaries, not here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Run Identifier
// ============================================================================

/// Identifier for a single migration run, used as the run bundle directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Creates a new run identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Table and Column Names
// ============================================================================

/// Fully-qualified or bare table name as reported by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Creates a new table name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TableName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TableName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Column name within a table, preserving the source's physical case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a new column name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ColumnName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ColumnName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Dialect
// ============================================================================

/// Source or target database dialect recognized by the core registry.
///
/// The variant set matches the dialect tags accepted in source/target URLs
/// (spec §6). `Other` preserves unrecognized dialect strings for forward
/// compatibility with adapters registered outside the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `SQLite` file-backed database.
    Sqlite,
    /// `PostgreSQL`.
    Postgresql,
    /// `MySQL` or `MariaDB`.
    Mysql,
    /// Oracle Database.
    Oracle,
    /// Microsoft SQL Server.
    Mssql,
    /// `DuckDB`.
    Duckdb,
    /// SAP HANA.
    Hana,
    /// File-based tabular source (CSV/Excel directory).
    File,
    /// Dialect tag not recognized by the core registry.
    Other(String),
}

impl Dialect {
    /// Returns the canonical lowercase tag used in URLs and config files.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Oracle => "oracle",
            Self::Mssql => "mssql",
            Self::Duckdb => "duckdb",
            Self::Hana => "hana",
            Self::File => "file",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "sqlite" => Self::Sqlite,
            "postgresql" | "postgres" => Self::Postgresql,
            "mysql" | "mariadb" => Self::Mysql,
            "oracle" => Self::Oracle,
            "mssql" => Self::Mssql,
            "duckdb" => Self::Duckdb,
            "hana" => Self::Hana,
            "file" => Self::File,
            other => Self::Other(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Dialect;

    #[test]
    fn postgres_alias_normalizes() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgresql);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgresql);
    }

    #[test]
    fn mariadb_alias_normalizes() {
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::Mysql);
    }

    #[test]
    fn unknown_dialect_round_trips() {
        let dialect: Dialect = "cockroachdb".parse().unwrap();
        assert_eq!(dialect.as_str(), "cockroachdb");
    }
}
