// migrator-core/src/core/mod.rs
// ============================================================================
// Module: Migrator Core Types
// Description: Canonical dialect-neutral schema and identifier types.
// Purpose: Provide stable, serializable types shared by every adapter and
//          the runner.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types define the identifiers, type registry, and schema IR that
//! make up the dialect-neutral vocabulary of the migration engine. These
//! types are the canonical source of truth for every adapter and for the
//! run bundle manifest.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identifiers;
pub mod schema;
pub mod type_info;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::ColumnName;
pub use identifiers::Dialect;
pub use identifiers::RunId;
pub use identifiers::TableName;
pub use schema::ArgumentMode;
pub use schema::ColumnIr;
pub use schema::ConstraintIr;
pub use schema::RoutineArgument;
pub use schema::RoutineIr;
pub use schema::SchemaIr;
pub use schema::TableIr;
pub use schema::TriggerEvent;
pub use schema::TriggerIr;
pub use schema::TriggerLevel;
pub use schema::TriggerTiming;
pub use schema::ViewIr;
pub use type_info::IrKind;
pub use type_info::LossinessReason;
pub use type_info::TypeInfo;
pub use type_info::TypeRegistry;
