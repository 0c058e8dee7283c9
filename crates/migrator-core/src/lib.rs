// migrator-core/src/lib.rs
// ============================================================================
// Module: Migrator Core Library
// Description: Public API surface for the migration engine's dialect-neutral
//              core.
// Purpose: Expose the type registry, schema IR, adapter contract,
//          fingerprint engine, and shared error/redaction utilities.
// Dependencies: crate::{adapter, core, error, fingerprint, redact}
// ============================================================================

//! ## Overview
//! Migrator core provides the dialect-neutral building blocks every other
//! crate in the workspace depends on: the type registry and schema IR that
//! introspection produces, the adapter trait boundary the runner programs
//! against, the fingerprint engine the validation report relies on, and a
//! single shared redaction routine. It has no knowledge of any concrete
//! database driver.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod core;
pub mod error;
pub mod fingerprint;
pub mod redact;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::AdapterError;
pub use adapter::Capability;
pub use adapter::Row;
pub use adapter::SourceAdapter;
pub use adapter::TargetAdapter;
pub use core::ArgumentMode;
pub use core::ColumnIr;
pub use core::ColumnName;
pub use core::ConstraintIr;
pub use core::DEFAULT_HASH_ALGORITHM;
pub use core::Dialect;
pub use core::HashAlgorithm;
pub use core::HashDigest;
pub use core::IrKind;
pub use core::LossinessReason;
pub use core::RoutineArgument;
pub use core::RoutineIr;
pub use core::RunId;
pub use core::SchemaIr;
pub use core::TableIr;
pub use core::TableName;
pub use core::TriggerEvent;
pub use core::TriggerIr;
pub use core::TriggerLevel;
pub use core::TriggerTiming;
pub use core::TypeInfo;
pub use core::TypeRegistry;
pub use error::MigratorError;
pub use fingerprint::DatasetFingerprint;
pub use fingerprint::FingerprintError;
pub use fingerprint::TableFingerprint;
pub use fingerprint::combine_fingerprints;
pub use fingerprint::fingerprint_table;
pub use fingerprint::fingerprint_table_default;
