// migrator-adapter-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Adapter Library
// Description: SourceAdapter/TargetAdapter backend using SQLite.
// Purpose: Provide a production-grade SQLite backend for the migration
//          engine's dialect-agnostic runner.
// Dependencies: migrator-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`SqliteAdapter`] implementing both
//! `SourceAdapter` and `TargetAdapter`, suitable for migrating into or out
//! of a SQLite file with WAL journaling and deterministic schema
//! introspection.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::SqliteAdapter;
pub use adapter::SqliteAdapterConfig;
pub use adapter::SqliteAdapterError;
pub use adapter::SqliteJournalMode;
pub use adapter::SqliteSyncMode;
