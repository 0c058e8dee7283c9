// migrator-cli/src/lib.rs
// ============================================================================
// Module: Migrator CLI Library
// Description: Shared helpers for the migration engine command-line
//              interface.
// Purpose: Provide reusable components (i18n, adapter dispatch) for the
//          CLI binary and its tests.
// Dependencies: migrator-core, migrator-config, migrator-runner, and the
//               adapter crates.
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the internationalized
//! message catalog and the adapter dispatch layer that lets the binary
//! build one [`migrator_runner::MigrationRunner`] regardless of which
//! dialect `--source`/`--target` name. The binary entry point (`src/main.rs`)
//! imports these helpers to keep user-facing output and connection
//! handling consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Connection-URL-to-adapter resolution.
pub mod adapter_dispatch;
/// Internationalization helpers and message catalog.
pub mod i18n;
