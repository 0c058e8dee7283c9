// migrator-core/src/error.rs
// ============================================================================
// Module: Migrator Error Aggregate
// Description: Top-level error type composing every component error.
// Purpose: Give the CLI boundary a single error type with a stable exit code.
// Dependencies: thiserror, crate::{adapter, core::hashing, fingerprint}
// ============================================================================

//! ## Overview
//! Each component raises its own narrow, `thiserror`-derived error enum.
//! `MigratorError` composes those into one type so the CLI can match on a
//! handful of top-level variants to choose an exit code, without needing to
//! know which crate actually produced the failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::adapter::AdapterError;
use crate::core::hashing::HashError;
use crate::fingerprint::FingerprintError;

// ============================================================================
// SECTION: MigratorError
// ============================================================================

/// Aggregate error type for the migration engine.
#[derive(Debug, Error)]
pub enum MigratorError {
    /// A source or target adapter operation failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// Canonical hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// Fingerprint computation failed.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    /// Configuration was invalid; carries a human-readable detail.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The run was aborted by preflight validation before any data moved.
    #[error("preflight validation failed: {0}")]
    Preflight(String),
    /// The run bundle could not be written or read.
    #[error("run bundle error: {0}")]
    Bundle(String),
    /// The migration completed but the post-run validation report found a
    /// data, type, or constraint parity mismatch.
    #[error("post-run validation found a parity mismatch")]
    ValidationMismatch,
    /// The run was cancelled before it could complete.
    #[error("run was cancelled")]
    Cancelled,
}

impl MigratorError {
    /// Maps this error onto the CLI exit code scheme from the external
    /// interface contract: `1` for a fatal error (connection, configuration,
    /// or any other unrecoverable failure), `2` for a post-run validation
    /// mismatch, `3` for a cancelled run.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationMismatch => 2,
            Self::Cancelled => 3,
            Self::Adapter(_)
            | Self::Hash(_)
            | Self::Fingerprint(_)
            | Self::Config(_)
            | Self::Preflight(_)
            | Self::Bundle(_) => 1,
        }
    }
}
