// migrator-config/src/lib.rs
// ============================================================================
// Module: Migrator Config Library
// Description: Canonical config model and fail-closed validation.
// Purpose: Single source of truth for migrator.toml semantics.
// Dependencies: migrator-core, serde, toml
// ============================================================================

//! ## Overview
//! `migrator-config` defines the canonical configuration model for the
//! migration engine: source/target connection strings, batch sizing,
//! output mode, checkpointing, routine handling, and fingerprint sampling.
//! It provides strict, fail-closed loading with `MIGRATOR_*` environment
//! variable overrides.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::BATCH_SIZE_ENV_VAR;
pub use config::BatchConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::MASTER_KEY_ENV_VAR;
pub use config::MigrationConfig;
pub use config::OutputConfig;
pub use config::OutputMode;
pub use config::RoutinesMode;
pub use config::SOURCE_ENV_VAR;
pub use config::SamplingConfig;
pub use config::TARGET_ENV_VAR;
pub use config::master_key;
