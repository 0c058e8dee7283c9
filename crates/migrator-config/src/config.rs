// migrator-config/src/config.rs
// ============================================================================
// Module: Migrator Configuration
// Description: Configuration loading and validation for the migration engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: migrator-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits, then
//! overridden field-by-field from `MIGRATOR_*` environment variables.
//! Missing or invalid configuration fails closed rather than falling back to
//! a silently permissive default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use migrator_core::Dialect;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "migrator.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MIGRATOR_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Environment variable carrying the source connection string.
pub const SOURCE_ENV_VAR: &str = "MIGRATOR_SOURCE";
/// Environment variable carrying the target connection string.
pub const TARGET_ENV_VAR: &str = "MIGRATOR_TARGET";
/// Environment variable carrying the batch size override.
pub const BATCH_SIZE_ENV_VAR: &str = "MIGRATOR_BATCH_SIZE";
/// Environment variable carrying an encryption key for credentials embedded
/// in the config file, when the file stores them encrypted at rest.
pub const MASTER_KEY_ENV_VAR: &str = "MIGRATOR_MASTER_KEY";
/// Default batch size for data copy operations.
pub(crate) const DEFAULT_BATCH_SIZE: u32 = 1_000;
/// Minimum allowed batch size.
pub(crate) const MIN_BATCH_SIZE: u32 = 1;
/// Maximum allowed batch size.
pub(crate) const MAX_BATCH_SIZE: u32 = 1_000_000;
/// Default per-batch timeout in milliseconds.
pub(crate) const DEFAULT_BATCH_TIMEOUT_MS: u64 = 30_000;
/// Minimum allowed per-batch timeout in milliseconds.
pub(crate) const MIN_BATCH_TIMEOUT_MS: u64 = 100;
/// Maximum allowed per-batch timeout in milliseconds.
pub(crate) const MAX_BATCH_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Output Mode
// ============================================================================

/// Where the runner sends migrated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Write directly into a live target database.
    #[default]
    Database,
    /// Write a run bundle to disk without touching a live target.
    Bundle,
    /// Validate only; no data is written anywhere.
    DryRun,
}

// ============================================================================
// SECTION: Routines Mode
// ============================================================================

/// How the runner handles stored routines and triggers (C6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutinesMode {
    /// Skip routines and triggers entirely.
    #[default]
    Skip,
    /// Attempt the fixed rewrite table; report anything it cannot translate.
    Translate,
    /// Report risk scores and proposed rewrites without applying anything.
    Analyze,
}

// ============================================================================
// SECTION: Migration Config
// ============================================================================

/// Top-level migration engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    /// Source connection string or `file://` directory path.
    #[serde(default)]
    pub source: Option<String>,
    /// Target connection string, `file://` directory path, or bundle output
    /// directory (depending on `output.mode`).
    #[serde(default)]
    pub target: Option<String>,
    /// Batch sizing and timeout configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Output mode and bundle destination.
    #[serde(default)]
    pub output: OutputConfig,
    /// Checkpoint file path for resumable runs.
    #[serde(default)]
    pub checkpoint_file: Option<PathBuf>,
    /// Stored routine / trigger handling mode.
    #[serde(default)]
    pub routines_mode: RoutinesMode,
    /// Drop any tables the runner created when a run fails partway through.
    #[serde(default)]
    pub clean_on_failure: bool,
    /// Enable deterministic sampling for fingerprinting tables above a row
    /// count threshold instead of hashing every row.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl MigrationConfig {
    /// Loads configuration from disk using the default resolution rules,
    /// then applies `MIGRATOR_*` environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid(
                "config file exceeds size limit".to_string(),
            ));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration purely from environment variables and
    /// defaults, for CLI invocations that pass no config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            source: None,
            target: None,
            batch: BatchConfig::default(),
            output: OutputConfig::default(),
            checkpoint_file: None,
            routines_mode: RoutinesMode::default(),
            clean_on_failure: false,
            sampling: SamplingConfig::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(source) = env::var(SOURCE_ENV_VAR) {
            self.source = Some(source);
        }
        if let Ok(target) = env::var(TARGET_ENV_VAR) {
            self.target = Some(target);
        }
        if let Ok(batch_size) = env::var(BATCH_SIZE_ENV_VAR)
            && let Ok(parsed) = batch_size.parse::<u32>()
        {
            self.batch.size = parsed;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(source) = &self.source else {
            return Err(ConfigError::Invalid("source is required".to_string()));
        };
        if source.trim().is_empty() {
            return Err(ConfigError::Invalid("source must be non-empty".to_string()));
        }
        if self.output.mode != OutputMode::DryRun {
            let Some(target) = &self.target else {
                return Err(ConfigError::Invalid(
                    "target is required unless output.mode=dry_run".to_string(),
                ));
            };
            if target.trim().is_empty() {
                return Err(ConfigError::Invalid("target must be non-empty".to_string()));
            }
        }
        self.batch.validate()?;
        self.output.validate()?;
        self.sampling.validate()?;
        Ok(())
    }

    /// Parses the source dialect tag from the source connection string's
    /// scheme (everything before `://`).
    #[must_use]
    pub fn source_dialect(&self) -> Option<Dialect> {
        self.source.as_deref().and_then(dialect_from_url)
    }

    /// Parses the target dialect tag from the target connection string's
    /// scheme.
    #[must_use]
    pub fn target_dialect(&self) -> Option<Dialect> {
        self.target.as_deref().and_then(dialect_from_url)
    }
}

fn dialect_from_url(url: &str) -> Option<Dialect> {
    let scheme = url.split("://").next()?;
    scheme.parse().ok()
}

/// Reads the master key used to decrypt credentials embedded in the config
/// file, if one is configured. Never logged or included in error messages.
#[must_use]
pub fn master_key() -> Option<String> {
    env::var(MASTER_KEY_ENV_VAR).ok()
}

// ============================================================================
// SECTION: Batch Config
// ============================================================================

/// Batch sizing and timeout settings for data copy operations.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Number of rows read and written per batch.
    #[serde(default = "default_batch_size")]
    pub size: u32,
    /// Per-batch timeout in milliseconds.
    #[serde(default = "default_batch_timeout_ms")]
    pub timeout_ms: u64,
    /// Number of worker threads for the optional parallel data-copy stage;
    /// `1` disables parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
            timeout_ms: default_batch_timeout_ms(),
            parallelism: default_parallelism(),
        }
    }
}

impl BatchConfig {
    /// Validates batch configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is out of its allowed range.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.size < MIN_BATCH_SIZE || self.size > MAX_BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "batch.size must be between {MIN_BATCH_SIZE} and {MAX_BATCH_SIZE}"
            )));
        }
        if self.timeout_ms < MIN_BATCH_TIMEOUT_MS || self.timeout_ms > MAX_BATCH_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "batch.timeout_ms must be between {MIN_BATCH_TIMEOUT_MS} and \
                 {MAX_BATCH_TIMEOUT_MS}"
            )));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::Invalid(
                "batch.parallelism must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Output Config
// ============================================================================

/// Output destination configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Output mode.
    #[serde(default)]
    pub mode: OutputMode,
    /// Bundle output directory, required when `mode = "bundle"`.
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,
}

impl OutputConfig {
    /// Validates output configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `mode = "bundle"` lacks `bundle_dir`.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == OutputMode::Bundle && self.bundle_dir.is_none() {
            return Err(ConfigError::Invalid(
                "output.bundle_dir is required when output.mode=bundle".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Sampling Config
// ============================================================================

/// Deterministic sampling settings for fingerprinting large tables.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Enable sampling for tables above `threshold_rows`.
    #[serde(default)]
    pub enabled: bool,
    /// Row count above which sampling kicks in.
    #[serde(default = "default_sampling_threshold")]
    pub threshold_rows: u64,
    /// Number of rows to sample when sampling is active.
    #[serde(default = "default_sample_size")]
    pub sample_size: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_rows: default_sampling_threshold(),
            sample_size: default_sample_size(),
        }
    }
}

impl SamplingConfig {
    /// Validates sampling configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `sample_size` exceeds `threshold_rows`.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.sample_size > self.threshold_rows {
            return Err(ConfigError::Invalid(
                "sampling.sample_size must not exceed sampling.threshold_rows".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

const fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

const fn default_batch_timeout_ms() -> u64 {
    DEFAULT_BATCH_TIMEOUT_MS
}

const fn default_parallelism() -> u32 {
    1
}

const fn default_sampling_threshold() -> u64 {
    10_000_000
}

const fn default_sample_size() -> u64 {
    1_000_000
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(from_env) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(from_env));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),
    /// The configuration file could not be parsed as TOML.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// The configuration failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> MigrationConfig {
        MigrationConfig {
            source: Some("sqlite:///tmp/source.db".to_string()),
            target: Some("sqlite:///tmp/target.db".to_string()),
            batch: BatchConfig::default(),
            output: OutputConfig::default(),
            checkpoint_file: None,
            routines_mode: RoutinesMode::default(),
            clean_on_failure: false,
            sampling: SamplingConfig::default(),
        }
    }

    #[test]
    fn missing_source_fails_validation() {
        let mut config = minimal_config();
        config.source = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn dry_run_does_not_require_target() {
        let mut config = minimal_config();
        config.target = None;
        config.output.mode = OutputMode::DryRun;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bundle_mode_requires_bundle_dir() {
        let mut config = minimal_config();
        config.output.mode = OutputMode::Bundle;
        assert!(config.validate().is_err());
        config.output.bundle_dir = Some(PathBuf::from("/tmp/bundle"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn batch_size_out_of_range_fails_validation() {
        let mut config = minimal_config();
        config.batch.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_size_larger_than_threshold_fails_validation() {
        let mut config = minimal_config();
        config.sampling.enabled = true;
        config.sampling.threshold_rows = 100;
        config.sampling.sample_size = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn source_dialect_parses_scheme() {
        let config = minimal_config();
        assert_eq!(config.source_dialect(), Some(Dialect::Sqlite));
    }
}
