// migrator-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The migrator CLI stores user-facing strings in a small translation
//! catalog to enforce consistent messaging and to prepare for future
//! locales. All runtime output should be routed through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries loaded into the localized message bundle.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "migrator {version}"),
    ("main.missing_source", "--source is required unless --resume-run is given"),
    ("main.missing_target", "--target is required unless --dry-run is given"),
    ("config.load_failed", "Failed to load configuration: {error}"),
    ("config.validate_failed", "Configuration is invalid: {error}"),
    ("dialect.unsupported", "{url} names a dialect this build has no adapter for: {error}"),
    ("source.open_failed", "Failed to open source {url}: {error}"),
    ("target.open_failed", "Failed to open target {url}: {error}"),
    ("run.started", "Starting migration run {run_id}"),
    ("run.resumed", "Resuming migration run {run_id}"),
    ("run.failed", "Migration run failed: {error}"),
    (
        "run.summary.success",
        "Run {run_id}: SUCCESS. Bundle at {bundle_dir}.",
    ),
    (
        "run.summary.mismatch",
        "Run {run_id}: VALIDATION MISMATCH. See {bundle_dir}/reports/validation_report.txt.",
    ),
    (
        "run.summary.cancelled",
        "Run {run_id}: CANCELLED. Bundle at {bundle_dir}.",
    ),
    (
        "run.summary.failed",
        "Run {run_id}: FAILED. Partial bundle at {bundle_dir}.",
    ),
    ("dry_run.started", "Running preflight checks only (--dry-run)"),
    ("dry_run.clean", "No limitations found; migration is expected to proceed without manual steps."),
    ("dry_run.limitation_line", "- [{severity}] {category}: {description}"),
    ("resume.not_found", "No run found matching {run_id}: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English fallback catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static English catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
