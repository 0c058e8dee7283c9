#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )
)]
// migrator-cli/src/main.rs
// ============================================================================
// Module: Migrator CLI Entry Point
// Description: Command dispatcher for the migration and validation engine.
// Purpose: Parse connection URLs and run options, drive a MigrationRunner
//          end to end, and map its outcome onto the documented exit codes.
// Dependencies: clap, migrator-core, migrator-config, migrator-runner,
//               the adapter crates, serde_json, thiserror, tokio, tracing.
// ============================================================================

//! ## Overview
//! The migrator CLI resolves `--source`/`--target` connection URLs to
//! concrete adapters, builds a [`MigrationConfig`], and drives a
//! [`MigrationRunner`] through either a full run, a resumed run, or a
//! dry-run preflight pass. All user-facing strings are routed through the
//! i18n catalog to prepare for future localization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use migrator_cli::adapter_dispatch::open_adapter;
use migrator_cli::t;
use migrator_config::MigrationConfig;
use migrator_config::OutputConfig;
use migrator_config::OutputMode;
use migrator_config::RoutinesMode;
use migrator_core::RunId;
use migrator_runner::MigrationRunner;
use migrator_runner::RunStatus;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "migrator",
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Source connection URL, e.g. `postgresql://user@host/db`.
    #[arg(long, value_name = "URL")]
    source: Option<String>,
    /// Target connection URL. Legacy alias for a `sqlite://` target file.
    #[arg(long, value_name = "URL")]
    target: Option<String>,
    /// Legacy alias for `--target` naming a SQLite file directory.
    #[arg(long, value_name = "DIR")]
    target_dir: Option<PathBuf>,
    /// Run preflight checks only; no schema or data is written anywhere.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Path to the checkpoint file used for resumable runs.
    #[arg(long, value_name = "PATH")]
    checkpoint_file: Option<PathBuf>,
    /// Where migrated data is written.
    #[arg(long, value_enum, default_value_t = CliOutputMode::Db)]
    output_mode: CliOutputMode,
    /// Directory for the run bundle artifacts (defaults to `./runs`).
    #[arg(long, value_name = "DIR", default_value = "runs")]
    output_dir: PathBuf,
    /// Drop any tables the runner created if the run fails partway through.
    #[arg(long, action = ArgAction::SetTrue)]
    clean_on_failure: bool,
    /// Resume a previously started run by id or by path under `--output-dir`.
    #[arg(long, value_name = "ID_OR_PATH")]
    resume_run: Option<String>,
    /// How stored routines and triggers are handled.
    #[arg(long, value_enum, default_value_t = CliRoutinesMode::None)]
    routines_mode: CliRoutinesMode,
    /// Directory to additionally copy `routines.sql` and the routine
    /// migration report into, alongside the run bundle.
    #[arg(long, value_name = "DIR")]
    routines_out: Option<PathBuf>,
}

/// CLI-facing output mode, matching the documented `--output-mode` values.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum CliOutputMode {
    /// Write directly into the live target database.
    Db,
    /// Write only a run bundle; no live target is touched.
    Files,
    /// Write to the live target database and keep the full run bundle.
    Both,
}

/// CLI-facing routines mode, matching the documented `--routines-mode`
/// values (a superset of [`RoutinesMode`] with two additional stub tiers).
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum CliRoutinesMode {
    /// Skip routines and triggers entirely.
    None,
    /// Report risk scores and proposed rewrites without applying anything.
    Analyze,
    /// Attempt the fixed rewrite table; anything it cannot translate is
    /// stubbed out with a warning comment rather than omitted.
    Stub,
    /// Attempt the fixed rewrite table and the safe trigger subset.
    SubsetTranslate,
}

impl From<CliRoutinesMode> for RoutinesMode {
    fn from(mode: CliRoutinesMode) -> Self {
        match mode {
            CliRoutinesMode::None => Self::Skip,
            CliRoutinesMode::Analyze => Self::Analyze,
            CliRoutinesMode::Stub | CliRoutinesMode::SubsetTranslate => Self::Translate,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => exit_code_from(code),
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher, returning the documented exit code.
async fn run() -> CliResult<i32> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(0);
    }

    let target = cli
        .target
        .clone()
        .or_else(|| cli.target_dir.as_ref().map(|dir| format!("sqlite://{}", dir.display())));

    let config = build_config(&cli, target)?;
    config.validate().map_err(|err| CliError::new(t!("config.validate_failed", error = err)))?;

    if let Some(resume_id) = &cli.resume_run {
        return command_resume(&cli, &config, resume_id).await;
    }

    if cli.dry_run {
        return command_dry_run(&config).await;
    }

    command_run(&cli, config).await
}

/// Builds a [`MigrationConfig`] from parsed CLI arguments.
fn build_config(cli: &Cli, target: Option<String>) -> CliResult<MigrationConfig> {
    let output_mode = match cli.output_mode {
        CliOutputMode::Db | CliOutputMode::Both => OutputMode::Database,
        CliOutputMode::Files => OutputMode::Bundle,
    };
    let output_mode = if cli.dry_run { OutputMode::DryRun } else { output_mode };

    Ok(MigrationConfig {
        source: cli.source.clone(),
        target,
        batch: migrator_config::BatchConfig::default(),
        output: OutputConfig {
            mode: output_mode,
            bundle_dir: Some(cli.output_dir.clone()),
        },
        checkpoint_file: cli.checkpoint_file.clone(),
        routines_mode: cli.routines_mode.into(),
        clean_on_failure: cli.clean_on_failure,
        sampling: migrator_config::SamplingConfig::default(),
    })
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes a fresh migration run to completion.
async fn command_run(cli: &Cli, config: MigrationConfig) -> CliResult<i32> {
    let Some(source_url) = config.source.clone() else {
        return Err(CliError::new(t!("main.missing_source")));
    };
    if config.target.is_none() && config.output.mode != OutputMode::DryRun {
        return Err(CliError::new(t!("main.missing_target")));
    }

    let source = open_adapter(&source_url)
        .await
        .map_err(|err| CliError::new(t!("source.open_failed", url = source_url, error = err)))?;
    let target_url = config.target.clone().unwrap_or_default();
    let target = open_adapter(&target_url)
        .await
        .map_err(|err| CliError::new(t!("target.open_failed", url = target_url, error = err)))?;

    tracing::info!(source = %source_url, "starting migration run");
    let mut runner = MigrationRunner::new(source, target, config, cli.output_dir.clone());
    let outcome = runner.run().await.map_err(|err| {
        tracing::error!(error = %err, "migration run failed");
        CliError::new(t!("run.failed", error = err))
    })?;

    if let Some(routines_out) = &cli.routines_out {
        copy_routine_artifacts(&cli.output_dir, &outcome.run_id, routines_out)?;
    }

    print_summary(&cli.output_dir, &outcome.run_id, outcome.status);
    Ok(outcome.exit_code())
}

/// Resumes a previously started run identified by id or bundle path.
async fn command_resume(cli: &Cli, config: &MigrationConfig, resume_id: &str) -> CliResult<i32> {
    let Some(source_url) = config.source.clone() else {
        return Err(CliError::new(t!("main.missing_source")));
    };
    let Some(target_url) = config.target.clone() else {
        return Err(CliError::new(t!("main.missing_target")));
    };

    let source = open_adapter(&source_url)
        .await
        .map_err(|err| CliError::new(t!("source.open_failed", url = source_url, error = err)))?;
    let target = open_adapter(&target_url)
        .await
        .map_err(|err| CliError::new(t!("target.open_failed", url = target_url, error = err)))?;

    let run_id = resolve_resume_id(resume_id);
    let mut runner = MigrationRunner::new(source, target, config.clone(), cli.output_dir.clone());
    let outcome = runner
        .resume(&run_id)
        .await
        .map_err(|err| CliError::new(t!("resume.not_found", run_id = resume_id, error = err)))?;

    print_summary(&cli.output_dir, &outcome.run_id, outcome.status);
    Ok(outcome.exit_code())
}

/// Runs preflight checks only, printing any limitations found.
async fn command_dry_run(config: &MigrationConfig) -> CliResult<i32> {
    let Some(source_url) = config.source.clone() else {
        return Err(CliError::new(t!("main.missing_source")));
    };

    write_stdout_line(&t!("dry_run.started")).map_err(|err| CliError::new(output_error("stdout", &err)))?;

    let source = open_adapter(&source_url)
        .await
        .map_err(|err| CliError::new(t!("source.open_failed", url = source_url, error = err)))?;
    // A dry run never writes anywhere, but the runner still needs a
    // `TargetAdapter` type parameter; a file adapter rooted at the bundle
    // directory is never opened against unless schema emission actually runs.
    let target_url = format!("file://{}", std::env::temp_dir().display());
    let target = open_adapter(&target_url)
        .await
        .map_err(|err| CliError::new(t!("target.open_failed", url = target_url, error = err)))?;

    let mut runner = MigrationRunner::new(source, target, config.clone(), std::env::temp_dir());
    let limitations = runner.dry_run().await.map_err(|err| CliError::new(t!("run.failed", error = err)))?;

    if limitations.is_empty() {
        write_stdout_line(&t!("dry_run.clean")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(0);
    }

    for limitation in &limitations {
        let line = t!(
            "dry_run.limitation_line",
            severity = format!("{:?}", limitation.severity),
            category = format!("{:?}", limitation.category),
            description = limitation.description
        );
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }

    Ok(0)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves `--resume-run`'s argument, which may be a bare run id or a
/// filesystem path ending in the run id's directory name.
fn resolve_resume_id(resume_id: &str) -> RunId {
    let candidate = PathBuf::from(resume_id);
    match candidate.file_name().and_then(|name| name.to_str()) {
        Some(name) if candidate.components().count() > 1 => RunId::new(name),
        _ => RunId::new(resume_id),
    }
}

/// Copies the routine migration artifacts into a separate directory, for
/// operators who want them outside the run bundle.
fn copy_routine_artifacts(runs_root: &std::path::Path, run_id: &RunId, dest: &std::path::Path) -> CliResult<()> {
    std::fs::create_dir_all(dest).map_err(|err| {
        CliError::new(t!("run.failed", error = format!("could not create {}: {err}", dest.display())))
    })?;
    let bundle_root = runs_root.join(run_id.as_str());
    for (relative, file_name) in [
        ("output/routines.sql", "routines.sql"),
        ("reports/routine_migration_report.md", "routine_migration_report.md"),
    ] {
        let source_path = bundle_root.join(relative);
        if source_path.is_file() {
            let _ = std::fs::copy(&source_path, dest.join(file_name));
        }
    }
    Ok(())
}

/// Prints the single-line run summary required by the error-handling design.
fn print_summary(runs_root: &std::path::Path, run_id: &RunId, status: RunStatus) {
    let bundle_dir = runs_root.join(run_id.as_str()).display().to_string();
    let message = match status {
        RunStatus::Success => t!("run.summary.success", run_id = run_id, bundle_dir = bundle_dir),
        RunStatus::ValidationMismatch => {
            t!("run.summary.mismatch", run_id = run_id, bundle_dir = bundle_dir)
        }
        RunStatus::Cancelled => t!("run.summary.cancelled", run_id = run_id, bundle_dir = bundle_dir),
        RunStatus::Failed | RunStatus::Running => {
            t!("run.summary.failed", run_id = run_id, bundle_dir = bundle_dir)
        }
    };
    let _ = write_stdout_line(&message);
}

/// Converts a documented exit code (`i32`, always `0..=3`) into an
/// [`ExitCode`].
fn exit_code_from(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
