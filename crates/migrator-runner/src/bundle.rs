// migrator-runner/src/bundle.rs
// ============================================================================
// Module: Run Bundle Manager (C9)
// Description: Per-run directory layout, atomic writes, checkpoint, manifest.
// Purpose: Centralize paths and give checkpoint/manifest writers one atomic
//          write primitive, with POSIX permissions enforced on the bundle
//          directory.
// Dependencies: migrator-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`RunBundle`] owns one `runs/<run_id>/` directory: `input/`,
//! `output/data/`, `reports/`, `logs/`, plus `checkpoint.json` and
//! `run_manifest.json` at the root. The manifest is always written last,
//! after every other artifact, and carries a SHA-256 checksum of every file
//! the bundle contains.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use migrator_core::DatasetFingerprint;
use migrator_core::HashAlgorithm;
use migrator_core::HashDigest;
use migrator_core::RunId;
use migrator_core::TableName;
use migrator_core::core::hashing::hash_bytes;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Schema version
// ============================================================================

/// Semver of the on-disk run bundle layout (`run_manifest.json`,
/// `checkpoint.json`, directory structure).
pub const BUNDLE_SCHEMA_VERSION: &str = "1.0.0";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by run bundle operations.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A bundle directory could not be created.
    #[error("failed to create bundle directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A bundle artifact could not be written.
    #[error("failed to write bundle file {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A bundle artifact could not be read.
    #[error("failed to read bundle file {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An artifact failed to serialize to JSON.
    #[error("failed to serialize bundle artifact: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The requested run bundle does not exist.
    #[error("run bundle {0} does not exist under {1}")]
    NotFound(RunId, PathBuf),
}

// ============================================================================
// SECTION: Checkpoint
// ============================================================================

/// Resumable progress marker for one migration run, written after every
/// successfully committed data batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Tables fully copied and validated so far.
    pub completed_tables: Vec<TableName>,
    /// Table currently being copied, if any.
    pub current_table: Option<TableName>,
    /// Row offset within `current_table` already committed.
    pub current_offset: u64,
}

impl Checkpoint {
    /// Returns `true` when `table` has already been fully copied.
    #[must_use]
    pub fn is_completed(&self, table: &TableName) -> bool {
        self.completed_tables.contains(table)
    }
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Final disposition of a migration run, recorded in the manifest on every
/// exit path, including failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run is still in progress (only observed mid-run, never persisted
    /// at rest on a finalized bundle).
    Running,
    /// The run completed and validation found no parity mismatch.
    Success,
    /// The run completed but validation found a parity mismatch.
    ValidationMismatch,
    /// The run failed before completion.
    Failed,
    /// The run was cancelled before completion.
    Cancelled,
}

/// Run bundle manifest, written exactly once, last, after every other
/// artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// On-disk layout version (see [`BUNDLE_SCHEMA_VERSION`]).
    pub schema_version: String,
    /// Identifier of this run.
    pub run_id: RunId,
    /// RFC 3339 timestamp the run started.
    pub started_at: String,
    /// RFC 3339 timestamp the run ended, once finalized.
    pub ended_at: Option<String>,
    /// Opaque identifier for the source connector (dialect tag).
    pub source_connector_id: String,
    /// Opaque identifier for the target connector (dialect tag).
    pub target_connector_id: String,
    /// Final disposition of the run.
    pub status: RunStatus,
    /// Dataset fingerprint computed by validation, when validation ran.
    pub dataset_fingerprint: Option<DatasetFingerprint>,
    /// SHA-256 checksum of every artifact in the bundle, keyed by path
    /// relative to the bundle root, sorted ascending.
    pub file_checksums: BTreeMap<String, HashDigest>,
}

// ============================================================================
// SECTION: Run Bundle
// ============================================================================

/// Owns the on-disk directory tree for one migration run.
#[derive(Debug, Clone)]
pub struct RunBundle {
    root: PathBuf,
    run_id: RunId,
}

impl RunBundle {
    /// Creates a fresh bundle directory under `runs_root`, with the standard
    /// subdirectory layout and restrictive permissions.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::CreateDir`] when a directory cannot be
    /// created.
    pub fn create(runs_root: &Path, run_id: &RunId) -> Result<Self, BundleError> {
        let root = runs_root.join(run_id.as_str());
        for sub in ["input", "output/data", "reports", "logs"] {
            create_dir_all(&root.join(sub))?;
        }
        restrict_permissions(&root, 0o700);
        Ok(Self {
            root,
            run_id: run_id.clone(),
        })
    }

    /// Reopens an existing bundle directory, for `resume`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::NotFound`] when the directory does not exist.
    pub fn reopen(runs_root: &Path, run_id: &RunId) -> Result<Self, BundleError> {
        let root = runs_root.join(run_id.as_str());
        if !root.is_dir() {
            return Err(BundleError::NotFound(run_id.clone(), runs_root.to_path_buf()));
        }
        Ok(Self {
            root,
            run_id: run_id.clone(),
        })
    }

    /// Returns the run identifier this bundle belongs to.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Returns the bundle's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a path relative to the bundle root.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Atomically writes `bytes` to `relative` (write-to-tempfile, fsync,
    /// rename), creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Write`] or [`BundleError::CreateDir`] when the
    /// write fails.
    pub fn write_atomic(&self, relative: &str, bytes: &[u8]) -> Result<(), BundleError> {
        atomic_write(&self.path(relative), bytes)
    }

    /// Atomically writes `value` as pretty-printed JSON to `relative`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Serialize`] or [`BundleError::Write`].
    pub fn write_json_atomic<T: Serialize>(
        &self,
        relative: &str,
        value: &T,
    ) -> Result<(), BundleError> {
        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');
        self.write_atomic(relative, &bytes)
    }

    /// Appends a line to `logs/migration.log`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Write`] when the log file cannot be opened or
    /// written.
    pub fn append_log(&self, line: &str) -> Result<(), BundleError> {
        let path = self.path("logs/migration.log");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| BundleError::Write {
                path: path.clone(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| BundleError::Write { path, source })
    }

    /// Writes the checkpoint, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Serialize`] or [`BundleError::Write`].
    pub fn write_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), BundleError> {
        self.write_json_atomic("checkpoint.json", checkpoint)
    }

    /// Reads back the checkpoint, if one has been written yet.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Read`] when the file exists but cannot be read
    /// or parsed.
    pub fn read_checkpoint(&self) -> Result<Option<Checkpoint>, BundleError> {
        let path = self.path("checkpoint.json");
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|source| BundleError::Read {
            path: path.clone(),
            source,
        })?;
        let checkpoint = serde_json::from_slice(&bytes)?;
        Ok(Some(checkpoint))
    }

    /// Computes the SHA-256 checksum of every file currently in the bundle,
    /// keyed by path relative to the bundle root, excluding
    /// `run_manifest.json` itself.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Read`] when a directory cannot be listed.
    pub fn checksum_all_files(&self) -> Result<BTreeMap<String, HashDigest>, BundleError> {
        let mut files = Vec::new();
        collect_files(&self.root, &self.root, &mut files)?;
        let manifest_path = self.path("run_manifest.json");

        let mut checksums = BTreeMap::new();
        for path in files {
            if path == manifest_path {
                continue;
            }
            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            let bytes = fs::read(&path).map_err(|source| BundleError::Read {
                path: path.clone(),
                source,
            })?;
            checksums.insert(relative, hash_bytes(HashAlgorithm::Sha256, &bytes));
        }
        Ok(checksums)
    }

    /// Writes the final manifest: checksums every other artifact in the
    /// bundle, attaches the dataset fingerprint and status, and writes it
    /// atomically as the very last step of a run.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when checksumming or writing fails.
    pub fn finalize(
        &self,
        started_at: &str,
        ended_at: &str,
        source_connector_id: &str,
        target_connector_id: &str,
        status: RunStatus,
        dataset_fingerprint: Option<DatasetFingerprint>,
    ) -> Result<RunManifest, BundleError> {
        let file_checksums = self.checksum_all_files()?;
        let manifest = RunManifest {
            schema_version: BUNDLE_SCHEMA_VERSION.to_string(),
            run_id: self.run_id.clone(),
            started_at: started_at.to_string(),
            ended_at: Some(ended_at.to_string()),
            source_connector_id: source_connector_id.to_string(),
            target_connector_id: target_connector_id.to_string(),
            status,
            dataset_fingerprint,
            file_checksums,
        };
        self.write_json_atomic("run_manifest.json", &manifest)?;
        Ok(manifest)
    }
}

// ============================================================================
// SECTION: Filesystem helpers
// ============================================================================

fn create_dir_all(path: &Path) -> Result<(), BundleError> {
    fs::create_dir_all(path).map_err(|source| BundleError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), BundleError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    create_dir_all(parent)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("artifact");
    let tmp_path = parent.join(format!("{file_name}.tmp-{}", std::process::id()));

    let mut file = fs::File::create(&tmp_path).map_err(|source| BundleError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    file.write_all(bytes).map_err(|source| BundleError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    file.sync_all().map_err(|source| BundleError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| BundleError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), BundleError> {
    let entries = fs::read_dir(dir).map_err(|source| BundleError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| BundleError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) {}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_tracks_completed_tables() {
        let mut checkpoint = Checkpoint::default();
        checkpoint.completed_tables.push(TableName::new("customers"));
        assert!(checkpoint.is_completed(&TableName::new("customers")));
        assert!(!checkpoint.is_completed(&TableName::new("orders")));
    }

    #[test]
    fn bundle_create_writes_checkpoint_and_reads_it_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let run_id = RunId::new("test-run-1");
        let bundle = RunBundle::create(dir.path(), &run_id).expect("create bundle");

        assert!(bundle.read_checkpoint().expect("read").is_none());

        let mut checkpoint = Checkpoint::default();
        checkpoint.current_offset = 42;
        bundle.write_checkpoint(&checkpoint).expect("write checkpoint");

        let read_back = bundle.read_checkpoint().expect("read").expect("present");
        assert_eq!(read_back.current_offset, 42);
    }

    #[test]
    fn finalize_checksums_every_written_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let run_id = RunId::new("test-run-2");
        let bundle = RunBundle::create(dir.path(), &run_id).expect("create bundle");
        bundle
            .write_atomic("output/data/widgets.csv", b"id,name\n1,a\n")
            .expect("write data file");

        let manifest = bundle
            .finalize(
                "2026-01-01T00:00:00Z",
                "2026-01-01T00:01:00Z",
                "sqlite",
                "sqlite",
                RunStatus::Success,
                None,
            )
            .expect("finalize");

        assert!(manifest.file_checksums.contains_key("output/data/widgets.csv"));
        assert!(!manifest.file_checksums.contains_key("run_manifest.json"));
    }

    #[test]
    fn reopen_fails_for_missing_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = RunBundle::reopen(dir.path(), &RunId::new("nonexistent"));
        assert!(result.is_err());
    }
}
