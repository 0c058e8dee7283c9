// migrator-adapter-file/src/lib.rs
// ============================================================================
// Module: File Adapter Library
// Description: SourceAdapter/TargetAdapter backend using CSV directories.
// Purpose: Let the migration engine read from or write to a plain
//          directory of CSV files without a live database on either side.
// Dependencies: migrator-core, csv
// ============================================================================

//! ## Overview
//! This crate provides a CSV-directory-backed [`FileAdapter`] implementing
//! both `SourceAdapter` and `TargetAdapter`, one `<table>.csv` file per
//! table with RFC 4180 formatting via the `csv` crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::FileAdapter;
pub use adapter::FileAdapterConfig;
pub use adapter::FileAdapterError;
