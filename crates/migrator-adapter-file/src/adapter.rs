// migrator-adapter-file/src/adapter.rs
// ============================================================================
// Module: File Adapter
// Description: SourceAdapter/TargetAdapter implementation backed by a
//              directory of RFC 4180 CSV files, one file per table.
// Purpose: Let the migration engine read from or write to a plain CSV
//          directory, useful for staging data outside any database.
// Dependencies: csv, migrator-core, thiserror
// ============================================================================

//! ## Overview
//! [`FileAdapter`] treats a directory as a dialect-neutral database: each
//! `<table>.csv` file is one table, its header row gives column names, and
//! every value is read and written as text since CSV carries no column
//! typing of its own. Schema introspection therefore always reports
//! [`IrKind::Text`] columns; the type registry still runs so a downstream
//! target can request a narrower type if it knows better.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use csv::ReaderBuilder;
use csv::WriterBuilder;
use migrator_core::AdapterError;
use migrator_core::Capability;
use migrator_core::ColumnIr;
use migrator_core::ColumnName;
use migrator_core::IrKind;
use migrator_core::Row;
use migrator_core::SchemaIr;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeInfo;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading the adapter's backing directory, wrapped
/// into [`AdapterError`] at the trait boundary.
#[derive(Debug, Error)]
pub enum FileAdapterError {
    /// The configured directory does not exist and could not be created.
    #[error("could not prepare directory {path}: {source}")]
    Directory {
        /// Directory path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A CSV file could not be read or written.
    #[error("csv error on {path}: {source}")]
    Csv {
        /// File path that failed.
        path: String,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for opening a [`FileAdapter`].
#[derive(Debug, Clone)]
pub struct FileAdapterConfig {
    /// Directory holding one `<table>.csv` file per table.
    pub directory: PathBuf,
}

impl FileAdapterConfig {
    /// Builds a config pointing at `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.directory.join(format!("{table}.csv"))
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// CSV-directory-backed [`SourceAdapter`] and [`TargetAdapter`].
pub struct FileAdapter {
    config: FileAdapterConfig,
    capabilities: Vec<Capability>,
}

impl FileAdapter {
    /// Opens (creating if absent) the directory at `config.directory`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Connection`] when the directory cannot be
    /// created.
    pub fn open(config: FileAdapterConfig) -> Result<Self, AdapterError> {
        fs::create_dir_all(&config.directory).map_err(|source| AdapterError::Connection {
            dialect: "file".to_string(),
            message: FileAdapterError::Directory {
                path: config.directory.display().to_string(),
                source,
            }
            .to_string(),
        })?;
        Ok(Self {
            config,
            capabilities: vec![Capability::DataOnly, Capability::SchemaAndData],
        })
    }

    fn list_table_names(&self) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.directory)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|extension| extension.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn introspect_table(&self, table_name: &str) -> Result<TableIr, AdapterError> {
        let path = self.config.table_path(table_name);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(|source| introspection_error(table_name, &path, source))?;
        let headers = reader
            .headers()
            .map_err(|source| introspection_error(table_name, &path, source))?
            .clone();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnIr {
                name: ColumnName::new(name),
                type_info: TypeInfo {
                    raw: "TEXT".to_string(),
                    ir_kind: IrKind::Text,
                    nullable: true,
                },
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "a header row never has anywhere near u32::MAX columns"
                )]
                ordinal: (index + 1) as u32,
                default_expr: None,
            })
            .collect();
        Ok(TableIr {
            name: TableName::new(table_name),
            columns,
            constraints: Vec::new(),
            estimated_row_count: count_data_rows(&path).ok(),
        })
    }
}

fn introspection_error(table_name: &str, path: &Path, source: csv::Error) -> AdapterError {
    AdapterError::Introspection {
        table: TableName::new(table_name),
        message: FileAdapterError::Csv {
            path: path.display().to_string(),
            source,
        }
        .to_string(),
    }
}

fn count_data_rows(path: &Path) -> Result<u64, csv::Error> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut count: u64 = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

fn value_to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn field_to_value(field: &str) -> Value {
    if field.is_empty() {
        Value::Null
    } else {
        Value::String(field.to_string())
    }
}

fn read_batch_sync(
    path: &Path,
    columns: &[ColumnIr],
    offset: u64,
    batch_size: u32,
) -> Result<Vec<Row>, csv::Error> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let position = index as u64;
        if position < offset {
            continue;
        }
        if rows.len() >= batch_size as usize {
            break;
        }
        let fields: Vec<(String, Value)> = columns
            .iter()
            .enumerate()
            .map(|(column_index, column)| {
                let field = record.get(column_index).unwrap_or_default();
                (column.name.as_str().to_string(), field_to_value(field))
            })
            .collect();
        rows.push(Row::new(fields));
    }
    Ok(rows)
}

fn write_batch_sync(path: &Path, columns: &[ColumnIr], rows: &[Row]) -> Result<(), csv::Error> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(csv::Error::from)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| {
                row.columns
                    .iter()
                    .find(|(name, _)| name == column.name.as_str())
                    .map_or_else(String::new, |(_, value)| value_to_field(value))
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

impl SourceAdapter for FileAdapter {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn introspect_schema(&mut self) -> impl Future<Output = Result<SchemaIr, AdapterError>> + Send {
        async move {
            let table_names = self.list_table_names().map_err(|error| AdapterError::Introspection {
                table: TableName::new("*"),
                message: error.to_string(),
            })?;
            let mut schema = SchemaIr::new();
            for table_name in table_names {
                schema.tables.push(self.introspect_table(&table_name)?);
            }
            Ok(schema)
        }
    }

    fn read_batch(
        &mut self,
        table: &TableIr,
        offset: u64,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<Row>, AdapterError>> + Send {
        let table = table.clone();
        async move {
            let path = self.config.table_path(table.name.as_str());
            read_batch_sync(&path, &table.columns, offset, batch_size).map_err(|error| {
                AdapterError::DataIo {
                    table: table.name.clone(),
                    message: error.to_string(),
                }
            })
        }
    }

    fn estimate_row_count(
        &mut self,
        table: &TableName,
    ) -> impl Future<Output = Result<Option<u64>, AdapterError>> + Send {
        let table = table.clone();
        async move {
            let path = self.config.table_path(table.as_str());
            Ok(count_data_rows(&path).ok())
        }
    }
}

impl TargetAdapter for FileAdapter {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn create_table(&mut self, table: &TableIr) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let table = table.clone();
        async move {
            let path = self.config.table_path(table.name.as_str());
            if path.exists() {
                return Ok(());
            }
            let header: Vec<&str> = table.columns.iter().map(|column| column.name.as_str()).collect();
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_path(&path)
                .map_err(|source| AdapterError::DdlEmission {
                    table: table.name.clone(),
                    message: FileAdapterError::Csv {
                        path: path.display().to_string(),
                        source,
                    }
                    .to_string(),
                })?;
            writer
                .write_record(&header)
                .and_then(|()| writer.flush().map_err(csv::Error::from))
                .map_err(|source| AdapterError::DdlEmission {
                    table: table.name.clone(),
                    message: FileAdapterError::Csv {
                        path: path.display().to_string(),
                        source,
                    }
                    .to_string(),
                })?;
            Ok(())
        }
    }

    fn write_batch(
        &mut self,
        table: &TableIr,
        rows: &[Row],
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let table = table.clone();
        let rows = rows.to_vec();
        async move {
            let path = self.config.table_path(table.name.as_str());
            write_batch_sync(&path, &table.columns, &rows).map_err(|error| AdapterError::DataIo {
                table: table.name.clone(),
                message: error.to_string(),
            })
        }
    }

    fn read_batch(
        &mut self,
        table: &TableIr,
        offset: u64,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<Row>, AdapterError>> + Send {
        SourceAdapter::read_batch(self, table, offset, batch_size)
    }

    fn drop_tables(&mut self, tables: &[TableName]) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let tables = tables.to_vec();
        async move {
            for table in &tables {
                let path = self.config.table_path(table.as_str());
                if path.exists() {
                    fs::remove_file(&path).map_err(|error| AdapterError::DdlEmission {
                        table: table.clone(),
                        message: error.to_string(),
                    })?;
                }
            }
            Ok(())
        }
    }

    fn get_table_schema(
        &mut self,
        table: &TableName,
    ) -> impl Future<Output = Result<Option<TableIr>, AdapterError>> + Send {
        let table = table.clone();
        async move {
            let path = self.config.table_path(table.as_str());
            if !path.exists() {
                return Ok(None);
            }
            self.introspect_table(table.as_str()).map(Some)
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]
mod tests {
    use super::*;

    #[test]
    fn table_path_appends_csv_extension() {
        let config = FileAdapterConfig::new("/tmp/migrator-staging");
        assert_eq!(
            config.table_path("widgets"),
            PathBuf::from("/tmp/migrator-staging/widgets.csv")
        );
    }

    #[test]
    fn field_round_trip_preserves_empty_as_null() {
        assert_eq!(field_to_value(""), Value::Null);
        assert_eq!(value_to_field(&Value::Null), String::new());
    }
}
