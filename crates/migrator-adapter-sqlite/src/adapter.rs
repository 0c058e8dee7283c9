// migrator-adapter-sqlite/src/adapter.rs
// ============================================================================
// Module: SQLite Adapter
// Description: SourceAdapter/TargetAdapter implementation backed by SQLite.
// Purpose: Let the migration engine read from or write to a SQLite file
//          without any dialect-specific code outside this crate.
// Dependencies: rusqlite (bundled), migrator-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`SqliteAdapter`] introspects a SQLite database's tables via
//! `sqlite_master` and `PRAGMA table_info`/`PRAGMA foreign_key_list`, emits
//! `CREATE TABLE` DDL from the dialect-neutral schema IR, and reads or
//! writes row batches through a single shared connection guarded by a
//! mutex, matching the single-writer model SQLite itself enforces.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use migrator_core::AdapterError;
use migrator_core::Capability;
use migrator_core::ColumnIr;
use migrator_core::ColumnName;
use migrator_core::ConstraintIr;
use migrator_core::Dialect;
use migrator_core::Row;
use migrator_core::SchemaIr;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;
use migrator_core::TypeInfo;
use migrator_core::TypeRegistry;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::ToSql;
use rusqlite::types::ValueRef;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

const MAX_PATH_COMPONENT_LEN: usize = 255;
const MAX_PATH_TOTAL_LEN: usize = 4096;
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Journal mode applied to the connection on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteJournalMode {
    /// Write-ahead log; allows concurrent readers during a write.
    Wal,
    /// Classic rollback journal.
    Delete,
}

impl SqliteJournalMode {
    const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
        }
    }
}

/// Fsync policy applied to the connection on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteSyncMode {
    /// `PRAGMA synchronous = FULL`.
    Full,
    /// `PRAGMA synchronous = NORMAL`.
    Normal,
}

impl SqliteSyncMode {
    const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Normal => "NORMAL",
        }
    }
}

/// Configuration for opening a [`SqliteAdapter`].
#[derive(Debug, Clone)]
pub struct SqliteAdapterConfig {
    /// Path to the database file. Created if it does not exist.
    pub path: PathBuf,
    /// Milliseconds to wait on a locked database before giving up.
    pub busy_timeout_ms: u32,
    /// Journal mode to apply on open.
    pub journal_mode: SqliteJournalMode,
    /// Sync mode to apply on open.
    pub sync_mode: SqliteSyncMode,
}

impl SqliteAdapterConfig {
    /// Builds a config pointing at `path` with the engine's recommended
    /// defaults: WAL journaling and normal sync.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::Wal,
            sync_mode: SqliteSyncMode::Normal,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while opening or preparing a SQLite adapter, wrapped into
/// [`AdapterError`] at the trait boundary.
#[derive(Debug, Error)]
pub enum SqliteAdapterError {
    /// The configured path failed validation (too long, or names a
    /// directory).
    #[error("invalid sqlite path: {0}")]
    InvalidPath(String),
    /// `rusqlite` reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The parent directory of the database file could not be created.
    #[error("could not create parent directory: {0}")]
    ParentDir(String),
}

// ============================================================================
// SECTION: Path validation
// ============================================================================

fn validate_store_path(path: &Path) -> Result<(), SqliteAdapterError> {
    let as_str = path.to_string_lossy();
    if as_str.len() > MAX_PATH_TOTAL_LEN {
        return Err(SqliteAdapterError::InvalidPath(format!(
            "path exceeds {MAX_PATH_TOTAL_LEN} bytes"
        )));
    }
    for component in path.components() {
        let component_str = component.as_os_str().to_string_lossy();
        if component_str.len() > MAX_PATH_COMPONENT_LEN {
            return Err(SqliteAdapterError::InvalidPath(format!(
                "path component exceeds {MAX_PATH_COMPONENT_LEN} bytes"
            )));
        }
    }
    if path.is_dir() {
        return Err(SqliteAdapterError::InvalidPath(
            "path names an existing directory".to_string(),
        ));
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), SqliteAdapterError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|error| SqliteAdapterError::ParentDir(error.to_string()))?;
        }
    }
    Ok(())
}

fn open_connection(config: &SqliteAdapterConfig) -> Result<Connection, SqliteAdapterError> {
    validate_store_path(&config.path)?;
    ensure_parent_dir(&config.path)?;
    let connection = Connection::open_with_flags(
        &config.path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
    )?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

fn apply_pragmas(
    connection: &Connection,
    config: &SqliteAdapterConfig,
) -> Result<(), SqliteAdapterError> {
    connection.busy_timeout(std::time::Duration::from_millis(u64::from(
        config.busy_timeout_ms,
    )))?;
    connection.pragma_update(None, "journal_mode", config.journal_mode.pragma_value())?;
    connection.pragma_update(None, "synchronous", config.sync_mode.pragma_value())?;
    connection.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// SQLite-backed [`SourceAdapter`] and [`TargetAdapter`].
pub struct SqliteAdapter {
    connection: Arc<Mutex<Connection>>,
    capabilities: Vec<Capability>,
    registry: TypeRegistry,
}

impl SqliteAdapter {
    /// Opens (creating if absent) the database file at `config.path`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Connection`] when the path is invalid or the
    /// connection cannot be opened.
    pub fn open(config: &SqliteAdapterConfig) -> Result<Self, AdapterError> {
        let connection = open_connection(config).map_err(|error| AdapterError::Connection {
            dialect: Dialect::Sqlite.to_string(),
            message: error.to_string(),
        })?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            capabilities: vec![
                Capability::DataOnly,
                Capability::SchemaAndData,
                Capability::Views,
            ],
            registry: TypeRegistry::new(),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn list_table_names(connection: &Connection) -> rusqlite::Result<Vec<String>> {
        let mut statement = connection.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn introspect_table(
        &self,
        connection: &Connection,
        table_name: &str,
    ) -> Result<TableIr, AdapterError> {
        let columns = self
            .introspect_columns(connection, table_name)
            .map_err(|error| AdapterError::Introspection {
                table: TableName::new(table_name),
                message: error.to_string(),
            })?;
        let mut constraints =
            self.introspect_primary_key(connection, table_name, &columns)
                .map_err(|error| AdapterError::Introspection {
                    table: TableName::new(table_name),
                    message: error.to_string(),
                })?;
        constraints.extend(self.introspect_foreign_keys(connection, table_name).map_err(
            |error| AdapterError::Introspection {
                table: TableName::new(table_name),
                message: error.to_string(),
            },
        )?);
        let estimated_row_count = estimate_row_count_sync(connection, table_name).ok();
        Ok(TableIr {
            name: TableName::new(table_name),
            columns,
            constraints,
            estimated_row_count,
        })
    }

    fn introspect_columns(
        &self,
        connection: &Connection,
        table_name: &str,
    ) -> rusqlite::Result<Vec<ColumnIr>> {
        let mut statement =
            connection.prepare(&format!("PRAGMA table_info(\"{table_name}\")"))?;
        let rows = statement.query_map([], |row| {
            let ordinal: i64 = row.get("cid")?;
            let name: String = row.get("name")?;
            let raw_type: String = row.get("type")?;
            let not_null: i64 = row.get("notnull")?;
            let default_value: Option<String> = row.get("dflt_value")?;
            Ok((ordinal, name, raw_type, not_null, default_value))
        })?;
        let mut columns = Vec::new();
        for row in rows {
            let (ordinal, name, raw_type, not_null, default_expr) = row?;
            let ir_kind = self.registry.map_to_ir(&Dialect::Sqlite, &raw_type);
            columns.push(ColumnIr {
                name: ColumnName::new(&name),
                type_info: TypeInfo {
                    raw: raw_type,
                    ir_kind,
                    nullable: not_null == 0,
                },
                #[expect(
                    clippy::cast_sign_loss,
                    clippy::cast_possible_truncation,
                    reason = "sqlite cid is always a small non-negative ordinal"
                )]
                ordinal: (ordinal + 1) as u32,
                default_expr,
            });
        }
        Ok(columns)
    }

    fn introspect_primary_key(
        &self,
        connection: &Connection,
        table_name: &str,
        columns: &[ColumnIr],
    ) -> rusqlite::Result<Vec<ConstraintIr>> {
        let mut statement =
            connection.prepare(&format!("PRAGMA table_info(\"{table_name}\")"))?;
        let pk_columns: Vec<(i64, String)> = statement
            .query_map([], |row| {
                let pk_index: i64 = row.get("pk")?;
                let name: String = row.get("name")?;
                Ok((pk_index, name))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .filter(|(pk_index, _)| *pk_index > 0)
            .collect();
        if pk_columns.is_empty() {
            return Ok(Vec::new());
        }
        let mut ordered = pk_columns;
        ordered.sort_by_key(|(pk_index, _)| *pk_index);
        let key_columns: Vec<ColumnName> = ordered
            .into_iter()
            .map(|(_, name)| ColumnName::new(&name))
            .collect();
        let _ = columns;
        Ok(vec![ConstraintIr::PrimaryKey {
            name: None,
            columns: key_columns,
        }])
    }

    fn introspect_foreign_keys(
        &self,
        connection: &Connection,
        table_name: &str,
    ) -> rusqlite::Result<Vec<ConstraintIr>> {
        let mut statement =
            connection.prepare(&format!("PRAGMA foreign_key_list(\"{table_name}\")"))?;
        let rows = statement.query_map([], |row| {
            let target_table: String = row.get("table")?;
            let from: String = row.get("from")?;
            let to: String = row.get("to")?;
            Ok((target_table, from, to))
        })?;
        let mut by_target: Vec<(String, Vec<ColumnName>, Vec<ColumnName>)> = Vec::new();
        for row in rows {
            let (target_table, from, to) = row?;
            match by_target.iter_mut().find(|(table, _, _)| *table == target_table) {
                Some((_, locals, remotes)) => {
                    locals.push(ColumnName::new(&from));
                    remotes.push(ColumnName::new(&to));
                }
                None => by_target.push((
                    target_table,
                    vec![ColumnName::new(&from)],
                    vec![ColumnName::new(&to)],
                )),
            }
        }
        Ok(by_target
            .into_iter()
            .map(|(target_table, columns, references_columns)| ConstraintIr::ForeignKey {
                name: None,
                columns,
                references_table: TableName::new(&target_table),
                references_columns,
            })
            .collect())
    }
}

fn estimate_row_count_sync(connection: &Connection, table_name: &str) -> rusqlite::Result<u64> {
    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(*) FROM \"{table_name}\""),
        [],
        |row| row.get(0),
    )?;
    #[expect(
        clippy::cast_sign_loss,
        reason = "COUNT(*) is never negative"
    )]
    Ok(count as u64)
}

fn value_from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(hex_encode_bytes(blob)),
    }
}

fn hex_encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn value_to_sqlite(value: &Value) -> Box<dyn ToSql> {
    match value {
        Value::Null => Box::new(Option::<i64>::None),
        Value::Bool(b) => Box::new(*b),
        Value::Number(number) => {
            if let Some(i) = number.as_i64() {
                Box::new(i)
            } else {
                Box::new(number.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => Box::new(s.clone()),
        other => Box::new(other.to_string()),
    }
}

fn read_batch_sync(
    connection: &Connection,
    table: &TableIr,
    offset: u64,
    batch_size: u32,
) -> rusqlite::Result<Vec<Row>> {
    let column_names: Vec<&str> = table.columns.iter().map(|column| column.name.as_str()).collect();
    let projected = column_names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let order_by = if let Some(ConstraintIr::PrimaryKey { columns, .. }) = table
        .constraints
        .iter()
        .find(|constraint| matches!(constraint, ConstraintIr::PrimaryKey { .. }))
    {
        columns
            .iter()
            .map(|column| format!("\"{}\"", column.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        "rowid".to_string()
    };
    let sql = format!(
        "SELECT {projected} FROM \"{}\" ORDER BY {order_by} LIMIT ?1 OFFSET ?2",
        table.name.as_str()
    );
    let mut statement = connection.prepare(&sql)?;
    let rows = statement.query_map([i64::from(batch_size), i64::try_from(offset).unwrap_or(i64::MAX)], |row| {
        let mut columns = Vec::with_capacity(column_names.len());
        for (index, name) in column_names.iter().enumerate() {
            let value = row.get_ref(index)?;
            columns.push(((*name).to_string(), value_from_sqlite(value)));
        }
        Ok(Row::new(columns))
    })?;
    rows.collect()
}

fn write_batch_sync(connection: &Connection, table: &TableIr, rows: &[Row]) -> rusqlite::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let column_names: Vec<String> = table
        .columns
        .iter()
        .map(|column| column.name.as_str().to_string())
        .collect();
    let placeholders = (1..=column_names.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let projected = column_names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO \"{}\" ({projected}) VALUES ({placeholders})",
        table.name.as_str()
    );
    let transaction = connection.unchecked_transaction()?;
    {
        let mut statement = transaction.prepare(&sql)?;
        for row in rows {
            let values: Vec<Box<dyn ToSql>> = column_names
                .iter()
                .map(|name| {
                    row.columns
                        .iter()
                        .find(|(column, _)| column == name)
                        .map_or_else(|| value_to_sqlite(&Value::Null), |(_, value)| value_to_sqlite(value))
                })
                .collect();
            let params: Vec<&dyn ToSql> = values.iter().map(AsRef::as_ref).collect();
            statement.execute(params.as_slice())?;
        }
    }
    transaction.commit()
}

fn create_table_sync(
    connection: &Connection,
    registry: &TypeRegistry,
    table: &TableIr,
) -> Result<(), AdapterError> {
    let mut column_defs = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        let sql_type = registry
            .map_from_ir(&Dialect::Sqlite, &column.type_info.ir_kind)
            .unwrap_or_else(|| "TEXT".to_string());
        let nullability = if column.type_info.nullable { "" } else { " NOT NULL" };
        column_defs.push(format!("\"{}\" {sql_type}{nullability}", column.name.as_str()));
    }
    for constraint in &table.constraints {
        if let ConstraintIr::PrimaryKey { columns, .. } = constraint {
            let key = columns
                .iter()
                .map(|column| format!("\"{}\"", column.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            column_defs.push(format!("PRIMARY KEY ({key})"));
        }
    }
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
        table.name.as_str(),
        column_defs.join(", ")
    );
    connection
        .execute(&sql, [])
        .map_err(|error| AdapterError::DdlEmission {
            table: table.name.clone(),
            message: error.to_string(),
        })?;
    Ok(())
}

impl SourceAdapter for SqliteAdapter {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn introspect_schema(&mut self) -> impl Future<Output = Result<SchemaIr, AdapterError>> + Send {
        async move {
            let connection = self.lock();
            let table_names =
                Self::list_table_names(&connection).map_err(|error| AdapterError::Introspection {
                    table: TableName::new("*"),
                    message: error.to_string(),
                })?;
            let mut schema = SchemaIr::new();
            for table_name in table_names {
                schema.tables.push(self.introspect_table(&connection, &table_name)?);
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
            let connection = self.lock();
            read_batch_sync(&connection, &table, offset, batch_size).map_err(|error| {
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
            let connection = self.lock();
            estimate_row_count_sync(&connection, table.as_str())
                .map(Some)
                .map_err(|error| AdapterError::Introspection {
                    table,
                    message: error.to_string(),
                })
        }
    }
}

impl TargetAdapter for SqliteAdapter {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn create_table(&mut self, table: &TableIr) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let table = table.clone();
        async move {
            let connection = self.lock();
            create_table_sync(&connection, &self.registry, &table)
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
            let connection = self.lock();
            write_batch_sync(&connection, &table, &rows).map_err(|error| AdapterError::DataIo {
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
            let connection = self.lock();
            for table in &tables {
                connection
                    .execute(&format!("DROP TABLE IF EXISTS \"{}\"", table.as_str()), [])
                    .map_err(|error| AdapterError::DdlEmission {
                        table: table.clone(),
                        message: error.to_string(),
                    })?;
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
            let connection = self.lock();
            let existing_names =
                Self::list_table_names(&connection).map_err(|error| AdapterError::Introspection {
                    table: table.clone(),
                    message: error.to_string(),
                })?;
            if !existing_names.iter().any(|name| name == table.as_str()) {
                return Ok(None);
            }
            self.introspect_table(&connection, table.as_str()).map(Some)
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
    fn rejects_path_with_overlong_component() {
        let overlong = "a".repeat(MAX_PATH_COMPONENT_LEN + 1);
        let path = PathBuf::from(overlong);
        assert!(validate_store_path(&path).is_err());
    }
}
