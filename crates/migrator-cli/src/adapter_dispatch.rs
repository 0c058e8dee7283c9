// migrator-cli/src/adapter_dispatch.rs
// ============================================================================
// Module: CLI Adapter Dispatch
// Description: Resolves a source/target connection URL to a concrete
//              backend adapter and exposes it behind one enum so the
//              runner can stay generic over exactly two type parameters.
// Purpose: Keep `main.rs` free of per-dialect branching beyond URL parsing.
// Dependencies: migrator-core, migrator-adapter-sqlite,
//               migrator-adapter-postgres, migrator-adapter-file
// ============================================================================

//! ## Overview
//! [`MigrationRunner`](migrator_runner::MigrationRunner) is generic over a
//! concrete `SourceAdapter`/`TargetAdapter` pair, but the CLI only knows
//! which dialect it is talking to at runtime, once it has parsed `--source`
//! and `--target`. [`AnyAdapter`] closes that gap: it implements both
//! adapter traits by matching on which concrete backend it wraps, so the
//! CLI can build one `MigrationRunner<AnyAdapter, AnyAdapter>` regardless
//! of dialect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;

use migrator_adapter_file::FileAdapter;
use migrator_adapter_file::FileAdapterConfig;
use migrator_adapter_postgres::PostgresAdapter;
use migrator_adapter_postgres::PostgresAdapterConfig;
use migrator_adapter_sqlite::SqliteAdapter;
use migrator_adapter_sqlite::SqliteAdapterConfig;
use migrator_core::AdapterError;
use migrator_core::Capability;
use migrator_core::Dialect;
use migrator_core::Row;
use migrator_core::SchemaIr;
use migrator_core::SourceAdapter;
use migrator_core::TableIr;
use migrator_core::TableName;
use migrator_core::TargetAdapter;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// A connection opened against one of the backends the CLI knows how to
/// drive, unified behind a single type.
pub enum AnyAdapter {
    /// SQLite file backend.
    Sqlite(SqliteAdapter),
    /// Live PostgreSQL connection.
    Postgres(PostgresAdapter),
    /// CSV directory backend.
    File(FileAdapter),
}

/// Errors raised while resolving a connection URL to a concrete adapter.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The URL's scheme does not match a dialect the CLI can drive
    /// directly (`oracle`, `mssql`, `duckdb`, `hana` require an adapter
    /// crate this workspace does not carry yet).
    #[error("unsupported connection dialect: {0}")]
    UnsupportedDialect(Dialect),
    /// The URL had no recognizable `scheme://` prefix.
    #[error("could not parse connection URL: {0}")]
    MalformedUrl(String),
    /// Opening the underlying adapter failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Opens a connection URL as a CLI-drivable adapter.
///
/// # Errors
///
/// Returns [`DispatchError`] when the URL cannot be parsed, names a
/// dialect this workspace has no adapter crate for, or the underlying
/// connection attempt fails.
pub async fn open_adapter(url: &str) -> Result<AnyAdapter, DispatchError> {
    let scheme = url
        .split("://")
        .next()
        .filter(|scheme| *scheme != url)
        .ok_or_else(|| DispatchError::MalformedUrl(url.to_string()))?;
    // `Dialect::from_str` is infallible; unrecognized schemes map to `Dialect::Other`.
    let dialect: Dialect = scheme.parse().unwrap_or(Dialect::Other(scheme.to_string()));
    let rest = &url[scheme.len() + "://".len()..];

    match dialect {
        Dialect::Sqlite => {
            let adapter = SqliteAdapter::open(&SqliteAdapterConfig::new(rest))?;
            Ok(AnyAdapter::Sqlite(adapter))
        }
        Dialect::Postgresql => {
            let adapter = PostgresAdapter::connect(&PostgresAdapterConfig::new(url)).await?;
            Ok(AnyAdapter::Postgres(adapter))
        }
        Dialect::File => {
            let adapter = FileAdapter::open(FileAdapterConfig::new(rest))?;
            Ok(AnyAdapter::File(adapter))
        }
        other => Err(DispatchError::UnsupportedDialect(other)),
    }
}

impl SourceAdapter for AnyAdapter {
    fn capabilities(&self) -> &[Capability] {
        match self {
            Self::Sqlite(adapter) => SourceAdapter::capabilities(adapter),
            Self::Postgres(adapter) => SourceAdapter::capabilities(adapter),
            Self::File(adapter) => SourceAdapter::capabilities(adapter),
        }
    }

    fn introspect_schema(&mut self) -> impl Future<Output = Result<SchemaIr, AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => adapter.introspect_schema().await,
                Self::Postgres(adapter) => adapter.introspect_schema().await,
                Self::File(adapter) => adapter.introspect_schema().await,
            }
        }
    }

    fn read_batch(
        &mut self,
        table: &TableIr,
        offset: u64,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<Row>, AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => {
                    SourceAdapter::read_batch(adapter, table, offset, batch_size).await
                }
                Self::Postgres(adapter) => {
                    SourceAdapter::read_batch(adapter, table, offset, batch_size).await
                }
                Self::File(adapter) => {
                    SourceAdapter::read_batch(adapter, table, offset, batch_size).await
                }
            }
        }
    }

    fn estimate_row_count(
        &mut self,
        table: &TableName,
    ) -> impl Future<Output = Result<Option<u64>, AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => adapter.estimate_row_count(table).await,
                Self::Postgres(adapter) => adapter.estimate_row_count(table).await,
                Self::File(adapter) => adapter.estimate_row_count(table).await,
            }
        }
    }
}

impl TargetAdapter for AnyAdapter {
    fn capabilities(&self) -> &[Capability] {
        match self {
            Self::Sqlite(adapter) => TargetAdapter::capabilities(adapter),
            Self::Postgres(adapter) => TargetAdapter::capabilities(adapter),
            Self::File(adapter) => TargetAdapter::capabilities(adapter),
        }
    }

    fn create_table(&mut self, table: &TableIr) -> impl Future<Output = Result<(), AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => TargetAdapter::create_table(adapter, table).await,
                Self::Postgres(adapter) => TargetAdapter::create_table(adapter, table).await,
                Self::File(adapter) => TargetAdapter::create_table(adapter, table).await,
            }
        }
    }

    fn write_batch(
        &mut self,
        table: &TableIr,
        rows: &[Row],
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => TargetAdapter::write_batch(adapter, table, rows).await,
                Self::Postgres(adapter) => TargetAdapter::write_batch(adapter, table, rows).await,
                Self::File(adapter) => TargetAdapter::write_batch(adapter, table, rows).await,
            }
        }
    }

    fn read_batch(
        &mut self,
        table: &TableIr,
        offset: u64,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<Row>, AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => {
                    TargetAdapter::read_batch(adapter, table, offset, batch_size).await
                }
                Self::Postgres(adapter) => {
                    TargetAdapter::read_batch(adapter, table, offset, batch_size).await
                }
                Self::File(adapter) => {
                    TargetAdapter::read_batch(adapter, table, offset, batch_size).await
                }
            }
        }
    }

    fn drop_tables(&mut self, tables: &[TableName]) -> impl Future<Output = Result<(), AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => TargetAdapter::drop_tables(adapter, tables).await,
                Self::Postgres(adapter) => TargetAdapter::drop_tables(adapter, tables).await,
                Self::File(adapter) => TargetAdapter::drop_tables(adapter, tables).await,
            }
        }
    }

    fn get_table_schema(
        &mut self,
        table: &TableName,
    ) -> impl Future<Output = Result<Option<TableIr>, AdapterError>> + Send {
        async move {
            match self {
                Self::Sqlite(adapter) => TargetAdapter::get_table_schema(adapter, table).await,
                Self::Postgres(adapter) => TargetAdapter::get_table_schema(adapter, table).await,
                Self::File(adapter) => TargetAdapter::get_table_schema(adapter, table).await,
            }
        }
    }
}
