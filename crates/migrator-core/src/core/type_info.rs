// migrator-core/src/core/type_info.rs
// ============================================================================
// Module: Migrator Type Registry
// Description: Dialect-neutral type kinds and raw-type mapping tables.
// Purpose: Translate each source/target dialect's raw column types into a
//          common intermediate representation and flag lossy conversions.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! The type registry is the single place that knows how every supported
//! dialect spells its column types. `IrKind` is the dialect-neutral
//! vocabulary everything else in the engine (schema IR, validation report,
//! routine translator) is built on. Mapping a raw type string to an
//! `IrKind` never fails: an unrecognized raw type maps to
//! [`IrKind::Unknown`] rather than propagating an error, so introspection
//! of a partially-supported dialect can still proceed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::Dialect;

// ============================================================================
// SECTION: IR Kind
// ============================================================================

/// Dialect-neutral column type.
///
/// `Decimal` carries precision and scale when the source reports them;
/// `Array` is boxed to keep the enum a fixed size despite nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrKind {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// 32-bit IEEE 754 floating point.
    Real32,
    /// 64-bit IEEE 754 floating point.
    Real64,
    /// Fixed-point decimal with precision and scale.
    Decimal {
        /// Total number of significant digits.
        precision: u32,
        /// Number of digits to the right of the decimal point.
        scale: u32,
    },
    /// Boolean.
    Bool,
    /// Variable-length text.
    Text,
    /// Variable-length binary data.
    Bytes,
    /// Calendar date without time-of-day.
    Date,
    /// Time-of-day without a date.
    Time,
    /// Date and time without a time zone offset.
    Timestamp,
    /// Date and time with a time zone offset.
    TimestampTz,
    /// Elapsed-time interval.
    Interval,
    /// 128-bit UUID.
    Uuid,
    /// JSON document.
    Json,
    /// XML document.
    Xml,
    /// Geographic/geometric data.
    Geography,
    /// Homogeneous array of another IR kind.
    Array(Box<IrKind>),
    /// Raw type string with no known mapping.
    Unknown {
        /// The raw type string as reported by the source dialect.
        raw: String,
    },
}

impl IrKind {
    /// Returns `true` when this kind is [`IrKind::Unknown`].
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

// ============================================================================
// SECTION: Type Info
// ============================================================================

/// A mapped column type: the raw dialect string alongside its IR kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Raw type string exactly as reported by introspection (e.g. `"NUMBER(10,2)"`).
    pub raw: String,
    /// Dialect-neutral kind derived from `raw`.
    pub ir_kind: IrKind,
    /// Whether the source column permits SQL `NULL`.
    pub nullable: bool,
}

// ============================================================================
// SECTION: Lossiness
// ============================================================================

/// A reason a type conversion between two dialects may lose information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossinessReason {
    /// Target's integer/decimal width is narrower than the source's.
    WidthTruncation,
    /// Target's decimal scale or precision is narrower than the source's.
    PrecisionTruncation,
    /// Source carries a time zone offset the target cannot represent.
    TimezoneLoss,
    /// Source distinguishes empty string from `NULL`; target does not (or vice versa).
    EmptyStringVsNull,
    /// Source kind has no corresponding target kind at all.
    UnsupportedKind,
    /// Source constraint (e.g. an `ENUM` member list) has no target equivalent.
    ConstraintDropped,
}

// ============================================================================
// SECTION: Type Registry
// ============================================================================

/// Maps raw dialect type strings to and from the intermediate representation.
///
/// The registry itself is stateless; all behavior is pure functions of the
/// dialect and raw type string, so instances are freely shared across
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRegistry;

impl TypeRegistry {
    /// Creates a new type registry.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Maps a raw dialect type string to its dialect-neutral IR kind.
    ///
    /// Unrecognized raw strings map to [`IrKind::Unknown`] rather than an
    /// error; callers that need to react to unmapped types should check
    /// [`IrKind::is_unknown`].
    #[must_use]
    pub fn map_to_ir(&self, dialect: &Dialect, raw: &str) -> IrKind {
        let normalized = raw.trim();
        match dialect {
            Dialect::Oracle => map_oracle(normalized),
            Dialect::Postgresql => map_postgresql(normalized),
            Dialect::Mysql => map_mysql(normalized),
            Dialect::Mssql => map_mssql(normalized),
            Dialect::Sqlite => map_sqlite(normalized),
            Dialect::Duckdb => map_duckdb(normalized),
            Dialect::Hana => map_hana(normalized),
            Dialect::File | Dialect::Other(_) => IrKind::Unknown {
                raw: normalized.to_string(),
            },
        }
    }

    /// Maps an IR kind back to a concrete raw type string for the given
    /// target dialect, used when emitting DDL.
    ///
    /// Returns `None` when the target dialect has no representation for
    /// the kind at all (e.g. `Geography` on SQLite); callers treat this as
    /// [`LossinessReason::UnsupportedKind`] and fall back to the widest
    /// compatible kind (typically `Text`).
    #[must_use]
    pub fn map_from_ir(&self, dialect: &Dialect, kind: &IrKind) -> Option<String> {
        match dialect {
            Dialect::Sqlite => sqlite_from_ir(kind),
            Dialect::Postgresql => postgresql_from_ir(kind),
            Dialect::Mysql => mysql_from_ir(kind),
            Dialect::Mssql => mssql_from_ir(kind),
            Dialect::Oracle => oracle_from_ir(kind),
            Dialect::Duckdb | Dialect::Hana | Dialect::File | Dialect::Other(_) => None,
        }
    }

    /// Determines whether converting `source` into `target` on the given
    /// target dialect loses information, and if so, why.
    #[must_use]
    pub fn is_lossy_conversion(
        &self,
        source: &TypeInfo,
        target_dialect: &Dialect,
        target: &TypeInfo,
    ) -> Option<LossinessReason> {
        if target.ir_kind.is_unknown() {
            return Some(LossinessReason::UnsupportedKind);
        }
        if let Some(reason) = width_lossiness(&source.ir_kind, &target.ir_kind) {
            return Some(reason);
        }
        if matches!(source.ir_kind, IrKind::TimestampTz)
            && matches!(target.ir_kind, IrKind::Timestamp)
        {
            return Some(LossinessReason::TimezoneLoss);
        }
        if empty_string_vs_null_lossy(source, target_dialect) {
            return Some(LossinessReason::EmptyStringVsNull);
        }
        None
    }
}

// ============================================================================
// SECTION: Width / precision comparison
// ============================================================================

fn integer_width(kind: &IrKind) -> Option<u8> {
    match kind {
        IrKind::Int8 | IrKind::Uint8 => Some(8),
        IrKind::Int16 | IrKind::Uint16 => Some(16),
        IrKind::Int32 | IrKind::Uint32 => Some(32),
        IrKind::Int64 | IrKind::Uint64 => Some(64),
        _ => None,
    }
}

fn width_lossiness(source: &IrKind, target: &IrKind) -> Option<LossinessReason> {
    if let (Some(source_width), Some(target_width)) =
        (integer_width(source), integer_width(target))
    {
        if target_width < source_width {
            return Some(LossinessReason::WidthTruncation);
        }
    }
    if let (
        IrKind::Decimal {
            precision: source_precision,
            scale: source_scale,
        },
        IrKind::Decimal {
            precision: target_precision,
            scale: target_scale,
        },
    ) = (source, target)
    {
        if target_precision < source_precision || target_scale < source_scale {
            return Some(LossinessReason::PrecisionTruncation);
        }
    }
    if matches!(source, IrKind::Real64) && matches!(target, IrKind::Real32) {
        return Some(LossinessReason::PrecisionTruncation);
    }
    None
}

/// Oracle folds empty string and `NULL` together for character types; most
/// other dialects keep them distinct. Flag the conversion as lossy only
/// when exactly one side of the pair is Oracle.
fn empty_string_vs_null_lossy(source: &TypeInfo, target_dialect: &Dialect) -> bool {
    let source_is_text = matches!(source.ir_kind, IrKind::Text);
    source_is_text && source.nullable && matches!(target_dialect, Dialect::Oracle)
}

// ============================================================================
// SECTION: Oracle
// ============================================================================

fn map_oracle(raw: &str) -> IrKind {
    let upper = raw.to_ascii_uppercase();
    if let Some(rest) = strip_prefix_ci(&upper, "NUMBER") {
        return map_oracle_number(rest);
    }
    if strip_prefix_ci(&upper, "VARCHAR2").is_some() || strip_prefix_ci(&upper, "NVARCHAR2").is_some()
    {
        return IrKind::Text;
    }
    match upper.as_str() {
        "CLOB" | "NCLOB" | "LONG" => IrKind::Text,
        "BLOB" | "RAW" | "LONG RAW" => IrKind::Bytes,
        "DATE" => IrKind::Timestamp,
        "TIMESTAMP WITH TIME ZONE" => IrKind::TimestampTz,
        "TIMESTAMP WITH LOCAL TIME ZONE" => IrKind::TimestampTz,
        "BINARY_FLOAT" => IrKind::Real32,
        "BINARY_DOUBLE" => IrKind::Real64,
        _ if upper.starts_with("TIMESTAMP") => IrKind::Timestamp,
        _ => IrKind::Unknown {
            raw: raw.to_string(),
        },
    }
}

fn map_oracle_number(paren_args: &str) -> IrKind {
    match parse_precision_scale(paren_args) {
        Some((precision, scale)) => IrKind::Decimal { precision, scale },
        None => IrKind::Real64,
    }
}

fn oracle_from_ir(kind: &IrKind) -> Option<String> {
    Some(match kind {
        IrKind::Int8 | IrKind::Int16 | IrKind::Int32 | IrKind::Int64 => "NUMBER(19,0)".to_string(),
        IrKind::Uint8 | IrKind::Uint16 | IrKind::Uint32 | IrKind::Uint64 => {
            "NUMBER(20,0)".to_string()
        }
        IrKind::Real32 => "BINARY_FLOAT".to_string(),
        IrKind::Real64 => "BINARY_DOUBLE".to_string(),
        IrKind::Decimal { precision, scale } => format!("NUMBER({precision},{scale})"),
        IrKind::Bool => "NUMBER(1,0)".to_string(),
        IrKind::Text => "CLOB".to_string(),
        IrKind::Bytes => "BLOB".to_string(),
        IrKind::Date => "DATE".to_string(),
        IrKind::Time => "VARCHAR2(18)".to_string(),
        IrKind::Timestamp => "TIMESTAMP".to_string(),
        IrKind::TimestampTz => "TIMESTAMP WITH TIME ZONE".to_string(),
        IrKind::Interval => "INTERVAL DAY TO SECOND".to_string(),
        IrKind::Uuid => "VARCHAR2(36)".to_string(),
        IrKind::Json => "CLOB".to_string(),
        IrKind::Xml => "XMLTYPE".to_string(),
        IrKind::Geography | IrKind::Array(_) | IrKind::Unknown { .. } => return None,
    })
}

// ============================================================================
// SECTION: PostgreSQL
// ============================================================================

fn map_postgresql(raw: &str) -> IrKind {
    let lower = raw.to_ascii_lowercase();
    if let Some(element) = lower.strip_suffix("[]") {
        return IrKind::Array(Box::new(map_postgresql(element)));
    }
    if let Some(rest) = strip_prefix_ci(&lower, "numeric").or_else(|| strip_prefix_ci(&lower, "decimal"))
    {
        return match parse_precision_scale(rest) {
            Some((precision, scale)) => IrKind::Decimal { precision, scale },
            None => IrKind::Decimal {
                precision: 38,
                scale: 10,
            },
        };
    }
    if strip_prefix_ci(&lower, "varchar").is_some() || strip_prefix_ci(&lower, "character varying").is_some()
    {
        return IrKind::Text;
    }
    match lower.as_str() {
        "smallint" | "int2" => IrKind::Int16,
        "integer" | "int" | "int4" => IrKind::Int32,
        "bigint" | "int8" => IrKind::Int64,
        "real" | "float4" => IrKind::Real32,
        "double precision" | "float8" => IrKind::Real64,
        "boolean" | "bool" => IrKind::Bool,
        "text" | "citext" => IrKind::Text,
        "bytea" => IrKind::Bytes,
        "date" => IrKind::Date,
        "time" | "time without time zone" => IrKind::Time,
        "timestamp" | "timestamp without time zone" => IrKind::Timestamp,
        "timestamptz" | "timestamp with time zone" => IrKind::TimestampTz,
        "interval" => IrKind::Interval,
        "uuid" => IrKind::Uuid,
        "json" | "jsonb" => IrKind::Json,
        "xml" => IrKind::Xml,
        "point" | "polygon" | "geometry" | "geography" => IrKind::Geography,
        _ => IrKind::Unknown {
            raw: raw.to_string(),
        },
    }
}

fn postgresql_from_ir(kind: &IrKind) -> Option<String> {
    Some(match kind {
        IrKind::Int8 | IrKind::Int16 | IrKind::Uint8 => "smallint".to_string(),
        IrKind::Int32 | IrKind::Uint16 => "integer".to_string(),
        IrKind::Int64 | IrKind::Uint32 => "bigint".to_string(),
        IrKind::Uint64 => "numeric(20,0)".to_string(),
        IrKind::Real32 => "real".to_string(),
        IrKind::Real64 => "double precision".to_string(),
        IrKind::Decimal { precision, scale } => format!("numeric({precision},{scale})"),
        IrKind::Bool => "boolean".to_string(),
        IrKind::Text => "text".to_string(),
        IrKind::Bytes => "bytea".to_string(),
        IrKind::Date => "date".to_string(),
        IrKind::Time => "time".to_string(),
        IrKind::Timestamp => "timestamp".to_string(),
        IrKind::TimestampTz => "timestamptz".to_string(),
        IrKind::Interval => "interval".to_string(),
        IrKind::Uuid => "uuid".to_string(),
        IrKind::Json => "jsonb".to_string(),
        IrKind::Xml => "xml".to_string(),
        IrKind::Geography => "geography".to_string(),
        IrKind::Array(element) => format!("{}[]", postgresql_from_ir(element)?),
        IrKind::Unknown { .. } => return None,
    })
}

// ============================================================================
// SECTION: MySQL / MariaDB
// ============================================================================

fn map_mysql(raw: &str) -> IrKind {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("tinyint(1)") {
        return IrKind::Bool;
    }
    if strip_prefix_ci(&lower, "enum").is_some() {
        return IrKind::Text;
    }
    if let Some(rest) = strip_prefix_ci(&lower, "decimal").or_else(|| strip_prefix_ci(&lower, "numeric"))
    {
        return match parse_precision_scale(rest) {
            Some((precision, scale)) => IrKind::Decimal { precision, scale },
            None => IrKind::Decimal {
                precision: 10,
                scale: 0,
            },
        };
    }
    if strip_prefix_ci(&lower, "varchar").is_some() {
        return IrKind::Text;
    }
    match lower.as_str() {
        "tinyint" => IrKind::Int8,
        "smallint" => IrKind::Int16,
        "mediumint" | "int" | "integer" => IrKind::Int32,
        "bigint" => IrKind::Int64,
        "tinyint unsigned" => IrKind::Uint8,
        "smallint unsigned" => IrKind::Uint16,
        "int unsigned" | "integer unsigned" | "mediumint unsigned" => IrKind::Uint32,
        "bigint unsigned" => IrKind::Uint64,
        "float" => IrKind::Real32,
        "double" | "double precision" => IrKind::Real64,
        "text" | "tinytext" | "mediumtext" | "longtext" | "char" => IrKind::Text,
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" => IrKind::Bytes,
        "date" => IrKind::Date,
        "time" => IrKind::Time,
        "datetime" | "timestamp" => IrKind::Timestamp,
        "year" => IrKind::Int16,
        "json" => IrKind::Json,
        _ => IrKind::Unknown {
            raw: raw.to_string(),
        },
    }
}

fn mysql_from_ir(kind: &IrKind) -> Option<String> {
    Some(match kind {
        IrKind::Int8 => "tinyint".to_string(),
        IrKind::Int16 => "smallint".to_string(),
        IrKind::Int32 => "int".to_string(),
        IrKind::Int64 => "bigint".to_string(),
        IrKind::Uint8 => "tinyint unsigned".to_string(),
        IrKind::Uint16 => "smallint unsigned".to_string(),
        IrKind::Uint32 => "int unsigned".to_string(),
        IrKind::Uint64 => "bigint unsigned".to_string(),
        IrKind::Real32 => "float".to_string(),
        IrKind::Real64 => "double".to_string(),
        IrKind::Decimal { precision, scale } => format!("decimal({precision},{scale})"),
        IrKind::Bool => "tinyint(1)".to_string(),
        IrKind::Text => "longtext".to_string(),
        IrKind::Bytes => "longblob".to_string(),
        IrKind::Date => "date".to_string(),
        IrKind::Time => "time".to_string(),
        IrKind::Timestamp | IrKind::TimestampTz => "datetime".to_string(),
        IrKind::Json => "json".to_string(),
        IrKind::Interval
        | IrKind::Uuid
        | IrKind::Xml
        | IrKind::Geography
        | IrKind::Array(_)
        | IrKind::Unknown { .. } => return None,
    })
}

// ============================================================================
// SECTION: MSSQL
// ============================================================================

fn map_mssql(raw: &str) -> IrKind {
    let lower = raw.to_ascii_lowercase();
    if strip_prefix_ci(&lower, "nvarchar").is_some() || strip_prefix_ci(&lower, "varchar").is_some() {
        return IrKind::Text;
    }
    if let Some(rest) = strip_prefix_ci(&lower, "decimal").or_else(|| strip_prefix_ci(&lower, "numeric"))
    {
        return match parse_precision_scale(rest) {
            Some((precision, scale)) => IrKind::Decimal { precision, scale },
            None => IrKind::Decimal {
                precision: 18,
                scale: 0,
            },
        };
    }
    match lower.as_str() {
        "tinyint" => IrKind::Uint8,
        "smallint" => IrKind::Int16,
        "int" => IrKind::Int32,
        "bigint" => IrKind::Int64,
        "bit" => IrKind::Bool,
        "real" => IrKind::Real32,
        "float" => IrKind::Real64,
        "money" => IrKind::Decimal {
            precision: 19,
            scale: 4,
        },
        "text" | "ntext" | "char" | "nchar" => IrKind::Text,
        "varbinary" | "binary" | "image" => IrKind::Bytes,
        "date" => IrKind::Date,
        "time" => IrKind::Time,
        "datetime" | "datetime2" | "smalldatetime" => IrKind::Timestamp,
        "datetimeoffset" => IrKind::TimestampTz,
        "uniqueidentifier" => IrKind::Uuid,
        "xml" => IrKind::Xml,
        _ => IrKind::Unknown {
            raw: raw.to_string(),
        },
    }
}

fn mssql_from_ir(kind: &IrKind) -> Option<String> {
    Some(match kind {
        IrKind::Int8 | IrKind::Uint8 => "tinyint".to_string(),
        IrKind::Int16 => "smallint".to_string(),
        IrKind::Int32 | IrKind::Uint16 => "int".to_string(),
        IrKind::Int64 | IrKind::Uint32 => "bigint".to_string(),
        IrKind::Uint64 => "decimal(20,0)".to_string(),
        IrKind::Real32 => "real".to_string(),
        IrKind::Real64 => "float".to_string(),
        IrKind::Decimal { precision, scale } => format!("decimal({precision},{scale})"),
        IrKind::Bool => "bit".to_string(),
        IrKind::Text => "nvarchar(max)".to_string(),
        IrKind::Bytes => "varbinary(max)".to_string(),
        IrKind::Date => "date".to_string(),
        IrKind::Time => "time".to_string(),
        IrKind::Timestamp => "datetime2".to_string(),
        IrKind::TimestampTz => "datetimeoffset".to_string(),
        IrKind::Uuid => "uniqueidentifier".to_string(),
        IrKind::Xml => "xml".to_string(),
        IrKind::Interval
        | IrKind::Json
        | IrKind::Geography
        | IrKind::Array(_)
        | IrKind::Unknown { .. } => return None,
    })
}

// ============================================================================
// SECTION: SQLite
// ============================================================================

fn map_sqlite(raw: &str) -> IrKind {
    let upper = raw.to_ascii_uppercase();
    match upper.as_str() {
        "INTEGER" | "INT" => IrKind::Int64,
        "REAL" | "DOUBLE" | "FLOAT" => IrKind::Real64,
        "TEXT" | "" => IrKind::Text,
        "BLOB" => IrKind::Bytes,
        "NUMERIC" | "DECIMAL" => IrKind::Decimal {
            precision: 38,
            scale: 10,
        },
        "BOOLEAN" => IrKind::Bool,
        "DATE" => IrKind::Date,
        "DATETIME" | "TIMESTAMP" => IrKind::Timestamp,
        _ => sqlite_affinity(&upper),
    }
}

/// SQLite assigns type affinity by substring rules rather than an exact
/// type catalog; this follows the documented affinity algorithm.
fn sqlite_affinity(upper: &str) -> IrKind {
    if upper.contains("INT") {
        IrKind::Int64
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        IrKind::Text
    } else if upper.contains("BLOB") {
        IrKind::Bytes
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        IrKind::Real64
    } else {
        IrKind::Decimal {
            precision: 38,
            scale: 10,
        }
    }
}

fn sqlite_from_ir(kind: &IrKind) -> Option<String> {
    Some(match kind {
        IrKind::Int8
        | IrKind::Int16
        | IrKind::Int32
        | IrKind::Int64
        | IrKind::Uint8
        | IrKind::Uint16
        | IrKind::Uint32
        | IrKind::Uint64 => "INTEGER".to_string(),
        IrKind::Real32 | IrKind::Real64 => "REAL".to_string(),
        IrKind::Decimal { .. } => "NUMERIC".to_string(),
        IrKind::Bool => "BOOLEAN".to_string(),
        IrKind::Text
        | IrKind::Uuid
        | IrKind::Json
        | IrKind::Xml
        | IrKind::Interval
        | IrKind::Geography => "TEXT".to_string(),
        IrKind::Bytes => "BLOB".to_string(),
        IrKind::Date => "DATE".to_string(),
        IrKind::Time => "TEXT".to_string(),
        IrKind::Timestamp | IrKind::TimestampTz => "DATETIME".to_string(),
        IrKind::Array(_) | IrKind::Unknown { .. } => return None,
    })
}

// ============================================================================
// SECTION: DuckDB / HANA (registry-only, no adapter)
// ============================================================================

fn map_duckdb(raw: &str) -> IrKind {
    let upper = raw.to_ascii_uppercase();
    match upper.as_str() {
        "TINYINT" => IrKind::Int8,
        "SMALLINT" => IrKind::Int16,
        "INTEGER" => IrKind::Int32,
        "BIGINT" => IrKind::Int64,
        "HUGEINT" => IrKind::Decimal {
            precision: 38,
            scale: 0,
        },
        "UTINYINT" => IrKind::Uint8,
        "USMALLINT" => IrKind::Uint16,
        "UINTEGER" => IrKind::Uint32,
        "UBIGINT" => IrKind::Uint64,
        "FLOAT" => IrKind::Real32,
        "DOUBLE" => IrKind::Real64,
        "BOOLEAN" => IrKind::Bool,
        "VARCHAR" => IrKind::Text,
        "BLOB" => IrKind::Bytes,
        "DATE" => IrKind::Date,
        "TIME" => IrKind::Time,
        "TIMESTAMP" => IrKind::Timestamp,
        "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => IrKind::TimestampTz,
        "UUID" => IrKind::Uuid,
        "JSON" => IrKind::Json,
        _ => IrKind::Unknown {
            raw: raw.to_string(),
        },
    }
}

fn map_hana(raw: &str) -> IrKind {
    let upper = raw.to_ascii_uppercase();
    match upper.as_str() {
        "TINYINT" => IrKind::Uint8,
        "SMALLINT" => IrKind::Int16,
        "INTEGER" | "INT" => IrKind::Int32,
        "BIGINT" => IrKind::Int64,
        "REAL" => IrKind::Real32,
        "DOUBLE" => IrKind::Real64,
        "BOOLEAN" => IrKind::Bool,
        "VARCHAR" | "NVARCHAR" | "ALPHANUM" | "SHORTTEXT" => IrKind::Text,
        "VARBINARY" | "BLOB" => IrKind::Bytes,
        "DATE" => IrKind::Date,
        "TIME" => IrKind::Time,
        "TIMESTAMP" | "SECONDDATE" => IrKind::Timestamp,
        _ => IrKind::Unknown {
            raw: raw.to_string(),
        },
    }
}

// ============================================================================
// SECTION: Parsing helpers
// ============================================================================

fn strip_prefix_ci<'a>(haystack: &'a str, prefix: &str) -> Option<&'a str> {
    if haystack.len() < prefix.len() {
        return None;
    }
    let (head, tail) = haystack.split_at(prefix.len());
    if head.eq_ignore_ascii_case(prefix) {
        Some(tail)
    } else {
        None
    }
}

/// Parses a `(precision,scale)` or `(precision)` suffix such as
/// `"(10,2)"` following a type name like `NUMBER` or `NUMERIC`.
fn parse_precision_scale(rest: &str) -> Option<(u32, u32)> {
    let trimmed = rest.trim();
    let inner = trimmed.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split(',');
    let precision: u32 = parts.next()?.trim().parse().ok()?;
    let scale: u32 = match parts.next() {
        Some(raw_scale) => raw_scale.trim().parse().ok()?,
        None => 0,
    };
    Some((precision, scale))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_number_with_precision_maps_to_decimal() {
        let registry = TypeRegistry::new();
        let kind = registry.map_to_ir(&Dialect::Oracle, "NUMBER(10,2)");
        assert_eq!(
            kind,
            IrKind::Decimal {
                precision: 10,
                scale: 2
            }
        );
    }

    #[test]
    fn oracle_bare_number_maps_to_real64() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.map_to_ir(&Dialect::Oracle, "NUMBER"), IrKind::Real64);
    }

    #[test]
    fn oracle_date_carries_time_of_day() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.map_to_ir(&Dialect::Oracle, "DATE"), IrKind::Timestamp);
    }

    #[test]
    fn mysql_tinyint_one_is_bool() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.map_to_ir(&Dialect::Mysql, "tinyint(1)"), IrKind::Bool);
    }

    #[test]
    fn postgres_array_suffix_maps_to_array_kind() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.map_to_ir(&Dialect::Postgresql, "int4[]"),
            IrKind::Array(Box::new(IrKind::Int32))
        );
    }

    #[test]
    fn unknown_raw_type_does_not_error() {
        let registry = TypeRegistry::new();
        let kind = registry.map_to_ir(&Dialect::Postgresql, "some_custom_domain");
        assert!(kind.is_unknown());
    }

    #[test]
    fn width_truncation_is_detected() {
        let registry = TypeRegistry::new();
        let source = TypeInfo {
            raw: "bigint".to_string(),
            ir_kind: IrKind::Int64,
            nullable: true,
        };
        let target = TypeInfo {
            raw: "smallint".to_string(),
            ir_kind: IrKind::Int16,
            nullable: true,
        };
        assert_eq!(
            registry.is_lossy_conversion(&source, &Dialect::Mssql, &target),
            Some(LossinessReason::WidthTruncation)
        );
    }

    #[test]
    fn timezone_loss_is_detected() {
        let registry = TypeRegistry::new();
        let source = TypeInfo {
            raw: "timestamptz".to_string(),
            ir_kind: IrKind::TimestampTz,
            nullable: true,
        };
        let target = TypeInfo {
            raw: "datetime".to_string(),
            ir_kind: IrKind::Timestamp,
            nullable: true,
        };
        assert_eq!(
            registry.is_lossy_conversion(&source, &Dialect::Mysql, &target),
            Some(LossinessReason::TimezoneLoss)
        );
    }
}
