// migrator-core/src/fingerprint.rs
// ============================================================================
// Module: Migrator Fingerprint Engine
// Description: Deterministic content fingerprints for tables and datasets.
// Purpose: Give the validation report generator an order-independent,
//          dialect-independent way to compare source and target data.
// Dependencies: serde, crate::core::hashing
// ============================================================================

//! ## Overview
//! A table fingerprint packs every row into a column-complete JSON object
//! (declared columns in, nulls and absent values replaced by a sentinel,
//! byte-shaped values hex-encoded), canonicalizes it via RFC 8785, and
//! hashes it. The per-row digests are then sorted and hashed once more, so
//! the result does not depend on the order rows were read in. Row values
//! are canonicalized through RFC 8785 JSON rules in both passes, so `1`
//! and `1.0` hash identically and object keys are order-independent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_bytes;
use crate::core::identifiers::ColumnName;
use crate::core::identifiers::TableName;

/// Substituted for a null or absent column value before canonicalization,
/// so a real `NULL` and an empty string never hash the same.
const NULL_SENTINEL: &str = "__NULL__";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while computing a fingerprint.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// A row value failed to canonicalize to JSON.
    #[error("failed to canonicalize row {row_index} of table {table}: {source}")]
    RowCanonicalization {
        /// Table the row belongs to.
        table: TableName,
        /// Zero-based index of the offending row within the batch presented
        /// to [`fingerprint_table`].
        row_index: usize,
        /// Underlying canonicalization error.
        #[source]
        source: crate::core::hashing::HashError,
    },
}

// ============================================================================
// SECTION: Table Fingerprint
// ============================================================================

/// Content fingerprint for a single table's row set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFingerprint {
    /// Table the fingerprint covers.
    pub table_name: TableName,
    /// Full row count of the table, independent of how many rows were
    /// actually hashed (a sample still reports the table's true size).
    pub row_count: u64,
    /// Number of declared columns the fingerprint accounted for.
    pub column_count: u32,
    /// Per-column count of null or absent values among the hashed rows.
    pub per_column_null_counts: BTreeMap<ColumnName, u64>,
    /// Hex-encoded digest of the hashed rows.
    pub hash_hex: String,
}

/// Returns `true` when `value` is a JSON array whose every element is an
/// integer in `0..=255`, the shape a raw byte column value would take.
fn looks_like_byte_array(value: &Value) -> bool {
    let Value::Array(items) = value else {
        return false;
    };
    !items.is_empty() && items.iter().all(|item| item.as_u64().is_some_and(|n| n <= u64::from(u8::MAX)))
}

/// Hex-encodes a byte-array-shaped JSON array using lowercase digits.
fn hex_encode_byte_array(items: &[Value]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(items.len() * 2);
    for item in items {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "looks_like_byte_array already checked every element is 0..=255"
        )]
        let byte = item.as_u64().unwrap_or(0) as u8;
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Builds the packed, column-complete representation of one row: every
/// declared column in `columns` is present, with [`NULL_SENTINEL`] filled
/// in for a `null` or missing value, and byte-shaped values hex-encoded.
/// Increments `null_counts` for every column that was null or absent.
fn pack_row(row: &Value, columns: &[ColumnName], null_counts: &mut BTreeMap<ColumnName, u64>) -> Value {
    let source = row.as_object();
    let mut packed = Map::with_capacity(columns.len());
    for column in columns {
        let found = source.and_then(|object| object.get(column.as_str()));
        let packed_value = match found {
            None | Some(Value::Null) => {
                *null_counts.entry(column.clone()).or_insert(0) += 1;
                Value::String(NULL_SENTINEL.to_string())
            }
            Some(value @ Value::Array(items)) if looks_like_byte_array(value) => Value::String(hex_encode_byte_array(items)),
            Some(value) => value.clone(),
        };
        packed.insert(column.as_str().to_string(), packed_value);
    }
    Value::Object(packed)
}

/// Computes a table fingerprint over an already-materialized set of rows.
///
/// `columns` lists the table's declared columns (any order); every one is
/// represented in each hashed row. `full_row_count` is the table's true row
/// count and is recorded verbatim even when `rows` holds only a sample.
/// Each row is packed and canonicalized via RFC 8785, hashed individually,
/// then the sorted set of per-row digests is hashed once more so the result
/// does not depend on the order rows were supplied in.
///
/// # Errors
///
/// Returns [`FingerprintError::RowCanonicalization`] when a row fails to
/// serialize to canonical JSON.
pub fn fingerprint_table(
    table: &TableName,
    rows: &[Value],
    columns: &[ColumnName],
    full_row_count: u64,
    algorithm: HashAlgorithm,
) -> Result<TableFingerprint, FingerprintError> {
    let mut null_counts = BTreeMap::new();
    let mut row_digests = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let packed = pack_row(row, columns, &mut null_counts);
        let canonical = canonical_json_bytes(&packed).map_err(|source| FingerprintError::RowCanonicalization {
            table: table.clone(),
            row_index,
            source,
        })?;
        row_digests.push(hash_bytes(algorithm, &canonical).value);
    }
    row_digests.sort_unstable();

    let mut combined = String::new();
    for digest in &row_digests {
        combined.push_str(digest);
    }

    #[expect(clippy::cast_possible_truncation, reason = "a table declares nowhere near u32::MAX columns")]
    let column_count = columns.len() as u32;

    Ok(TableFingerprint {
        table_name: table.clone(),
        row_count: full_row_count,
        column_count,
        per_column_null_counts: null_counts,
        hash_hex: hash_bytes(algorithm, combined.as_bytes()).value,
    })
}

/// Convenience wrapper using [`DEFAULT_HASH_ALGORITHM`].
///
/// # Errors
///
/// Returns [`FingerprintError::RowCanonicalization`] when a row fails to
/// serialize to canonical JSON.
pub fn fingerprint_table_default(
    table: &TableName,
    rows: &[Value],
    columns: &[ColumnName],
    full_row_count: u64,
) -> Result<TableFingerprint, FingerprintError> {
    fingerprint_table(table, rows, columns, full_row_count, DEFAULT_HASH_ALGORITHM)
}

// ============================================================================
// SECTION: Dataset Fingerprint
// ============================================================================

/// Content fingerprint across every table in a migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFingerprint {
    /// Per-table fingerprints, sorted by table name for determinism.
    pub tables: Vec<TableFingerprint>,
    /// Digest of the sorted per-table digests, summarizing the whole
    /// dataset in one value.
    pub digest: HashDigest,
}

/// Combines per-table fingerprints into one dataset fingerprint.
///
/// Input order does not matter: table fingerprints are sorted by table
/// name before the combined digest is computed.
#[must_use]
pub fn combine_fingerprints(mut tables: Vec<TableFingerprint>, algorithm: HashAlgorithm) -> DatasetFingerprint {
    tables.sort_by(|left, right| left.table_name.as_str().cmp(right.table_name.as_str()));

    let mut combined = Vec::new();
    for table_fingerprint in &tables {
        combined.extend_from_slice(table_fingerprint.table_name.as_str().as_bytes());
        combined.push(b':');
        combined.extend_from_slice(table_fingerprint.hash_hex.as_bytes());
        combined.push(b'\n');
    }

    DatasetFingerprint {
        digest: hash_bytes(algorithm, &combined),
        tables,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions are permitted.")]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<ColumnName> {
        names.iter().map(|name| ColumnName::new(*name)).collect()
    }

    #[test]
    fn row_order_does_not_affect_fingerprint() {
        let table = TableName::new("customers");
        let columns = cols(&["id", "name"]);
        let forward = vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})];
        let reversed = vec![json!({"id": 2, "name": "b"}), json!({"id": 1, "name": "a"})];

        let forward_fp = fingerprint_table_default(&table, &forward, &columns, 2).unwrap();
        let reversed_fp = fingerprint_table_default(&table, &reversed, &columns, 2).unwrap();

        assert_eq!(forward_fp.hash_hex, reversed_fp.hash_hex);
    }

    #[test]
    fn key_order_within_a_row_does_not_affect_fingerprint() {
        let table = TableName::new("customers");
        let columns = cols(&["id", "name"]);
        let first = vec![json!({"id": 1, "name": "a"})];
        let second = vec![json!({"name": "a", "id": 1})];

        let first_fp = fingerprint_table_default(&table, &first, &columns, 1).unwrap();
        let second_fp = fingerprint_table_default(&table, &second, &columns, 1).unwrap();

        assert_eq!(first_fp.hash_hex, second_fp.hash_hex);
    }

    #[test]
    fn differing_rows_produce_differing_fingerprints() {
        let table = TableName::new("customers");
        let columns = cols(&["id"]);
        let rows_a = vec![json!({"id": 1})];
        let rows_b = vec![json!({"id": 2})];

        let fp_a = fingerprint_table_default(&table, &rows_a, &columns, 1).unwrap();
        let fp_b = fingerprint_table_default(&table, &rows_b, &columns, 1).unwrap();

        assert_ne!(fp_a.hash_hex, fp_b.hash_hex);
    }

    #[test]
    fn missing_and_null_columns_hash_the_same_and_are_counted() {
        let table = TableName::new("customers");
        let columns = cols(&["id", "name"]);
        let with_null = vec![json!({"id": 1, "name": null})];
        let missing = vec![json!({"id": 1})];

        let with_null_fp = fingerprint_table_default(&table, &with_null, &columns, 1).unwrap();
        let missing_fp = fingerprint_table_default(&table, &missing, &columns, 1).unwrap();

        assert_eq!(with_null_fp.hash_hex, missing_fp.hash_hex);
        assert_eq!(with_null_fp.per_column_null_counts.get(&ColumnName::new("name")), Some(&1));
        assert_eq!(missing_fp.per_column_null_counts.get(&ColumnName::new("name")), Some(&1));
    }

    #[test]
    fn row_count_reflects_full_table_size_even_when_sampled() {
        let table = TableName::new("customers");
        let columns = cols(&["id"]);
        let sample = vec![json!({"id": 1})];

        let fp = fingerprint_table_default(&table, &sample, &columns, 1_000).unwrap();

        assert_eq!(fp.row_count, 1_000);
    }

    #[test]
    fn byte_array_values_are_hex_encoded_before_hashing() {
        let table = TableName::new("blobs");
        let columns = cols(&["id", "payload"]);
        let as_array = vec![json!({"id": 1, "payload": [0xde, 0xad, 0xbe, 0xef]})];
        let as_hex = vec![json!({"id": 1, "payload": "deadbeef"})];

        let array_fp = fingerprint_table_default(&table, &as_array, &columns, 1).unwrap();
        let hex_fp = fingerprint_table_default(&table, &as_hex, &columns, 1).unwrap();

        assert_eq!(array_fp.hash_hex, hex_fp.hash_hex);
    }

    #[test]
    fn dataset_fingerprint_is_order_independent_across_tables() {
        let columns = cols(&["id"]);
        let customers = fingerprint_table_default(&TableName::new("customers"), &[json!({"id": 1})], &columns, 1).unwrap();
        let orders = fingerprint_table_default(&TableName::new("orders"), &[json!({"id": 9})], &columns, 1).unwrap();

        let forward = combine_fingerprints(vec![customers.clone(), orders.clone()], HashAlgorithm::Sha256);
        let reversed = combine_fingerprints(vec![orders, customers], HashAlgorithm::Sha256);

        assert_eq!(forward.digest, reversed.digest);
    }
}
