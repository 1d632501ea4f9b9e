//! Content hashes over normalised row values.

use sha2::{Digest, Sha256};

use crate::{
    error::{EtlError, EtlResult},
    model::Table,
};

const SEPARATOR: &[u8] = b"\x1f";
const NULL: &[u8] = b"\x00";

/// SHA-256 (hex) over cells joined by the unit separator; nulls hash as NUL.
pub fn hash_row<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut hasher = Sha256::new();
    for (idx, value) in values.into_iter().enumerate() {
        if idx > 0 {
            hasher.update(SEPARATOR);
        }
        match value {
            Some(value) => hasher.update(value.as_bytes()),
            None => hasher.update(NULL),
        }
    }
    hex::encode(hasher.finalize())
}

pub fn hash_business_key(table: &Table, row: usize, key: &[&str]) -> EtlResult<String> {
    let mut values = Vec::with_capacity(key.len());
    for column in key {
        if table.column_index(column).is_none() {
            return Err(EtlError::MissingColumn((*column).to_string()));
        }
        values.push(table.get(row, column));
    }
    Ok(hash_row(values))
}

/// Append `hash_business_key` and `hash_row`. The row hash covers the columns
/// present before either hash column is added.
pub fn attach_hashes(table: &mut Table, key: &[&str]) -> EtlResult<()> {
    let mut business = Vec::with_capacity(table.len());
    let mut rows = Vec::with_capacity(table.len());
    for (idx, row) in table.rows().iter().enumerate() {
        business.push(Some(hash_business_key(table, idx, key)?));
        rows.push(Some(hash_row(row.iter().map(|c| c.as_deref()))));
    }
    table.add_column("hash_business_key", business);
    table.add_column("hash_row", rows);
    Ok(())
}
