//! A small column-ordered string table used as the interchange format between
//! transforms, validation and the deterministic writers.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{EtlError, EtlResult},
    normalize::format_float,
};

/// A row keyed by column name, used when building tables incrementally.
pub type Row = IndexMap<String, Option<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Flatten serialisable records into a table, preserving struct field order.
    pub fn from_records<T: Serialize>(records: &[T]) -> EtlResult<Self> {
        let mut table = Table::default();
        for record in records {
            let value = serde_json::to_value(record)?;
            let Value::Object(map) = value else {
                return Err(EtlError::parse("table", "record is not a JSON object"));
            };
            let row: Row = map
                .into_iter()
                .map(|(key, value)| (key, cell_from_json(value)))
                .collect();
            table.push_map(row);
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a positional row, padding or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Append a named row; unseen columns are added and back-filled with nulls.
    pub fn push_map(&mut self, row: Row) {
        for key in row.keys() {
            if self.column_index(key).is_none() {
                self.columns.push(key.clone());
                for existing in &mut self.rows {
                    existing.push(None);
                }
            }
        }
        let mut values = vec![None; self.columns.len()];
        for (key, value) in row {
            if let Some(idx) = self.column_index(&key) {
                values[idx] = value;
            }
        }
        self.rows.push(values);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn set(&mut self, row: usize, column: &str, value: Option<String>) -> EtlResult<()> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| EtlError::MissingColumn(column.to_string()))?;
        if let Some(cells) = self.rows.get_mut(row) {
            cells[idx] = value;
        }
        Ok(())
    }

    /// Add a column, or overwrite it when it already exists.
    pub fn add_column(&mut self, name: &str, mut values: Vec<Option<String>>) {
        values.resize(self.rows.len(), None);
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// Project onto `columns`; absent columns become all-null.
    pub fn select(&self, columns: &[String]) -> Table {
        let indices: Vec<Option<usize>> =
            columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.and_then(|i| row[i].clone()))
                    .collect()
            })
            .collect();
        Table {
            columns: columns.to_vec(),
            rows,
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Option<String>>> {
        &mut self.rows
    }
}

fn cell_from_json(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().and_then(format_float)
            }
        }
        Value::Array(items) if items.is_empty() => None,
        other => Some(other.to_string()),
    }
}
