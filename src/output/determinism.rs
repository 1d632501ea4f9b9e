//! Canonical column order, cell cleaning and row ordering.

use std::cmp::Ordering;

use crate::{
    model::Table,
    normalize::clean_text,
    schema::{ColumnKind, TableSchema},
};

/// Produce the canonical form of `table`: schema columns first (missing ones
/// as nulls), remaining columns alphabetically, cleaned cells, rows sorted by
/// the business key and then by every other column.
pub fn canonicalize(table: &Table, schema: &TableSchema) -> Table {
    let mut order = schema.column_order();
    let mut extra: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| schema.column(c).is_none())
        .cloned()
        .collect();
    extra.sort();
    order.extend(extra);

    let mut canonical = table.select(&order);
    for row in canonical.rows_mut() {
        for cell in row.iter_mut() {
            *cell = cell.as_deref().and_then(clean_text);
        }
    }

    let kinds: Vec<ColumnKind> = order
        .iter()
        .map(|c| schema.column(c).map(|s| s.kind).unwrap_or(ColumnKind::String))
        .collect();
    let mut sort_columns: Vec<usize> = schema
        .key
        .iter()
        .filter_map(|k| order.iter().position(|c| c == k))
        .collect();
    let rest: Vec<usize> = (0..order.len())
        .filter(|idx| !sort_columns.contains(idx))
        .collect();
    sort_columns.extend(rest);

    canonical.rows_mut().sort_by(|left, right| {
        sort_columns
            .iter()
            .map(|&idx| compare_cells(left[idx].as_deref(), right[idx].as_deref(), kinds[idx]))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    canonical
}

/// Nulls sort last. In numeric columns parseable cells come before
/// unparseable ones and compare by value with a lexical tiebreak; the
/// ordering is total over malformed numbers too.
fn compare_cells(left: Option<&str>, right: Option<&str>, kind: ColumnKind) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => {
            if !matches!(kind, ColumnKind::Integer | ColumnKind::Float) {
                return l.cmp(r);
            }
            match (l.parse::<f64>().ok(), r.parse::<f64>().ok()) {
                (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| l.cmp(r)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => l.cmp(r),
            }
        }
    }
}
