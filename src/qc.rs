//! Quality-control profile of a finished table.

use std::{collections::HashMap, path::Path};

use polars::prelude::PolarsResult;
use serde::Serialize;
use tracing::info;

use crate::{
    error::EtlResult,
    model::Table,
    normalize::format_float,
    output::{to_dataframe, write_csv},
    schema::ValidationReport,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcMetric {
    pub metric: String,
    pub column: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QcReport {
    pub metrics: Vec<QcMetric>,
}

impl QcReport {
    fn push(&mut self, metric: &str, column: Option<&str>, value: impl ToString) {
        self.metrics.push(QcMetric {
            metric: metric.to_string(),
            column: column.map(str::to_string),
            value: value.to_string(),
        });
    }

    pub fn value(&self, metric: &str, column: Option<&str>) -> Option<&str> {
        self.metrics
            .iter()
            .find(|m| m.metric == metric && m.column.as_deref() == column)
            .map(|m| m.value.as_str())
    }

    /// Append validation totals and per-kind counts.
    pub fn add_validation(&mut self, report: &ValidationReport) {
        self.push("validation_errors", None, report.errors.len());
        for (kind, count) in report.count_by_kind() {
            self.push("validation_errors", Some(kind.as_str()), count);
        }
    }

    /// Persist as a CSV sorted by `(metric, column)`.
    pub fn write(&self, path: &Path) -> EtlResult<()> {
        let mut metrics = self.metrics.clone();
        metrics.sort_by(|a, b| (&a.metric, &a.column).cmp(&(&b.metric, &b.column)));
        let table = Table::from_records(&metrics)?;
        let table = if table.columns().is_empty() {
            Table::new(["metric", "column", "value"])
        } else {
            table
        };
        write_csv(&table, path)
    }
}

/// Row count, per-column null fraction and cardinality, duplicate business
/// keys and the number of flagged conflicts per `conflict_*` column.
pub fn profile(table: &Table, key: &[&str]) -> PolarsResult<QcReport> {
    let mut report = QcReport::default();
    let rows = table.len();
    report.push("row_count", None, rows);

    let df = to_dataframe(table)?;
    for series in df.get_columns() {
        let name = series.name().to_string();
        let nulls = series.null_count();
        let fraction = if rows == 0 {
            0.0
        } else {
            nulls as f64 / rows as f64
        };
        report.push(
            "null_fraction",
            Some(&name),
            format_float(fraction).unwrap_or_else(|| "0".to_string()),
        );
        let unique = series.drop_nulls().n_unique()?;
        report.push("unique_count", Some(&name), unique);
    }

    report.push("duplicate_keys", None, duplicate_keys(table, key));

    for column in table.columns().iter().filter(|c| c.starts_with("conflict_")) {
        let flagged = table
            .column_values(column)
            .unwrap_or_default()
            .into_iter()
            .filter(|v| *v == Some("true"))
            .count();
        report.push("conflicts", Some(column), flagged);
    }
    info!(metrics = report.metrics.len(), rows, "computed qc profile");
    Ok(report)
}

fn duplicate_keys(table: &Table, key: &[&str]) -> usize {
    let mut seen: HashMap<Vec<Option<&str>>, usize> = HashMap::new();
    for row in 0..table.len() {
        let values: Vec<Option<&str>> = key.iter().map(|k| table.get(row, k)).collect();
        *seen.entry(values).or_insert(0) += 1;
    }
    seen.values().filter(|count| **count > 1).map(|count| count - 1).sum()
}
