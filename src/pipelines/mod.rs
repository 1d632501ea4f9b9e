//! Per-entity pipelines and the shared tail that validates, canonicalises and writes.

pub mod activities;
pub mod assays;
pub mod documents;
pub mod targets;
pub mod testitems;

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::{info, warn};

use crate::{
    error::{EtlError, EtlResult},
    model::{Source, Table},
    output::{self, OutputFormat, RunMeta},
    qc,
    schema::{validate, TableSchema},
};

/// Issues logged individually before the rest are summarised.
const LOGGED_ISSUES: usize = 20;

/// Options shared by every pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// ChEMBL identifiers to extract, already deduplicated.
    pub ids: Vec<String>,
    pub format: OutputFormat,
    /// Abort before writing when validation reports any issue.
    pub strict: bool,
    /// ChEMBL only; enrichment services are not contacted.
    pub offline: bool,
    /// Bibliographic sources used by the documents pipeline.
    pub sources: Vec<Source>,
    pub output_dir: PathBuf,
}

impl RunOptions {
    pub fn new(ids: Vec<String>, output_dir: PathBuf) -> Self {
        Self {
            ids,
            format: OutputFormat::Csv,
            strict: false,
            offline: false,
            sources: Source::BIBLIOGRAPHIC.to_vec(),
            output_dir,
        }
    }
}

/// Artefacts produced by one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pipeline: String,
    pub rows: usize,
    pub output: PathBuf,
    pub qc: PathBuf,
    pub meta: PathBuf,
    pub validation_errors: usize,
}

/// Validate, canonicalise, hash and persist `table` with its QC report and
/// run metadata under `<output_dir>/<name>/`.
pub fn finalize(
    name: &str,
    table: Table,
    schema: &TableSchema,
    options: &RunOptions,
    sources: &[Source],
) -> EtlResult<RunSummary> {
    let table = if table.columns().is_empty() {
        Table::new(schema.column_order())
    } else {
        table
    };

    let report = validate(schema, &table);
    for issue in report.errors.iter().take(LOGGED_ISSUES) {
        warn!(pipeline = name, %issue, "validation issue");
    }
    if report.errors.len() > LOGGED_ISSUES {
        warn!(
            pipeline = name,
            remaining = report.errors.len() - LOGGED_ISSUES,
            "further validation issues omitted"
        );
    }
    if options.strict && !report.is_valid() {
        return Err(EtlError::Validation {
            table: name.to_string(),
            errors: report.errors,
        });
    }

    let mut canonical = output::canonicalize(&table, schema);
    output::attach_hashes(&mut canonical, schema.key)?;

    let dir = options.output_dir.join(name);
    let output_path = dir.join(format!("{name}.{}", options.format.extension()));
    match options.format {
        OutputFormat::Csv => output::write_csv(&canonical, &output_path)?,
        OutputFormat::Parquet => output::write_parquet(&canonical, &output_path)?,
    }

    let mut report_qc = qc::profile(&canonical, schema.key)?;
    report_qc.add_validation(&report);
    let qc_path = dir.join(format!("{name}_qc.csv"));
    report_qc.write(&qc_path)?;

    let meta = RunMeta {
        pipeline: name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rows: canonical.len(),
        columns: canonical.columns().to_vec(),
        business_key: schema.key.iter().map(|k| k.to_string()).collect(),
        output: file_name(&output_path),
        output_sha256: output::file_sha256(&output_path)?,
        sources: sources.iter().map(|s| s.as_str().to_string()).collect(),
        validation_errors: report.errors.len(),
        generated_at: RunMeta::now(),
    };
    let meta_path = dir.join(format!("{name}.meta.json"));
    meta.write(&meta_path)?;

    info!(
        pipeline = name,
        rows = canonical.len(),
        path = %output_path.display(),
        "pipeline finished"
    );
    Ok(RunSummary {
        pipeline: name.to_string(),
        rows: canonical.len(),
        output: output_path,
        qc: qc_path,
        meta: meta_path,
        validation_errors: report.errors.len(),
    })
}

/// Read identifiers from the `column` of a CSV file.
pub fn read_ids(path: &Path, column: &str) -> EtlResult<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| EtlError::MissingColumn(column.to_string()))?;
    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(idx) {
            ids.push(value.to_string());
        }
    }
    Ok(ids)
}

/// Trim, drop blanks and duplicates (first occurrence wins), then truncate.
pub fn prepare_ids<I>(ids: I, limit: Option<usize>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let unique: IndexSet<String> = ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let mut ids: Vec<String> = unique.into_iter().collect();
    if let Some(limit) = limit {
        ids.truncate(limit);
    }
    ids
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
