//! Arguments and runner shared by every pipeline sub-command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::Pipeline;
use crate::{
    config::Settings,
    output::OutputFormat,
    pipelines::{self, RunOptions, RunSummary},
};

#[derive(Debug, Clone, ClapArgs)]
pub struct PipelineArgs {
    /// CSV file with an identifier column named after the entity (e.g. `assay_chembl_id`).
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Comma separated identifiers, appended after those read from `--input`.
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,
    /// Process at most this many identifiers.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Output format of the dataset.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
    /// Fail instead of writing when validation reports issues.
    #[arg(long)]
    pub strict: bool,
    /// Skip enrichment services and use ChEMBL only.
    #[arg(long)]
    pub offline: bool,
    /// Override the configured outputs directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl PipelineArgs {
    pub fn options(&self, pipeline: Pipeline, settings: &Settings) -> Result<RunOptions> {
        let mut raw = Vec::new();
        if let Some(input) = &self.input {
            let path = resolve_input(input, settings);
            raw.extend(
                pipelines::read_ids(&path, pipeline.id_column())
                    .with_context(|| format!("read ids from {}", path.display()))?,
            );
        }
        raw.extend(self.ids.iter().cloned());
        let ids = pipelines::prepare_ids(raw, self.limit);
        if ids.is_empty() {
            bail!("no identifiers given; use --input or --ids");
        }

        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| settings.outputs_dir.clone());
        let mut options = RunOptions::new(ids, output_dir);
        options.format = self.format;
        options.strict = self.strict;
        options.offline = self.offline;
        Ok(options)
    }
}

/// Relative inputs missing from the working directory are looked up under `DATA_DIR`.
fn resolve_input(input: &Path, settings: &Settings) -> PathBuf {
    if input.is_relative() && !input.exists() {
        let candidate = settings.join_data(input);
        if candidate.exists() {
            return candidate;
        }
    }
    input.to_path_buf()
}

#[instrument(skip(args, settings), fields(pipeline = pipeline.name()))]
pub async fn run(pipeline: Pipeline, args: PipelineArgs, settings: Settings) -> Result<()> {
    let options = args.options(pipeline, &settings)?;
    let summary = execute(pipeline, &settings, &options).await?;
    report(&summary);
    Ok(())
}

pub(super) async fn execute(
    pipeline: Pipeline,
    settings: &Settings,
    options: &RunOptions,
) -> Result<RunSummary> {
    info!(pipeline = pipeline.name(), ids = options.ids.len(), "starting pipeline");
    match pipeline {
        Pipeline::Documents => pipelines::documents::run(settings, options).await,
        Pipeline::Activities => pipelines::activities::run(settings, options).await,
        Pipeline::Assays => pipelines::assays::run(settings, options).await,
        Pipeline::Targets => pipelines::targets::run(settings, options).await,
        Pipeline::Testitems => pipelines::testitems::run(settings, options).await,
    }
}

pub(super) fn report(summary: &RunSummary) {
    println!(
        "{}: {} rows -> {} (qc: {}, validation issues: {})",
        summary.pipeline,
        summary.rows,
        summary.output.display(),
        summary.qc.display(),
        summary.validation_errors
    );
}
