//! CLI entry-point for the documents pipeline.

use anyhow::{anyhow, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::{
    pipeline::{self, PipelineArgs},
    Pipeline,
};
use crate::{config::Settings, model::Source};

/// Args for the `documents` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub common: PipelineArgs,
    /// Bibliographic sources to query.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "pubmed,crossref,openalex,semantic_scholar"
    )]
    pub sources: Vec<String>,
}

impl Args {
    pub fn selected_sources(&self) -> Result<Vec<Source>> {
        let mut selected = Vec::new();
        for name in &self.sources {
            let source = Source::parse(name)
                .filter(|s| Source::BIBLIOGRAPHIC.contains(s))
                .ok_or_else(|| anyhow!("unsupported bibliographic source `{name}`"))?;
            if !selected.contains(&source) {
                selected.push(source);
            }
        }
        Ok(selected)
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut options = args.common.options(Pipeline::Documents, &settings)?;
    options.sources = args.selected_sources()?;
    let summary = pipeline::execute(Pipeline::Documents, &settings, &options).await?;
    pipeline::report(&summary);
    Ok(())
}
