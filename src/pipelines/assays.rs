//! ChEMBL assays.

use anyhow::{Context, Result};
use tracing::instrument;

use super::{finalize, RunOptions, RunSummary};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, Table},
    schema,
    sources::chembl::{self, ChemblAssay, ChemblClient, Entity},
};

#[instrument(skip(settings, options), fields(ids = options.ids.len()))]
pub async fn run(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    let client = ChemblClient::new(settings)?;
    let items = client
        .fetch(Entity::Assay, &options.ids)
        .await
        .context("fetch chembl assays")?;
    let table = transform(chembl::parse_assays(&items))?;
    let summary = finalize("assays", table, &schema::assays(), options, &[Source::Chembl])?;
    Ok(summary)
}

/// Assay type codes are upper-cased; everything else passes through.
pub fn transform(mut assays: Vec<ChemblAssay>) -> EtlResult<Table> {
    for assay in &mut assays {
        assay.assay_type = assay.assay_type.take().map(|t| t.to_ascii_uppercase());
    }
    Table::from_records(&assays)
}
