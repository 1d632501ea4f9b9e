//! ChEMBL targets reconciled with UniProt and IUPHAR.

use anyhow::{Context, Result};
use indexmap::IndexSet;
use tracing::{info, instrument, warn};

use super::{finalize, RunOptions, RunSummary};
use crate::{
    config::Settings,
    merge::merge_targets,
    model::{Source, SourceRecord},
    normalize::normalize_uniprot,
    schema,
    sources::{
        chembl::{self, ChemblClient, Entity},
        iuphar::IupharClient,
        uniprot::UniProtClient,
    },
};

#[instrument(skip(settings, options), fields(ids = options.ids.len()))]
pub async fn run(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    let client = ChemblClient::new(settings)?;
    let items = client
        .fetch(Entity::Target, &options.ids)
        .await
        .context("fetch chembl targets")?;
    let targets = chembl::parse_targets(&items);

    let mut used = vec![Source::Chembl];
    let mut enrichment = Vec::new();
    if options.offline {
        info!("offline run; skipping uniprot and iuphar");
    } else {
        let accessions = accessions(&targets);
        match UniProtClient::new(settings)?.fetch(&accessions).await {
            Ok(records) => {
                used.push(Source::UniProt);
                enrichment.extend(records);
            }
            Err(err) => warn!(%err, "uniprot enrichment failed; continuing without it"),
        }
        match IupharClient::new(settings)?.fetch(&accessions).await {
            Ok(records) => {
                used.push(Source::Iuphar);
                enrichment.extend(records);
            }
            Err(err) => warn!(%err, "iuphar enrichment failed; continuing without it"),
        }
    }

    let table = merge_targets(&targets, &enrichment);
    let summary = finalize("targets", table, &schema::targets(), options, &used)?;
    Ok(summary)
}

/// Distinct UniProt accessions of the ChEMBL targets, in input order.
pub fn accessions(targets: &[SourceRecord]) -> Vec<String> {
    targets
        .iter()
        .filter_map(|t| t.get("uniprot_accession").and_then(normalize_uniprot))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
