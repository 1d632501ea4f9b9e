//! ChEMBL molecules reconciled with PubChem compound properties.

use anyhow::{Context, Result};
use indexmap::IndexSet;
use tracing::{info, instrument, warn};

use super::{finalize, RunOptions, RunSummary};
use crate::{
    config::Settings,
    merge::merge_testitems,
    model::{Source, SourceRecord},
    normalize::normalize_inchikey,
    schema,
    sources::{
        chembl::{self, ChemblClient, Entity},
        pubchem::PubChemClient,
    },
};

#[instrument(skip(settings, options), fields(ids = options.ids.len()))]
pub async fn run(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    let client = ChemblClient::new(settings)?;
    let items = client
        .fetch(Entity::Molecule, &options.ids)
        .await
        .context("fetch chembl molecules")?;
    let molecules = chembl::parse_molecules(&items);

    let mut used = vec![Source::Chembl];
    let mut enrichment = Vec::new();
    if options.offline {
        info!("offline run; skipping pubchem");
    } else {
        match PubChemClient::new(settings)?.fetch(&inchikeys(&molecules)).await {
            Ok(records) => {
                used.push(Source::PubChem);
                enrichment = records;
            }
            Err(err) => warn!(%err, "pubchem enrichment failed; continuing without it"),
        }
    }

    let table = merge_testitems(&molecules, &enrichment);
    let summary = finalize("testitems", table, &schema::testitems(), options, &used)?;
    Ok(summary)
}

pub fn inchikeys(molecules: &[SourceRecord]) -> Vec<String> {
    molecules
        .iter()
        .filter_map(|m| m.get("standard_inchi_key").and_then(normalize_inchikey))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
