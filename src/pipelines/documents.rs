//! ChEMBL documents enriched with PubMed, Crossref, OpenAlex and Semantic
//! Scholar metadata.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indexmap::IndexSet;
use tracing::{info, instrument, warn};

use super::{finalize, RunOptions, RunSummary};
use crate::{
    config::Settings,
    error::EtlResult,
    merge::merge_documents,
    model::{Source, SourceRecord},
    normalize::{normalize_doi, normalize_pmid},
    schema,
    sources::{
        chembl::{self, ChemblClient, Entity},
        crossref::CrossrefClient,
        openalex::OpenAlexClient,
        pubmed::PubmedClient,
        semantic_scholar::SemanticScholarClient,
    },
};

/// Identifiers used to query the enrichment services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentIds {
    pub pmids: Vec<String>,
    pub dois: Vec<String>,
    /// DOIs of documents without a PMID.
    pub orphan_dois: Vec<String>,
}

impl DocumentIds {
    /// Collect normalised, de-duplicated identifiers in input order.
    pub fn collect(records: &[SourceRecord]) -> Self {
        let mut pmids = IndexSet::new();
        let mut dois = IndexSet::new();
        let mut orphans = IndexSet::new();
        for record in records {
            let pmid = record.get("pmid").and_then(normalize_pmid);
            let doi = record.get("doi").and_then(normalize_doi);
            if let Some(doi) = &doi {
                dois.insert(doi.clone());
                if pmid.is_none() {
                    orphans.insert(doi.clone());
                }
            }
            if let Some(pmid) = pmid {
                pmids.insert(pmid);
            }
        }
        Self {
            pmids: pmids.into_iter().collect(),
            dois: dois.into_iter().collect(),
            orphan_dois: orphans.into_iter().collect(),
        }
    }

    /// Add DOIs reported by PubMed for documents ChEMBL lists without one.
    pub fn extend_dois(&mut self, records: &[SourceRecord]) {
        for doi in records.iter().filter_map(|r| r.get("doi").and_then(normalize_doi)) {
            if !self.dois.contains(&doi) {
                self.dois.push(doi);
            }
        }
    }
}

#[instrument(skip(settings, options), fields(ids = options.ids.len()))]
pub async fn run(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    let client = ChemblClient::new(settings)?;
    let items = client
        .fetch(Entity::Document, &options.ids)
        .await
        .context("fetch chembl documents")?;
    let documents = chembl::parse_documents(&items);

    let mut used = vec![Source::Chembl];
    let enrichment = if options.offline {
        info!("offline run; skipping bibliographic enrichment");
        Vec::new()
    } else {
        used.extend(options.sources.iter().copied());
        enrich(settings, &documents, &options.sources).await
    };

    let table = merge_documents(&documents, &enrichment);
    let summary = finalize("documents", table, &schema::documents(), options, &used)?;
    Ok(summary)
}

/// Query the selected sources. PubMed runs first because the DOIs it reports
/// widen the lookups of the others, which then run concurrently. A failing
/// source is logged and contributes nothing.
pub async fn enrich(
    settings: &Settings,
    documents: &[SourceRecord],
    sources: &[Source],
) -> Vec<SourceRecord> {
    let mut ids = DocumentIds::collect(documents);
    let mut records = Vec::new();

    if sources.contains(&Source::Pubmed) {
        let pubmed = guarded(Source::Pubmed, fetch_source(Source::Pubmed, settings, &ids).await);
        ids.extend_dois(&pubmed);
        records.extend(pubmed);
    }

    let ids = &ids;
    let mut fetched: Vec<(Source, Vec<SourceRecord>)> = stream::iter(
        sources
            .iter()
            .copied()
            .filter(|s| *s != Source::Pubmed),
    )
    .map(|source| async move { (source, guarded(source, fetch_source(source, settings, ids).await)) })
    .buffer_unordered(settings.source_concurrency.max(1))
    .collect()
    .await;
    // Completion order is arbitrary; merge lookups depend on record order.
    fetched.sort_by_key(|(source, _)| *source);
    for (_, batch) in fetched {
        records.extend(batch);
    }
    records
}

async fn fetch_source(
    source: Source,
    settings: &Settings,
    ids: &DocumentIds,
) -> EtlResult<Vec<SourceRecord>> {
    match source {
        Source::Pubmed => PubmedClient::new(settings)?.fetch(&ids.pmids).await,
        Source::Crossref => CrossrefClient::new(settings)?.fetch(&ids.dois).await,
        Source::OpenAlex => {
            OpenAlexClient::new(settings)?
                .fetch(&ids.dois, &ids.pmids)
                .await
        }
        Source::SemanticScholar => {
            SemanticScholarClient::new(settings)?
                .fetch(&ids.pmids, &ids.orphan_dois)
                .await
        }
        other => {
            warn!(source = %other, "not a bibliographic source; ignored");
            Ok(Vec::new())
        }
    }
}

fn guarded(source: Source, result: EtlResult<Vec<SourceRecord>>) -> Vec<SourceRecord> {
    match result {
        Ok(records) => {
            info!(%source, count = records.len(), "enrichment source fetched");
            records
        }
        Err(err) => {
            warn!(%source, %err, "enrichment source failed; continuing without it");
            Vec::new()
        }
    }
}
