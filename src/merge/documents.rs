//! Reconciliation of ChEMBL documents with bibliographic enrichment sources.

use std::collections::HashMap;

use strsim::jaro_winkler;
use tracing::debug;

use super::{
    merged_row,
    precedence::{DOCUMENT_PRECEDENCE, DOCUMENT_TRACKED},
};
use crate::{
    model::{Row, Source, SourceRecord, Table},
    normalize::{format_float, normalize_doi, normalize_pmid, normalize_title},
};

/// ChEMBL fields carried to the output verbatim.
const PASSTHROUGH: &[&str] = &["doc_type", "last_page", "patent_id", "src_id"];

/// Enrichment records indexed by `(source, identifier)`.
#[derive(Debug, Default)]
struct EnrichmentIndex<'a> {
    by_doi: HashMap<(Source, String), &'a SourceRecord>,
    by_pmid: HashMap<(Source, String), &'a SourceRecord>,
}

impl<'a> EnrichmentIndex<'a> {
    fn build(records: &'a [SourceRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            if let Some(doi) = record.get("doi").and_then(normalize_doi) {
                index.by_doi.entry((record.source, doi)).or_insert(record);
            }
            if let Some(pmid) = record.get("pmid").and_then(normalize_pmid) {
                index.by_pmid.entry((record.source, pmid)).or_insert(record);
            }
        }
        index
    }

    fn doi(&self, source: Source, doi: Option<&String>) -> Option<&'a SourceRecord> {
        doi.and_then(|doi| self.by_doi.get(&(source, doi.clone())).copied())
    }

    fn pmid(&self, source: Source, pmid: Option<&String>) -> Option<&'a SourceRecord> {
        pmid.and_then(|pmid| self.by_pmid.get(&(source, pmid.clone())).copied())
    }

    fn first_doi(&self, source: Source, dois: &[String]) -> Option<&'a SourceRecord> {
        dois.iter().find_map(|doi| self.doi(source, Some(doi)))
    }
}

/// Merge each ChEMBL document with the matching PubMed, Crossref, OpenAlex and
/// Semantic Scholar records. Output rows follow the input order.
pub fn merge_documents(chembl: &[SourceRecord], enrichment: &[SourceRecord]) -> Table {
    let index = EnrichmentIndex::build(enrichment);
    let mut table = Table::new(document_columns());

    for document in chembl {
        let chembl_doi = document.get("doi").and_then(normalize_doi);
        let chembl_pmid = document.get("pmid").and_then(normalize_pmid);

        let pubmed = index.pmid(Source::Pubmed, chembl_pmid.as_ref());
        let mut dois: Vec<String> = chembl_doi.iter().cloned().collect();
        if let Some(doi) = pubmed.and_then(|r| r.get("doi")).and_then(normalize_doi) {
            if !dois.contains(&doi) {
                dois.push(doi);
            }
        }
        let crossref = index.first_doi(Source::Crossref, &dois);
        let openalex = index
            .first_doi(Source::OpenAlex, &dois)
            .or_else(|| index.pmid(Source::OpenAlex, chembl_pmid.as_ref()));
        let semantic = index
            .pmid(Source::SemanticScholar, chembl_pmid.as_ref())
            .or_else(|| index.first_doi(Source::SemanticScholar, &dois));

        let mut group = vec![document];
        group.extend([pubmed, crossref, openalex, semantic].into_iter().flatten());
        debug!(
            document = document.get("document_chembl_id").unwrap_or_default(),
            matched = group.len() - 1,
            "merging document"
        );
        table.push_map(document_row(document, &group));
    }
    table
}

fn document_row(document: &SourceRecord, group: &[&SourceRecord]) -> Row {
    let mut row = Row::new();
    row.insert(
        "document_chembl_id".to_string(),
        document.get("document_chembl_id").map(str::to_string),
    );
    row.extend(merged_row(DOCUMENT_PRECEDENCE, DOCUMENT_TRACKED, group));
    for field in PASSTHROUGH {
        row.insert((*field).to_string(), document.get(field).map(str::to_string));
    }
    row.insert("title_similarity".to_string(), title_similarity(group));
    for source in std::iter::once(Source::Chembl).chain(Source::BIBLIOGRAPHIC) {
        let record = group.iter().find(|r| r.source == source);
        for field in DOCUMENT_TRACKED {
            row.insert(
                format!("{}_{field}", source.as_str()),
                record.and_then(|r| r.get(field)).map(str::to_string),
            );
        }
    }
    row
}

/// Lowest pairwise Jaro-Winkler similarity between distinct title keys.
fn title_similarity(group: &[&SourceRecord]) -> Option<String> {
    let mut keys: Vec<String> = group
        .iter()
        .filter_map(|r| r.get("title").and_then(normalize_title))
        .collect();
    keys.sort();
    keys.dedup();
    let mut lowest = 1.0f64;
    for (i, left) in keys.iter().enumerate() {
        for right in &keys[i + 1..] {
            lowest = lowest.min(jaro_winkler(left, right));
        }
    }
    format_float(lowest)
}

/// Column order of the merged document table.
pub fn document_columns() -> Vec<String> {
    let mut columns = vec!["document_chembl_id".to_string()];
    columns.extend(DOCUMENT_PRECEDENCE.iter().map(|r| r.field.to_string()));
    columns.extend(DOCUMENT_TRACKED.iter().map(|f| format!("{f}_source")));
    columns.extend(DOCUMENT_TRACKED.iter().map(|f| format!("conflict_{f}")));
    columns.push("sources".to_string());
    columns.extend(PASSTHROUGH.iter().map(|f| f.to_string()));
    columns.push("title_similarity".to_string());
    for source in std::iter::once(Source::Chembl).chain(Source::BIBLIOGRAPHIC) {
        for field in DOCUMENT_TRACKED {
            columns.push(format!("{}_{field}", source.as_str()));
        }
    }
    columns
}
