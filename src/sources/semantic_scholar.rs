//! Semantic Scholar Graph API client.
//!
//! API: POST https://api.semanticscholar.org/graph/v1/paper/batch

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{info, instrument};

use super::{array_at, http_client, send_json_lenient, text_at};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, SourceRecord},
};

const SERVICE: &str = "semantic_scholar";
const FIELDS: &str = "externalIds,title,abstract,venue,year,authors,journal";
const BATCH_LIMIT: usize = 500;

pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    delay: Duration,
}

impl SemanticScholarClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings
                .semantic_scholar_base_url
                .trim_end_matches('/')
                .to_string(),
            api_key: settings.semantic_scholar_api_key.clone(),
            delay: settings.request_delay(),
        })
    }

    /// Papers by PMID, with DOI lookups for documents lacking one.
    #[instrument(skip(self, pmids, dois), fields(pmids = pmids.len(), dois = dois.len()))]
    pub async fn fetch(&self, pmids: &[String], dois: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let ids: Vec<String> = pmids
            .iter()
            .map(|p| format!("PMID:{p}"))
            .chain(dois.iter().map(|d| format!("DOI:{d}")))
            .collect();
        let mut records = Vec::new();
        for chunk in ids.chunks(BATCH_LIMIT) {
            let mut request = self
                .client
                .post(format!("{}/paper/batch", self.base_url))
                .query(&[("fields", FIELDS)])
                .json(&json!({ "ids": chunk }));
            if let Some(key) = &self.api_key {
                request = request.header("x-api-key", key);
            }
            if let Some(body) = send_json_lenient(request, SERVICE).await {
                records.extend(parse_papers(&body));
            }
            sleep(self.delay).await;
        }
        info!(count = records.len(), "fetched semantic scholar papers");
        Ok(records)
    }
}

/// The batch endpoint answers with an array aligned to the request; unknown
/// ids come back as `null`.
pub fn parse_papers(body: &Value) -> Vec<SourceRecord> {
    body.as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter(|paper| paper.is_object())
        .map(|paper| {
            let mut record = SourceRecord::new(Source::SemanticScholar);
            record.set("paper_id", text_at(paper, "/paperId"));
            record.set("doi", text_at(paper, "/externalIds/DOI"));
            record.set("pmid", text_at(paper, "/externalIds/PubMed"));
            record.set("title", text_at(paper, "/title"));
            record.set("abstract", text_at(paper, "/abstract"));
            record.set(
                "journal",
                text_at(paper, "/journal/name").or_else(|| text_at(paper, "/venue")),
            );
            record.set("year", text_at(paper, "/year"));
            let authors = array_at(paper, "/authors")
                .iter()
                .filter_map(|a| text_at(a, "/name"))
                .collect::<Vec<_>>()
                .join("; ");
            record.set("authors", Some(authors));
            record
        })
        .collect()
}
