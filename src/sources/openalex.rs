//! OpenAlex works client.
//!
//! API: https://api.openalex.org/works?filter=doi:a|b

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, instrument};

use super::{array_at, http_client, send_json_lenient, text_at};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, SourceRecord},
};

const SERVICE: &str = "openalex";
/// OpenAlex caps OR-filters at 50 values.
const FILTER_CHUNK: usize = 50;

pub struct OpenAlexClient {
    client: Client,
    base_url: String,
    mailto: String,
    delay: Duration,
}

impl OpenAlexClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.openalex_base_url.trim_end_matches('/').to_string(),
            mailto: settings.contact_email.clone(),
            delay: settings.request_delay(),
        })
    }

    /// Look works up by DOI and by PMID.
    #[instrument(skip(self, dois, pmids), fields(dois = dois.len(), pmids = pmids.len()))]
    pub async fn fetch(&self, dois: &[String], pmids: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let mut records = self.fetch_filtered("doi", dois).await;
        records.extend(self.fetch_filtered("pmid", pmids).await);
        info!(count = records.len(), "fetched openalex works");
        Ok(records)
    }

    async fn fetch_filtered(&self, filter: &str, ids: &[String]) -> Vec<SourceRecord> {
        let mut records = Vec::new();
        for chunk in ids.chunks(FILTER_CHUNK) {
            let filter = format!("{filter}:{}", chunk.join("|"));
            let per_page = FILTER_CHUNK.to_string();
            let request = self.client.get(format!("{}/works", self.base_url)).query(&[
                ("filter", filter.as_str()),
                ("per-page", per_page.as_str()),
                ("mailto", self.mailto.as_str()),
            ]);
            if let Some(body) = send_json_lenient(request, SERVICE).await {
                records.extend(parse_works(&body));
            }
            sleep(self.delay).await;
        }
        records
    }
}

/// Convert a `/works` listing.
pub fn parse_works(body: &Value) -> Vec<SourceRecord> {
    array_at(body, "/results").iter().map(parse_work).collect()
}

pub fn parse_work(work: &Value) -> SourceRecord {
    let mut record = SourceRecord::new(Source::OpenAlex);
    record.set("openalex_id", text_at(work, "/id"));
    record.set(
        "doi",
        text_at(work, "/ids/doi").or_else(|| text_at(work, "/doi")),
    );
    record.set("pmid", text_at(work, "/ids/pmid"));
    record.set(
        "title",
        text_at(work, "/title").or_else(|| text_at(work, "/display_name")),
    );
    record.set("year", text_at(work, "/publication_year"));
    record.set(
        "journal",
        text_at(work, "/primary_location/source/display_name"),
    );
    record.set("volume", text_at(work, "/biblio/volume"));
    record.set("issue", text_at(work, "/biblio/issue"));
    record.set("first_page", text_at(work, "/biblio/first_page"));
    let authors = array_at(work, "/authorships")
        .iter()
        .filter_map(|a| text_at(a, "/author/display_name"))
        .collect::<Vec<_>>()
        .join("; ");
    record.set("authors", Some(authors));
    record
}
