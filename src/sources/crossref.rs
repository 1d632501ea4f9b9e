//! Crossref DOI metadata client.
//!
//! API: https://api.crossref.org/works/{doi}
//! Polite pool: the `mailto` parameter carries the contact address.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, instrument};
use urlencoding::encode;

use super::{array_at, http_client, scalar, send_json_lenient, text_at};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, SourceRecord},
    normalize::strip_markup,
};

const SERVICE: &str = "crossref";

pub struct CrossrefClient {
    client: Client,
    base_url: String,
    mailto: String,
    delay: Duration,
}

impl CrossrefClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.crossref_base_url.trim_end_matches('/').to_string(),
            mailto: settings.contact_email.clone(),
            delay: settings.request_delay(),
        })
    }

    /// Resolve DOIs one by one; unknown DOIs and failed requests are skipped.
    #[instrument(skip(self, dois), fields(ids = dois.len()))]
    pub async fn fetch(&self, dois: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let mut records = Vec::new();
        for doi in dois {
            let url = format!("{}/works/{}", self.base_url, encode(doi));
            let request = self.client.get(&url).query(&[("mailto", self.mailto.as_str())]);
            match send_json_lenient(request, SERVICE).await {
                Some(body) => records.push(parse_work(&body["message"])),
                None => debug!(%doi, "no crossref record"),
            }
            sleep(self.delay).await;
        }
        Ok(records)
    }
}

/// Convert a Crossref `message` work object.
pub fn parse_work(work: &Value) -> SourceRecord {
    let mut record = SourceRecord::new(Source::Crossref);
    record.set("doi", text_at(work, "/DOI"));
    record.set("title", array_at(work, "/title").first().and_then(scalar));
    record.set(
        "journal",
        array_at(work, "/container-title").first().and_then(scalar),
    );
    let year = ["/issued", "/published-print", "/published-online", "/published"]
        .iter()
        .find_map(|key| text_at(work, &format!("{key}/date-parts/0/0")));
    record.set("year", year);
    record.set("volume", text_at(work, "/volume"));
    record.set("issue", text_at(work, "/issue"));
    record.set(
        "first_page",
        text_at(work, "/page").and_then(|p| p.split('-').next().map(|s| s.trim().to_string())),
    );
    record.set(
        "abstract",
        work.get("abstract")
            .and_then(Value::as_str)
            .and_then(strip_markup),
    );
    let authors = array_at(work, "/author")
        .iter()
        .filter_map(|a| {
            let given = text_at(a, "/given");
            let family = text_at(a, "/family");
            match (given, family) {
                (Some(given), Some(family)) => Some(format!("{given} {family}")),
                (None, Some(family)) => Some(family),
                _ => text_at(a, "/name"),
            }
        })
        .collect::<Vec<_>>()
        .join("; ");
    record.set("authors", Some(authors));
    record
}
