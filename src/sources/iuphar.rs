//! IUPHAR/BPS Guide to Pharmacology web services.
//!
//! Targets are matched by UniProt accession; the human gene symbol comes from
//! a second `geneProteinInformation` call per target.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, instrument};

use super::{http_client, send_json_lenient, text_at};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, SourceRecord},
    normalize::strip_markup,
};

const SERVICE: &str = "iuphar";

pub struct IupharClient {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl IupharClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.iuphar_base_url.trim_end_matches('/').to_string(),
            delay: settings.request_delay(),
        })
    }

    #[instrument(skip(self, accessions), fields(ids = accessions.len()))]
    pub async fn fetch(&self, accessions: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let mut records = Vec::new();
        for accession in accessions {
            let request = self
                .client
                .get(format!("{}/targets", self.base_url))
                .query(&[("accession", accession.as_str()), ("database", "UniProt")]);
            let Some(body) = send_json_lenient(request, SERVICE).await else {
                debug!(%accession, "no iuphar target");
                continue;
            };
            sleep(self.delay).await;
            let Some(mut record) = parse_targets(&body, accession) else {
                continue;
            };
            if let Some(target_id) = record.get("iuphar_target_id").map(str::to_string) {
                let url = format!("{}/targets/{target_id}/geneProteinInformation", self.base_url);
                if let Some(genes) = send_json_lenient(self.client.get(&url), SERVICE).await {
                    record.set("gene_symbol", parse_gene_symbol(&genes));
                }
                sleep(self.delay).await;
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// First target returned for `accession`; IUPHAR names may carry HTML.
pub fn parse_targets(body: &Value, accession: &str) -> Option<SourceRecord> {
    let target = body.as_array()?.first()?;
    let mut record = SourceRecord::new(Source::Iuphar);
    record.set("uniprot_accession", Some(accession.to_ascii_uppercase()));
    record.set("iuphar_target_id", text_at(target, "/targetId"));
    record.set(
        "pref_name",
        target.get("name").and_then(Value::as_str).and_then(strip_markup),
    );
    record.set("iuphar_type", text_at(target, "/type"));
    Some(record)
}

/// Human gene symbol, falling back to the first species listed.
pub fn parse_gene_symbol(body: &Value) -> Option<String> {
    let entries = body.as_array()?;
    entries
        .iter()
        .find(|e| text_at(e, "/species").as_deref() == Some("Human"))
        .or_else(|| entries.first())
        .and_then(|e| text_at(e, "/geneSymbol"))
        .and_then(|s| strip_markup(&s))
}
