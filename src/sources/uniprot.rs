//! UniProtKB REST search client.

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

const SERVICE: &str = "uniprot";
const FIELDS: &str = "accession,gene_primary,protein_name,organism_name,organism_id,length";

pub struct UniProtClient {
    client: Client,
    base_url: String,
    batch_size: usize,
    delay: Duration,
}

impl UniProtClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.uniprot_base_url.trim_end_matches('/').to_string(),
            batch_size: settings.batch_size.max(1),
            delay: settings.request_delay(),
        })
    }

    #[instrument(skip(self, accessions), fields(ids = accessions.len()))]
    pub async fn fetch(&self, accessions: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let mut records = Vec::new();
        for chunk in accessions.chunks(self.batch_size) {
            let query = chunk
                .iter()
                .map(|acc| format!("(accession:{acc})"))
                .collect::<Vec<_>>()
                .join(" OR ");
            let size = chunk.len().to_string();
            let request = self
                .client
                .get(format!("{}/uniprotkb/search", self.base_url))
                .query(&[
                    ("query", query.as_str()),
                    ("format", "json"),
                    ("fields", FIELDS),
                    ("size", size.as_str()),
                ]);
            if let Some(body) = send_json_lenient(request, SERVICE).await {
                records.extend(parse_entries(&body));
            }
            sleep(self.delay).await;
        }
        info!(count = records.len(), "fetched uniprot entries");
        Ok(records)
    }
}

pub fn parse_entries(body: &Value) -> Vec<SourceRecord> {
    array_at(body, "/results")
        .iter()
        .map(|entry| {
            let mut record = SourceRecord::new(Source::UniProt);
            record.set("uniprot_accession", text_at(entry, "/primaryAccession"));
            record.set("gene_symbol", text_at(entry, "/genes/0/geneName/value"));
            record.set(
                "protein_name",
                text_at(entry, "/proteinDescription/recommendedName/fullName/value").or_else(
                    || text_at(entry, "/proteinDescription/submissionNames/0/fullName/value"),
                ),
            );
            record.set("pref_name", record.get("protein_name").map(str::to_string));
            record.set("organism", text_at(entry, "/organism/scientificName"));
            record.set("tax_id", text_at(entry, "/organism/taxonId"));
            record.set("sequence_length", text_at(entry, "/sequence/length"));
            record
        })
        .collect()
}
