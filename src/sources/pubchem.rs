//! PubChem PUG-REST property lookup by InChIKey.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, instrument};

use super::{array_at, http_client, send_json_lenient, text_at};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, SourceRecord},
};

const SERVICE: &str = "pubchem";
const PROPERTIES: &str = "CanonicalSMILES,ConnectivitySMILES,MolecularFormula,MolecularWeight,IUPACName,InChIKey";

pub struct PubChemClient {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl PubChemClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.pubchem_base_url.trim_end_matches('/').to_string(),
            delay: settings.request_delay(),
        })
    }

    #[instrument(skip(self, inchikeys), fields(ids = inchikeys.len()))]
    pub async fn fetch(&self, inchikeys: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let mut records = Vec::new();
        for key in inchikeys {
            let url = format!(
                "{}/compound/inchikey/{key}/property/{PROPERTIES}/JSON",
                self.base_url
            );
            match send_json_lenient(self.client.get(&url), SERVICE).await {
                Some(body) => records.extend(parse_properties(&body)),
                None => debug!(%key, "no pubchem record"),
            }
            sleep(self.delay).await;
        }
        Ok(records)
    }
}

/// Convert a `PropertyTable`; when one key maps to several CIDs only the
/// lowest CID is kept.
pub fn parse_properties(body: &Value) -> Vec<SourceRecord> {
    let mut properties: Vec<&Value> = array_at(body, "/PropertyTable/Properties").iter().collect();
    properties.sort_by_key(|p| p.get("CID").and_then(Value::as_i64).unwrap_or(i64::MAX));

    let mut records: Vec<SourceRecord> = Vec::new();
    for property in properties {
        let inchikey = text_at(property, "/InChIKey");
        if records
            .iter()
            .any(|r| r.get("standard_inchi_key") == inchikey.as_deref())
        {
            continue;
        }
        let mut record = SourceRecord::new(Source::PubChem);
        record.set("pubchem_cid", text_at(property, "/CID"));
        record.set("standard_inchi_key", inchikey);
        record.set(
            "canonical_smiles",
            text_at(property, "/CanonicalSMILES").or_else(|| text_at(property, "/ConnectivitySMILES")),
        );
        record.set("molecular_formula", text_at(property, "/MolecularFormula"));
        record.set("molecular_weight", text_at(property, "/MolecularWeight"));
        record.set("iupac_name", text_at(property, "/IUPACName"));
        records.push(record);
    }
    records
}
