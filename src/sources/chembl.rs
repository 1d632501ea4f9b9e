//! ChEMBL REST client.
//!
//! Records are requested with `<id>__in` filters in batches and pages are
//! followed through `page_meta.next`.
//! API docs: https://chembl.gitbook.io/chembl-interface-documentation/web-resources/chembl-api

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use super::{array_at, http_client, scalar, send_json, text_at};
use crate::{
    config::Settings,
    error::{EtlError, EtlResult},
    model::{Source, SourceRecord},
};

const SERVICE: &str = "chembl";

/// ChEMBL resources handled by the pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Document,
    Activity,
    Assay,
    Target,
    Molecule,
}

impl Entity {
    fn resource(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Activity => "activity",
            Self::Assay => "assay",
            Self::Target => "target",
            Self::Molecule => "molecule",
        }
    }

    /// Identifier column, also the id column expected in input CSVs.
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Document => "document_chembl_id",
            Self::Activity => "activity_id",
            Self::Assay => "assay_chembl_id",
            Self::Target => "target_chembl_id",
            Self::Molecule => "molecule_chembl_id",
        }
    }

    fn collection(&self) -> &'static str {
        match self {
            Self::Document => "documents",
            Self::Activity => "activities",
            Self::Assay => "assays",
            Self::Target => "targets",
            Self::Molecule => "molecules",
        }
    }
}

pub struct ChemblClient {
    client: Client,
    base_url: String,
    batch_size: usize,
    delay: Duration,
}

impl ChemblClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.chembl_base_url.trim_end_matches('/').to_string(),
            batch_size: settings.batch_size.max(1),
            delay: settings.request_delay(),
        })
    }

    /// Fetch raw JSON items for `ids`, in batches, following pagination.
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn fetch(&self, entity: Entity, ids: &[String]) -> EtlResult<Vec<Value>> {
        let mut items = Vec::new();
        for chunk in ids.chunks(self.batch_size) {
            let mut url = Some(self.first_page_url(entity, chunk)?);
            while let Some(current) = url.take() {
                debug!(%current, "requesting chembl page");
                let page = send_json(self.client.get(current.clone()), SERVICE)
                    .await?
                    .ok_or_else(|| EtlError::http(SERVICE, format!("not found: {current}")))?;
                items.extend(array_at(&page, &format!("/{}", entity.collection())).iter().cloned());
                url = next_page(&page, &current);
                sleep(self.delay).await;
            }
        }
        info!(entity = entity.resource(), rows = items.len(), "fetched chembl records");
        Ok(items)
    }

    fn first_page_url(&self, entity: Entity, chunk: &[String]) -> EtlResult<Url> {
        let base = format!("{}/{}.json", self.base_url, entity.resource());
        let filter = format!("{}__in", entity.id_field());
        let limit = chunk.len().max(1).to_string();
        Url::parse_with_params(
            &base,
            &[(filter.as_str(), chunk.join(",").as_str()), ("limit", limit.as_str())],
        )
        .map_err(|err| EtlError::http(SERVICE, err))
    }
}

/// Resolve `page_meta.next`, which ChEMBL returns as a host-relative path.
fn next_page(page: &Value, current: &Url) -> Option<Url> {
    let next = page.pointer("/page_meta/next")?.as_str()?;
    if next.is_empty() {
        return None;
    }
    current.join(next).ok()
}

pub fn parse_documents(items: &[Value]) -> Vec<SourceRecord> {
    items
        .iter()
        .map(|item| {
            let mut record = SourceRecord::new(Source::Chembl);
            for (field, pointer) in [
                ("document_chembl_id", "/document_chembl_id"),
                ("doi", "/doi"),
                ("pmid", "/pubmed_id"),
                ("title", "/title"),
                ("abstract", "/abstract"),
                ("journal", "/journal"),
                ("year", "/year"),
                ("authors", "/authors"),
                ("volume", "/volume"),
                ("issue", "/issue"),
                ("first_page", "/first_page"),
                ("last_page", "/last_page"),
                ("doc_type", "/doc_type"),
                ("patent_id", "/patent_id"),
                ("src_id", "/src_id"),
            ] {
                record.set(field, text_at(item, pointer));
            }
            record
        })
        .collect()
}

/// Activity as served by ChEMBL, before unit normalisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChemblActivity {
    pub activity_id: Option<String>,
    pub assay_chembl_id: Option<String>,
    pub molecule_chembl_id: Option<String>,
    pub target_chembl_id: Option<String>,
    pub document_chembl_id: Option<String>,
    pub standard_type: Option<String>,
    pub standard_relation: Option<String>,
    pub standard_value: Option<String>,
    pub standard_units: Option<String>,
    pub pchembl_value: Option<String>,
    pub activity_comment: Option<String>,
    pub data_validity_comment: Option<String>,
    pub potential_duplicate: Option<String>,
    pub src_id: Option<String>,
}

pub fn parse_activities(items: &[Value]) -> Vec<ChemblActivity> {
    items
        .iter()
        .map(|item| ChemblActivity {
            activity_id: text_at(item, "/activity_id"),
            assay_chembl_id: text_at(item, "/assay_chembl_id"),
            molecule_chembl_id: text_at(item, "/molecule_chembl_id"),
            target_chembl_id: text_at(item, "/target_chembl_id"),
            document_chembl_id: text_at(item, "/document_chembl_id"),
            standard_type: text_at(item, "/standard_type"),
            standard_relation: text_at(item, "/standard_relation"),
            standard_value: text_at(item, "/standard_value"),
            standard_units: text_at(item, "/standard_units"),
            pchembl_value: text_at(item, "/pchembl_value"),
            activity_comment: text_at(item, "/activity_comment"),
            data_validity_comment: text_at(item, "/data_validity_comment"),
            potential_duplicate: item.get("potential_duplicate").and_then(as_flag),
            src_id: text_at(item, "/src_id"),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChemblAssay {
    pub assay_chembl_id: Option<String>,
    pub description: Option<String>,
    pub assay_type: Option<String>,
    pub assay_category: Option<String>,
    pub assay_organism: Option<String>,
    pub assay_tax_id: Option<String>,
    pub bao_format: Option<String>,
    pub confidence_score: Option<String>,
    pub target_chembl_id: Option<String>,
    pub document_chembl_id: Option<String>,
    pub cell_chembl_id: Option<String>,
    pub src_id: Option<String>,
}

pub fn parse_assays(items: &[Value]) -> Vec<ChemblAssay> {
    items
        .iter()
        .map(|item| ChemblAssay {
            assay_chembl_id: text_at(item, "/assay_chembl_id"),
            description: text_at(item, "/description"),
            assay_type: text_at(item, "/assay_type"),
            assay_category: text_at(item, "/assay_category"),
            assay_organism: text_at(item, "/assay_organism"),
            assay_tax_id: text_at(item, "/assay_tax_id"),
            bao_format: text_at(item, "/bao_format"),
            confidence_score: text_at(item, "/confidence_score"),
            target_chembl_id: text_at(item, "/target_chembl_id"),
            document_chembl_id: text_at(item, "/document_chembl_id"),
            cell_chembl_id: text_at(item, "/cell_chembl_id"),
            src_id: text_at(item, "/src_id"),
        })
        .collect()
}

/// Targets as merge records. The first protein component supplies the
/// UniProt accession and gene symbol.
pub fn parse_targets(items: &[Value]) -> Vec<SourceRecord> {
    items
        .iter()
        .map(|item| {
            let mut record = SourceRecord::new(Source::Chembl);
            record.set("target_chembl_id", text_at(item, "/target_chembl_id"));
            record.set("pref_name", text_at(item, "/pref_name"));
            record.set("target_type", text_at(item, "/target_type"));
            record.set("organism", text_at(item, "/organism"));
            record.set("tax_id", text_at(item, "/tax_id"));
            let component = array_at(item, "/target_components")
                .iter()
                .find(|c| text_at(c, "/accession").is_some());
            if let Some(component) = component {
                record.set("uniprot_accession", text_at(component, "/accession"));
                record.set("protein_name", text_at(component, "/component_description"));
                let gene = array_at(component, "/target_component_synonyms")
                    .iter()
                    .find(|s| text_at(s, "/syn_type").as_deref() == Some("GENE_SYMBOL"))
                    .and_then(|s| text_at(s, "/component_synonym"));
                record.set("gene_symbol", gene);
            }
            record
        })
        .collect()
}

pub fn parse_molecules(items: &[Value]) -> Vec<SourceRecord> {
    items
        .iter()
        .map(|item| {
            let mut record = SourceRecord::new(Source::Chembl);
            for (field, pointer) in [
                ("molecule_chembl_id", "/molecule_chembl_id"),
                ("pref_name", "/pref_name"),
                ("molecule_type", "/molecule_type"),
                ("max_phase", "/max_phase"),
                ("canonical_smiles", "/molecule_structures/canonical_smiles"),
                ("standard_inchi_key", "/molecule_structures/standard_inchi_key"),
                ("molecular_formula", "/molecule_properties/full_molformula"),
                ("molecular_weight", "/molecule_properties/full_mwt"),
                ("alogp", "/molecule_properties/alogp"),
                ("hba", "/molecule_properties/hba"),
                ("hbd", "/molecule_properties/hbd"),
                ("num_ro5_violations", "/molecule_properties/num_ro5_violations"),
            ] {
                record.set(field, text_at(item, pointer));
            }
            record
        })
        .collect()
}

/// ChEMBL reports some flags as `0`/`1` and others as booleans.
fn as_flag(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => n.as_i64().map(|i| (i != 0).to_string()),
        other => scalar(other).map(|s| matches!(s.as_str(), "1" | "true" | "True").to_string()),
    }
}
