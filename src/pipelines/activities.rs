//! ChEMBL activities with unit normalisation to nanomolar and derived pChEMBL.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::instrument;

use super::{finalize, RunOptions, RunSummary};
use crate::{
    config::Settings,
    error::EtlResult,
    model::{Source, Table},
    normalize::{clean_text, format_float, normalize_number},
    schema,
    sources::chembl::{self, ChemblActivity, ChemblClient, Entity},
};

/// Multipliers converting molar concentration units to nM.
const TO_NANOMOLAR: &[(&str, f64)] = &[
    ("M", 1e9),
    ("mM", 1e6),
    ("uM", 1e3),
    ("µM", 1e3),
    ("μM", 1e3),
    ("nM", 1.0),
    ("pM", 1e-3),
    ("fM", 1e-6),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub activity_id: Option<String>,
    pub assay_chembl_id: Option<String>,
    pub molecule_chembl_id: Option<String>,
    pub target_chembl_id: Option<String>,
    pub document_chembl_id: Option<String>,
    pub standard_type: Option<String>,
    pub standard_relation: Option<String>,
    pub standard_value: Option<String>,
    pub standard_units: Option<String>,
    pub standard_value_nm: Option<String>,
    pub pchembl_value: Option<String>,
    pub pchembl_derived: bool,
    pub is_censored: bool,
    pub activity_comment: Option<String>,
    pub data_validity_comment: Option<String>,
    pub potential_duplicate: Option<String>,
    pub src_id: Option<String>,
}

#[instrument(skip(settings, options), fields(ids = options.ids.len()))]
pub async fn run(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    let client = ChemblClient::new(settings)?;
    let items = client
        .fetch(Entity::Activity, &options.ids)
        .await
        .context("fetch chembl activities")?;
    let table = transform(&chembl::parse_activities(&items))?;
    let summary = finalize(
        "activities",
        table,
        &schema::activities(),
        options,
        &[Source::Chembl],
    )?;
    Ok(summary)
}

pub fn transform(raw: &[ChemblActivity]) -> EtlResult<Table> {
    let rows: Vec<ActivityRow> = raw.iter().map(normalize_activity).collect();
    Table::from_records(&rows)
}

pub fn normalize_activity(raw: &ChemblActivity) -> ActivityRow {
    let standard_value = raw.standard_value.as_deref().and_then(normalize_number);
    let relation = match (&raw.standard_relation, &standard_value) {
        (Some(relation), _) => normalize_relation(relation),
        (None, Some(_)) => Some("=".to_string()),
        (None, None) => None,
    };
    let units = raw.standard_units.as_deref().and_then(clean_text);
    let value_nm = standard_value
        .as_deref()
        .zip(units.as_deref())
        .and_then(|(value, unit)| to_nanomolar(value, unit));

    let reported = raw.pchembl_value.as_deref().and_then(normalize_number);
    let derived = if reported.is_none() && relation.as_deref() == Some("=") {
        value_nm.as_deref().and_then(pchembl_from_nm)
    } else {
        None
    };
    let pchembl_derived = derived.is_some();

    ActivityRow {
        activity_id: raw.activity_id.clone(),
        assay_chembl_id: raw.assay_chembl_id.clone(),
        molecule_chembl_id: raw.molecule_chembl_id.clone(),
        target_chembl_id: raw.target_chembl_id.clone(),
        document_chembl_id: raw.document_chembl_id.clone(),
        standard_type: raw.standard_type.clone(),
        is_censored: relation.as_deref().is_some_and(|r| r != "="),
        standard_relation: relation,
        standard_value,
        standard_units: units,
        standard_value_nm: value_nm,
        pchembl_value: reported.or(derived),
        pchembl_derived,
        activity_comment: raw.activity_comment.clone(),
        data_validity_comment: raw.data_validity_comment.clone(),
        potential_duplicate: raw.potential_duplicate.clone(),
        src_id: raw.src_id.clone(),
    }
}

/// Strip ChEMBL's quoted relations (`'='`) and fold `<<`/`>>`. Anything
/// outside `=, <, >, <=, >=, ~` is dropped.
pub fn normalize_relation(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('\'').trim();
    let folded = match value {
        "<<" => "<",
        ">>" => ">",
        "=<" => "<=",
        "=>" => ">=",
        "=" | "<" | ">" | "<=" | ">=" | "~" => value,
        _ => return None,
    };
    Some(folded.to_string())
}

pub fn to_nanomolar(value: &str, unit: &str) -> Option<String> {
    let factor = TO_NANOMOLAR
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)?;
    let value: f64 = value.parse().ok()?;
    format_float(value * factor)
}

/// `-log10(molar)`, rounded to two decimals like ChEMBL's own values.
pub fn pchembl_from_nm(value_nm: &str) -> Option<String> {
    let nm: f64 = value_nm.parse().ok()?;
    if nm <= 0.0 {
        return None;
    }
    let pchembl = 9.0 - nm.log10();
    format_float((pchembl * 100.0).round() / 100.0)
}
