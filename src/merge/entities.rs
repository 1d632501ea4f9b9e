//! Target and test-item reconciliation, keyed by UniProt accession and
//! InChIKey respectively.

use std::collections::HashMap;

use super::{
    merged_row,
    precedence::{TARGET_PRECEDENCE, TARGET_TRACKED, TESTITEM_PRECEDENCE, TESTITEM_TRACKED},
};
use crate::{
    model::{Row, Source, SourceRecord, Table},
    normalize::{normalize_inchikey, normalize_uniprot},
};

const TARGET_PASSTHROUGH: &[(Source, &str)] = &[
    (Source::Chembl, "target_type"),
    (Source::Iuphar, "iuphar_target_id"),
    (Source::Iuphar, "iuphar_type"),
];

const TESTITEM_PASSTHROUGH: &[&str] = &[
    "pref_name",
    "molecule_type",
    "max_phase",
    "alogp",
    "hba",
    "hbd",
    "num_ro5_violations",
];

fn index_by<'a>(
    records: &'a [SourceRecord],
    field: &str,
    normalizer: fn(&str) -> Option<String>,
) -> HashMap<(Source, String), &'a SourceRecord> {
    let mut index = HashMap::new();
    for record in records {
        if let Some(key) = record.get(field).and_then(normalizer) {
            index.entry((record.source, key)).or_insert(record);
        }
    }
    index
}

/// Merge ChEMBL targets with UniProt and IUPHAR records on the accession.
pub fn merge_targets(chembl: &[SourceRecord], enrichment: &[SourceRecord]) -> Table {
    let index = index_by(enrichment, "uniprot_accession", normalize_uniprot);
    let mut table = Table::default();
    for target in chembl {
        let accession = target.get("uniprot_accession").and_then(normalize_uniprot);
        let mut group = vec![target];
        if let Some(accession) = &accession {
            for source in [Source::UniProt, Source::Iuphar] {
                if let Some(record) = index.get(&(source, accession.clone())) {
                    group.push(*record);
                }
            }
        }
        let mut row = Row::new();
        row.insert(
            "target_chembl_id".to_string(),
            target.get("target_chembl_id").map(str::to_string),
        );
        row.extend(merged_row(TARGET_PRECEDENCE, TARGET_TRACKED, &group));
        for (source, field) in TARGET_PASSTHROUGH {
            let value = group
                .iter()
                .find(|r| r.source == *source)
                .and_then(|r| r.get(field))
                .map(str::to_string);
            row.insert((*field).to_string(), value);
        }
        table.push_map(row);
    }
    table
}

/// Merge ChEMBL molecules with PubChem compounds on the standard InChIKey.
pub fn merge_testitems(chembl: &[SourceRecord], enrichment: &[SourceRecord]) -> Table {
    let index = index_by(enrichment, "standard_inchi_key", normalize_inchikey);
    let mut table = Table::default();
    for molecule in chembl {
        let mut group = vec![molecule];
        let key = molecule
            .get("standard_inchi_key")
            .and_then(normalize_inchikey);
        if let Some(record) = key.and_then(|k| index.get(&(Source::PubChem, k))) {
            group.push(*record);
        }
        let mut row = Row::new();
        row.insert(
            "molecule_chembl_id".to_string(),
            molecule.get("molecule_chembl_id").map(str::to_string),
        );
        row.extend(merged_row(TESTITEM_PRECEDENCE, TESTITEM_TRACKED, &group));
        for field in TESTITEM_PASSTHROUGH {
            row.insert((*field).to_string(), molecule.get(field).map(str::to_string));
        }
        table.push_map(row);
    }
    table
}
