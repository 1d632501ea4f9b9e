//! Output schemas for each pipeline.

use super::{ColumnSpec as C, TableSchema};

const CHEMBL_ID: &str = r"^CHEMBL\d+$";
const DOI: &str = r"^10\.\d{4,9}/\S+$";
const INCHIKEY: &str = r"^[A-Z]{14}-[A-Z]{10}-[A-Z]$";
const SOURCES: &[&str] = &[
    "chembl",
    "pubmed",
    "crossref",
    "openalex",
    "semantic_scholar",
    "pubchem",
    "uniprot",
    "iuphar",
];

pub fn for_pipeline(name: &str) -> Option<TableSchema> {
    match name {
        "documents" => Some(documents()),
        "activities" => Some(activities()),
        "assays" => Some(assays()),
        "targets" => Some(targets()),
        "testitems" => Some(testitems()),
        _ => None,
    }
}

pub fn documents() -> TableSchema {
    let columns = vec![
        C::string("document_chembl_id").required().unique().pattern(CHEMBL_ID),
        C::string("doi").pattern(DOI),
        C::integer("pmid"),
        C::string("title"),
        C::string("abstract"),
        C::string("journal"),
        C::integer("year"),
        C::string("authors"),
        C::string("volume"),
        C::string("issue"),
        C::string("first_page"),
        C::string("doi_source").allowed(SOURCES),
        C::string("pmid_source").allowed(SOURCES),
        C::string("title_source").allowed(SOURCES),
        C::boolean("conflict_doi").required(),
        C::boolean("conflict_pmid").required(),
        C::boolean("conflict_title").required(),
        C::string("sources"),
        C::string("doc_type").allowed(&["PUBLICATION", "BOOK", "PATENT", "DATASET"]),
        C::string("last_page"),
        C::string("patent_id"),
        C::integer("src_id"),
        C::float("title_similarity"),
        C::string("chembl_doi"),
        C::string("chembl_pmid"),
        C::string("chembl_title"),
        C::string("pubmed_doi"),
        C::string("pubmed_pmid"),
        C::string("pubmed_title"),
        C::string("crossref_doi"),
        C::string("crossref_pmid"),
        C::string("crossref_title"),
        C::string("openalex_doi"),
        C::string("openalex_pmid"),
        C::string("openalex_title"),
        C::string("semantic_scholar_doi"),
        C::string("semantic_scholar_pmid"),
        C::string("semantic_scholar_title"),
    ];
    TableSchema {
        name: "documents",
        columns,
        key: &["document_chembl_id"],
    }
}

pub fn activities() -> TableSchema {
    TableSchema {
        name: "activities",
        columns: vec![
            C::integer("activity_id").required().unique(),
            C::string("assay_chembl_id").pattern(CHEMBL_ID),
            C::string("molecule_chembl_id").required().pattern(CHEMBL_ID),
            C::string("target_chembl_id").pattern(CHEMBL_ID),
            C::string("document_chembl_id").pattern(CHEMBL_ID),
            C::string("standard_type"),
            C::string("standard_relation").allowed(&["=", "<", ">", "<=", ">=", "~"]),
            C::float("standard_value"),
            C::string("standard_units"),
            C::float("standard_value_nm"),
            C::float("pchembl_value"),
            C::boolean("pchembl_derived").required(),
            C::boolean("is_censored").required(),
            C::string("activity_comment"),
            C::string("data_validity_comment"),
            C::boolean("potential_duplicate"),
            C::integer("src_id"),
        ],
        key: &["activity_id"],
    }
}

pub fn assays() -> TableSchema {
    TableSchema {
        name: "assays",
        columns: vec![
            C::string("assay_chembl_id").required().unique().pattern(CHEMBL_ID),
            C::string("description"),
            C::string("assay_type").allowed(&["B", "F", "A", "T", "P", "U"]),
            C::string("assay_category"),
            C::string("assay_organism"),
            C::integer("assay_tax_id"),
            C::string("bao_format"),
            C::integer("confidence_score"),
            C::string("target_chembl_id").pattern(CHEMBL_ID),
            C::string("document_chembl_id").pattern(CHEMBL_ID),
            C::string("cell_chembl_id").pattern(CHEMBL_ID),
            C::integer("src_id"),
        ],
        key: &["assay_chembl_id"],
    }
}

pub fn targets() -> TableSchema {
    TableSchema {
        name: "targets",
        columns: vec![
            C::string("target_chembl_id").required().unique().pattern(CHEMBL_ID),
            C::string("target_type"),
            C::string("pref_name"),
            C::string("uniprot_accession"),
            C::string("gene_symbol"),
            C::string("protein_name"),
            C::string("organism"),
            C::integer("tax_id"),
            C::integer("sequence_length"),
            C::string("pref_name_source").allowed(SOURCES),
            C::string("gene_symbol_source").allowed(SOURCES),
            C::string("organism_source").allowed(SOURCES),
            C::boolean("conflict_pref_name").required(),
            C::boolean("conflict_gene_symbol").required(),
            C::boolean("conflict_organism").required(),
            C::string("sources"),
            C::integer("iuphar_target_id"),
            C::string("iuphar_type"),
        ],
        key: &["target_chembl_id"],
    }
}

pub fn testitems() -> TableSchema {
    TableSchema {
        name: "testitems",
        columns: vec![
            C::string("molecule_chembl_id").required().unique().pattern(CHEMBL_ID),
            C::string("pref_name"),
            C::string("molecule_type"),
            C::float("max_phase"),
            C::string("canonical_smiles"),
            C::string("standard_inchi_key").pattern(INCHIKEY),
            C::string("molecular_formula"),
            C::float("molecular_weight"),
            C::string("iupac_name"),
            C::integer("pubchem_cid"),
            C::string("standard_inchi_key_source").allowed(SOURCES),
            C::string("molecular_formula_source").allowed(SOURCES),
            C::boolean("conflict_standard_inchi_key").required(),
            C::boolean("conflict_molecular_formula").required(),
            C::string("sources"),
            C::float("alogp"),
            C::integer("hba"),
            C::integer("hbd"),
            C::integer("num_ro5_violations"),
        ],
        key: &["molecule_chembl_id"],
    }
}
