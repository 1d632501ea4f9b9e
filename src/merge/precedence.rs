//! Static source precedence tables.

use super::{FieldKind, FieldRule};
use crate::model::Source::{self, *};

const BIBLIO_DOI: &[Source] = &[Crossref, Pubmed, OpenAlex, Chembl, SemanticScholar];
const BIBLIO_PMID: &[Source] = &[Pubmed, Chembl, OpenAlex, SemanticScholar];
const BIBLIO_TITLE: &[Source] = &[Pubmed, Chembl, Crossref, OpenAlex, SemanticScholar];
const BIBLIO_ABSTRACT: &[Source] = &[Pubmed, Chembl, SemanticScholar];
const BIBLIO_CITATION: &[Source] = &[Pubmed, Crossref, Chembl, OpenAlex, SemanticScholar];
const BIBLIO_PAGING: &[Source] = &[Pubmed, Crossref, Chembl];

pub const DOCUMENT_PRECEDENCE: &[FieldRule] = &[
    FieldRule::new("doi", FieldKind::Doi, BIBLIO_DOI),
    FieldRule::new("pmid", FieldKind::Pmid, BIBLIO_PMID),
    FieldRule::new("title", FieldKind::Title, BIBLIO_TITLE),
    FieldRule::new("abstract", FieldKind::Text, BIBLIO_ABSTRACT),
    FieldRule::new("journal", FieldKind::Text, BIBLIO_CITATION),
    FieldRule::new("year", FieldKind::Year, BIBLIO_CITATION),
    FieldRule::new("authors", FieldKind::Text, BIBLIO_CITATION),
    FieldRule::new("volume", FieldKind::Text, BIBLIO_PAGING),
    FieldRule::new("issue", FieldKind::Text, BIBLIO_PAGING),
    FieldRule::new("first_page", FieldKind::Text, BIBLIO_PAGING),
];

/// Fields whose provenance and conflict status are reported per row.
pub const DOCUMENT_TRACKED: &[&str] = &["doi", "pmid", "title"];

pub const TARGET_PRECEDENCE: &[FieldRule] = &[
    FieldRule::new("pref_name", FieldKind::Text, &[Chembl, Iuphar, UniProt]),
    FieldRule::new("uniprot_accession", FieldKind::Code, &[UniProt, Chembl]),
    FieldRule::new("gene_symbol", FieldKind::Code, &[UniProt, Iuphar, Chembl]),
    FieldRule::new("protein_name", FieldKind::Text, &[UniProt, Chembl]),
    FieldRule::new("organism", FieldKind::Text, &[Chembl, UniProt]),
    FieldRule::new("tax_id", FieldKind::Code, &[Chembl, UniProt]),
    FieldRule::new("sequence_length", FieldKind::Number, &[UniProt]),
];

pub const TARGET_TRACKED: &[&str] = &["pref_name", "gene_symbol", "organism"];

pub const TESTITEM_PRECEDENCE: &[FieldRule] = &[
    FieldRule::new("canonical_smiles", FieldKind::Text, &[Chembl, PubChem]),
    FieldRule::new("standard_inchi_key", FieldKind::Code, &[Chembl, PubChem]),
    FieldRule::new("molecular_formula", FieldKind::Code, &[Chembl, PubChem]),
    FieldRule::new("molecular_weight", FieldKind::Number, &[Chembl, PubChem]),
    FieldRule::new("iupac_name", FieldKind::Text, &[PubChem]),
    FieldRule::new("pubchem_cid", FieldKind::Code, &[PubChem]),
];

pub const TESTITEM_TRACKED: &[&str] = &["standard_inchi_key", "molecular_formula"];
