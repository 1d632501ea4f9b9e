use bioetl::{
    model::Source,
    sources::{chembl, crossref, iuphar, openalex, pubchem, pubmed, semantic_scholar, uniprot},
};
use serde_json::json;

#[test]
fn pubmed_articles_are_flattened() {
    let xml = include_str!("fixtures/pubmed_efetch.xml");
    let records = pubmed::parse_articles(xml).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.source, Source::Pubmed);
    assert_eq!(first.get("pmid"), Some("17439191"));
    assert_eq!(
        first.get("title"),
        Some("Discovery of N-aryl inhibitors of EGFR kinase.")
    );
    assert_eq!(first.get("doi"), Some("10.1021/jm061302z"));
    assert_eq!(first.get("journal"), Some("Journal of medicinal chemistry"));
    assert_eq!(first.get("volume"), Some("50"));
    assert_eq!(first.get("issue"), Some("9"));
    assert_eq!(first.get("year"), Some("2007"));
    assert_eq!(first.get("first_page"), Some("2011"));
    assert_eq!(
        first.get("abstract"),
        Some("Kinases matter. IC50 values were low.")
    );
    assert_eq!(first.get("authors"), Some("Jane Smith; Doe; EGFR Consortium"));

    let second = &records[1];
    assert_eq!(second.get("doi"), Some("10.1016/j.bioorg.2010.01.001"));
    assert_eq!(second.get("year"), Some("2010"));
    assert_eq!(second.get("authors"), None);
}

#[test]
fn pubmed_rejects_malformed_xml() {
    assert!(pubmed::parse_articles("<PubmedArticleSet><PubmedArticle>").is_err());
}

#[test]
fn chembl_documents_use_canonical_field_names() {
    let items = vec![json!({
        "document_chembl_id": "CHEMBL1123",
        "doi": "10.1021/jm061302z",
        "pubmed_id": 17439191,
        "title": "Discovery  of\nN-aryl inhibitors",
        "year": 2007,
        "doc_type": "PUBLICATION",
        "patent_id": null,
        "src_id": 1
    })];
    let records = chembl::parse_documents(&items);
    assert_eq!(records[0].get("pmid"), Some("17439191"));
    assert_eq!(records[0].get("title"), Some("Discovery of N-aryl inhibitors"));
    assert_eq!(records[0].get("year"), Some("2007"));
    assert_eq!(records[0].get("patent_id"), None);
}

#[test]
fn chembl_activity_flags_are_normalised() {
    let items = vec![
        json!({"activity_id": 31863, "standard_value": "2.5", "potential_duplicate": 0}),
        json!({"activity_id": 31864, "potential_duplicate": true}),
    ];
    let activities = chembl::parse_activities(&items);
    assert_eq!(activities[0].activity_id.as_deref(), Some("31863"));
    assert_eq!(activities[0].standard_value.as_deref(), Some("2.5"));
    assert_eq!(activities[0].potential_duplicate.as_deref(), Some("false"));
    assert_eq!(activities[1].potential_duplicate.as_deref(), Some("true"));
}

#[test]
fn chembl_targets_take_the_first_component() {
    let items = vec![json!({
        "target_chembl_id": "CHEMBL203",
        "pref_name": "Epidermal growth factor receptor erbB1",
        "target_type": "SINGLE PROTEIN",
        "organism": "Homo sapiens",
        "tax_id": 9606,
        "target_components": [{
            "accession": "P00533",
            "component_description": "Epidermal growth factor receptor",
            "target_component_synonyms": [
                {"component_synonym": "ERBB1", "syn_type": "GENE_SYMBOL_OTHER"},
                {"component_synonym": "EGFR", "syn_type": "GENE_SYMBOL"}
            ]
        }]
    })];
    let records = chembl::parse_targets(&items);
    assert_eq!(records[0].get("uniprot_accession"), Some("P00533"));
    assert_eq!(records[0].get("gene_symbol"), Some("EGFR"));
    assert_eq!(records[0].get("tax_id"), Some("9606"));
}

#[test]
fn chembl_molecules_read_nested_structures() {
    let items = vec![json!({
        "molecule_chembl_id": "CHEMBL25",
        "pref_name": "ASPIRIN",
        "max_phase": "4.0",
        "molecule_structures": {
            "canonical_smiles": "CC(=O)Oc1ccccc1C(=O)O",
            "standard_inchi_key": "BSYNRYMUTXBXSQ-UHFFFAOYSA-N"
        },
        "molecule_properties": {"full_molformula": "C9H8O4", "full_mwt": "180.16", "hba": 3}
    })];
    let records = chembl::parse_molecules(&items);
    assert_eq!(
        records[0].get("standard_inchi_key"),
        Some("BSYNRYMUTXBXSQ-UHFFFAOYSA-N")
    );
    assert_eq!(records[0].get("molecular_formula"), Some("C9H8O4"));
    assert_eq!(records[0].get("hba"), Some("3"));
    assert_eq!(records[0].get("alogp"), None);
}

#[test]
fn crossref_work_is_converted() {
    let work = json!({
        "DOI": "10.1021/JM061302Z",
        "title": ["Discovery of <i>N</i>-aryl inhibitors"],
        "container-title": ["Journal of Medicinal Chemistry"],
        "issued": {"date-parts": [[2007, 5, 3]]},
        "volume": "50",
        "page": "2011-2021",
        "abstract": "<jats:p>Kinases   matter.</jats:p>",
        "author": [{"given": "Jane", "family": "Smith"}, {"name": "EGFR Consortium"}]
    });
    let record = crossref::parse_work(&work);
    assert_eq!(record.source, Source::Crossref);
    assert_eq!(record.get("doi"), Some("10.1021/JM061302Z"));
    assert_eq!(record.get("year"), Some("2007"));
    assert_eq!(record.get("first_page"), Some("2011"));
    assert_eq!(record.get("abstract"), Some("Kinases matter."));
    assert_eq!(record.get("authors"), Some("Jane Smith; EGFR Consortium"));
}

#[test]
fn openalex_works_are_converted() {
    let body = json!({"results": [{
        "id": "https://openalex.org/W1",
        "doi": "https://doi.org/10.1021/jm061302z",
        "ids": {"pmid": "https://pubmed.ncbi.nlm.nih.gov/17439191"},
        "display_name": "Discovery of N-aryl inhibitors",
        "publication_year": 2007,
        "primary_location": {"source": {"display_name": "J Med Chem"}},
        "biblio": {"volume": "50", "first_page": "2011"},
        "authorships": [{"author": {"display_name": "Jane Smith"}}]
    }]});
    let records = openalex::parse_works(&body);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("doi"), Some("https://doi.org/10.1021/jm061302z"));
    assert_eq!(records[0].get("pmid"), Some("https://pubmed.ncbi.nlm.nih.gov/17439191"));
    assert_eq!(records[0].get("title"), Some("Discovery of N-aryl inhibitors"));
    assert_eq!(records[0].get("journal"), Some("J Med Chem"));
    assert_eq!(records[0].get("authors"), Some("Jane Smith"));
}

#[test]
fn semantic_scholar_skips_unknown_papers() {
    let body = json!([
        null,
        {
            "paperId": "abc",
            "externalIds": {"DOI": "10.1021/jm061302z", "PubMed": "17439191"},
            "title": "Discovery",
            "venue": "J Med Chem",
            "year": 2007,
            "authors": [{"name": "Jane Smith"}, {"name": "John Roe"}]
        }
    ]);
    let records = semantic_scholar::parse_papers(&body);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("pmid"), Some("17439191"));
    assert_eq!(records[0].get("journal"), Some("J Med Chem"));
    assert_eq!(records[0].get("authors"), Some("Jane Smith; John Roe"));
}

#[test]
fn pubchem_keeps_lowest_cid_per_inchikey() {
    let body = json!({"PropertyTable": {"Properties": [
        {"CID": 9000, "InChIKey": "BSYNRYMUTXBXSQ-UHFFFAOYSA-N", "MolecularFormula": "X"},
        {"CID": 2244, "InChIKey": "BSYNRYMUTXBXSQ-UHFFFAOYSA-N", "MolecularFormula": "C9H8O4",
         "MolecularWeight": "180.16", "ConnectivitySMILES": "CC(=O)OC1=CC=CC=C1C(=O)O",
         "IUPACName": "2-acetyloxybenzoic acid"}
    ]}});
    let records = pubchem::parse_properties(&body);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("pubchem_cid"), Some("2244"));
    assert_eq!(records[0].get("molecular_formula"), Some("C9H8O4"));
    assert_eq!(
        records[0].get("canonical_smiles"),
        Some("CC(=O)OC1=CC=CC=C1C(=O)O")
    );
}

#[test]
fn uniprot_entries_are_converted() {
    let body = json!({"results": [{
        "primaryAccession": "P00533",
        "genes": [{"geneName": {"value": "EGFR"}}],
        "proteinDescription": {"recommendedName": {"fullName": {"value": "Epidermal growth factor receptor"}}},
        "organism": {"scientificName": "Homo sapiens", "taxonId": 9606},
        "sequence": {"length": 1210}
    }]});
    let records = uniprot::parse_entries(&body);
    assert_eq!(records[0].get("gene_symbol"), Some("EGFR"));
    assert_eq!(records[0].get("pref_name"), Some("Epidermal growth factor receptor"));
    assert_eq!(records[0].get("tax_id"), Some("9606"));
    assert_eq!(records[0].get("sequence_length"), Some("1210"));
}

#[test]
fn iuphar_targets_and_genes_are_parsed() {
    let targets = json!([{"targetId": 1797, "name": "epidermal growth factor receptor <i>EGFR</i>", "type": "Catalytic receptor"}]);
    let record = iuphar::parse_targets(&targets, "p00533").unwrap();
    assert_eq!(record.get("uniprot_accession"), Some("P00533"));
    assert_eq!(record.get("iuphar_target_id"), Some("1797"));
    assert_eq!(record.get("pref_name"), Some("epidermal growth factor receptor EGFR"));
    assert!(iuphar::parse_targets(&json!([]), "P00533").is_none());

    let genes = json!([
        {"species": "Mouse", "geneSymbol": "Egfr"},
        {"species": "Human", "geneSymbol": "EGFR"}
    ]);
    assert_eq!(iuphar::parse_gene_symbol(&genes).as_deref(), Some("EGFR"));
}
