use std::fs;

use bioetl::{
    error::EtlError,
    model::{Source, Table},
    output::{file_sha256, OutputFormat},
    pipelines::{assays, finalize, prepare_ids, read_ids, RunOptions},
    schema,
    sources::chembl::ChemblAssay,
};
use serde_json::Value;
use tempfile::tempdir;

fn assay_table(ids: &[&str]) -> Table {
    let records = ids
        .iter()
        .map(|id| ChemblAssay {
            assay_chembl_id: Some(id.to_string()),
            description: Some(" Binding   assay ".to_string()),
            assay_type: Some("b".to_string()),
            confidence_score: Some("9".to_string()),
            target_chembl_id: Some("CHEMBL203".to_string()),
            ..ChemblAssay::default()
        })
        .collect();
    assays::transform(records).unwrap()
}

#[test]
fn finalize_writes_dataset_qc_and_meta() {
    let dir = tempdir().unwrap();
    let options = RunOptions::new(Vec::new(), dir.path().to_path_buf());
    let summary = finalize(
        "assays",
        assay_table(&["CHEMBL2", "CHEMBL1"]),
        &schema::assays(),
        &options,
        &[Source::Chembl],
    )
    .unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.validation_errors, 0);
    assert_eq!(summary.output, dir.path().join("assays/assays.csv"));

    let csv = fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].starts_with("assay_chembl_id,description,assay_type,"));
    assert!(lines[0].ends_with(",hash_business_key,hash_row"));
    assert!(lines[1].starts_with("CHEMBL1,Binding assay,B,,,,,9,CHEMBL203,"));

    let qc = fs::read_to_string(&summary.qc).unwrap();
    assert!(qc.contains("row_count,,2"));

    let meta: Value = serde_json::from_str(&fs::read_to_string(&summary.meta).unwrap()).unwrap();
    assert_eq!(meta["pipeline"], "assays");
    assert_eq!(meta["rows"], 2);
    assert_eq!(meta["output"], "assays.csv");
    assert_eq!(meta["sources"][0], "chembl");
    assert_eq!(
        meta["output_sha256"].as_str().unwrap(),
        file_sha256(&summary.output).unwrap()
    );
}

#[test]
fn reruns_produce_identical_datasets() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let run = |dir: &std::path::Path, ids: &[&str]| {
        let options = RunOptions::new(Vec::new(), dir.to_path_buf());
        finalize("assays", assay_table(ids), &schema::assays(), &options, &[Source::Chembl])
            .unwrap()
    };
    let a = run(first.path(), &["CHEMBL3", "CHEMBL1", "CHEMBL2"]);
    let b = run(second.path(), &["CHEMBL2", "CHEMBL3", "CHEMBL1"]);
    assert_eq!(fs::read(&a.output).unwrap(), fs::read(&b.output).unwrap());
    assert_eq!(fs::read(&a.qc).unwrap(), fs::read(&b.qc).unwrap());
}

#[test]
fn strict_runs_fail_before_writing() {
    let dir = tempdir().unwrap();
    let mut options = RunOptions::new(Vec::new(), dir.path().to_path_buf());
    options.strict = true;
    let err = finalize(
        "assays",
        assay_table(&["CHEMBL1", "CHEMBL1"]),
        &schema::assays(),
        &options,
        &[Source::Chembl],
    )
    .unwrap_err();
    match err {
        EtlError::Validation { table, errors } => {
            assert_eq!(table, "assays");
            assert_eq!(errors.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("assays/assays.csv").exists());
}

#[test]
fn lenient_runs_write_and_count_issues() {
    let dir = tempdir().unwrap();
    let options = RunOptions::new(Vec::new(), dir.path().to_path_buf());
    let summary = finalize(
        "assays",
        assay_table(&["CHEMBL1", "bogus"]),
        &schema::assays(),
        &options,
        &[Source::Chembl],
    )
    .unwrap();
    assert_eq!(summary.validation_errors, 1);
    let qc = fs::read_to_string(&summary.qc).unwrap();
    assert!(qc.contains("validation_errors,pattern,1"));
}

#[test]
fn empty_runs_still_emit_headers() {
    let dir = tempdir().unwrap();
    let mut options = RunOptions::new(Vec::new(), dir.path().to_path_buf());
    options.format = OutputFormat::Parquet;
    let summary = finalize(
        "targets",
        Table::default(),
        &schema::targets(),
        &options,
        &[Source::Chembl],
    )
    .unwrap();
    assert_eq!(summary.rows, 0);
    assert!(summary.output.ends_with("targets/targets.parquet"));
    assert!(summary.output.exists());
}

#[test]
fn ids_are_read_trimmed_and_deduplicated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(
        &path,
        "assay_chembl_id,note\nCHEMBL2,x\n CHEMBL1 ,y\n,z\nCHEMBL2,w\n",
    )
    .unwrap();
    let ids = read_ids(&path, "assay_chembl_id").unwrap();
    assert_eq!(prepare_ids(ids.clone(), None), vec!["CHEMBL2", "CHEMBL1"]);
    assert_eq!(prepare_ids(ids, Some(1)), vec!["CHEMBL2"]);
    assert!(matches!(
        read_ids(&path, "target_chembl_id"),
        Err(EtlError::MissingColumn(_))
    ));
}

#[test]
fn enrichment_identifiers_are_normalised_and_unique() {
    use bioetl::{
        model::SourceRecord,
        pipelines::{documents::DocumentIds, targets, testitems},
    };

    let documents = vec![
        SourceRecord::new(Source::Chembl)
            .with("pmid", "123.0")
            .with("doi", "https://doi.org/10.1/A"),
        SourceRecord::new(Source::Chembl).with("doi", "10.2/b"),
        SourceRecord::new(Source::Chembl).with("pmid", "123"),
    ];
    let mut ids = DocumentIds::collect(&documents);
    assert_eq!(ids.pmids, vec!["123"]);
    assert_eq!(ids.dois, vec!["10.1/a", "10.2/b"]);
    assert_eq!(ids.orphan_dois, vec!["10.2/b"]);
    ids.extend_dois(&[SourceRecord::new(Source::Pubmed).with("doi", "10.3/C")]);
    assert_eq!(ids.dois, vec!["10.1/a", "10.2/b", "10.3/c"]);

    let chembl_targets = vec![
        SourceRecord::new(Source::Chembl).with("uniprot_accession", "p00533"),
        SourceRecord::new(Source::Chembl).with("uniprot_accession", "P00533"),
        SourceRecord::new(Source::Chembl).with("uniprot_accession", "nonsense"),
    ];
    assert_eq!(targets::accessions(&chembl_targets), vec!["P00533"]);

    let molecules = vec![SourceRecord::new(Source::Chembl)
        .with("standard_inchi_key", "bsynrymutxbxsq-uhfffaoysa-n")];
    assert_eq!(
        testitems::inchikeys(&molecules),
        vec!["BSYNRYMUTXBXSQ-UHFFFAOYSA-N"]
    );
}
