use bioetl::{
    model::Table,
    qc::profile,
    schema::{IssueKind, ValidationIssue, ValidationReport},
};
use tempfile::tempdir;

fn sample() -> Table {
    let mut table = Table::new(["id", "name", "conflict_title"]);
    for (id, name, conflict) in [
        ("1", Some("a"), "true"),
        ("2", Some("a"), "false"),
        ("2", Some("b"), "true"),
        ("3", None, "false"),
    ] {
        table.push_row(vec![
            Some(id.to_string()),
            name.map(str::to_string),
            Some(conflict.to_string()),
        ]);
    }
    table
}

#[test]
fn profile_reports_core_metrics() {
    let report = profile(&sample(), &["id"]).unwrap();
    assert_eq!(report.value("row_count", None), Some("4"));
    assert_eq!(report.value("null_fraction", Some("name")), Some("0.25"));
    assert_eq!(report.value("null_fraction", Some("id")), Some("0"));
    assert_eq!(report.value("unique_count", Some("name")), Some("2"));
    assert_eq!(report.value("unique_count", Some("id")), Some("3"));
    assert_eq!(report.value("duplicate_keys", None), Some("1"));
    assert_eq!(report.value("conflicts", Some("conflict_title")), Some("2"));
}

#[test]
fn empty_table_profiles_cleanly() {
    let report = profile(&Table::new(["id"]), &["id"]).unwrap();
    assert_eq!(report.value("row_count", None), Some("0"));
    assert_eq!(report.value("null_fraction", Some("id")), Some("0"));
    assert_eq!(report.value("duplicate_keys", None), Some("0"));
}

#[test]
fn report_is_written_sorted_with_validation_counts() {
    let dir = tempdir().unwrap();
    let mut report = profile(&sample(), &["id"]).unwrap();
    report.add_validation(&ValidationReport {
        errors: vec![ValidationIssue {
            kind: IssueKind::Null,
            column: "name".to_string(),
            row: Some(3),
            value: None,
        }],
    });
    let path = dir.path().join("qc.csv");
    report.write(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "metric,column,value");
    assert_eq!(lines[1], "conflicts,conflict_title,2");
    assert!(lines.contains(&"validation_errors,,1"));
    assert!(lines.contains(&"validation_errors,null,1"));

    let mut sorted = lines[1..].to_vec();
    sorted.sort();
    assert_eq!(sorted, lines[1..].to_vec());
}
