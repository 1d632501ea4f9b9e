use bioetl::{
    model::Table,
    schema::{self, validate, ColumnSpec, IssueKind, TableSchema},
};

fn row(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

fn small_schema() -> TableSchema {
    TableSchema {
        name: "small",
        columns: vec![
            ColumnSpec::string("id").required().unique().pattern(r"^ID\d+$"),
            ColumnSpec::integer("count"),
            ColumnSpec::boolean("flag").required(),
            ColumnSpec::string("kind").allowed(&["a", "b"]),
        ],
        key: &["id"],
    }
}

#[test]
fn valid_table_has_no_issues() {
    let mut table = Table::new(["id", "count", "flag", "kind", "extra"]);
    table.push_row(row(&[Some("ID1"), Some("3"), Some("true"), Some("a"), Some("x")]));
    table.push_row(row(&[Some("ID2"), None, Some("false"), None, None]));
    let report = validate(&small_schema(), &table);
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn each_rule_reports_its_own_issue_kind() {
    let mut table = Table::new(["id", "count", "flag", "kind"]);
    table.push_row(row(&[Some("ID1"), Some("three"), Some("true"), Some("c")]));
    table.push_row(row(&[Some("ID1"), Some("1"), None, Some("a")]));
    table.push_row(row(&[Some("X9"), Some("2"), Some("yes"), Some("b")]));

    let report = validate(&small_schema(), &table);
    let counts = report.count_by_kind();
    assert!(counts.contains(&(IssueKind::Type, 2)));
    assert!(counts.contains(&(IssueKind::NotAllowed, 1)));
    assert!(counts.contains(&(IssueKind::Duplicate, 1)));
    assert!(counts.contains(&(IssueKind::Null, 1)));
    assert!(counts.contains(&(IssueKind::Pattern, 1)));

    let duplicate = report
        .errors
        .iter()
        .find(|i| i.kind == IssueKind::Duplicate)
        .unwrap();
    assert_eq!(duplicate.row, Some(1));
    assert_eq!(duplicate.column, "id");
    assert_eq!(duplicate.to_string(), "duplicate in `id` at row 1 (\"ID1\")");
}

#[test]
fn missing_columns_are_reported_once() {
    let table = Table::new(["id"]);
    let report = validate(&small_schema(), &table);
    let missing: Vec<&str> = report
        .errors
        .iter()
        .filter(|i| i.kind == IssueKind::MissingColumn)
        .map(|i| i.column.as_str())
        .collect();
    assert_eq!(missing, vec!["count", "flag", "kind"]);
}

#[test]
fn broken_pattern_rejects_every_value() {
    let schema = TableSchema {
        name: "broken",
        columns: vec![ColumnSpec::string("v").pattern("(")],
        key: &["v"],
    };
    let mut table = Table::new(["v"]);
    table.push_row(row(&[Some("anything")]));
    table.push_row(row(&[None]));
    let report = validate(&schema, &table);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::Pattern);
}

#[test]
fn validation_never_modifies_the_table() {
    let mut table = Table::new(["id", "count", "flag", "kind"]);
    table.push_row(row(&[Some(" ID1 "), Some("x"), None, Some("z")]));
    let before = table.clone();
    let _ = validate(&small_schema(), &table);
    assert_eq!(table, before);
}

#[test]
fn every_pipeline_has_a_schema_keyed_on_a_required_column() {
    for name in ["documents", "activities", "assays", "targets", "testitems"] {
        let schema = schema::for_pipeline(name).unwrap();
        assert_eq!(schema.name, name);
        for key in schema.key {
            let spec = schema.column(key).unwrap();
            assert!(!spec.nullable, "{name}.{key} must be required");
        }
    }
    assert!(schema::for_pipeline("compounds").is_none());
}
