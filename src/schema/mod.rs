//! Declarative column schemas and a row-level validator.

mod tables;

use std::{collections::HashMap, fmt};

use regex::Regex;
use serde::Serialize;

use crate::model::Table;

pub use tables::{activities, assays, documents, for_pipeline, targets, testitems};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ColumnKind {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::String => true,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Float => value.parse::<f64>().map(f64::is_finite).unwrap_or(false),
            Self::Boolean => matches!(value, "true" | "false"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub pattern: Option<&'static str>,
    pub unique: bool,
    pub allowed: Option<&'static [&'static str]>,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
            pattern: None,
            unique: false,
            allowed: None,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, ColumnKind::String)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn float(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Float)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Boolean)
    }

    pub const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub const fn allowed(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(values);
        self
    }
}

/// Column layout, types and business key of one output table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnSpec>,
    pub key: &'static [&'static str],
}

impl TableSchema {
    pub fn column_order(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingColumn,
    Null,
    Type,
    Pattern,
    NotAllowed,
    Duplicate,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingColumn => "missing_column",
            Self::Null => "null",
            Self::Type => "type",
            Self::Pattern => "pattern",
            Self::NotAllowed => "not_allowed",
            Self::Duplicate => "duplicate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub column: String,
    pub row: Option<usize>,
    pub value: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in `{}`", self.kind.as_str(), self.column)?;
        if let Some(row) = self.row {
            write!(f, " at row {row}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " ({value:?})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count_by_kind(&self) -> Vec<(IssueKind, usize)> {
        let mut counts: HashMap<IssueKind, usize> = HashMap::new();
        for issue in &self.errors {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort();
        counts
    }
}

/// Check `table` against `schema`. Extra columns are permitted; the table is
/// never modified.
pub fn validate(schema: &TableSchema, table: &Table) -> ValidationReport {
    let mut report = ValidationReport::default();
    for spec in &schema.columns {
        let Some(values) = table.column_values(spec.name) else {
            report.errors.push(ValidationIssue {
                kind: IssueKind::MissingColumn,
                column: spec.name.to_string(),
                row: None,
                value: None,
            });
            continue;
        };
        // An unparseable pattern rejects every value in the column.
        let pattern = spec.pattern.map(Regex::new);
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (row, value) in values.into_iter().enumerate() {
            let issue = |kind: IssueKind, value: Option<&str>| ValidationIssue {
                kind,
                column: spec.name.to_string(),
                row: Some(row),
                value: value.map(str::to_string),
            };
            let Some(value) = value else {
                if !spec.nullable {
                    report.errors.push(issue(IssueKind::Null, None));
                }
                continue;
            };
            if !spec.kind.accepts(value) {
                report.errors.push(issue(IssueKind::Type, Some(value)));
                continue;
            }
            if let Some(pattern) = &pattern {
                if !pattern.as_ref().is_ok_and(|re| re.is_match(value)) {
                    report.errors.push(issue(IssueKind::Pattern, Some(value)));
                }
            }
            if let Some(allowed) = spec.allowed {
                if !allowed.contains(&value) {
                    report.errors.push(issue(IssueKind::NotAllowed, Some(value)));
                }
            }
            if spec.unique && seen.insert(value, row).is_some() {
                report.errors.push(issue(IssueKind::Duplicate, Some(value)));
            }
        }
    }
    report
}
