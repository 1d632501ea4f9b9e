//! Field-level reconciliation across sources.
//!
//! Each output field has a static precedence list of sources. The winning value
//! is the first usable candidate in that order; a conflict is flagged whenever
//! the listed sources disagree after normalisation.

pub mod documents;
pub mod entities;
pub mod precedence;

use indexmap::IndexMap;

use crate::{
    model::{Row, Source, SourceRecord},
    normalize::{
        clean_text, normalize_doi, normalize_number, normalize_pmid, normalize_title,
        normalize_year, strip_markup,
    },
};

pub use documents::merge_documents;
pub use entities::{merge_targets, merge_testitems};

/// How candidate values are cleaned and compared for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Doi,
    Pmid,
    Title,
    Text,
    Year,
    Number,
    /// Case-insensitive identifier; the winning value is uppercased.
    Code,
}

impl FieldKind {
    /// Returns `(output value, comparison key)` or `None` when unusable.
    fn prepare(self, raw: &str) -> Option<(String, String)> {
        match self {
            Self::Doi => normalize_doi(raw).map(|v| (v.clone(), v)),
            Self::Pmid => normalize_pmid(raw).map(|v| (v.clone(), v)),
            Self::Title => {
                let display = strip_markup(raw)?;
                let key = normalize_title(&display)?;
                Some((display, key))
            }
            Self::Text => clean_text(raw).map(|v| (v.clone(), v.to_lowercase())),
            Self::Year => normalize_year(raw).map(|v| (v.clone(), v)),
            Self::Number => normalize_number(raw).map(|v| (v.clone(), v)),
            Self::Code => clean_text(raw).map(|v| {
                let upper = v.to_ascii_uppercase();
                (upper.clone(), upper)
            }),
        }
    }
}

/// Ordered source preference for a single field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub precedence: &'static [Source],
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn new(field: &'static str, kind: FieldKind, precedence: &'static [Source]) -> Self {
        Self {
            field,
            precedence,
            kind,
        }
    }
}

/// Outcome of reconciling one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub value: Option<String>,
    pub source: Option<Source>,
    pub conflict: bool,
    /// Number of distinct comparison keys among listed sources.
    pub distinct: usize,
    /// Comparison keys in precedence order, one per contributing source.
    pub keys: Vec<(Source, String)>,
}

/// Pick the winning value for `rule` from `candidates`.
pub fn resolve(rule: &FieldRule, candidates: &[(Source, Option<&str>)]) -> Resolution {
    let mut resolution = Resolution::default();
    for source in rule.precedence {
        let prepared = candidates
            .iter()
            .filter(|(candidate, _)| candidate == source)
            .find_map(|(_, raw)| raw.and_then(|raw| rule.kind.prepare(raw)));
        let Some((value, key)) = prepared else {
            continue;
        };
        if resolution.value.is_none() {
            resolution.value = Some(value);
            resolution.source = Some(*source);
        }
        resolution.keys.push((*source, key));
    }
    let mut distinct: Vec<&str> = resolution.keys.iter().map(|(_, k)| k.as_str()).collect();
    distinct.sort_unstable();
    distinct.dedup();
    resolution.distinct = distinct.len();
    resolution.conflict = resolution.distinct > 1;
    resolution
}

/// Resolve every rule against a group of records describing the same entity.
pub fn resolve_all(
    rules: &[FieldRule],
    records: &[&SourceRecord],
) -> IndexMap<&'static str, Resolution> {
    rules
        .iter()
        .map(|rule| {
            let candidates: Vec<(Source, Option<&str>)> = records
                .iter()
                .map(|record| (record.source, record.get(rule.field)))
                .collect();
            (rule.field, resolve(rule, &candidates))
        })
        .collect()
}

/// Build the reconciled row for one entity: resolved values, then provenance
/// and conflict columns for the `tracked` fields, then the contributing sources.
pub fn merged_row(rules: &[FieldRule], tracked: &[&str], records: &[&SourceRecord]) -> Row {
    let resolved = resolve_all(rules, records);
    let mut row = Row::new();
    for (field, resolution) in &resolved {
        row.insert((*field).to_string(), resolution.value.clone());
    }
    for field in tracked {
        let source = resolved.get(*field).and_then(|r| r.source);
        row.insert(format!("{field}_source"), source.map(|s| s.as_str().to_string()));
    }
    for field in tracked {
        let conflict = resolved.get(*field).map(|r| r.conflict).unwrap_or(false);
        row.insert(format!("conflict_{field}"), flag(conflict));
    }
    row.insert("sources".to_string(), contributing_sources(records));
    row
}

fn contributing_sources(records: &[&SourceRecord]) -> Option<String> {
    let mut sources: Vec<Source> = records.iter().map(|r| r.source).collect();
    sources.sort();
    sources.dedup();
    if sources.is_empty() {
        return None;
    }
    Some(
        sources
            .iter()
            .map(Source::as_str)
            .collect::<Vec<_>>()
            .join(";"),
    )
}

pub(crate) fn flag(value: bool) -> Option<String> {
    Some(value.to_string())
}
