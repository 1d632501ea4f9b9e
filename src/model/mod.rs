//! Core record types shared by the source clients, merge engine and writers.

mod table;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use table::{Row, Table};

/// Upstream services a record can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Chembl,
    Pubmed,
    Crossref,
    #[serde(rename = "openalex")]
    OpenAlex,
    SemanticScholar,
    #[serde(rename = "pubchem")]
    PubChem,
    #[serde(rename = "uniprot")]
    UniProt,
    Iuphar,
}

impl Source {
    pub const BIBLIOGRAPHIC: [Source; 4] = [
        Source::Pubmed,
        Source::Crossref,
        Source::OpenAlex,
        Source::SemanticScholar,
    ];

    /// Stable identifier, also used as output column prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chembl => "chembl",
            Self::Pubmed => "pubmed",
            Self::Crossref => "crossref",
            Self::OpenAlex => "openalex",
            Self::SemanticScholar => "semantic_scholar",
            Self::PubChem => "pubchem",
            Self::UniProt => "uniprot",
            Self::Iuphar => "iuphar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let key = value.trim().to_ascii_lowercase().replace('-', "_");
        [
            Self::Chembl,
            Self::Pubmed,
            Self::Crossref,
            Self::OpenAlex,
            Self::SemanticScholar,
            Self::PubChem,
            Self::UniProt,
            Self::Iuphar,
        ]
        .into_iter()
        .find(|source| source.as_str() == key)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record from one source, keyed by canonical field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source: Source,
    pub fields: IndexMap<String, String>,
}

impl SourceRecord {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            fields: IndexMap::new(),
        }
    }

    /// Store a field, skipping blank values.
    pub fn set(&mut self, field: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            let value = value.into();
            if !value.trim().is_empty() {
                self.fields.insert(field.to_string(), value);
            }
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}
