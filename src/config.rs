//! Runtime configuration utilities for bioetl.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Contact email sent to APIs with a polite-pool policy (NCBI, Crossref, OpenAlex).
    pub contact_email: String,
    /// Tool name sent with E-utilities requests.
    pub tool_name: String,
    pub chembl_base_url: String,
    pub pubmed_base_url: String,
    pub crossref_base_url: String,
    pub openalex_base_url: String,
    pub semantic_scholar_base_url: String,
    pub semantic_scholar_api_key: Option<String>,
    pub pubchem_base_url: String,
    pub uniprot_base_url: String,
    pub iuphar_base_url: String,
    /// Identifiers per ChEMBL / enrichment request.
    pub batch_size: usize,
    /// Pause between consecutive requests to the same service.
    pub request_delay_ms: u64,
    pub http_timeout_secs: u64,
    /// Enrichment sources queried at the same time.
    pub source_concurrency: usize,
    /// Root folder for cached inputs.
    pub data_dir: PathBuf,
    /// Root folder for datasets, QC reports and run metadata.
    pub outputs_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            contact_email: "research@example.com".to_string(),
            tool_name: "bioetl".to_string(),
            chembl_base_url: "https://www.ebi.ac.uk/chembl/api/data".to_string(),
            pubmed_base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            crossref_base_url: "https://api.crossref.org".to_string(),
            openalex_base_url: "https://api.openalex.org".to_string(),
            semantic_scholar_base_url: "https://api.semanticscholar.org/graph/v1".to_string(),
            semantic_scholar_api_key: None,
            pubchem_base_url: "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string(),
            uniprot_base_url: "https://rest.uniprot.org".to_string(),
            iuphar_base_url: "https://www.guidetopharmacology.org/services".to_string(),
            batch_size: 25,
            request_delay_ms: 350,
            http_timeout_secs: 60,
            source_concurrency: 2,
            data_dir: PathBuf::from("./data"),
            outputs_dir: PathBuf::from("./outputs"),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let settings = Self {
            contact_email: string_var("CONTACT_EMAIL", defaults.contact_email),
            tool_name: string_var("TOOL_NAME", defaults.tool_name),
            chembl_base_url: string_var("CHEMBL_BASE_URL", defaults.chembl_base_url),
            pubmed_base_url: string_var("PUBMED_BASE_URL", defaults.pubmed_base_url),
            crossref_base_url: string_var("CROSSREF_BASE_URL", defaults.crossref_base_url),
            openalex_base_url: string_var("OPENALEX_BASE_URL", defaults.openalex_base_url),
            semantic_scholar_base_url: string_var(
                "SEMANTIC_SCHOLAR_BASE_URL",
                defaults.semantic_scholar_base_url,
            ),
            semantic_scholar_api_key: env::var("SEMANTIC_SCHOLAR_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            pubchem_base_url: string_var("PUBCHEM_BASE_URL", defaults.pubchem_base_url),
            uniprot_base_url: string_var("UNIPROT_BASE_URL", defaults.uniprot_base_url),
            iuphar_base_url: string_var("IUPHAR_BASE_URL", defaults.iuphar_base_url),
            batch_size: parsed_var("BATCH_SIZE", defaults.batch_size).max(1),
            request_delay_ms: parsed_var("REQUEST_DELAY_MS", defaults.request_delay_ms),
            http_timeout_secs: parsed_var("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            source_concurrency: parsed_var("SOURCE_CONCURRENCY", defaults.source_concurrency)
                .max(1),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            outputs_dir: env::var("OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
        };

        std::fs::create_dir_all(&settings.data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&settings.outputs_dir).context("creating outputs dir")?;
        Ok(settings)
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn string_var(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
