//! Run metadata written alongside each dataset.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::EtlResult;

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub pipeline: String,
    pub version: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub business_key: Vec<String>,
    pub output: String,
    pub output_sha256: String,
    pub sources: Vec<String>,
    pub validation_errors: usize,
    pub generated_at: String,
}

impl RunMeta {
    /// Timestamp in RFC 3339 with second precision.
    pub fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn write(&self, path: &Path) -> EtlResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{body}\n"))?;
        Ok(())
    }
}
