//! Error types shared by the extraction, merge and output layers.

use thiserror::Error;

use crate::schema::ValidationIssue;

/// Failures raised by library code. Command handlers wrap these in `anyhow`.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("{service} request failed: {message}")]
    Http { service: &'static str, message: String },
    #[error("{service} payload could not be parsed: {message}")]
    Parse { service: &'static str, message: String },
    #[error("table `{table}` failed validation with {} issue(s)", .errors.len())]
    Validation {
        table: String,
        errors: Vec<ValidationIssue>,
    },
    #[error("missing column `{0}`")]
    MissingColumn(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

impl EtlError {
    pub fn http(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Http {
            service,
            message: err.to_string(),
        }
    }

    pub fn parse(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            service,
            message: err.to_string(),
        }
    }
}

pub type EtlResult<T> = Result<T, EtlError>;
