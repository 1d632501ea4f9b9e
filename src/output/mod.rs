//! Deterministic output layer: canonical ordering, content hashes and writers.

pub mod determinism;
pub mod hash;
pub mod meta;
pub mod writer;

use clap::ValueEnum;
use serde::Serialize;

pub use determinism::canonicalize;
pub use hash::{attach_hashes, hash_business_key, hash_row};
pub use meta::RunMeta;
pub use writer::{file_sha256, to_dataframe, write_csv, write_parquet};

/// File format of the primary dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}
