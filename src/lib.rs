//! bioetl: ChEMBL-centred bioactivity ETL with bibliographic and entity enrichment.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipelines;
pub mod qc;
pub mod schema;
pub mod sources;
