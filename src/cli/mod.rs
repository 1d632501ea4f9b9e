//! Command-line interface wiring for bioetl.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod documents;
pub mod pipeline;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "ChEMBL bioactivity and bibliography ETL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Documents(args) => documents::run(args, settings).await,
            Commands::Activities(args) => pipeline::run(Pipeline::Activities, args, settings).await,
            Commands::Assays(args) => pipeline::run(Pipeline::Assays, args, settings).await,
            Commands::Targets(args) => pipeline::run(Pipeline::Targets, args, settings).await,
            Commands::Testitems(args) => pipeline::run(Pipeline::Testitems, args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract ChEMBL documents and reconcile them with bibliographic sources.
    Documents(documents::Args),
    /// Extract ChEMBL activities and normalise units.
    Activities(pipeline::PipelineArgs),
    /// Extract ChEMBL assays.
    Assays(pipeline::PipelineArgs),
    /// Extract ChEMBL targets enriched from UniProt and IUPHAR.
    Targets(pipeline::PipelineArgs),
    /// Extract ChEMBL molecules enriched from PubChem.
    Testitems(pipeline::PipelineArgs),
}

/// Pipelines sharing the generic argument set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pipeline {
    Documents,
    Activities,
    Assays,
    Targets,
    Testitems,
}

impl Pipeline {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Activities => "activities",
            Self::Assays => "assays",
            Self::Targets => "targets",
            Self::Testitems => "testitems",
        }
    }

    /// Column holding identifiers in `--input` files.
    pub fn id_column(&self) -> &'static str {
        use crate::sources::chembl::Entity;
        match self {
            Self::Documents => Entity::Document.id_field(),
            Self::Activities => Entity::Activity.id_field(),
            Self::Assays => Entity::Assay.id_field(),
            Self::Targets => Entity::Target.id_field(),
            Self::Testitems => Entity::Molecule.id_field(),
        }
    }
}
