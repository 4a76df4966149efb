//! CLI command implementations

pub mod error;
pub mod export;
pub mod harvest;

pub use error::CliError;
pub use export::ExportArgs;
pub use harvest::{CatalogArgs, ChannelsArgs, DumpsArgs, EngineArgs, TeamsArgs};

use clap::{Parser, Subcommand};

/// Resumable, rate-limited harvester for sports catalog data.
#[derive(Debug, Parser)]
#[command(name = "sports-data-harvester", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Harvest tournament participants per season
    Teams(TeamsArgs),
    /// Dump full tournament detail (overview, fixtures, standings)
    Dumps(DumpsArgs),
    /// Harvest TV channel listings per country
    Channels(ChannelsArgs),
    /// Fetch the competitions catalog and save it
    Catalog(CatalogArgs),
    /// Build the unified channel index from a harvested dataset
    Export(ExportArgs),
}
