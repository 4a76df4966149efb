//! CLI error types and conversions

use crate::api::ApiError;
use crate::harvest::HarvestError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Transport setup or credential error
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Harvest run error
    #[error("harvest error: {0}")]
    Harvest(#[from] HarvestError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Input file could not be read or parsed
    #[error("input error: {0}")]
    Input(String),

    /// Output file could not be written
    #[error("output error: {0}")]
    Output(String),
}
