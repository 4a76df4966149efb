//! Unified channel index export
//!
//! Flattens a harvested channel dataset into a single lookup document:
//! a `countries` section from the reference list and a `channels` section
//! holding every merged channel keyed by id. This is a derived artifact and
//! is rebuilt from scratch on every export.

use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use crate::catalog;
use crate::store::{self, merge};

use super::CliError;

/// `export` command arguments.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Harvested channel dataset to flatten
    #[arg(long, default_value = "data/channels_database.json")]
    pub dataset: PathBuf,

    /// Path to the country reference list (GeoLite2-style JSON)
    #[arg(long, default_value = "data/geolite2_countries.json")]
    pub countries: PathBuf,

    /// Where to write the unified index
    #[arg(long, default_value = "data/channels_unified.json")]
    pub out: PathBuf,
}

impl ExportArgs {
    pub async fn execute(&self) -> Result<(), CliError> {
        let dataset = store::load_or_default(&self.dataset);
        if dataset.shard_count() == 0 {
            return Err(CliError::Input(format!(
                "{}: dataset is empty or missing, harvest channels first",
                self.dataset.display()
            )));
        }

        let countries = catalog::load_countries(&self.countries)
            .map_err(|e| CliError::Input(format!("{}: {e}", self.countries.display())))?;
        let channels = merge::collect_channels(&dataset);

        let countries_section: serde_json::Map<String, Value> = countries
            .iter()
            .filter(|c| c.is_valid())
            .map(|c| {
                (
                    c.iso.trim().to_ascii_uppercase(),
                    json!({
                        "name": c.name,
                        "continent": c.continent.as_deref().unwrap_or("Unknown"),
                        "is_eu": c.is_eu(),
                    }),
                )
            })
            .collect();

        let channels_section: serde_json::Map<String, Value> = channels
            .values()
            .map(|channel| {
                (
                    channel.id.to_string(),
                    serde_json::to_value(channel).unwrap_or(Value::Null),
                )
            })
            .collect();

        let document = json!({
            "metadata": {
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "total_countries": countries_section.len(),
                "total_channels": channels_section.len(),
            },
            "countries": countries_section,
            "channels": channels_section,
        });

        let serialized = serde_json::to_string_pretty(&document)
            .map_err(|e| CliError::Output(e.to_string()))?;
        if let Some(parent) = self.out.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CliError::Output(format!("{}: {e}", self.out.display())))?;
            }
        }
        std::fs::write(&self.out, serialized)
            .map_err(|e| CliError::Output(format!("{}: {e}", self.out.display())))?;

        info!(
            channels = channels_section.len(),
            countries = countries_section.len(),
            path = %self.out.display(),
            "unified channel index written"
        );
        Ok(())
    }
}
