//! Harvest command implementations

use clap::{Args, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::HttpTransport;
use crate::catalog::{self, CatalogEntry, Shard};
use crate::harvest::config::{
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_DELAY_SECS,
    DEFAULT_REQUEST_JITTER_SECS, DEFAULT_RETRY_DELAY_SECS, DEFAULT_SHARD_DELAY_SECS,
    DEFAULT_SHARD_JITTER_SECS,
};
use crate::harvest::{
    channels::ChannelHarvester, dumps::DumpHarvester, teams::TeamHarvester, Fetcher,
    HarvestConfig, Orchestrator,
};
use crate::shutdown::SharedShutdown;
use crate::store;

use super::CliError;

/// Pacing, retry, and checkpoint flags shared by every harvest command.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Seconds to wait before each request
    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY_SECS)]
    pub request_delay: f64,

    /// Random jitter added to each request delay (seconds)
    #[arg(long, default_value_t = DEFAULT_REQUEST_JITTER_SECS)]
    pub request_jitter: f64,

    /// Seconds to wait before each shard
    #[arg(long, default_value_t = DEFAULT_SHARD_DELAY_SECS)]
    pub shard_delay: f64,

    /// Random jitter added to each shard delay (seconds)
    #[arg(long, default_value_t = DEFAULT_SHARD_JITTER_SECS)]
    pub shard_jitter: f64,

    /// Maximum retries when the upstream returns a retryable status
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Base delay (seconds) for retry backoff; doubles with each attempt
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_SECS)]
    pub retry_delay: f64,

    /// HTTP status code that triggers a retry; repeat flag to add more
    #[arg(long = "retry-status")]
    pub retry_statuses: Vec<u16>,

    /// Re-fetch shards even when the dataset already has their data
    #[arg(long)]
    pub force: bool,

    /// Persist the dataset after this many fetched shards
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    pub checkpoint_interval: usize,
}

impl EngineArgs {
    /// Validate and convert into a [`HarvestConfig`].
    pub fn to_config(&self) -> Result<HarvestConfig, CliError> {
        for (name, value) in [
            ("request-delay", self.request_delay),
            ("request-jitter", self.request_jitter),
            ("shard-delay", self.shard_delay),
            ("shard-jitter", self.shard_jitter),
            ("retry-delay", self.retry_delay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CliError::InvalidArgument(format!(
                    "--{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.checkpoint_interval == 0 {
            return Err(CliError::InvalidArgument(
                "--checkpoint-interval must be at least 1".to_string(),
            ));
        }

        let mut config = HarvestConfig {
            request_delay: Duration::from_secs_f64(self.request_delay),
            request_jitter: Duration::from_secs_f64(self.request_jitter),
            shard_delay: Duration::from_secs_f64(self.shard_delay),
            shard_jitter: Duration::from_secs_f64(self.shard_jitter),
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs_f64(self.retry_delay),
            force: self.force,
            checkpoint_interval: self.checkpoint_interval,
            ..Default::default()
        };
        if !self.retry_statuses.is_empty() {
            config.retry_statuses = self.retry_statuses.iter().copied().collect();
        }
        Ok(config)
    }
}

/// `teams` command arguments.
#[derive(Debug, Parser)]
pub struct TeamsArgs {
    /// Sport slug to harvest; repeat flag for multiple (default: football)
    #[arg(long = "sport")]
    pub sports: Vec<String>,

    /// Path to a competitions catalog JSON; fetched live when missing
    #[arg(long, default_value = "data/competitions.json")]
    pub catalog: PathBuf,

    /// Where to store the harvested dataset
    #[arg(long, default_value = "data/tournaments_participants.json")]
    pub out: PathBuf,

    /// Limit the number of tournaments processed
    #[arg(long)]
    pub limit: Option<usize>,

    /// Collect team lists for every season (default: most recent only)
    #[arg(long)]
    pub all_seasons: bool,

    /// Clamp the number of seasons harvested per tournament
    #[arg(long)]
    pub season_limit: Option<usize>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl TeamsArgs {
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        let mut config = self.engine.to_config()?;
        config.all_subshards = self.all_seasons;
        config.subshard_limit = self.season_limit;

        let transport = Arc::new(HttpTransport::sports_api()?);
        let fetcher = Fetcher::from_config(transport, &config);
        let sports = self.sports_or_default();

        let entries = if self.catalog.exists() {
            catalog::load_catalog(&self.catalog)
                .map_err(|e| CliError::Input(format!("{}: {e}", self.catalog.display())))?
        } else {
            info!(path = %self.catalog.display(), "no catalog file, fetching live");
            catalog::fetch_catalog(&fetcher, &sports).await
        };

        let mut shards = catalog::tournament_shards(&entries, &sports);
        truncate_shards(&mut shards, self.limit);

        let mut dataset = store::load_or_default(&self.out);
        let harvester = TeamHarvester::new(config.all_subshards, config.subshard_limit);
        let orchestrator = Orchestrator::new(config, self.out.clone(), shutdown);
        orchestrator
            .run(&shards, &harvester, &fetcher, &mut dataset)
            .await?;
        Ok(())
    }

    fn sports_or_default(&self) -> Vec<String> {
        if self.sports.is_empty() {
            vec![catalog::FALLBACK_SPORT.to_string()]
        } else {
            self.sports.clone()
        }
    }
}

/// `dumps` command arguments.
///
/// Same shard enumeration as `teams`, but each tournament is captured as a
/// full point-in-time snapshot (overview, fixtures, per-season standings and
/// top players) instead of a team roster. Snapshots never mark a shard
/// satisfied, so every run re-fetches them.
#[derive(Debug, Parser)]
pub struct DumpsArgs {
    /// Sport slug to dump; repeat flag for multiple (default: football)
    #[arg(long = "sport")]
    pub sports: Vec<String>,

    /// Path to a competitions catalog JSON; fetched live when missing
    #[arg(long, default_value = "data/competitions.json")]
    pub catalog: PathBuf,

    /// Where to store the dumped dataset
    #[arg(long, default_value = "data/tournaments_full.json")]
    pub out: PathBuf,

    /// Limit the number of tournaments processed
    #[arg(long)]
    pub limit: Option<usize>,

    /// Dump every season (default: most recent only)
    #[arg(long)]
    pub all_seasons: bool,

    /// Clamp the number of seasons dumped per tournament
    #[arg(long)]
    pub season_limit: Option<usize>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl DumpsArgs {
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        let mut config = self.engine.to_config()?;
        config.all_subshards = self.all_seasons;
        config.subshard_limit = self.season_limit;

        let transport = Arc::new(HttpTransport::sports_api()?);
        let fetcher = Fetcher::from_config(transport, &config);
        let sports = if self.sports.is_empty() {
            vec![catalog::FALLBACK_SPORT.to_string()]
        } else {
            self.sports.clone()
        };

        let entries = if self.catalog.exists() {
            catalog::load_catalog(&self.catalog)
                .map_err(|e| CliError::Input(format!("{}: {e}", self.catalog.display())))?
        } else {
            info!(path = %self.catalog.display(), "no catalog file, fetching live");
            catalog::fetch_catalog(&fetcher, &sports).await
        };

        let mut shards = catalog::tournament_shards(&entries, &sports);
        truncate_shards(&mut shards, self.limit);

        let mut dataset = store::load_or_default(&self.out);
        let harvester = DumpHarvester::new(config.all_subshards, config.subshard_limit);
        let orchestrator = Orchestrator::new(config, self.out.clone(), shutdown);
        orchestrator
            .run(&shards, &harvester, &fetcher, &mut dataset)
            .await?;
        Ok(())
    }
}

/// `channels` command arguments.
#[derive(Debug, Parser)]
pub struct ChannelsArgs {
    /// Path to the country reference list (GeoLite2-style JSON)
    #[arg(long, default_value = "data/geolite2_countries.json")]
    pub countries: PathBuf,

    /// Where to store the harvested dataset
    #[arg(long, default_value = "data/channels_database.json")]
    pub out: PathBuf,

    /// Limit the number of countries processed
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip countries before this ISO code in the reference order
    #[arg(long)]
    pub start_from: Option<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl ChannelsArgs {
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = self.engine.to_config()?;

        // Credential check happens here, before any shard work
        let transport = Arc::new(HttpTransport::channel_api()?);
        let fetcher = Fetcher::from_config(transport, &config);

        let countries = catalog::load_countries(&self.countries)
            .map_err(|e| CliError::Input(format!("{}: {e}", self.countries.display())))?;
        let mut shards = catalog::country_shards(&countries);

        if let Some(start) = &self.start_from {
            let start = start.trim().to_ascii_uppercase();
            let index = shards
                .iter()
                .position(|s| s.key == start)
                .ok_or_else(|| {
                    CliError::InvalidArgument(format!(
                        "--start-from country '{start}' is not in the reference list"
                    ))
                })?;
            shards.drain(..index);
        }
        truncate_shards(&mut shards, self.limit);

        let mut dataset = store::load_or_default(&self.out);
        let harvester = ChannelHarvester::new();
        let orchestrator = Orchestrator::new(config, self.out.clone(), shutdown);
        orchestrator
            .run(&shards, &harvester, &fetcher, &mut dataset)
            .await?;
        Ok(())
    }
}

/// `catalog` command arguments.
#[derive(Debug, Parser)]
pub struct CatalogArgs {
    /// Sport slug to list; repeat flag for multiple (default: football)
    #[arg(long = "sport")]
    pub sports: Vec<String>,

    /// Where to store the catalog JSON
    #[arg(long, default_value = "data/competitions.json")]
    pub out: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl CatalogArgs {
    pub async fn execute(&self) -> Result<(), CliError> {
        let config = self.engine.to_config()?;
        let transport = Arc::new(HttpTransport::sports_api()?);
        let fetcher = Fetcher::from_config(transport, &config);

        let sports = if self.sports.is_empty() {
            vec![catalog::FALLBACK_SPORT.to_string()]
        } else {
            self.sports.clone()
        };
        let entries: Vec<CatalogEntry> = catalog::fetch_catalog(&fetcher, &sports).await;

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::Output(e.to_string()))?;
        if let Some(parent) = self.out.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CliError::Output(format!("{}: {e}", self.out.display())))?;
            }
        }
        std::fs::write(&self.out, json)
            .map_err(|e| CliError::Output(format!("{}: {e}", self.out.display())))?;

        info!(entries = entries.len(), path = %self.out.display(), "catalog saved");
        Ok(())
    }
}

fn truncate_shards(shards: &mut Vec<Shard>, limit: Option<usize>) {
    if let Some(limit) = limit {
        shards.truncate(limit);
    }
}
