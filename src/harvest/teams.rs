//! Tournament participant harvesting
//!
//! One shard is one unique tournament. Harvesting lists its seasons, then
//! fetches the team list for each selected season. Each season fetch is an
//! independent sub-call: a failed one records its error in place and the
//! remaining seasons are still attempted.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Shard;
use crate::harvest::orchestrator::ShardHarvester;
use crate::harvest::Fetcher;
use crate::store::{ShardResult, SubResult};
use crate::Team;

/// Harvests team rosters per tournament season.
#[derive(Debug, Clone)]
pub struct TeamHarvester {
    /// Harvest every season instead of only the most recent one
    pub all_seasons: bool,
    /// Clamp on seasons per tournament, applied after `all_seasons`
    pub season_limit: Option<usize>,
}

impl TeamHarvester {
    pub fn new(all_seasons: bool, season_limit: Option<usize>) -> Self {
        Self {
            all_seasons,
            season_limit,
        }
    }

    fn selected_seasons<'a>(&self, seasons: &'a [Value]) -> &'a [Value] {
        let mut end = if self.all_seasons { seasons.len() } else { 1.min(seasons.len()) };
        if let Some(limit) = self.season_limit {
            end = end.min(limit);
        }
        &seasons[..end]
    }
}

#[async_trait]
impl ShardHarvester for TeamHarvester {
    async fn harvest(&self, fetcher: &Fetcher, shard: &Shard) -> ShardResult {
        let mut result = ShardResult {
            metadata: shard.metadata.clone(),
            ..Default::default()
        };

        // Season listing failure is shard-level: nothing below it can run
        let seasons_payload = match fetcher
            .fetch(&format!("/unique-tournament/{}/seasons", shard.key))
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!(shard = %shard.key, error = %e, "season listing failed");
                result.error = Some(e.to_string());
                return result;
            }
        };

        result.seasons = season_list(&seasons_payload);
        if result.seasons.is_empty() {
            debug!(shard = %shard.key, "tournament has no seasons");
            return result;
        }

        let selected = self.selected_seasons(&result.seasons).to_vec();
        for season in &selected {
            let Some(season_id) = season.get("id").and_then(Value::as_i64) else {
                continue;
            };

            let endpoint = format!(
                "/unique-tournament/{}/season/{season_id}/teams",
                shard.key
            );
            let sub = match fetcher.fetch(&endpoint).await {
                Ok(payload) => SubResult {
                    season_id: Some(season_id),
                    season: Some(season.clone()),
                    teams: Some(team_list(&payload)),
                    ..Default::default()
                },
                Err(e) => {
                    warn!(shard = %shard.key, season_id, error = %e, "season teams fetch failed");
                    SubResult {
                        season_id: Some(season_id),
                        season: Some(season.clone()),
                        error: Some(e.to_string()),
                        ..Default::default()
                    }
                }
            };
            result.results.push(sub);
        }

        result
    }
}

/// Seasons from a listing payload. The endpoint has returned both a bare
/// array and a `{"seasons": [...]}` wrapper over time; accept either.
pub(crate) fn season_list(payload: &Value) -> Vec<Value> {
    if let Some(list) = payload.as_array() {
        return list.clone();
    }
    payload
        .get("seasons")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Teams from a roster payload, reduced to the fields the dataset keeps.
/// Entries that do not deserialize are dropped rather than failing the
/// sub-call.
fn team_list(payload: &Value) -> Vec<Team> {
    payload
        .get("teams")
        .and_then(Value::as_array)
        .map(|teams| {
            teams
                .iter()
                .filter_map(|t| serde_json::from_value(t.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
