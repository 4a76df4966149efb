//! Full tournament dumps
//!
//! One shard is one unique tournament, fetched as a set of named sections:
//! league-level calls (overview, highlights, fixtures) plus per-season
//! detail calls (info, standings, top players, rounds). Every section is an
//! independent fetch; a failed one stores an `{"error": ...}` payload under
//! its name so the dump stays structurally complete.
//!
//! Dumps are point-in-time documents (fixtures and standings move between
//! runs), so a dump shard never reads as satisfied and every run re-fetches
//! it. Checkpointing still bounds data loss on interruption.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;

use crate::catalog::Shard;
use crate::harvest::orchestrator::ShardHarvester;
use crate::harvest::teams::season_list;
use crate::harvest::Fetcher;
use crate::store::{ShardResult, SubResult};

/// Harvests the full per-tournament dump.
#[derive(Debug, Clone)]
pub struct DumpHarvester {
    /// Dump every season instead of only the most recent one
    pub all_seasons: bool,
    /// Clamp on seasons per tournament, applied after `all_seasons`
    pub season_limit: Option<usize>,
}

impl DumpHarvester {
    pub fn new(all_seasons: bool, season_limit: Option<usize>) -> Self {
        Self {
            all_seasons,
            season_limit,
        }
    }
}

/// League-level sections, in dump order.
fn league_sections(tournament: &str) -> Vec<(&'static str, String)> {
    vec![
        ("overview", format!("/unique-tournament/{tournament}")),
        (
            "latestHighlights",
            format!("/unique-tournament/{tournament}/highlights"),
        ),
        (
            "featuredGames",
            format!("/unique-tournament/{tournament}/featured-events"),
        ),
        (
            "nextFixtures",
            format!("/unique-tournament/{tournament}/events/next/0"),
        ),
        (
            "lastFixtures",
            format!("/unique-tournament/{tournament}/events/last/0"),
        ),
    ]
}

/// Per-season sections, in dump order.
fn season_sections(tournament: &str, season_id: i64) -> Vec<(&'static str, String)> {
    let base = format!("/unique-tournament/{tournament}/season/{season_id}");
    vec![
        ("info", format!("{base}/info")),
        ("topPlayers", format!("{base}/top-players/overall")),
        ("topTeams", format!("{base}/top-teams/overall")),
        ("standings", format!("{base}/standings/total")),
        ("standingsHome", format!("{base}/standings/home")),
        ("standingsAway", format!("{base}/standings/away")),
        ("rounds", format!("{base}/rounds")),
        ("cupTree", format!("{base}/cup-trees")),
    ]
}

/// Fetch one named section, capturing a failure as an error payload so the
/// remaining sections still run.
async fn fetch_section(fetcher: &Fetcher, shard_key: &str, name: &str, endpoint: &str) -> Value {
    match fetcher.fetch(endpoint).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(shard = %shard_key, section = name, error = %e, "dump section failed");
            json!({"error": e.to_string()})
        }
    }
}

#[async_trait]
impl ShardHarvester for DumpHarvester {
    async fn harvest(&self, fetcher: &Fetcher, shard: &Shard) -> ShardResult {
        let mut result = ShardResult {
            metadata: shard.metadata.clone(),
            ..Default::default()
        };

        let mut league = BTreeMap::new();
        for (name, endpoint) in league_sections(&shard.key) {
            league.insert(
                name.to_string(),
                fetch_section(fetcher, &shard.key, name, &endpoint).await,
            );
        }
        result.league = Some(league);

        // The season listing gates all season detail; its failure is
        // shard-level like the team harvester's
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

        let selected: Vec<Value> = result
            .seasons
            .iter()
            .filter(|season| season.get("id").and_then(Value::as_i64).is_some())
            .take(if self.all_seasons {
                self.season_limit.unwrap_or(usize::MAX)
            } else {
                self.season_limit.unwrap_or(1).min(1)
            })
            .cloned()
            .collect();

        for season in &selected {
            // Filtered to id-bearing seasons above
            let Some(season_id) = season.get("id").and_then(Value::as_i64) else {
                continue;
            };

            let mut sections = BTreeMap::new();
            for (name, endpoint) in season_sections(&shard.key, season_id) {
                sections.insert(
                    name.to_string(),
                    fetch_section(fetcher, &shard.key, name, &endpoint).await,
                );
            }

            result.results.push(SubResult {
                season_id: Some(season_id),
                season: Some(season.clone()),
                sections: Some(sections),
                ..Default::default()
            });
        }

        result
    }
}
