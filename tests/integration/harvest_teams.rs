//! End-to-end team harvesting: retry recovery, retry exhaustion,
//! idempotence, and resumption.

use serde_json::json;
use sports_data_harvester::catalog::Shard;
use sports_data_harvester::harvest::teams::TeamHarvester;
use sports_data_harvester::harvest::{Fetcher, HarvestConfig, Orchestrator};
use sports_data_harvester::shutdown::ShutdownCoordinator;
use sports_data_harvester::store::{self, Dataset};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{instant_config, ScriptedTransport};

fn tournament_shard(key: &str) -> Shard {
    Shard {
        scope: "football".to_string(),
        key: key.to_string(),
        label: format!("Tournament {key}"),
        metadata: json!({"tournamentId": key, "sportSlug": "football"}),
    }
}

fn orchestrator(config: HarvestConfig, path: &Path) -> Orchestrator {
    Orchestrator::new(config, path.to_path_buf(), ShutdownCoordinator::shared())
}

fn fetcher(transport: &Arc<ScriptedTransport>, config: &HarvestConfig) -> Fetcher {
    Fetcher::from_config(transport.clone(), config)
}

#[tokio::test(start_paused = true)]
async fn recovers_within_retry_budget() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.json");

    // Teams endpoint fails 3 times with 503, then succeeds on the 4th call
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok("/unique-tournament/10/seasons", json!([{"id": 1, "year": "2026"}]))
            .status_times("/unique-tournament/10/season/1/teams", 503, 3)
            .ok(
                "/unique-tournament/10/season/1/teams",
                json!({"teams": [{"id": 1, "name": "A"}]}),
            ),
    );

    let config = instant_config();
    let mut dataset = Dataset::new();
    let stats = orchestrator(config.clone(), &path)
        .run(
            &[tournament_shard("10")],
            &TeamHarvester::new(false, None),
            &fetcher(&transport, &config),
            &mut dataset,
        )
        .await
        .unwrap();

    assert_eq!(stats.fetched, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.sub_errors, 0);
    assert_eq!(transport.calls("/unique-tournament/10/season/1/teams"), 4);

    let result = dataset.get("football", "10").unwrap();
    assert!(result.error.is_none());
    assert_eq!(result.seasons.len(), 1);
    assert_eq!(result.results.len(), 1);
    let sub = &result.results[0];
    assert_eq!(sub.season_id, Some(1));
    assert!(sub.error.is_none());
    let teams = sub.teams.as_ref().unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].name, "A");
    assert!(dataset.is_satisfied("football", "10"));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_record_error_and_continue() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.json");

    // Shard 10 keeps failing past the retry budget; shard 11 succeeds
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok("/unique-tournament/10/seasons", json!([{"id": 1}]))
            .status_times("/unique-tournament/10/season/1/teams", 503, 5)
            .ok("/unique-tournament/11/seasons", json!([{"id": 2}]))
            .ok(
                "/unique-tournament/11/season/2/teams",
                json!({"teams": [{"id": 7, "name": "B"}]}),
            ),
    );

    let config = instant_config();
    let mut dataset = Dataset::new();
    let stats = orchestrator(config.clone(), &path)
        .run(
            &[tournament_shard("10"), tournament_shard("11")],
            &TeamHarvester::new(false, None),
            &fetcher(&transport, &config),
            &mut dataset,
        )
        .await
        .unwrap();

    // Initial attempt plus max_retries=4, never a 6th call
    assert_eq!(transport.calls("/unique-tournament/10/season/1/teams"), 5);
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.sub_errors, 1);

    let failed = dataset.get("football", "10").unwrap();
    assert!(failed.results[0].error.is_some());
    assert!(failed.results[0].teams.is_none());
    assert!(!dataset.is_satisfied("football", "10"));

    // The failure did not stop the run
    assert!(dataset.is_satisfied("football", "11"));
}

#[tokio::test(start_paused = true)]
async fn second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.json");

    let transport = Arc::new(
        ScriptedTransport::new()
            .ok("/unique-tournament/10/seasons", json!([{"id": 1}]))
            .ok(
                "/unique-tournament/10/season/1/teams",
                json!({"teams": [{"id": 1, "name": "A"}]}),
            ),
    );

    let config = instant_config();
    let shards = [tournament_shard("10")];
    let harvester = TeamHarvester::new(false, None);

    let mut dataset = Dataset::new();
    orchestrator(config.clone(), &path)
        .run(&shards, &harvester, &fetcher(&transport, &config), &mut dataset)
        .await
        .unwrap();
    let first_bytes = std::fs::read(&path).unwrap();
    let calls_after_first = transport.total_calls();

    // Second run resumes from the persisted file, skips everything
    let mut reloaded = store::load_or_default(&path);
    let stats = orchestrator(config.clone(), &path)
        .run(&shards, &harvester, &fetcher(&transport, &config), &mut reloaded)
        .await
        .unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.fetched, 0);
    assert_eq!(transport.total_calls(), calls_after_first);
    assert_eq!(std::fs::read(&path).unwrap(), first_bytes);
}

#[tokio::test(start_paused = true)]
async fn resumption_refetches_only_unsatisfied_shards() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.json");
    let config = instant_config();
    let shards = [tournament_shard("10"), tournament_shard("11")];
    let harvester = TeamHarvester::new(false, None);

    // First run: shard 10 succeeds, shard 11 fails terminally (404)
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok("/unique-tournament/10/seasons", json!([{"id": 1}]))
            .ok(
                "/unique-tournament/10/season/1/teams",
                json!({"teams": [{"id": 1, "name": "A"}]}),
            )
            .ok("/unique-tournament/11/seasons", json!([{"id": 2}]))
            .status("/unique-tournament/11/season/2/teams", 404),
    );
    let mut dataset = Dataset::new();
    orchestrator(config.clone(), &path)
        .run(&shards, &harvester, &fetcher(&transport, &config), &mut dataset)
        .await
        .unwrap();

    let shard_10_before =
        serde_json::to_string(dataset.get("football", "10").unwrap()).unwrap();
    assert!(!dataset.is_satisfied("football", "11"));

    // Second run: only shard 11 is re-fetched, and this time it succeeds
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok("/unique-tournament/11/seasons", json!([{"id": 2}]))
            .ok(
                "/unique-tournament/11/season/2/teams",
                json!({"teams": [{"id": 9, "name": "C"}]}),
            ),
    );
    let mut reloaded = store::load_or_default(&path);
    let stats = orchestrator(config.clone(), &path)
        .run(&shards, &harvester, &fetcher(&transport, &config), &mut reloaded)
        .await
        .unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.fetched, 1);
    assert_eq!(transport.calls("/unique-tournament/10/seasons"), 0);

    // Shard 10's persisted result is byte-for-byte unchanged
    let shard_10_after =
        serde_json::to_string(reloaded.get("football", "10").unwrap()).unwrap();
    assert_eq!(shard_10_after, shard_10_before);
    assert!(reloaded.is_satisfied("football", "11"));
}

#[tokio::test(start_paused = true)]
async fn season_listing_failure_is_shard_level() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.json");

    let transport =
        Arc::new(ScriptedTransport::new().status("/unique-tournament/10/seasons", 404));

    let config = instant_config();
    let mut dataset = Dataset::new();
    let stats = orchestrator(config.clone(), &path)
        .run(
            &[tournament_shard("10")],
            &TeamHarvester::new(false, None),
            &fetcher(&transport, &config),
            &mut dataset,
        )
        .await
        .unwrap();

    assert_eq!(stats.failed, 1);
    let result = dataset.get("football", "10").unwrap();
    assert!(result.error.is_some());
    assert!(result.results.is_empty());
    // No team call was ever attempted
    assert_eq!(transport.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn all_seasons_fetches_every_season() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.json");

    let transport = Arc::new(
        ScriptedTransport::new()
            .ok(
                "/unique-tournament/10/seasons",
                json!([{"id": 3}, {"id": 2}, {"id": 1}]),
            )
            .ok(
                "/unique-tournament/10/season/3/teams",
                json!({"teams": [{"id": 1, "name": "A"}]}),
            )
            .ok(
                "/unique-tournament/10/season/2/teams",
                json!({"teams": [{"id": 2, "name": "B"}]}),
            )
            .ok(
                "/unique-tournament/10/season/1/teams",
                json!({"teams": [{"id": 3, "name": "C"}]}),
            ),
    );

    let config = instant_config();
    let mut dataset = Dataset::new();
    orchestrator(config.clone(), &path)
        .run(
            &[tournament_shard("10")],
            &TeamHarvester::new(true, Some(2)),
            &fetcher(&transport, &config),
            &mut dataset,
        )
        .await
        .unwrap();

    // all-seasons clamped to the first two by the season limit
    let result = dataset.get("football", "10").unwrap();
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].season_id, Some(3));
    assert_eq!(result.results[1].season_id, Some(2));
    assert_eq!(transport.calls("/unique-tournament/10/season/1/teams"), 0);
}
