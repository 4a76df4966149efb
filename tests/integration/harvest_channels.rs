//! End-to-end channel harvesting: cross-country deduplication and the
//! merged channel index.

use serde_json::json;
use sports_data_harvester::catalog::{country_shards, Shard};
use sports_data_harvester::harvest::channels::ChannelHarvester;
use sports_data_harvester::harvest::{Fetcher, Orchestrator};
use sports_data_harvester::shutdown::ShutdownCoordinator;
use sports_data_harvester::store::{self, merge, Dataset};
use sports_data_harvester::CountryInfo;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{instant_config, ScriptedTransport};

fn country(iso: &str, name: &str) -> CountryInfo {
    CountryInfo {
        iso: iso.to_string(),
        name: name.to_string(),
        continent: Some("Europe".to_string()),
        is_in_european_union: None,
    }
}

#[tokio::test(start_paused = true)]
async fn shared_channel_unions_countries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("channels.json");

    // Channel 100 airs in both countries; 200 only in DE
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok(
                "/api/v1/tv/country/GB/channels",
                json!({"channels": [
                    {"id": 100, "name": "EuroSport", "logo": "https://cdn/es.png"}
                ]}),
            )
            .ok(
                "/api/v1/tv/country/DE/channels",
                json!({"channels": [
                    {"id": 100, "name": "Eurosport DE"},
                    {"id": 200, "name": "Sport1", "website": "https://sport1.de"}
                ]}),
            ),
    );

    let shards: Vec<Shard> = country_shards(&[
        country("GB", "United Kingdom"),
        country("DE", "Germany"),
    ]);
    assert_eq!(shards.len(), 2);

    let config = instant_config();
    let fetcher = Fetcher::from_config(transport.clone(), &config);
    let harvester = ChannelHarvester::with_timestamp("2026-01-01T00:00:00Z");
    let mut dataset = Dataset::new();

    let stats = Orchestrator::new(config, path.clone(), ShutdownCoordinator::shared())
        .run(&shards, &harvester, &fetcher, &mut dataset)
        .await
        .unwrap();

    assert_eq!(stats.fetched, 2);
    assert!(dataset.is_satisfied("tv", "GB"));
    assert!(dataset.is_satisfied("tv", "DE"));

    let index = merge::collect_channels(&dataset);
    assert_eq!(index.len(), 2);

    let shared = &index[&100];
    // First discovery fixed the name; countries unioned across shards
    assert_eq!(shared.name, "EuroSport");
    assert_eq!(shared.countries.len(), 2);
    assert!(shared.countries.contains("GB"));
    assert!(shared.countries.contains("DE"));
    assert!(shared.logos.contains("https://cdn/es.png"));

    let solo = &index[&200];
    assert_eq!(solo.countries.len(), 1);
    assert!(solo.websites.contains("https://sport1.de"));
}

#[tokio::test(start_paused = true)]
async fn empty_country_is_refetched_next_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("channels.json");
    let shards = country_shards(&[country("VA", "Vatican City")]);
    let harvester = ChannelHarvester::with_timestamp("2026-01-01T00:00:00Z");

    // First run: the country lists no channels
    let transport = Arc::new(
        ScriptedTransport::new().ok("/api/v1/tv/country/VA/channels", json!({"channels": []})),
    );
    let config = instant_config();
    let mut dataset = Dataset::new();
    Orchestrator::new(config.clone(), path.clone(), ShutdownCoordinator::shared())
        .run(
            &shards,
            &harvester,
            &Fetcher::from_config(transport, &config),
            &mut dataset,
        )
        .await
        .unwrap();

    // An empty listing does not satisfy the shard
    assert!(!dataset.is_satisfied("tv", "VA"));

    // Second run fetches it again
    let transport = Arc::new(
        ScriptedTransport::new().ok(
            "/api/v1/tv/country/VA/channels",
            json!({"channels": [{"id": 7, "name": "CTV"}]}),
        ),
    );
    let mut reloaded = store::load_or_default(&path);
    let stats = Orchestrator::new(config.clone(), path, ShutdownCoordinator::shared())
        .run(
            &shards,
            &harvester,
            &Fetcher::from_config(transport.clone(), &config),
            &mut reloaded,
        )
        .await
        .unwrap();

    assert_eq!(stats.fetched, 1);
    assert_eq!(transport.calls("/api/v1/tv/country/VA/channels"), 1);
    assert!(reloaded.is_satisfied("tv", "VA"));
}

#[tokio::test(start_paused = true)]
async fn failed_country_records_sub_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("channels.json");
    let shards = country_shards(&[country("GB", "United Kingdom")]);

    let transport =
        Arc::new(ScriptedTransport::new().status("/api/v1/tv/country/GB/channels", 404));
    let config = instant_config();
    let mut dataset = Dataset::new();
    let stats = Orchestrator::new(config.clone(), path, ShutdownCoordinator::shared())
        .run(
            &shards,
            &ChannelHarvester::with_timestamp("t"),
            &Fetcher::from_config(transport.clone(), &config),
            &mut dataset,
        )
        .await
        .unwrap();

    // 404 is not retryable: one transport call only
    assert_eq!(transport.calls("/api/v1/tv/country/GB/channels"), 1);
    assert_eq!(stats.sub_errors, 1);
    assert!(!dataset.is_satisfied("tv", "GB"));

    let result = dataset.get("tv", "GB").unwrap();
    assert!(result.results[0].error.is_some());
}
