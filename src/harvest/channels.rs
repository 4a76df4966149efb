//! TV channel harvesting
//!
//! One shard is one country. A single sub-call lists the channels airing in
//! that country; the upstream response shape has drifted over time, so
//! extraction is deliberately tolerant about both the list wrapper and the
//! per-channel field names.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

use crate::catalog::Shard;
use crate::harvest::orchestrator::ShardHarvester;
use crate::harvest::Fetcher;
use crate::store::{ShardResult, SubResult};
use crate::Channel;

/// Harvests the TV channel listing per country.
#[derive(Debug, Clone)]
pub struct ChannelHarvester {
    /// RFC 3339 timestamp stamped onto newly discovered channels
    discovered_at: String,
}

impl ChannelHarvester {
    /// Harvester stamping discoveries with the current time.
    pub fn new() -> Self {
        Self::with_timestamp(chrono::Utc::now().to_rfc3339())
    }

    /// Harvester with a fixed discovery timestamp.
    pub fn with_timestamp(discovered_at: impl Into<String>) -> Self {
        Self {
            discovered_at: discovered_at.into(),
        }
    }
}

impl Default for ChannelHarvester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShardHarvester for ChannelHarvester {
    async fn harvest(&self, fetcher: &Fetcher, shard: &Shard) -> ShardResult {
        let mut result = ShardResult {
            metadata: shard.metadata.clone(),
            ..Default::default()
        };

        let endpoint = format!("/api/v1/tv/country/{}/channels", shard.key);
        match fetcher.fetch(&endpoint).await {
            Ok(payload) => {
                let channels = extract_channels(&payload, &shard.key, &self.discovered_at);
                result.results.push(SubResult {
                    channels: Some(channels),
                    ..Default::default()
                });
            }
            Err(e) => {
                warn!(country = %shard.key, error = %e, "channel listing failed");
                result.results.push(SubResult {
                    error: Some(e.to_string()),
                    ..Default::default()
                });
            }
        }

        result
    }
}

/// Channels from a listing payload.
///
/// The list has been observed under `channels`, `data`, and `results`
/// wrappers as well as a bare array; the first non-empty form wins.
fn extract_channels(payload: &Value, iso: &str, discovered_at: &str) -> Vec<Channel> {
    let list = channel_list(payload);
    let mut channels = Vec::new();

    for item in list {
        let Some(item) = item.as_object() else {
            continue;
        };
        let id = item
            .get("id")
            .or_else(|| item.get("channel_id"))
            .and_then(Value::as_i64);
        let Some(id) = id else {
            continue;
        };

        let name = ["name", "channel_name", "title"]
            .iter()
            .find_map(|key| item.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Channel {id}"));

        let mut countries = BTreeSet::new();
        countries.insert(iso.to_string());

        let logos = string_set(item, &["logo", "image"]);
        let websites = string_set(item, &["website", "url"]);

        channels.push(Channel {
            id,
            name,
            countries,
            logos,
            websites,
            first_discovered: Some(discovered_at.to_string()),
        });
    }

    channels
}

fn channel_list(payload: &Value) -> Vec<Value> {
    if let Some(list) = payload.as_array() {
        return list.clone();
    }
    for key in ["channels", "data", "results"] {
        if let Some(list) = payload.get(key).and_then(Value::as_array) {
            if !list.is_empty() {
                return list.clone();
            }
        }
    }
    Vec::new()
}

fn string_set(item: &serde_json::Map<String, Value>, keys: &[&str]) -> BTreeSet<String> {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .take(1)
        .collect()
}
