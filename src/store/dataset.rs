//! The resumable dataset and its satisfaction rules

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{Channel, Team};

/// Version tag written into every persisted dataset. Bump when the shard
/// result shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything one harvest run reads at startup and writes at checkpoints.
///
/// Shard results are grouped by scope (sport slug for teams, `"tv"` for
/// channels) and keyed by the shard key within the scope. `BTreeMap` keeps
/// the persisted form deterministic, so a run that fetches nothing new
/// rewrites the file byte-for-byte identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub scopes: BTreeMap<String, BTreeMap<String, ShardResult>>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            scopes: BTreeMap::new(),
        }
    }

    /// Result previously recorded for a shard, if any.
    pub fn get(&self, scope: &str, key: &str) -> Option<&ShardResult> {
        self.scopes.get(scope)?.get(key)
    }

    /// Record a shard result, replacing any earlier one for the same key.
    pub fn insert(&mut self, scope: &str, key: &str, result: ShardResult) {
        self.scopes
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), result);
    }

    /// Whether this shard can be skipped on resume.
    ///
    /// A shard is satisfied only when at least one of its sub-results holds
    /// non-empty entity data. Error-only results and results with empty
    /// entity lists are re-fetched on the next run.
    pub fn is_satisfied(&self, scope: &str, key: &str) -> bool {
        self.get(scope, key).is_some_and(ShardResult::is_satisfied)
    }

    /// Total number of recorded shard results across all scopes.
    pub fn shard_count(&self) -> usize {
        self.scopes.values().map(BTreeMap::len).sum()
    }
}

/// Outcome of harvesting one shard, errors included.
///
/// Failed sub-calls are recorded in place rather than dropped, so a resumed
/// run can tell "fetched and empty" apart from "never fetched".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardResult {
    /// Shard metadata captured at enumeration time (name, category, ...)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
    /// Season descriptors, for shards with per-season sub-shards
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<Value>,
    /// One entry per attempted sub-call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<SubResult>,
    /// League-level dump sections keyed by section name, for dump shards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<BTreeMap<String, Value>>,
    /// Shard-level failure (e.g. the season listing itself failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShardResult {
    /// Shard result carrying only a shard-level error.
    pub fn failed(metadata: Value, error: String) -> Self {
        Self {
            metadata,
            seasons: Vec::new(),
            results: Vec::new(),
            league: None,
            error: Some(error),
        }
    }

    /// Whether the result holds at least one non-empty entity list.
    pub fn is_satisfied(&self) -> bool {
        self.results.iter().any(SubResult::has_entities)
    }
}

/// Outcome of one sub-call within a shard: the teams of one season, or the
/// channels of one country.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubResult {
    #[serde(rename = "seasonId", default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    /// Season descriptor this sub-result belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<Team>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    /// Season dump sections keyed by section name, for dump shards.
    /// Sections are raw payloads, not entities, so they never mark a shard
    /// satisfied; dumps are re-fetched every run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubResult {
    /// Whether this sub-result carries non-empty entity data.
    pub fn has_entities(&self) -> bool {
        self.teams.as_ref().is_some_and(|t| !t.is_empty())
            || self.channels.as_ref().is_some_and(|c| !c.is_empty())
    }
}
