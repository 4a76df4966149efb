//! # Sports Data Harvester Library
//!
//! A resumable, rate-limited harvester that pulls large catalogs of sports
//! entities (TV channels, tournaments, teams, seasons) from remote APIs and
//! accumulates them into a durable, deduplicated local dataset.
//!
//! ## Features
//!
//! - **Sharded Harvesting**: Work is split into independent shards (one per
//!   tournament or country) that can be fetched and retried in isolation
//! - **Resume Capability**: The dataset is checkpointed periodically, so an
//!   interrupted run skips already-satisfied shards on the next invocation
//! - **Rate Limiting**: Configurable delay and jitter before every request
//!   and before every shard, to respect upstream API limits
//! - **Retry with Backoff**: Failures carrying a retryable status code are
//!   retried with exponential backoff; everything else fails the shard only
//! - **Deduplicated Merging**: Entities discovered through multiple shards
//!   are merged by stable id, unioning their relationship sets
//!
//! ## Architecture
//!
//! - [`api`] - Typed network boundary (transport trait + HTTP clients)
//! - [`catalog`] - Shard enumeration from a competitions catalog
//! - [`harvest`] - Pacing, retry, and the harvest orchestrator
//! - [`store`] - Resumable dataset, merging, and atomic persistence
//! - [`cli`] - Command implementations
//!
//! ## Data Types
//!
//! - [`Channel`] - A TV channel with monotonically growing country/logo sets
//! - [`Team`] - A tournament participant as reported for one season
//! - [`CountryInfo`] - Reference data for one ISO-3166 country

#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod api;
pub mod catalog;
pub mod cli;
pub mod harvest;
pub mod shutdown;
pub mod store;

/// A TV channel in the merged entity index.
///
/// `id` and `name` are scalar attributes fixed at first discovery. The
/// relationship sets only grow as the same channel is rediscovered through
/// additional country shards. `BTreeSet` keeps serialization deterministic
/// so unchanged datasets stay byte-for-byte identical across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Stable channel id from the upstream API
    pub id: i64,
    /// Channel display name (first-write-wins across shards)
    pub name: String,
    /// ISO-3166 alpha-2 codes of every country this channel airs in
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub countries: BTreeSet<String>,
    /// Logo URLs seen for this channel
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub logos: BTreeSet<String>,
    /// Website URLs seen for this channel
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub websites: BTreeSet<String>,
    /// RFC 3339 timestamp of first discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_discovered: Option<String>,
}

/// A team as reported by the teams endpoint for one tournament season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Stable team id from the upstream API
    pub id: i64,
    /// Team display name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(
        rename = "shortName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Team type as reported upstream (e.g. club vs national side)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<TeamCountry>,
}

/// Country attribution for a [`Team`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamCountry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Reference data for one country, loaded from a GeoLite2-style JSON list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// ISO-3166 alpha-2 code
    #[serde(rename = "country_iso_code")]
    pub iso: String,
    /// English country name
    #[serde(rename = "country_name")]
    pub name: String,
    #[serde(rename = "continent_name", default)]
    pub continent: Option<String>,
    /// GeoLite2 encodes EU membership as 0/1
    #[serde(rename = "is_in_european_union", default)]
    pub is_in_european_union: Option<u8>,
}

impl CountryInfo {
    /// Whether this country is an EU member.
    pub fn is_eu(&self) -> bool {
        self.is_in_european_union == Some(1)
    }

    /// Whether the record looks like a usable ISO-3166 alpha-2 entry.
    pub fn is_valid(&self) -> bool {
        let iso = self.iso.trim();
        iso.len() == 2 && iso.chars().all(|c| c.is_ascii_alphabetic())
    }
}
