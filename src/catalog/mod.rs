//! Catalog loading and shard enumeration
//!
//! A catalog is an ordered list of competition records, either loaded from a
//! previously saved JSON file or fetched live from the sports API (the
//! per-sport category listing, then each category's unique tournaments).
//! The enumerator turns catalog entries into [`Shard`]s in catalog order;
//! that order drives progress logging and checkpoint cadence only, because
//! merging is commutative.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::harvest::Fetcher;
use crate::CountryInfo;

/// Sport slug backfilled for legacy catalog entries that predate multi-sport
/// support and carry no slug of their own.
pub const FALLBACK_SPORT: &str = "football";

/// One competition record in the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Sport slug; absent on legacy entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_alpha2: Option<String>,
    pub tournament_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// One independently fetchable unit of work.
///
/// Immutable once enumerated; only its outputs (the shard result) are
/// persisted. `metadata` carries whatever the domain harvester needs to
/// build its requests and is stored verbatim on the result.
#[derive(Debug, Clone)]
pub struct Shard {
    /// Grouping scope: sport slug for tournaments, `"tv"` for countries
    pub scope: String,
    /// Stable key, unique within the scope
    pub key: String,
    /// Human-readable label for progress logging
    pub label: String,
    /// Opaque request-building data, persisted on the shard result
    pub metadata: Value,
}

/// Enumerate tournament shards from a catalog, filtered to `sports`.
///
/// Entries without a sport slug are backfilled with [`FALLBACK_SPORT`] and
/// kept regardless of the filter. Duplicate tournament ids within a scope
/// keep their first occurrence.
pub fn tournament_shards(catalog: &[CatalogEntry], sports: &[String]) -> Vec<Shard> {
    let requested: BTreeSet<&str> = sports.iter().map(String::as_str).collect();
    let mut seen: BTreeSet<(String, i64)> = BTreeSet::new();
    let mut shards = Vec::new();

    for entry in catalog {
        let scope = match &entry.sport_slug {
            Some(slug) => {
                if !requested.is_empty() && !requested.contains(slug.as_str()) {
                    continue;
                }
                slug.clone()
            }
            // Untagged legacy entry: keep it under the fallback scope
            None => FALLBACK_SPORT.to_string(),
        };

        if !seen.insert((scope.clone(), entry.tournament_id)) {
            debug!(
                scope = %scope,
                tournament_id = entry.tournament_id,
                "dropping duplicate catalog entry"
            );
            continue;
        }

        let label = match (&entry.category_name, &entry.tournament_name) {
            (Some(category), Some(name)) => format!("{category} - {name}"),
            (None, Some(name)) => name.clone(),
            _ => entry.tournament_id.to_string(),
        };

        // Persist the backfilled slug so legacy entries round-trip tagged
        let mut entry = entry.clone();
        entry.sport_slug.get_or_insert_with(|| scope.clone());

        shards.push(Shard {
            scope,
            key: entry.tournament_id.to_string(),
            label,
            metadata: serde_json::to_value(&entry).unwrap_or(Value::Null),
        });
    }

    shards
}

/// Enumerate one shard per valid country under the `"tv"` scope.
///
/// Malformed reference entries (non-alpha-2 codes) are dropped with a
/// warning. Order follows the reference list after ISO code normalization.
pub fn country_shards(countries: &[CountryInfo]) -> Vec<Shard> {
    let mut seen = BTreeSet::new();
    let mut shards = Vec::new();

    for country in countries {
        if !country.is_valid() {
            warn!(iso = %country.iso, "skipping malformed country record");
            continue;
        }
        let iso = country.iso.trim().to_ascii_uppercase();
        if !seen.insert(iso.clone()) {
            continue;
        }
        shards.push(Shard {
            scope: "tv".to_string(),
            key: iso.clone(),
            label: format!("{} ({iso})", country.name),
            metadata: serde_json::to_value(country).unwrap_or(Value::Null),
        });
    }

    shards
}

/// Fetch the competitions catalog for `sports` from the live API.
///
/// Walks `/sport/{slug}/categories`, then each category's unique-tournament
/// listing. Tournaments arrive either inside `groups` or as a top-level
/// `uniqueTournaments` array; both are collected. A sport that fails
/// entirely contributes no entries but does not abort the others.
pub async fn fetch_catalog(fetcher: &Fetcher, sports: &[String]) -> Vec<CatalogEntry> {
    let mut catalog = Vec::new();

    for sport in sports {
        match fetch_sport_catalog(fetcher, sport).await {
            Ok(mut entries) => {
                info!(sport = %sport, entries = entries.len(), "fetched sport catalog");
                catalog.append(&mut entries);
            }
            Err(e) => {
                warn!(sport = %sport, error = %e, "failed to fetch sport catalog");
            }
        }
    }

    catalog
}

async fn fetch_sport_catalog(
    fetcher: &Fetcher,
    sport: &str,
) -> crate::api::ApiResult<Vec<CatalogEntry>> {
    let payload = fetcher.fetch(&format!("/sport/{sport}/categories")).await?;
    let categories = payload
        .get("categories")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut entries = Vec::new();
    for category in &categories {
        let Some(category_id) = category.get("id").and_then(Value::as_i64) else {
            continue;
        };

        let tournaments_payload = match fetcher
            .fetch(&format!("/category/{category_id}/unique-tournaments"))
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!(sport = %sport, category_id, error = %e, "failed to list category tournaments");
                continue;
            }
        };

        for tournament in category_tournaments(&tournaments_payload) {
            let Some(tournament_id) = tournament.get("id").and_then(Value::as_i64) else {
                continue;
            };
            entries.push(CatalogEntry {
                sport_slug: Some(sport.to_string()),
                category_id: Some(category_id),
                category_name: string_field(category, "name"),
                category_slug: string_field(category, "slug"),
                category_alpha2: string_field(category, "alpha2"),
                tournament_id,
                tournament_name: string_field(&tournament, "name"),
                tournament_slug: string_field(&tournament, "slug"),
                priority: tournament.get("priority").and_then(Value::as_i64),
            });
        }
    }

    Ok(entries)
}

/// Tournaments from a category payload: every `groups[].uniqueTournaments`
/// entry, then any top-level `uniqueTournaments` array.
fn category_tournaments(payload: &Value) -> Vec<Value> {
    let mut tournaments = Vec::new();
    if let Some(groups) = payload.get("groups").and_then(Value::as_array) {
        for group in groups {
            if let Some(list) = group.get("uniqueTournaments").and_then(Value::as_array) {
                tournaments.extend(list.iter().cloned());
            }
        }
    }
    if let Some(list) = payload.get("uniqueTournaments").and_then(Value::as_array) {
        tournaments.extend(list.iter().cloned());
    }
    tournaments
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Load a catalog document from disk.
pub fn load_catalog(path: &Path) -> anyhow::Result<Vec<CatalogEntry>> {
    let contents = std::fs::read_to_string(path)?;
    let catalog = serde_json::from_str(&contents)?;
    Ok(catalog)
}

/// Load the country reference list (GeoLite2-style JSON array).
pub fn load_countries(path: &Path) -> anyhow::Result<Vec<CountryInfo>> {
    let contents = std::fs::read_to_string(path)?;
    let countries = serde_json::from_str(&contents)?;
    Ok(countries)
}
