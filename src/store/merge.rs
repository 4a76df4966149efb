//! Entity merging
//!
//! The same channel is discovered again and again as country shards are
//! harvested. Merging is first-write-wins for scalar attributes and a set
//! union for relationship fields, which makes it insensitive to shard order
//! and safe to apply repeatedly.

use std::collections::BTreeMap;

use crate::store::Dataset;
use crate::Channel;

/// Merge one observation of a channel into the index.
///
/// A new id inserts the observation as-is. An existing entry keeps its
/// scalars (`name`, `first_discovered`) and unions the incoming relationship
/// sets into its own, so the sets only ever grow.
pub fn merge_channel(index: &mut BTreeMap<i64, Channel>, incoming: Channel) {
    match index.get_mut(&incoming.id) {
        Some(existing) => {
            existing.countries.extend(incoming.countries);
            existing.logos.extend(incoming.logos);
            existing.websites.extend(incoming.websites);
        }
        None => {
            index.insert(incoming.id, incoming);
        }
    }
}

/// Build the merged channel index from every channel sub-result in the
/// dataset, in scope and shard key order.
pub fn collect_channels(dataset: &Dataset) -> BTreeMap<i64, Channel> {
    let mut index = BTreeMap::new();
    for shards in dataset.scopes.values() {
        for result in shards.values() {
            for sub in &result.results {
                if let Some(channels) = &sub.channels {
                    for channel in channels {
                        merge_channel(&mut index, channel.clone());
                    }
                }
            }
        }
    }
    index
}
