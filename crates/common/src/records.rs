use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{PlayerUuid, StatId};

/// Per-player statistics, laid out like the server's `stats/<uuid>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(default)]
    pub stats: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(rename = "DataVersion", default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<u32>,
}

impl StatsRecord {
    /// Value of a single statistic, if the player has recorded it.
    pub fn get(&self, id: &StatId) -> Option<i64> {
        self.stats.get(&id.category)?.get(&id.name).copied()
    }

    /// Value of a statistic, treating "never recorded" as zero.
    pub fn get_or_zero(&self, id: &StatId) -> i64 {
        self.get(id).unwrap_or(0)
    }

    /// Sum of every entry in a category (e.g. total blocks mined).
    pub fn category_total(&self, category: &str) -> i64 {
        self.stats
            .get(category)
            .map(|entries| entries.values().sum())
            .unwrap_or(0)
    }

    /// Iterate all statistics as `(id, value)` pairs in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (StatId, i64)> + '_ {
        self.stats.iter().flat_map(|(category, entries)| {
            entries.iter().map(move |(name, value)| {
                (
                    StatId {
                        category: category.clone(),
                        name: name.clone(),
                    },
                    *value,
                )
            })
        })
    }
}

/// Progress on one advancement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancementProgress {
    /// Criterion name to the timestamp it was completed at.
    #[serde(default)]
    pub criteria: BTreeMap<String, String>,
    #[serde(default)]
    pub done: bool,
}

/// Per-player advancement progress, laid out like `advancements/<uuid>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancementsRecord {
    #[serde(rename = "DataVersion", default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<u32>,
    #[serde(flatten)]
    pub progress: BTreeMap<String, AdvancementProgress>,
}

impl AdvancementsRecord {
    pub fn is_done(&self, id: &str) -> bool {
        self.progress.get(id).is_some_and(|p| p.done)
    }

    /// Completed advancements, excluding recipe unlocks.
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.progress
            .iter()
            .filter(|(id, p)| p.done && !id.contains(":recipes/"))
            .map(|(id, _)| id.as_str())
    }

    pub fn completed_count(&self) -> usize {
        self.completed().count()
    }
}

/// Player profile as served by the `player/<uuid>` endpoint.
///
/// Only `name` is required; anything else the server sends is retained in
/// `extra` so a round trip through the local store is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlayerUuid>,
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
