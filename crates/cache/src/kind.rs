use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use mcstats_common::{AdvancementsRecord, PlayerProfile, StatsRecord};
use mcstats_persist::{KeyValueStore, keys};

use crate::error::CacheError;

/// A per-player entity kind served by `<NAME>/<uuid>` and stored under
/// `<NAME>:<uuid>`.
pub trait EntityKind {
    const KIND: CacheKind;
    const NAME: &'static str = Self::KIND.name();
    type Payload: DeserializeOwned + Serialize + Clone + fmt::Debug;
}

/// `stats/<uuid>`
#[derive(Debug, Clone, Copy)]
pub struct Stats;

impl EntityKind for Stats {
    const KIND: CacheKind = CacheKind::Stats;
    type Payload = StatsRecord;
}

/// `player/<uuid>`
#[derive(Debug, Clone, Copy)]
pub struct Player;

impl EntityKind for Player {
    const KIND: CacheKind = CacheKind::Player;
    type Payload = PlayerProfile;
}

/// `advancements/<uuid>`
#[derive(Debug, Clone, Copy)]
pub struct Advancements;

impl EntityKind for Advancements {
    const KIND: CacheKind = CacheKind::Advancements;
    type Payload = AdvancementsRecord;
}

/// Every cache kind, including the uuid list itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Uuid,
    Stats,
    Player,
    Advancements,
}

impl CacheKind {
    pub const ALL: [CacheKind; 4] = [
        CacheKind::Uuid,
        CacheKind::Stats,
        CacheKind::Player,
        CacheKind::Advancements,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            CacheKind::Uuid => "uuid",
            CacheKind::Stats => "stats",
            CacheKind::Player => "player",
            CacheKind::Advancements => "advancements",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a kind stands relative to the server's freshness token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No local timestamp recorded.
    Unknown,
    /// Local timestamp differs from the server's.
    Stale { local: String },
    /// Local timestamp equals the server's.
    Fresh,
}

impl Freshness {
    /// Compare the stored `meta.lastupdated:<kind>` against `server`.
    pub fn check<S: KeyValueStore>(
        store: &S,
        kind: CacheKind,
        server: &str,
    ) -> Result<Self, CacheError> {
        Ok(match store.get(&keys::last_updated(kind.name()))? {
            None => Freshness::Unknown,
            Some(local) if local == server => Freshness::Fresh,
            Some(local) => Freshness::Stale { local },
        })
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcstats_persist::MemoryStore;

    #[test]
    fn freshness_states() {
        let mut store = MemoryStore::new();
        assert_eq!(
            Freshness::check(&store, CacheKind::Stats, "100").unwrap(),
            Freshness::Unknown
        );

        store.set("meta.lastupdated:stats", "99").unwrap();
        assert_eq!(
            Freshness::check(&store, CacheKind::Stats, "100").unwrap(),
            Freshness::Stale { local: "99".into() }
        );

        store.set("meta.lastupdated:stats", "100").unwrap();
        assert!(Freshness::check(&store, CacheKind::Stats, "100")
            .unwrap()
            .is_fresh());
        // Other kinds are tracked independently.
        assert_eq!(
            Freshness::check(&store, CacheKind::Player, "100").unwrap(),
            Freshness::Unknown
        );
    }

    #[test]
    fn kind_names_match_endpoints() {
        let names: Vec<_> = CacheKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["uuid", "stats", "player", "advancements"]);
    }
}
