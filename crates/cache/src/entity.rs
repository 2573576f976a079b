use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use mcstats_common::PlayerUuid;
use mcstats_persist::{KeyValueStore, keys};

use crate::api::{RemoteApi, endpoints};
use crate::error::CacheError;
use crate::kind::{CacheKind, EntityKind};

/// The set of known player uuids, itself cached under the `uuid` key.
#[derive(Debug, Clone, Default)]
pub struct UuidCache {
    uuids: Vec<PlayerUuid>,
}

impl UuidCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the uuid list and persist it, drop entries of players no longer
    /// listed, then write the list's timestamp.
    pub async fn refresh<A: RemoteApi, S: KeyValueStore>(
        &mut self,
        api: &A,
        store: &mut S,
        server_ts: &str,
    ) -> Result<usize, CacheError> {
        let uuids = api.uuids().await?;
        let json = serde_json::to_string(&uuids).map_err(|e| CacheError::parse(keys::UUID_LIST, e))?;
        store.set(keys::UUID_LIST, &json)?;
        let pruned = prune_departed(store, &uuids)?;
        store.set(&keys::last_updated(CacheKind::Uuid.name()), server_ts)?;
        tracing::debug!(count = uuids.len(), pruned, "uuid list refreshed");
        self.uuids = uuids;
        Ok(self.uuids.len())
    }

    /// Load the persisted uuid list. An absent list is an empty server; a
    /// malformed one is an error.
    pub fn load<S: KeyValueStore>(&mut self, store: &S) -> Result<(), CacheError> {
        self.uuids = match store.get(keys::UUID_LIST)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::parse(keys::UUID_LIST, e))?
            }
            None => Vec::new(),
        };
        Ok(())
    }

    pub fn uuids(&self) -> &[PlayerUuid] {
        &self.uuids
    }

    pub fn contains(&self, uuid: &PlayerUuid) -> bool {
        self.uuids.contains(uuid)
    }

    pub fn len(&self) -> usize {
        self.uuids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uuids.is_empty()
    }
}

/// Remove the payloads and per-entry timestamps of every player not in
/// `uuids`. Kind-wide timestamps are kept.
fn prune_departed<S: KeyValueStore>(
    store: &mut S,
    uuids: &[PlayerUuid],
) -> Result<usize, CacheError> {
    let listed: BTreeSet<String> = uuids.iter().map(PlayerUuid::to_string).collect();
    let mut removed = 0;
    for kind in CacheKind::ALL.into_iter().filter(|k| *k != CacheKind::Uuid) {
        for prefix in [
            keys::entry(kind.name(), ""),
            keys::last_updated_entry(kind.name(), ""),
        ] {
            for key in store.keys_with_prefix(&prefix) {
                if !listed.contains(&key[prefix.len()..]) {
                    store.remove(&key)?;
                    removed += 1;
                }
            }
        }
    }
    Ok(removed)
}

/// In-memory view of one entity kind, keyed by player uuid.
#[derive(Debug, Clone)]
pub struct EntityCache<K: EntityKind> {
    entries: BTreeMap<PlayerUuid, K::Payload>,
    _kind: PhantomData<K>,
}

pub type StatsCache = EntityCache<crate::kind::Stats>;
pub type PlayerCache = EntityCache<crate::kind::Player>;
pub type AdvancementsCache = EntityCache<crate::kind::Advancements>;

impl<K: EntityKind> Default for EntityCache<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            _kind: PhantomData,
        }
    }
}

impl<K: EntityKind> EntityCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and persist the payload of every uuid, one request at a time.
    ///
    /// The kind's `meta.lastupdated` key is written only after every fetch
    /// succeeded. On failure, entries already written stay written and later
    /// ones are left untouched.
    pub async fn refresh_all<A: RemoteApi, S: KeyValueStore>(
        &mut self,
        api: &A,
        store: &mut S,
        uuids: &[PlayerUuid],
        server_ts: &str,
    ) -> Result<usize, CacheError> {
        for (i, uuid) in uuids.iter().enumerate() {
            tracing::trace!(kind = K::NAME, %uuid, index = i, total = uuids.len(), "fetching");
            self.refresh_one(api, store, uuid, server_ts).await?;
        }
        store.set(&keys::last_updated(K::NAME), server_ts)?;
        tracing::debug!(kind = K::NAME, count = uuids.len(), "kind refreshed");
        Ok(uuids.len())
    }

    /// Fetch and persist one uuid's payload with its per-entry timestamp.
    ///
    /// The body is decoded before anything is written, so a malformed
    /// response never reaches the store.
    pub async fn refresh_one<A: RemoteApi, S: KeyValueStore>(
        &mut self,
        api: &A,
        store: &mut S,
        uuid: &PlayerUuid,
        server_ts: &str,
    ) -> Result<(), CacheError> {
        let endpoint = endpoints::entity(K::NAME, uuid);
        let body = api.get(&endpoint).await?;
        let payload: K::Payload =
            serde_json::from_str(&body).map_err(|e| CacheError::parse(endpoint, e))?;
        store.set(&keys::entry(K::NAME, uuid), &body)?;
        store.set(&keys::last_updated_entry(K::NAME, uuid), server_ts)?;
        self.entries.insert(*uuid, payload);
        Ok(())
    }

    /// Replace the in-memory map with the persisted payload of every uuid.
    ///
    /// A missing or undecodable entry for a known uuid is an error; it is
    /// never papered over with a default payload.
    pub fn load<S: KeyValueStore>(
        &mut self,
        store: &S,
        uuids: &[PlayerUuid],
    ) -> Result<(), CacheError> {
        let mut entries = BTreeMap::new();
        for uuid in uuids {
            let key = keys::entry(K::NAME, uuid);
            let json = store
                .get(&key)?
                .ok_or_else(|| CacheError::parse(key.clone(), "no cached entry"))?;
            let payload: K::Payload =
                serde_json::from_str(&json).map_err(|e| CacheError::parse(key, e))?;
            entries.insert(*uuid, payload);
        }
        self.entries = entries;
        Ok(())
    }

    pub fn get(&self, uuid: &PlayerUuid) -> Option<&K::Payload> {
        self.entries.get(uuid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerUuid, &K::Payload)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
