use mcstats_common::{AdvancementsRecord, PlayerProfile, PlayerUuid, StatsRecord};
use mcstats_persist::KeyValueStore;

use crate::api::RemoteApi;
use crate::entity::{AdvancementsCache, EntityCache, PlayerCache, StatsCache, UuidCache};
use crate::error::CacheError;
use crate::kind::{CacheKind, EntityKind, Freshness};

/// What `init()` did for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Local timestamp already matched the server; nothing was written.
    AlreadyFresh,
    /// The kind was refetched; `entries` payloads were written.
    Updated { entries: usize },
}

impl InitOutcome {
    pub fn was_fresh(self) -> bool {
        matches!(self, InitOutcome::AlreadyFresh)
    }
}

/// Result of [`CacheManager::init`], per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// The freshness token every kind was reconciled against.
    pub server_timestamp: String,
    pub uuid: InitOutcome,
    pub stats: InitOutcome,
    pub player: InitOutcome,
    pub advancements: InitOutcome,
}

impl InitReport {
    pub fn outcome(&self, kind: CacheKind) -> InitOutcome {
        match kind {
            CacheKind::Uuid => self.uuid,
            CacheKind::Stats => self.stats,
            CacheKind::Player => self.player,
            CacheKind::Advancements => self.advancements,
        }
    }

    /// True when nothing needed refreshing.
    pub fn all_fresh(&self) -> bool {
        CacheKind::ALL.iter().all(|k| self.outcome(*k).was_fresh())
    }
}

/// Keeps the local store consistent with the remote API using the server's
/// single freshness token, then serves payloads from memory.
///
/// The uuid list is reconciled first because every other kind enumerates it.
pub struct CacheManager<A, S> {
    api: A,
    store: S,
    uuids: UuidCache,
    stats: StatsCache,
    players: PlayerCache,
    advancements: AdvancementsCache,
}

impl<S: KeyValueStore> CacheManager<(), S> {
    /// A manager with no remote side, for reading a synced store.
    pub fn offline(store: S) -> Self {
        Self::new((), store)
    }
}

impl<A: RemoteApi, S: KeyValueStore> CacheManager<A, S> {
    /// Reconcile every kind with the server and load all payloads.
    ///
    /// Performs one request for the freshness token, then refetches only the
    /// kinds whose stored timestamp differs. When everything is fresh this
    /// writes nothing.
    #[tracing::instrument(skip_all)]
    pub async fn init(&mut self) -> Result<InitReport, CacheError> {
        let server_ts = self.api.last_updated().await?;
        tracing::debug!(%server_ts, "freshness token");

        let uuid = if Freshness::check(&self.store, CacheKind::Uuid, &server_ts)?.is_fresh() {
            self.uuids.load(&self.store)?;
            InitOutcome::AlreadyFresh
        } else {
            let entries = self
                .uuids
                .refresh(&self.api, &mut self.store, &server_ts)
                .await?;
            InitOutcome::Updated { entries }
        };

        let stats = reconcile(
            &mut self.stats,
            &self.api,
            &mut self.store,
            self.uuids.uuids(),
            &server_ts,
        )
        .await?;
        let player = reconcile(
            &mut self.players,
            &self.api,
            &mut self.store,
            self.uuids.uuids(),
            &server_ts,
        )
        .await?;
        let advancements = reconcile(
            &mut self.advancements,
            &self.api,
            &mut self.store,
            self.uuids.uuids(),
            &server_ts,
        )
        .await?;

        let report = InitReport {
            server_timestamp: server_ts,
            uuid,
            stats,
            player,
            advancements,
        };
        tracing::info!(
            players = self.uuids.len(),
            up_to_date = report.all_fresh(),
            "cache initialized"
        );
        Ok(report)
    }

    /// Refetch one player's stats, profile and advancements.
    ///
    /// Writes the per-player timestamp keys only; the kind-wide timestamps
    /// still describe the last full refresh.
    #[tracing::instrument(skip_all, fields(%uuid))]
    pub async fn refresh_player(&mut self, uuid: &PlayerUuid) -> Result<(), CacheError> {
        if !self.uuids.contains(uuid) {
            return Err(CacheError::UnknownPlayer(*uuid));
        }
        let server_ts = self.api.last_updated().await?;
        self.stats
            .refresh_one(&self.api, &mut self.store, uuid, &server_ts)
            .await?;
        self.players
            .refresh_one(&self.api, &mut self.store, uuid, &server_ts)
            .await?;
        self.advancements
            .refresh_one(&self.api, &mut self.store, uuid, &server_ts)
            .await?;
        Ok(())
    }
}

impl<A, S: KeyValueStore> CacheManager<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            uuids: UuidCache::new(),
            stats: StatsCache::new(),
            players: PlayerCache::new(),
            advancements: AdvancementsCache::new(),
        }
    }

    /// Freshness of one kind against a given server token, without fetching.
    pub fn freshness(&self, kind: CacheKind, server_ts: &str) -> Result<Freshness, CacheError> {
        Freshness::check(&self.store, kind, server_ts)
    }

    /// Load whatever the store holds without contacting the server.
    pub fn load_offline(&mut self) -> Result<(), CacheError> {
        self.uuids.load(&self.store)?;
        self.stats.load(&self.store, self.uuids.uuids())?;
        self.players.load(&self.store, self.uuids.uuids())?;
        self.advancements.load(&self.store, self.uuids.uuids())?;
        Ok(())
    }

    pub fn uuids(&self) -> &[PlayerUuid] {
        self.uuids.uuids()
    }

    pub fn stats(&self, uuid: &PlayerUuid) -> Option<&StatsRecord> {
        self.stats.get(uuid)
    }

    pub fn player(&self, uuid: &PlayerUuid) -> Option<&PlayerProfile> {
        self.players.get(uuid)
    }

    pub fn advancements(&self, uuid: &PlayerUuid) -> Option<&AdvancementsRecord> {
        self.advancements.get(uuid)
    }

    /// Look a player up by profile name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<PlayerUuid> {
        self.players
            .iter()
            .find(|(_, profile)| profile.name.eq_ignore_ascii_case(name))
            .map(|(uuid, _)| *uuid)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_parts(self) -> (A, S) {
        (self.api, self.store)
    }
}

/// Refresh one kind if its stored timestamp is not the server's, then load it.
async fn reconcile<K: EntityKind, A: RemoteApi, S: KeyValueStore>(
    cache: &mut EntityCache<K>,
    api: &A,
    store: &mut S,
    uuids: &[PlayerUuid],
    server_ts: &str,
) -> Result<InitOutcome, CacheError> {
    let outcome = match Freshness::check(store, K::KIND, server_ts)? {
        Freshness::Fresh => InitOutcome::AlreadyFresh,
        state => {
            tracing::debug!(kind = K::NAME, ?state, "refreshing");
            let entries = cache.refresh_all(api, store, uuids, server_ts).await?;
            InitOutcome::Updated { entries }
        }
    };
    cache.load(store, uuids)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockApi, uuid_n};
    use mcstats_persist::{CountingStore, MemoryStore};

    fn server(ts: &str, players: &[PlayerUuid]) -> MockApi {
        let api = MockApi::new().with("meta/lastupdated", ts);
        let list: Vec<String> = players.iter().map(|u| u.to_string()).collect();
        api.set("uuid", &serde_json::to_string(&list).unwrap());
        for (i, uuid) in players.iter().enumerate() {
            api.set(
                format!("stats/{uuid}"),
                &format!(r#"{{"stats": {{"minecraft:custom": {{"minecraft:jump": {i}}}}}}}"#),
            );
            api.set(format!("player/{uuid}"), &format!(r#"{{"name": "player{i}"}}"#));
            api.set(format!("advancements/{uuid}"), r#"{"DataVersion": 3465}"#);
        }
        api
    }

    fn manager(api: MockApi) -> CacheManager<MockApi, CountingStore<MemoryStore>> {
        CacheManager::new(api, CountingStore::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn first_init_populates_everything() {
        let players = [uuid_n(1), uuid_n(2)];
        let mut cache = manager(server("1000", &players));

        let report = cache.init().await.unwrap();
        assert_eq!(report.server_timestamp, "1000");
        assert_eq!(report.uuid, InitOutcome::Updated { entries: 2 });
        assert_eq!(report.stats, InitOutcome::Updated { entries: 2 });
        assert_eq!(report.player, InitOutcome::Updated { entries: 2 });
        assert_eq!(report.advancements, InitOutcome::Updated { entries: 2 });
        assert!(!report.all_fresh());

        assert_eq!(cache.uuids(), players);
        assert_eq!(cache.player(&players[1]).unwrap().name, "player1");
        assert!(cache.stats(&players[0]).is_some());
        assert!(cache.advancements(&players[0]).is_some());
        assert_eq!(cache.find_by_name("PLAYER0"), Some(players[0]));
        assert!(
            cache
                .freshness(CacheKind::Advancements, "1000")
                .unwrap()
                .is_fresh()
        );
    }

    #[tokio::test]
    async fn second_init_is_one_request_and_no_writes() {
        let players = [uuid_n(1), uuid_n(2), uuid_n(3)];
        let mut cache = manager(server("1000", &players));
        cache.init().await.unwrap();

        cache.api().reset_calls();
        let writes_before = cache.store().write_count();

        let report = cache.init().await.unwrap();
        assert!(report.all_fresh());
        assert_eq!(cache.api().calls(), ["meta/lastupdated"]);
        assert_eq!(cache.store().write_count(), writes_before);
        // Payloads are still served from memory.
        assert_eq!(cache.player(&players[2]).unwrap().name, "player2");
    }

    #[tokio::test]
    async fn server_change_refreshes_every_kind() {
        let players = [uuid_n(1)];
        let mut cache = manager(server("1000", &players));
        cache.init().await.unwrap();

        cache.api().set("meta/lastupdated", "2000");
        cache.api().set(
            format!("stats/{}", players[0]),
            r#"{"stats": {"minecraft:custom": {"minecraft:jump": 99}}}"#,
        );
        let report = cache.init().await.unwrap();
        assert_eq!(report.stats, InitOutcome::Updated { entries: 1 });
        let jump = mcstats_common::StatId::parse("custom/jump").unwrap();
        assert_eq!(cache.stats(&players[0]).unwrap().get(&jump), Some(99));
    }

    #[tokio::test]
    async fn partial_failure_keeps_marker_and_earlier_entries() {
        let players: Vec<_> = (1..=5).map(uuid_n).collect();
        let api = server("1000", &players);
        let mut store = CountingStore::new(MemoryStore::new());
        // Older data for every player from a previous refresh.
        for uuid in &players {
            store.set(&format!("stats:{uuid}"), r#"{"stats": {}}"#).unwrap();
        }
        store.set("meta.lastupdated:stats", "500").unwrap();
        store.reset_writes();

        api.fail(format!("stats/{}", players[2]), 503, "try later");
        let mut cache = CacheManager::new(api, store);

        match cache.init().await {
            Err(CacheError::Api { status, body, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "try later");
            }
            other => panic!("expected API error, got {other:?}"),
        }

        let store = cache.store();
        assert_eq!(
            store.get("meta.lastupdated:stats").unwrap().as_deref(),
            Some("500")
        );
        let jump = r#"{"stats": {"minecraft:custom": {"minecraft:jump": 0}}}"#;
        assert_eq!(
            store.get(&format!("stats:{}", players[0])).unwrap().as_deref(),
            Some(jump)
        );
        for uuid in &players[3..] {
            assert_eq!(
                store.get(&format!("stats:{uuid}")).unwrap().as_deref(),
                Some(r#"{"stats": {}}"#)
            );
            assert!(!store.writes().contains(&format!("stats:{uuid}")));
        }
        // Later kinds were never attempted.
        assert!(store.get("meta.lastupdated:player").unwrap().is_none());
    }

    #[tokio::test]
    async fn retry_after_partial_failure_completes() {
        let players: Vec<_> = (1..=3).map(uuid_n).collect();
        let api = server("1000", &players);
        api.fail(format!("stats/{}", players[1]), 500, "boom");
        let mut cache = manager(api);
        assert!(cache.init().await.is_err());

        cache
            .api()
            .set(format!("stats/{}", players[1]), r#"{"stats": {}}"#);
        let report = cache.init().await.unwrap();
        assert!(report.uuid.was_fresh());
        assert_eq!(report.stats, InitOutcome::Updated { entries: 3 });
    }

    #[tokio::test]
    async fn corrupted_local_entry_fails_loud_even_when_fresh() {
        let players = [uuid_n(1)];
        let mut cache = manager(server("1000", &players));
        cache.init().await.unwrap();

        let (api, mut store) = cache.into_parts();
        store
            .set(&format!("player:{}", players[0]), "{\"nam")
            .unwrap();
        let mut cache = CacheManager::new(api, store);
        match cache.init().await {
            Err(CacheError::Parse { key, .. }) => assert!(key.starts_with("player:")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_player_writes_per_entry_timestamps_only() {
        let players = [uuid_n(1), uuid_n(2)];
        let mut cache = manager(server("1000", &players));
        cache.init().await.unwrap();

        cache.api().set("meta/lastupdated", "1001");
        cache
            .api()
            .set(format!("player/{}", players[0]), r#"{"name": "renamed"}"#);
        cache.refresh_player(&players[0]).await.unwrap();

        assert_eq!(cache.player(&players[0]).unwrap().name, "renamed");
        let store = cache.store();
        assert_eq!(
            store
                .get(&format!("meta.lastupdated:player.{}", players[0]))
                .unwrap()
                .as_deref(),
            Some("1001")
        );
        assert_eq!(
            store.get("meta.lastupdated:player").unwrap().as_deref(),
            Some("1000")
        );
    }

    #[tokio::test]
    async fn refresh_unknown_player_is_rejected() {
        let mut cache = manager(server("1000", &[uuid_n(1)]));
        cache.init().await.unwrap();
        assert!(matches!(
            cache.refresh_player(&uuid_n(9)).await,
            Err(CacheError::UnknownPlayer(_))
        ));
    }

    #[tokio::test]
    async fn load_offline_reads_a_synced_store() {
        let players = [uuid_n(4)];
        let mut cache = manager(server("7", &players));
        cache.init().await.unwrap();
        let (_, store) = cache.into_parts();

        let mut offline = CacheManager::offline(store);
        offline.load_offline().unwrap();
        assert_eq!(offline.uuids(), players);
        assert_eq!(offline.player(&players[0]).unwrap().name, "player0");
    }
}
