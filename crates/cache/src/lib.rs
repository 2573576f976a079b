//! Cache Manager: keeps locally stored stats, player profiles and
//! advancements consistent with the remote stats API.
//!
//! # Invariants
//! - One shared freshness token (`meta/lastupdated`) decides whether a kind is refetched.
//! - The uuid list is reconciled before any per-player kind.
//! - A kind's `meta.lastupdated` key advances only after every player in the batch succeeded.
//! - Malformed or missing payloads for known players are errors, never defaults.
//! - Requests run one at a time per kind; nothing is retried.

mod api;
mod entity;
mod error;
mod kind;
mod manager;
#[cfg(test)]
mod testing;

pub use api::{ApiConfig, HttpApi, RemoteApi, endpoints};
pub use entity::{AdvancementsCache, EntityCache, PlayerCache, StatsCache, UuidCache};
pub use error::CacheError;
pub use kind::{Advancements, CacheKind, EntityKind, Freshness, Player, Stats};
pub use manager::{CacheManager, InitOutcome, InitReport};

pub fn crate_info() -> &'static str {
    "mcstats-cache v0.1.0"
}
