//! Shared data model: player ids, namespaced stat ids, and the payload
//! records served by the stats API.
//!
//! # Invariants
//! - `PlayerUuid` always formats as lowercase hyphenated, so store keys are stable.
//! - Payload records deserialize from the server's JSON without loss.

mod records;
mod types;

pub use records::{AdvancementProgress, AdvancementsRecord, PlayerProfile, StatsRecord};
pub use types::{DEFAULT_NAMESPACE, IdError, PlayerUuid, StatId};

pub fn crate_info() -> &'static str {
    "mcstats-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
