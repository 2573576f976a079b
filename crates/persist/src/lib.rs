//! Persistence: the local key-value store the caches write through.
//!
//! # Invariants
//! - Keys are flat strings; values are opaque strings (JSON payloads or timestamps).
//! - The file store writes every mutation through, so partial refreshes survive restarts.
//! - No locking: two writers over one store race (single user, single process).

pub mod keys;
mod memory;
mod store;

pub use memory::{CountingStore, MemoryStore};
pub use store::{FileStore, KeyValueStore, StoreError};

pub fn crate_info() -> &'static str {
    "mcstats-persist v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("persist"));
    }
}
