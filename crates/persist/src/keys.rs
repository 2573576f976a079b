//! Key layout shared by every cache kind.
//!
//! ```text
//! uuid                               JSON array of known player uuids
//! meta.lastupdated:uuid              server timestamp the uuid list matches
//! <kind>:<uuid>                      raw JSON payload for one player
//! meta.lastupdated:<kind>            server timestamp the whole kind matches
//! meta.lastupdated:<kind>.<uuid>     server timestamp one player's entry matches
//! ```

use std::fmt::Display;

/// Key holding the JSON array of player uuids.
pub const UUID_LIST: &str = "uuid";

const LAST_UPDATED_PREFIX: &str = "meta.lastupdated:";

/// `<kind>:<uuid>`
pub fn entry(kind: &str, uuid: impl Display) -> String {
    format!("{kind}:{uuid}")
}

/// `meta.lastupdated:<kind>`
pub fn last_updated(kind: &str) -> String {
    format!("{LAST_UPDATED_PREFIX}{kind}")
}

/// `meta.lastupdated:<kind>.<uuid>`
pub fn last_updated_entry(kind: &str, uuid: impl Display) -> String {
    format!("{LAST_UPDATED_PREFIX}{kind}.{uuid}")
}
