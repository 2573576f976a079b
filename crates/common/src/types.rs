use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace applied to stat and advancement ids that omit one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Errors from parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("invalid player uuid {0:?}")]
    InvalidUuid(String),
    #[error("invalid stat id {0:?}: expected `category:name` or `category/name`")]
    InvalidStatId(String),
}

/// Minecraft player identifier. Used as the cache key for every entity kind.
///
/// Always rendered in the lowercase hyphenated form, so store keys stay
/// stable regardless of how the server spelled the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerUuid(pub Uuid);

impl PlayerUuid {
    pub fn parse(s: &str) -> Result<Self, IdError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| IdError::InvalidUuid(s.to_string()))
    }
}

impl fmt::Display for PlayerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PlayerUuid {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlayerUuid {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlayerUuid> for String {
    fn from(value: PlayerUuid) -> Self {
        value.to_string()
    }
}

/// A namespaced statistic: a category (`minecraft:custom`) and an entry
/// within it (`minecraft:play_time`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatId {
    pub category: String,
    pub name: String,
}

impl StatId {
    pub fn new(category: &str, name: &str) -> Self {
        Self {
            category: namespaced(category),
            name: namespaced(name),
        }
    }

    /// Parse `category/name`, `category:name`, or the fully namespaced
    /// `ns:category/ns:name`.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let s = s.trim();
        let (category, name) = match s.split_once('/') {
            Some(parts) => parts,
            None => s
                .split_once(':')
                .ok_or_else(|| IdError::InvalidStatId(s.to_string()))?,
        };
        if category.is_empty() || name.is_empty() || name.contains('/') {
            return Err(IdError::InvalidStatId(s.to_string()));
        }
        Ok(Self::new(category, name))
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

impl FromStr for StatId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn namespaced(id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("{DEFAULT_NAMESPACE}:{id}")
    }
}
