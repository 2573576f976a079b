use mcstats_common::{IdError, PlayerUuid};
use mcstats_persist::StoreError;

/// Errors from cache refresh and load operations.
///
/// None of these are retried by the cache; they propagate to whoever called
/// `init()` or `refresh_player()`.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The remote API answered with something other than 200.
    #[error("API error {status} from {endpoint}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// A cached or remote payload failed to decode.
    #[error("failed to parse {key}: {message}")]
    Parse { key: String, message: String },
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerUuid),
}

impl CacheError {
    pub(crate) fn parse(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

impl From<IdError> for CacheError {
    fn from(e: IdError) -> Self {
        Self::parse("uuid", e)
    }
}
