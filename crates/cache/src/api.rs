use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use mcstats_common::PlayerUuid;

use crate::error::CacheError;

/// Endpoint paths, relative to the API base url.
pub mod endpoints {
    use mcstats_common::PlayerUuid;

    /// Global freshness token: a single timestamp string.
    pub const LAST_UPDATED: &str = "meta/lastupdated";
    /// JSON array of every known player uuid.
    pub const UUIDS: &str = "uuid";

    /// `<kind>/<uuid>`
    pub fn entity(kind: &str, uuid: &PlayerUuid) -> String {
        format!("{kind}/{uuid}")
    }
}

/// The remote stats API. Every endpoint returns a plain-text or JSON body.
///
/// Implementations must map any status other than 200 to
/// [`CacheError::Api`] carrying the response body.
#[allow(async_fn_in_trait)]
pub trait RemoteApi {
    async fn get(&self, endpoint: &str) -> Result<String, CacheError>;

    async fn last_updated(&self) -> Result<String, CacheError> {
        Ok(self.get(endpoints::LAST_UPDATED).await?.trim().to_string())
    }

    async fn uuids(&self) -> Result<Vec<PlayerUuid>, CacheError> {
        let body = self.get(endpoints::UUIDS).await?;
        serde_json::from_str(&body).map_err(|e| CacheError::parse(endpoints::UUIDS, e))
    }
}

/// Connection settings for [`HttpApi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base url every endpoint is resolved against.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".into(),
            timeout_secs: 20,
            user_agent: concat!("mcstats/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| CacheError::parse(path.display().to_string(), e))
    }

    /// Base url with a guaranteed trailing slash, so `join` appends rather
    /// than replacing the last path segment.
    pub fn base(&self) -> Result<url::Url, CacheError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(url::Url::parse(&base)?)
    }
}

/// [`RemoteApi`] over HTTP.
pub struct HttpApi {
    client: reqwest::Client,
    base: url::Url,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self, CacheError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base: config.base()?,
        })
    }

    pub fn base(&self) -> &url::Url {
        &self.base
    }
}

impl RemoteApi for HttpApi {
    async fn get(&self, endpoint: &str) -> Result<String, CacheError> {
        let url = self.base.join(endpoint)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            tracing::warn!(endpoint, status = status.as_u16(), "API request failed");
            return Err(CacheError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single HTTP request with `status_line` and `body`; returns
    /// the base url to reach it.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/api")
    }

    async fn get_from(status_line: &'static str, body: &'static str) -> Result<String, CacheError> {
        let base = serve_once(status_line, body).await;
        let api = HttpApi::new(&ApiConfig::with_base_url(base)).unwrap();
        api.get(endpoints::LAST_UPDATED).await
    }

    #[tokio::test]
    async fn http_200_returns_body() {
        assert_eq!(get_from("200 OK", "1700000000").await.unwrap(), "1700000000");
    }

    #[tokio::test]
    async fn http_error_status_carries_raw_body() {
        match get_from("503 Service Unavailable", "x").await {
            Err(CacheError::Api {
                endpoint,
                status,
                body,
            }) => {
                assert_eq!(endpoint, "meta/lastupdated");
                assert_eq!(status, 503);
                assert_eq!(body, "x");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_success_codes_are_not_ok() {
        for status_line in ["202 Accepted", "304 Not Modified"] {
            match get_from(status_line, "").await {
                Err(CacheError::Api { status, .. }) => assert_ne!(status, 200),
                other => panic!("{status_line}: expected API error, got {other:?}"),
            }
        }
    }

    #[test]
    fn base_gets_trailing_slash() {
        let config = ApiConfig::with_base_url("https://example.net/api");
        let base = config.base().unwrap();
        assert_eq!(base.as_str(), "https://example.net/api/");
        assert_eq!(
            base.join(endpoints::LAST_UPDATED).unwrap().as_str(),
            "https://example.net/api/meta/lastupdated"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let config = ApiConfig::with_base_url("not a url");
        assert!(matches!(config.base(), Err(CacheError::Url(_))));
    }

    #[test]
    fn config_load_fills_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{"base_url": "https://stats.example.net/"}"#).unwrap();
        let config = ApiConfig::load(tmp.path()).unwrap();
        assert_eq!(config.base_url, "https://stats.example.net/");
        assert_eq!(config.timeout_secs, ApiConfig::default().timeout_secs);
    }

    #[test]
    fn entity_endpoint_shape() {
        let uuid = PlayerUuid::parse("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();
        assert_eq!(
            endpoints::entity("stats", &uuid),
            "stats/069a79f4-44e9-4726-a5be-fca90e38aaf5"
        );
    }
}
