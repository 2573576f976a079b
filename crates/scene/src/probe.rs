use std::collections::HashMap;
use std::time::Duration;

use crate::element::{BlockElement, ProbeTicket, RenderInstruction};
use crate::error::SceneError;

/// Checks whether a texture URL can be loaded.
#[allow(async_fn_in_trait)]
pub trait TextureProbe {
    /// `false` for anything that is not a successful response, including
    /// transport errors.
    async fn exists(&self, url: &str) -> bool;
}

/// Probes with an HTTP `HEAD` request.
#[derive(Debug, Clone)]
pub struct HttpTextureProbe {
    client: reqwest::Client,
}

impl HttpTextureProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, SceneError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }
}

impl TextureProbe for HttpTextureProbe {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                tracing::debug!(url, status = resp.status().as_u16(), "texture probe");
                ok
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "texture probe failed");
                false
            }
        }
    }
}

/// Remembers probe results per URL so each texture is checked once.
#[derive(Debug, Default)]
pub struct ProbeCache {
    results: HashMap<String, bool>,
}

impl ProbeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<bool> {
        self.results.get(url).copied()
    }

    pub async fn exists<P: TextureProbe>(&mut self, probe: &P, url: &str) -> bool {
        if let Some(known) = self.get(url) {
            return known;
        }
        let found = probe.exists(url).await;
        self.results.insert(url.to_string(), found);
        found
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

/// Probe every ticket in order and apply the results to `element`.
/// Returns the resulting face updates.
pub async fn resolve_tickets<P: TextureProbe>(
    element: &mut BlockElement,
    tickets: &[ProbeTicket],
    probe: &P,
    cache: &mut ProbeCache,
) -> Vec<RenderInstruction> {
    let mut out = Vec::new();
    for ticket in tickets {
        let exists = cache.exists(probe, &ticket.url).await;
        out.extend(element.resolve_probe(ticket, exists));
    }
    out
}
