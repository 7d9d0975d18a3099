use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use moka::future::Cache;
use url::Url;

use crate::error::{Error, Result};
use crate::identity::KeyCacheConfig;
use crate::identity::map_reqwest_error;

/// The provider's published signing keys, cached as one set.
///
/// Lookups are answered from the most recent set. Concurrent misses share a
/// single fetch, and a key id absent from the set triggers at most one
/// refetch per `min_refresh_interval`. Failed fetches are not cached.
#[derive(Clone)]
pub(crate) struct RemoteKeys {
    // Keyed by generation; a forced refresh moves to the next one.
    sets: Cache<u64, Arc<KeySet>>,
    generation: Arc<AtomicU64>,
    min_refresh_interval: Duration,
    http_client: reqwest::Client,
    jwks_url: Url,
    timeout: Duration,
}

struct KeySet {
    generation: u64,
    fetched_at: Instant,
    keys: HashMap<String, Arc<DecodingKey>>,
}

impl KeySet {
    fn from_jwks(generation: u64, jwks: &JwkSet) -> Self {
        let mut keys = HashMap::with_capacity(jwks.keys.len());
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                continue;
            };

            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid.to_owned(), Arc::new(key));
                }
                Err(e) => tracing::warn!(kid, "skipping unusable provider key: {e}"),
            }
        }

        Self {
            generation,
            fetched_at: Instant::now(),
            keys,
        }
    }
}

impl RemoteKeys {
    pub fn new(
        http_client: reqwest::Client,
        jwks_url: Url,
        timeout: Duration,
        config: &KeyCacheConfig,
    ) -> Self {
        let sets = Cache::builder()
            .max_capacity(2)
            .time_to_live(config.ttl)
            .build();

        Self {
            sets,
            generation: Arc::new(AtomicU64::new(0)),
            min_refresh_interval: config.min_refresh_interval,
            http_client,
            jwks_url,
            timeout,
        }
    }

    pub async fn get(&self, kid: &str) -> Result<Arc<DecodingKey>> {
        let set = self.load(self.generation.load(Ordering::Acquire)).await?;
        if let Some(key) = set.keys.get(kid) {
            return Ok(key.clone());
        }

        if set.fetched_at.elapsed() >= self.min_refresh_interval {
            let next = set.generation + 1;
            let set = self.load(next).await?;
            self.generation.fetch_max(next, Ordering::AcqRel);

            if let Some(key) = set.keys.get(kid) {
                return Ok(key.clone());
            }
        }

        tracing::warn!(kid, "key id not present in provider key set");
        Err(Error::KeyNotFound {
            kid: kid.to_owned(),
        })
    }

    async fn load(&self, generation: u64) -> Result<Arc<KeySet>> {
        self.sets
            .try_get_with(generation, async {
                let jwks = self.fetch().await?;
                Ok::<_, Error>(Arc::new(KeySet::from_jwks(generation, &jwks)))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    async fn fetch(&self) -> Result<JwkSet> {
        let set: JwkSet = self
            .http_client
            .get(self.jwks_url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!("failed to fetch provider key set: {e}");
                Error::network(e)
            })?
            .json()
            .await
            .map_err(map_reqwest_error)?;

        tracing::debug!(keys = set.keys.len(), "fetched provider key set");
        Ok(set)
    }
}
