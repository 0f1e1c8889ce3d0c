//! Remote JWKS endpoint with caching

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::key_set::{JwksKeySet, KeySetSource};
use crate::domain::DomainError;

/// Default time a fetched key set stays cached
pub const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Minimum time between forced refreshes triggered by unknown `kid`s
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Key set fetched from the identity provider's JWKS endpoint
#[derive(Debug)]
pub struct RemoteKeySet {
    client: reqwest::Client,
    url: String,
    cache: Cache<String, Arc<JwksKeySet>>,
    min_refresh_interval: Duration,
    last_refresh: Mutex<Option<Instant>>,
}

impl RemoteKeySet {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            last_refresh: Mutex::new(None),
        })
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    async fn fetch(&self) -> Result<Arc<JwksKeySet>, DomainError> {
        debug!(url = %self.url, "Fetching JWKS");

        let set: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| DomainError::unavailable(format!("Failed to fetch JWKS: {}", e)))?
            .json()
            .await
            .map_err(|e| DomainError::unavailable(format!("Invalid JWKS response: {}", e)))?;

        let keys = JwksKeySet::from_jwk_set(&set)?;
        info!(url = %self.url, keys = keys.len(), "Loaded identity provider signing keys");

        Ok(Arc::new(keys))
    }
}

#[async_trait]
impl KeySetSource for RemoteKeySet {
    async fn current(&self) -> Result<Arc<JwksKeySet>, DomainError> {
        self.cache
            .try_get_with(self.url.clone(), self.fetch())
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))
    }

    async fn refresh(&self) -> Result<Arc<JwksKeySet>, DomainError> {
        {
            let mut last = self.last_refresh.lock().await;

            if last.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
                return self.current().await;
            }

            *last = Some(Instant::now());
        }

        self.cache.invalidate(&self.url).await;
        self.current().await
    }
}
