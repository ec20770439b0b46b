use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use reqwest::header::CACHE_CONTROL;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::VerifyError;

pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Minimum gap between refetches triggered by a `kid` missing from a fresh set.
const REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, VerifyError>;
}

/// Fixed key set, for tests and emulator setups.
pub struct StaticKeyProvider {
    keys: JwkSet,
}

impl StaticKeyProvider {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, VerifyError> {
        Ok(self.keys.find(kid).cloned())
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Google's published signing keys, cached for as long as the response's
/// `Cache-Control: max-age` allows.
pub struct GoogleKeyProvider {
    http: reqwest::Client,
    url: String,
    refresh_cooldown: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleKeyProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, GOOGLE_JWKS_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            refresh_cooldown: REFRESH_COOLDOWN,
            cache: RwLock::new(None),
        }
    }

    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    async fn refresh(&self) -> Result<JwkSet, VerifyError> {
        let res = self.http.get(&self.url).send().await?.error_for_status()?;
        let max_age = res
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_MAX_AGE);
        let keys: JwkSet = res.json().await?;
        info!(count = keys.keys.len(), max_age_secs = max_age.as_secs(), "firebase public keys fetched");

        let now = Instant::now();
        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: now,
            expires_at: now + max_age,
        });
        Ok(keys)
    }
}

#[async_trait]
impl KeyProvider for GoogleKeyProvider {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return Ok(Some(jwk.clone()));
                    }
                    if cached.fetched_at.elapsed() < self.refresh_cooldown {
                        debug!(kid, "kid not in cached key set, refresh on cooldown");
                        return Ok(None);
                    }
                    debug!(kid, "kid not in cached key set, refreshing");
                }
            }
        }

        let keys = self.refresh().await?;
        Ok(keys.find(kid).cloned())
    }
}

fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
