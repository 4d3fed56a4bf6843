use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::token::AuthHeaders;

/// Cached headers together with the expiry they were derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub headers: AuthHeaders,
    pub expires_at: i64, // UNIX timestamp
}

impl CacheEntry {
    pub fn new(headers: AuthHeaders, expires_at: i64) -> Self {
        Self { headers, expires_at }
    }

    /// Renewal is due once `now` reaches `expires_at - safety_margin_seconds`.
    pub fn refresh_at(&self, safety_margin_seconds: u64) -> i64 {
        self.expires_at
            .saturating_sub(i64::try_from(safety_margin_seconds).unwrap_or(i64::MAX))
    }

    pub fn is_fresh_at(&self, now: i64, safety_margin_seconds: u64) -> bool {
        now < self.refresh_at(safety_margin_seconds)
    }
}

/// Single-identity token cache. Headers and expiry are published together.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<Option<CacheEntry>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached entry
    pub async fn set(&self, entry: CacheEntry) {
        *self.inner.write().await = Some(entry);
    }

    /// Headers if an entry exists and is still outside the safety margin
    pub async fn get_fresh(&self, now: i64, safety_margin_seconds: u64) -> Option<AuthHeaders> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh_at(now, safety_margin_seconds))
            .map(|entry| entry.headers.clone())
    }

    pub async fn entry(&self) -> Option<CacheEntry> {
        self.inner.read().await.clone()
    }
}
