//! Per-client submission limit.
//!
//! Clients are keyed by a short SHA-256 prefix of their address; the raw
//! address is never stored. State lives behind [`RateLimitStore`] so a shared
//! TTL store can stand in for the in-process map.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use folio_shared::rate_window::{AttemptWindow, SERVER_WINDOW};
use sha2::{Digest, Sha256};

const CLIENT_KEY_CHARS: usize = 16;

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Purge stale attempts, then admit and record `now_ms` if `key` still has
    /// room in `window`.
    async fn check_and_record(&self, key: &str, now_ms: i64, window: AttemptWindow) -> bool;
}

/// Process-lifetime store. Concurrent callers may briefly over- or
/// under-count; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    attempts: DashMap<String, Vec<i64>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_record(&self, key: &str, now_ms: i64, window: AttemptWindow) -> bool {
        self.attempts.retain(|_, stamps| {
            window.prune(stamps, now_ms);
            !stamps.is_empty()
        });
        let mut stamps = self.attempts.entry(key.to_string()).or_default();
        window.check_and_record(&mut stamps, now_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Admitted,
    Denied { retry_after_secs: u64 },
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    window: AttemptWindow,
}

impl RateLimiter {
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryRateLimitStore::new()), SERVER_WINDOW)
    }

    pub fn with_store(store: Arc<dyn RateLimitStore>, window: AttemptWindow) -> Self {
        Self { store, window }
    }

    pub async fn check(&self, client_ip: &str) -> RateDecision {
        self.check_at(client_ip, chrono::Utc::now().timestamp_millis())
            .await
    }

    pub async fn check_at(&self, client_ip: &str, now_ms: i64) -> RateDecision {
        let key = client_key(client_ip);
        if self.store.check_and_record(&key, now_ms, self.window).await {
            RateDecision::Admitted
        } else {
            // Full window, not the time until the oldest attempt expires.
            let retry_after_secs = u64::try_from(self.window.window_ms / 1000).unwrap_or_default();
            tracing::warn!("submission rate limit hit for client {key}");
            RateDecision::Denied { retry_after_secs }
        }
    }
}

/// First 16 hex chars of SHA-256(ip). An unknown address hashes the empty
/// string, so all such callers share one bucket.
pub fn client_key(client_ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_ip.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..CLIENT_KEY_CHARS].to_string()
}
