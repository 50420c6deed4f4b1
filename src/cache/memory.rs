// ABOUTME: In-memory LRU cache of validated claims with expiry-aware lookups
// ABOUTME: Includes an optional background task sweeping expired entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::Utc;
use lru::LruCache;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;
use tracing::{debug, warn};

use super::ClaimsCacheConfig;
use crate::models::Claims;

#[derive(Debug, Clone)]
struct CacheEntry<D> {
    claims: Claims<D>,
    /// Unix seconds after which the entry is stale
    expires_at: i64,
    /// Whether `expires_at` comes from the token's own `exp`
    token_expiry: bool,
}

impl<D> CacheEntry<D> {
    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<D> {
    /// Cached and still valid
    Fresh(Claims<D>),
    /// Cached but the token's `exp` has passed; the entry has been evicted
    Expired,
    /// Not cached, or only the default TTL lapsed
    Miss,
}

type Store<D> = Arc<RwLock<LruCache<String, CacheEntry<D>>>>;

/// Bounded LRU cache of validated claims keyed by token string
pub struct ClaimsCache<D> {
    store: Store<D>,
    default_ttl_secs: i64,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl<D: Clone + Send + Sync + 'static> ClaimsCache<D> {
    /// Capacity used when the configuration asks for zero entries
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache, spawning the sweeper when enabled and a runtime is available
    #[must_use]
    pub fn new(config: &ClaimsCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        let store: Store<D> = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if config.enable_background_cleanup {
            Self::spawn_sweeper(&store, config)
        } else {
            None
        };

        Self {
            store,
            default_ttl_secs: i64::try_from(config.default_ttl.as_secs()).unwrap_or(i64::MAX),
            shutdown_tx,
        }
    }

    fn spawn_sweeper(store: &Store<D>, config: &ClaimsCacheConfig) -> Option<mpsc::Sender<()>> {
        let Ok(handle) = Handle::try_current() else {
            warn!("No Tokio runtime available, claims cache sweeper disabled");
            return None;
        };
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let store = Arc::clone(store);
        let cleanup_interval = config.cleanup_interval;

        handle.spawn(async move {
            let mut ticker = interval(cleanup_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        Self::cleanup_expired(&store).await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Claims cache sweeper received shutdown signal");
                        break;
                    }
                }
            }
        });
        Some(shutdown_tx)
    }

    /// Remove all expired entries
    async fn cleanup_expired(store: &Store<D>) -> usize {
        let now = Utc::now().timestamp();
        let mut guard = store.write().await;
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            guard.pop(token);
        }
        drop(guard);

        if !expired.is_empty() {
            debug!(removed = expired.len(), "Swept expired claims cache entries");
        }
        expired.len()
    }

    /// Look up `token`, evicting it if stale
    pub async fn lookup(&self, token: &str) -> Lookup<D> {
        let now = Utc::now().timestamp();
        let mut guard = self.store.write().await;
        let Some(entry) = guard.get(token) else {
            return Lookup::Miss;
        };
        if !entry.is_expired_at(now) {
            return Lookup::Fresh(entry.claims.clone());
        }

        let token_expiry = entry.token_expiry;
        guard.pop(token);
        drop(guard);
        if token_expiry {
            Lookup::Expired
        } else {
            Lookup::Miss
        }
    }

    /// Cached claims for `token` if present and not stale
    pub async fn get(&self, token: &str) -> Option<Claims<D>> {
        match self.lookup(token).await {
            Lookup::Fresh(claims) => Some(claims),
            Lookup::Expired | Lookup::Miss => None,
        }
    }

    /// Cache `claims` under `token` until the claims expire
    pub async fn put(&self, token: String, claims: Claims<D>) {
        let (expires_at, token_expiry) = claims.exp.map_or_else(
            || {
                let now = Utc::now().timestamp();
                (now.saturating_add(self.default_ttl_secs), false)
            },
            |exp| (exp, true),
        );
        let entry = CacheEntry {
            claims,
            expires_at,
            token_expiry,
        };
        self.store.write().await.push(token, entry);
    }

    /// Remove `token` from the cache
    pub async fn evict(&self, token: &str) -> bool {
        self.store.write().await.pop(token).is_some()
    }

    /// Remove every entry
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Number of cached entries, stale ones included until swept
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Sweep expired entries now, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        Self::cleanup_expired(&self.store).await
    }
}

impl<D> Drop for ClaimsCache<D> {
    fn drop(&mut self) {
        if let Some(tx) = &self.shutdown_tx {
            if let Err(e) = tx.try_send(()) {
                debug!(error = ?e, "Claims cache shutdown signal send failed (channel likely closed)");
            }
        }
    }
}
