//! Time-bounded cache in front of a `KeySetSource`.
//!
//! - One cache wraps one source, so entries are keyed by that source's URL.
//! - At most one refetch is in flight: the refresh gate is held across the fetch
//!   and waiters re-check freshness after acquiring it.
//! - Entries are immutable `Arc<JwkSet>` swapped under a write lock, so readers
//!   see either the previous set or the new one.
//! - A cancelled refresh drops the gate without touching the entry.
//! - Failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::{JwkSet, KeySetSource};

#[derive(Debug, Clone)]
struct CacheEntry {
    set: Arc<JwkSet>,
    fetched_at: Instant,
}

pub struct CachedKeySet<S: KeySetSource> {
    inner: S,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
    refresh_gate: Mutex<()>,
}

impl<S: KeySetSource> std::fmt::Debug for CachedKeySet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedKeySet")
            .field("url", &self.inner.source_url())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<S: KeySetSource> CachedKeySet<S> {
    /// A key rotated at the provider becomes effective here within `ttl`.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the cached entry; the next call refetches.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }

    async fn fresh(&self) -> Option<Arc<JwkSet>> {
        let guard = self.entry.read().await;
        guard
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.set))
    }
}

#[async_trait]
impl<S: KeySetSource> KeySetSource for CachedKeySet<S> {
    fn source_url(&self) -> &str {
        self.inner.source_url()
    }

    async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        if let Some(set) = self.fresh().await {
            return Ok(set);
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone else may have refreshed while we waited for the gate.
        if let Some(set) = self.fresh().await {
            return Ok(set);
        }

        let set = self.inner.key_set().await?;
        debug!(url = %self.inner.source_url(), ttl = ?self.ttl, "jwks cache refreshed");

        *self.entry.write().await = Some(CacheEntry {
            set: Arc::clone(&set),
            fetched_at: Instant::now(),
        });

        Ok(set)
    }
}
