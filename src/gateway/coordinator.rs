//! CacheCoordinator - mode-driven read-through cache over a remote service

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::cache::Fingerprint;
use crate::telemetry;
use crate::traits::{FastStore, RemoteService};
use crate::types::{ConnectionMode, Query, Record};
use crate::{Result, ShotcacheError};

/// Default time-to-live for cached results (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Why a cached lookup gave up.
enum CachedFindError {
    /// The fast store failed; demote and retry directly.
    Store(ShotcacheError),
    /// Anything else; returned to the caller unchanged.
    Propagate(ShotcacheError),
}

/// Read-through cache facade in front of a [`RemoteService`].
///
/// Built with [`CacheCoordinator::builder()`](super::CacheCoordinatorBuilder).
/// Safe to share across tasks behind an `Arc`. The mode is a one-way latch:
/// once a fast-store failure demotes a `Cached` coordinator to `Direct`, no
/// later call on the same instance touches the store again.
pub struct CacheCoordinator {
    mode: AtomicU8,
    default_ttl: Duration,
    remote: Option<Arc<dyn RemoteService>>,
    store: Option<Arc<dyn FastStore>>,
}

impl CacheCoordinator {
    pub(crate) fn new(
        mode: ConnectionMode,
        default_ttl: Duration,
        remote: Option<Arc<dyn RemoteService>>,
        store: Option<Arc<dyn FastStore>>,
    ) -> Self {
        Self {
            mode: AtomicU8::new(mode as u8),
            default_ttl,
            remote,
            store,
        }
    }

    /// The mode the next `find` call will use.
    pub fn mode(&self) -> ConnectionMode {
        ConnectionMode::from_repr(self.mode.load(Ordering::Acquire))
    }

    /// TTL applied when a query carries no `ttl` option.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Run a `find` query according to the current mode.
    ///
    /// The reserved `ttl` option is stripped before the query is
    /// fingerprinted or forwarded. Remote service errors are returned
    /// unchanged; fast-store errors never are.
    #[instrument(skip_all, fields(mode))]
    pub async fn find(&self, query: &Query) -> Result<Vec<Record>> {
        let (query, ttl) = query.split_ttl()?;
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mode = self.mode();
        tracing::Span::current().record("mode", mode.as_str());

        match mode {
            ConnectionMode::Direct => self.direct_find(&query).await,
            ConnectionMode::Local => Ok(self.cache_only_find(&query).await),
            ConnectionMode::Cached => match self.cached_find(&query, ttl).await {
                Ok(records) => Ok(records),
                Err(CachedFindError::Propagate(e)) => Err(e),
                Err(CachedFindError::Store(e)) => {
                    self.demote(&e);
                    self.direct_find(&query).await
                }
            },
        }
    }

    async fn direct_find(&self, query: &Query) -> Result<Vec<Record>> {
        count_request(ConnectionMode::Direct);
        self.fetch_remote(query).await
    }

    async fn cache_only_find(&self, query: &Query) -> Vec<Record> {
        count_request(ConnectionMode::Local);
        let key = Fingerprint::of(query).store_key();
        let lookup = match self.store() {
            Ok(store) => lookup(store.as_ref(), &key, ConnectionMode::Local).await,
            Err(e) => Err(e),
        };
        match lookup {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                count_store_error(ConnectionMode::Local, &e);
                warn!(
                    key = %key,
                    error = %e,
                    error_kind = e.kind(),
                    "cannot read from fast store, returning empty result"
                );
                Vec::new()
            }
        }
    }

    async fn cached_find(
        &self,
        query: &Query,
        ttl: Duration,
    ) -> std::result::Result<Vec<Record>, CachedFindError> {
        count_request(ConnectionMode::Cached);
        let store = self.store().map_err(CachedFindError::Store)?;
        let key = Fingerprint::of(query).store_key();

        if let Some(records) = lookup(store.as_ref(), &key, ConnectionMode::Cached)
            .await
            .map_err(CachedFindError::Store)?
        {
            return Ok(records);
        }

        let records = self
            .fetch_remote(query)
            .await
            .map_err(CachedFindError::Propagate)?;
        let blob = serde_json::to_vec(&records)
            .map_err(|e| CachedFindError::Propagate(ShotcacheError::Json(e)))?;

        store
            .set(&key, blob)
            .await
            .map_err(CachedFindError::Store)?;
        store
            .expire(&key, ttl)
            .await
            .map_err(CachedFindError::Store)?;
        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "stored remote result");

        Ok(records)
    }

    /// Latch `Cached → Direct`. Losing the race to another caller is fine.
    fn demote(&self, cause: &ShotcacheError) {
        count_store_error(ConnectionMode::Cached, cause);
        let demoted = self
            .mode
            .compare_exchange(
                ConnectionMode::Cached as u8,
                ConnectionMode::Direct as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if demoted {
            metrics::counter!(telemetry::MODE_DEMOTIONS_TOTAL).increment(1);
            warn!(
                error = %cause,
                error_kind = cause.kind(),
                "cannot use fast store, switching to direct connection"
            );
        } else {
            debug!(error = %cause, "fast store failed after demotion");
        }
    }

    async fn fetch_remote(&self, query: &Query) -> Result<Vec<Record>> {
        let remote = self.remote.as_ref().ok_or_else(|| {
            ShotcacheError::Configuration("no remote service configured".to_string())
        })?;

        let start = Instant::now();
        let result = remote.find(query).await;
        metrics::histogram!(telemetry::REMOTE_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REMOTE_REQUESTS_TOTAL, "status" => status).increment(1);

        result
    }

    fn store(&self) -> Result<&Arc<dyn FastStore>> {
        self.store.as_ref().ok_or_else(|| {
            ShotcacheError::Configuration("no fast store configured".to_string())
        })
    }
}

#[async_trait]
impl RemoteService for CacheCoordinator {
    fn name(&self) -> &str {
        "shotcache"
    }

    async fn find(&self, query: &Query) -> Result<Vec<Record>> {
        CacheCoordinator::find(self, query).await
    }
}

/// Read and decode `key`. `Ok(None)` is a miss.
///
/// An entry that expires between `exists` and `get` is also a miss.
async fn lookup(
    store: &dyn FastStore,
    key: &str,
    mode: ConnectionMode,
) -> Result<Option<Vec<Record>>> {
    let cached = if store.exists(key).await? {
        store.get(key).await?
    } else {
        None
    };

    match cached {
        Some(bytes) => {
            let records: Vec<Record> = serde_json::from_slice(&bytes)
                .map_err(|e| ShotcacheError::CacheData(format!("undecodable entry {key}: {e}")))?;
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "mode" => mode.as_str()).increment(1);
            debug!(key, records = records.len(), "fast store hit");
            Ok(Some(records))
        }
        None => {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "mode" => mode.as_str())
                .increment(1);
            debug!(key, "fast store miss");
            Ok(None)
        }
    }
}

fn count_request(mode: ConnectionMode) {
    metrics::counter!(telemetry::FIND_REQUESTS_TOTAL, "mode" => mode.as_str()).increment(1);
}

fn count_store_error(mode: ConnectionMode, err: &ShotcacheError) {
    metrics::counter!(telemetry::CACHE_ERRORS_TOTAL,
        "mode" => mode.as_str(),
        "kind" => err.kind(),
    )
    .increment(1);
}
