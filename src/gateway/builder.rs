//! Builder for configuring coordinator instances

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::coordinator::{CacheCoordinator, DEFAULT_TTL};
use crate::cache::RedisStore;
use crate::remote::ShotgunClient;
use crate::traits::{FastStore, RemoteService};
use crate::types::ConnectionMode;
use crate::{Result, ShotcacheError};

impl CacheCoordinator {
    /// Create a new builder for configuring the coordinator.
    pub fn builder() -> CacheCoordinatorBuilder {
        CacheCoordinatorBuilder::new()
    }
}

/// Connection details for the bundled [`ShotgunClient`].
struct ShotgunSettings {
    base_url: String,
    script_name: String,
    api_key: String,
}

/// Builder for configuring coordinator instances.
///
/// Without a remote identity (no [`remote`](Self::remote) service and no
/// non-empty script name) the mode is forced to [`ConnectionMode::Local`].
/// When the resolved mode needs a fast store and none was given, a
/// [`RedisStore`] on `localhost:6379/1` is used.
pub struct CacheCoordinatorBuilder {
    mode: ConnectionMode,
    default_ttl: Duration,
    shotgun: Option<ShotgunSettings>,
    remote_timeout: Option<Duration>,
    remote: Option<Arc<dyn RemoteService>>,
    redis_url: Option<String>,
    store: Option<Arc<dyn FastStore>>,
}

impl CacheCoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            mode: ConnectionMode::default(),
            default_ttl: DEFAULT_TTL,
            shotgun: None,
            remote_timeout: None,
            remote: None,
            redis_url: None,
            store: None,
        }
    }

    /// Set the initial connection mode (default: `Cached`).
    pub fn mode(mut self, mode: ConnectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the TTL used when a query has no `ttl` option (default: 600s).
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Configure the bundled HTTP client for the remote service.
    ///
    /// An empty `script_name` counts as no remote identity.
    pub fn shotgun(
        mut self,
        base_url: impl Into<String>,
        script_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.shotgun = Some(ShotgunSettings {
            base_url: base_url.into(),
            script_name: script_name.into(),
            api_key: api_key.into(),
        });
        self
    }

    /// Set the request timeout of the bundled HTTP client (default: 60s).
    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = Some(timeout);
        self
    }

    /// Use a custom remote service. Takes precedence over [`shotgun`](Self::shotgun).
    pub fn remote(mut self, remote: Arc<dyn RemoteService>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Use a redis server at `url` as the fast store.
    pub fn redis(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Use a custom fast store. Takes precedence over [`redis`](Self::redis).
    pub fn store(mut self, store: Arc<dyn FastStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn has_remote_identity(&self) -> bool {
        self.remote.is_some()
            || self
                .shotgun
                .as_ref()
                .is_some_and(|s| !s.script_name.trim().is_empty())
    }

    /// Build the coordinator.
    pub fn build(self) -> Result<CacheCoordinator> {
        let mode = if self.has_remote_identity() {
            self.mode
        } else {
            if self.mode != ConnectionMode::Local {
                info!(
                    requested = self.mode.as_str(),
                    "no remote identity supplied, forcing local mode"
                );
            }
            ConnectionMode::Local
        };

        let remote = if mode.uses_remote() {
            match (self.remote, self.shotgun) {
                (Some(remote), _) => Some(remote),
                (None, Some(settings)) => {
                    Some(build_shotgun(settings, self.remote_timeout)? as Arc<dyn RemoteService>)
                }
                (None, None) => {
                    return Err(ShotcacheError::Configuration(
                        "no remote service configured".to_string(),
                    ));
                }
            }
        } else {
            None
        };

        let store = if mode.uses_store() {
            Some(match (self.store, self.redis_url) {
                (Some(store), _) => store,
                (None, Some(url)) => Arc::new(RedisStore::new(&url)?) as Arc<dyn FastStore>,
                (None, None) => Arc::new(RedisStore::local()?) as Arc<dyn FastStore>,
            })
        } else {
            None
        };

        match mode {
            ConnectionMode::Direct => info!("direct connection to remote service initiated"),
            ConnectionMode::Cached => info!(
                default_ttl_secs = self.default_ttl.as_secs_f64(),
                "cached connection to remote service initiated"
            ),
            ConnectionMode::Local => info!("local fast store connection initiated"),
        }

        Ok(CacheCoordinator::new(mode, self.default_ttl, remote, store))
    }
}

fn build_shotgun(
    settings: ShotgunSettings,
    timeout: Option<Duration>,
) -> Result<Arc<ShotgunClient>> {
    let client = match timeout {
        Some(timeout) => ShotgunClient::with_timeout(
            settings.base_url,
            settings.script_name,
            settings.api_key,
            timeout,
        )?,
        None => ShotgunClient::new(settings.base_url, settings.script_name, settings.api_key)?,
    };
    Ok(Arc::new(client))
}

impl Default for CacheCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
