//! Redis-backed fast store.
//!
//! The connection is established lazily on first use, so building a
//! coordinator never fails because redis is down; the failure surfaces
//! from the first store operation and drives the coordinator's fallback.
//!
//! A connection that drops is discarded after the failing command, and the
//! next command connects again.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::debug;

use crate::traits::FastStore;
use crate::{Result, ShotcacheError};

/// Default redis host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default redis port.
pub const DEFAULT_PORT: u16 = 6379;
/// Default logical database index.
pub const DEFAULT_DB: i64 = 1;

/// [`FastStore`] over a single redis server.
pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    response_timeout: Option<Duration>,
    connection_timeout: Option<Duration>,
}

impl RedisStore {
    /// Create a store from a connection URL, e.g. `redis://localhost:6379/1`.
    ///
    /// Only parses the URL; no connection is made yet.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            ShotcacheError::Configuration(format!("invalid redis url '{url}': {e}"))
        })?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            response_timeout: None,
            connection_timeout: None,
        })
    }

    /// Create a store for `host:port`, using logical database `db`.
    pub fn from_host(host: &str, port: u16, db: i64) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}/{db}"))
    }

    /// Store on `localhost:6379`, database 1.
    pub fn local() -> Result<Self> {
        Self::from_host(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_DB)
    }

    /// Set the timeout for command responses. `None` blocks indefinitely.
    pub fn response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Set the timeout for establishing the connection. `None` blocks indefinitely.
    pub fn connection_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connection_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// The live connection, connecting first if there is none.
    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let mut config = redis::AsyncConnectionConfig::new();
        if let Some(timeout) = self.response_timeout {
            config = config.set_response_timeout(timeout);
        }
        if let Some(timeout) = self.connection_timeout {
            config = config.set_connection_timeout(timeout);
        }
        let conn = self
            .client
            .get_multiplexed_async_connection_with_config(&config)
            .await
            .map_err(|e| ShotcacheError::CacheConnection(e.to_string()))?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Convert a command result, dropping the connection if it is no longer usable.
    async fn settle<T>(&self, result: redis::RedisResult<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() || e.is_unrecoverable_error() {
                    debug!(error = %e, "redis connection lost, reconnecting on next command");
                    *self.connection.lock().await = None;
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl FastStore for RedisStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result = conn.exists(key).await;
        self.settle(result).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let result = conn.get(key).await;
        self.settle(result).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.connection().await?;
        let result = conn.set::<_, _, ()>(key, value).await;
        self.settle(result).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let result = conn.pexpire::<_, ()>(key, millis).await;
        self.settle(result).await
    }
}
