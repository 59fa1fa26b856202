//! Collaborator traits.
//!
//! The coordinator composes two collaborators behind trait objects rather
//! than depending on concrete clients:
//!
//! - [`RemoteService`]: the authoritative, relatively slow data source.
//! - [`FastStore`]: a key/value store with per-key expiration.
//!
//! Either side can be replaced with a test double. The coordinator itself
//! implements [`RemoteService`], so a cached facade can stand in wherever a
//! plain remote client is expected.
//!
//! # Error contract
//!
//! - `RemoteService` errors are terminal and reach the caller unchanged.
//! - `FastStore` errors must be [`CacheConnection`](crate::ShotcacheError::CacheConnection)
//!   or [`CacheData`](crate::ShotcacheError::CacheData); the coordinator
//!   absorbs them and never returns them from `find`.

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::types::{Query, Record};

// ============================================================================
// Remote Service
// ============================================================================

/// The authoritative record source.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Service name for logging/debugging.
    fn name(&self) -> &str;

    /// Run a `find` query and return the matching records.
    async fn find(&self, query: &Query) -> Result<Vec<Record>>;
}

// ============================================================================
// Fast Store
// ============================================================================

/// A key/value store with expiration, used as the read-through cache.
///
/// Expiration is enforced by the store, not by the caller.
#[async_trait]
pub trait FastStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    /// Whether `key` currently holds a value.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Fetch the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value and clearing
    /// its expiration.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Expire `key` after `ttl`. A missing key is not an error.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;
}
