//! Shotcache - read-through cache facade for record query APIs
//!
//! [`CacheCoordinator`] sits in front of a remote record service (a
//! Shotgun-style `find` API) and, depending on its [`ConnectionMode`],
//! answers queries from a fast key/value store, from the remote service,
//! or from the store with remote fallback and write-back under a TTL.
//!
//! - `direct`: always ask the remote service; never touch the store.
//! - `cached`: store first; on a miss ask the remote service and cache
//!   the result. If the store fails, the coordinator permanently switches
//!   to `direct` and retries the call.
//! - `local`: store only; a miss yields an empty result.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use serde_json::json;
//! use shotcache::{CacheCoordinator, ConnectionMode, Query};
//!
//! #[tokio::main]
//! async fn main() -> shotcache::Result<()> {
//!     let shotgun = CacheCoordinator::builder()
//!         .shotgun("https://studio.example.com", "pipeline", "script-key")
//!         .redis("redis://localhost:6379/1")
//!         .mode(ConnectionMode::Cached)
//!         .build()?;
//!
//!     let query = Query::new([json!("Shot"), json!([["id", "is", 5]])])
//!         .option("fields", json!(["code"]))
//!         .ttl(Duration::from_secs(30));
//!
//!     for record in shotgun.find(&query).await? {
//!         println!("{}", record["code"]);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod gateway;
pub mod remote;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{Fingerprint, MemoryStore, RedisStore, fingerprint};
pub use error::{Result, ShotcacheError};
pub use gateway::{CacheCoordinator, CacheCoordinatorBuilder, DEFAULT_TTL};
pub use remote::ShotgunClient;
pub use traits::{FastStore, RemoteService};
pub use types::{ConnectionMode, Query, Record, TTL_OPTION};
