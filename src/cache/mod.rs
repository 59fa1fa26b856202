//! Fast store implementations and query fingerprinting.
//!
//! - [`fingerprint`]: stable XXH3-128 digests of queries, used as store keys.
//! - [`RedisStore`]: the networked store used in production. Connects
//!   lazily to `redis://localhost:6379/1` by default.
//! - [`MemoryStore`]: in-process moka store with the same expiration
//!   semantics, for embedding and tests.

pub mod fingerprint;
pub mod memory;
pub mod redis_store;

pub use fingerprint::{Fingerprint, KEY_PREFIX, fingerprint};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
