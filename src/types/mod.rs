//! Public types for the Shotcache API.

mod mode;
mod query;

pub use mode::ConnectionMode;
pub use query::{Query, TTL_OPTION};

/// A single record returned by the remote service: field name → value.
pub type Record = serde_json::Map<String, serde_json::Value>;
