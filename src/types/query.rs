//! Query type for `find` calls.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, ShotcacheError};

/// Reserved option naming a per-query cache TTL, in seconds.
///
/// Consumed by the coordinator; never fingerprinted or forwarded.
pub const TTL_OPTION: &str = "ttl";

/// A `find` query: positional filter arguments plus named options.
///
/// Mirrors the remote API's call shape, e.g.
/// `find("Shot", [["id", "is", 5]], fields=["code"])`:
///
/// ```rust
/// # use shotcache::Query;
/// # use serde_json::json;
/// # use std::time::Duration;
/// let query = Query::new([json!("Shot"), json!([["id", "is", 5]])])
///     .option("fields", json!(["code"]))
///     .ttl(Duration::from_secs(30));
/// assert_eq!(query.args.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Ordered positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Named options, keyed by unique name.
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

impl Query {
    /// Create a query from positional arguments.
    pub fn new(args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            args: args.into_iter().collect(),
            options: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a named option, replacing any previous value.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Override the coordinator's default TTL for this query only.
    pub fn ttl(self, ttl: Duration) -> Self {
        let value = if ttl.subsec_nanos() == 0 {
            Value::from(ttl.as_secs())
        } else {
            Value::from(ttl.as_secs_f64())
        };
        self.option(TTL_OPTION, value)
    }

    /// Whether the reserved `ttl` option is present.
    pub fn has_ttl(&self) -> bool {
        self.options.contains_key(TTL_OPTION)
    }

    /// Split off the reserved `ttl` option.
    ///
    /// Returns the query without `ttl` and the parsed override, if any.
    /// The value must be a non-negative number of seconds.
    pub fn split_ttl(&self) -> Result<(Query, Option<Duration>)> {
        let mut query = self.clone();
        let ttl = match query.options.remove(TTL_OPTION) {
            Some(value) => Some(parse_ttl(&value)?),
            None => None,
        };
        Ok((query, ttl))
    }
}

fn parse_ttl(value: &Value) -> Result<Duration> {
    if let Some(secs) = value.as_u64() {
        return Ok(Duration::from_secs(secs));
    }
    value
        .as_f64()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            ShotcacheError::InvalidInput(format!(
                "'{TTL_OPTION}' must be a non-negative number of seconds, got {value}"
            ))
        })
}
