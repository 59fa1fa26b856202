//! Deterministic query fingerprints.
//!
//! A fingerprint is an XXH3-128 digest of the query's canonical JSON
//! encoding. Option maps and nested objects are emitted with keys in
//! ascending order, so the digest depends only on content, never on
//! insertion order or process state. Positional order is significant.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use xxhash_rust::xxh3::xxh3_128;

use crate::types::Query;

/// Prefix shared by every store key this crate writes.
pub const KEY_PREFIX: &str = "shotcache:find:";

/// Stable 128-bit identifier of a query's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Fingerprint a query as given.
    ///
    /// The coordinator strips the reserved `ttl` option before calling this.
    pub fn of(query: &Query) -> Self {
        fingerprint(&query.args, &query.options)
    }

    /// Raw digest value.
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Key under which results for this fingerprint are stored.
    pub fn store_key(&self) -> String {
        format!("{KEY_PREFIX}{self}")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Compute the fingerprint of positional arguments plus named options.
pub fn fingerprint(args: &[Value], options: &BTreeMap<String, Value>) -> Fingerprint {
    let options: Map<String, Value> = options
        .iter()
        .map(|(name, value)| (name.clone(), canonicalize(value)))
        .collect();
    let canonical = Value::Array(vec![
        Value::Array(args.iter().map(canonicalize).collect()),
        Value::Object(options),
    ]);
    Fingerprint(xxh3_128(canonical.to_string().as_bytes()))
}

/// Rebuild `value` with every object's keys in ascending order.
///
/// `serde_json::Map` only sorts when `preserve_order` is off; sorting here
/// keeps the encoding stable even if a dependency enables that feature.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}
