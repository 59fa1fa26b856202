//! Telemetry metric name constants.
//!
//! Centralised metric names for shotcache operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `shotcache_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `mode`: connection mode serving the call: "direct", "cached" or "local"
//! - `kind`: store error kind: "connection" or "data"
//! - `status`: outcome: "ok" or "error"

/// Total `find` calls dispatched by the coordinator.
///
/// Labels: `mode`. A call retried after demotion is counted once per mode.
pub const FIND_REQUESTS_TOTAL: &str = "shotcache_find_requests_total";

/// Total fast store hits.
///
/// Labels: `mode`.
pub const CACHE_HITS_TOTAL: &str = "shotcache_cache_hits_total";

/// Total fast store misses.
///
/// Labels: `mode`.
pub const CACHE_MISSES_TOTAL: &str = "shotcache_cache_misses_total";

/// Total fast store failures caught by the coordinator.
///
/// Labels: `mode`, `kind`.
pub const CACHE_ERRORS_TOTAL: &str = "shotcache_cache_errors_total";

/// Total `cached → direct` demotions.
pub const MODE_DEMOTIONS_TOTAL: &str = "shotcache_mode_demotions_total";

/// Total requests sent to the remote service.
///
/// Labels: `status` ("ok" | "error").
pub const REMOTE_REQUESTS_TOTAL: &str = "shotcache_remote_requests_total";

/// Remote service request duration in seconds.
pub const REMOTE_DURATION_SECONDS: &str = "shotcache_remote_duration_seconds";
