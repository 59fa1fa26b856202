//! Tests for metrics emitted by the coordinator.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;

use shotcache::telemetry;
use shotcache::{
    CacheCoordinator, ConnectionMode, FastStore, MemoryStore, Query, Record, RemoteService,
    Result, ShotcacheError,
};

// ============================================================================
// Mock collaborators
// ============================================================================

struct StaticRemote;

#[async_trait]
impl RemoteService for StaticRemote {
    fn name(&self) -> &str {
        "static"
    }

    async fn find(&self, _query: &Query) -> Result<Vec<Record>> {
        Ok(serde_json::from_value(json!([{"id": 5, "code": "shot_005"}]))?)
    }
}

struct FailingRemote;

#[async_trait]
impl RemoteService for FailingRemote {
    fn name(&self) -> &str {
        "failing"
    }

    async fn find(&self, _query: &Query) -> Result<Vec<Record>> {
        Err(ShotcacheError::Http("connection reset".to_string()))
    }
}

struct DeadStore;

#[async_trait]
impl FastStore for DeadStore {
    fn name(&self) -> &str {
        "dead"
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(ShotcacheError::CacheConnection("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(ShotcacheError::CacheConnection("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<()> {
        Err(ShotcacheError::CacheConnection("connection refused".into()))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<()> {
        Err(ShotcacheError::CacheConnection("connection refused".into()))
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values matching a metric name and a single label.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn shot_query() -> Query {
    Query::new([json!("Shot"), json!([["id", "is", 5]])])
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn miss_then_hit_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let coordinator = CacheCoordinator::builder()
                    .remote(Arc::new(StaticRemote))
                    .store(Arc::new(MemoryStore::new()))
                    .build()
                    .unwrap();
                coordinator.find(&shot_query()).await.unwrap();
                coordinator.find(&shot_query()).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::FIND_REQUESTS_TOTAL, "mode", "cached"),
        2
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REMOTE_REQUESTS_TOTAL, "status", "ok"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::REMOTE_DURATION_SECONDS),
        "expected a remote duration histogram entry"
    );
    assert_eq!(counter_total(&snapshot, telemetry::MODE_DEMOTIONS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn store_failure_records_single_demotion() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let coordinator = CacheCoordinator::builder()
                    .remote(Arc::new(StaticRemote))
                    .store(Arc::new(DeadStore))
                    .build()
                    .unwrap();
                coordinator.find(&shot_query()).await.unwrap();
                coordinator.find(&shot_query()).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::MODE_DEMOTIONS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_ERRORS_TOTAL, "kind", "connection"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::FIND_REQUESTS_TOTAL, "mode", "direct"),
        2
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REMOTE_REQUESTS_TOTAL, "status", "ok"),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn local_store_failure_records_error_without_demotion() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let coordinator = CacheCoordinator::builder()
                    .mode(ConnectionMode::Local)
                    .store(Arc::new(DeadStore))
                    .build()
                    .unwrap();
                coordinator.find(&shot_query()).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_ERRORS_TOTAL, "mode", "local"),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::MODE_DEMOTIONS_TOTAL), 0);
    assert_eq!(counter_total(&snapshot, telemetry::REMOTE_REQUESTS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn remote_failure_records_error_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let coordinator = CacheCoordinator::builder()
                    .mode(ConnectionMode::Direct)
                    .remote(Arc::new(FailingRemote))
                    .build()
                    .unwrap();
                coordinator.find(&shot_query()).await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::REMOTE_REQUESTS_TOTAL, "status", "error"),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let coordinator = CacheCoordinator::builder()
        .remote(Arc::new(StaticRemote))
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    coordinator.find(&shot_query()).await.unwrap();
}
