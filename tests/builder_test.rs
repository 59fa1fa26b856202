//! Tests for coordinator construction and mode resolution.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use shotcache::{
    CacheCoordinator, ConnectionMode, DEFAULT_TTL, MemoryStore, Query, Record, RemoteService,
    Result, ShotcacheError,
};

/// Nothing listens on port 1, so connects are refused immediately.
const UNREACHABLE_REDIS: &str = "redis://127.0.0.1:1/0";

struct EchoRemote;

#[async_trait]
impl RemoteService for EchoRemote {
    fn name(&self) -> &str {
        "echo"
    }

    async fn find(&self, query: &Query) -> Result<Vec<Record>> {
        let mut record = Record::new();
        record.insert("args".to_string(), json!(query.args));
        Ok(vec![record])
    }
}

#[test]
fn defaults_to_cached_with_ten_minute_ttl() {
    let coordinator = CacheCoordinator::builder()
        .remote(Arc::new(EchoRemote))
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    assert_eq!(coordinator.mode(), ConnectionMode::Cached);
    assert_eq!(coordinator.default_ttl(), DEFAULT_TTL);
    assert_eq!(DEFAULT_TTL, Duration::from_secs(600));
}

#[test]
fn missing_identity_forces_local() {
    for mode in ConnectionMode::ALL {
        let coordinator = CacheCoordinator::builder()
            .mode(mode)
            .store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap();
        assert_eq!(coordinator.mode(), ConnectionMode::Local, "requested {mode}");
    }
}

#[test]
fn empty_script_name_forces_local() {
    let coordinator = CacheCoordinator::builder()
        .shotgun("https://studio.example.com", "  ", "key")
        .mode(ConnectionMode::Direct)
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    assert_eq!(coordinator.mode(), ConnectionMode::Local);
}

#[test]
fn script_name_keeps_requested_mode() {
    let coordinator = CacheCoordinator::builder()
        .shotgun("https://studio.example.com", "pipeline", "key")
        .mode(ConnectionMode::Direct)
        .build()
        .unwrap();
    assert_eq!(coordinator.mode(), ConnectionMode::Direct);
}

#[test]
fn default_store_is_built_lazily() {
    // No redis server is needed until the first query.
    let coordinator = CacheCoordinator::builder()
        .remote(Arc::new(EchoRemote))
        .build()
        .unwrap();
    assert_eq!(coordinator.mode(), ConnectionMode::Cached);
}

#[test]
fn invalid_redis_url_is_a_configuration_error() {
    let result = CacheCoordinator::builder()
        .remote(Arc::new(EchoRemote))
        .redis("not a redis url")
        .build();
    assert!(matches!(result, Err(ShotcacheError::Configuration(_))));
}

#[test]
fn explicit_store_wins_over_redis_url() {
    let result = CacheCoordinator::builder()
        .remote(Arc::new(EchoRemote))
        .redis("not a redis url")
        .store(Arc::new(MemoryStore::new()))
        .build();
    assert!(result.is_ok());
}

#[tokio::test]
async fn unreachable_redis_demotes_cached_coordinator() {
    let coordinator = CacheCoordinator::builder()
        .remote(Arc::new(EchoRemote))
        .redis(UNREACHABLE_REDIS)
        .build()
        .unwrap();

    let records = coordinator
        .find(&Query::new([json!("Shot")]))
        .await
        .unwrap();
    assert_eq!(records[0]["args"], json!(["Shot"]));
    assert_eq!(coordinator.mode(), ConnectionMode::Direct);
}

#[tokio::test]
async fn unreachable_redis_in_local_mode_yields_empty() {
    let coordinator = CacheCoordinator::builder()
        .redis(UNREACHABLE_REDIS)
        .build()
        .unwrap();
    assert_eq!(coordinator.mode(), ConnectionMode::Local);

    let records = coordinator
        .find(&Query::new([json!("Shot")]))
        .await
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(coordinator.mode(), ConnectionMode::Local);
}
