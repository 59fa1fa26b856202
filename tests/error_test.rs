use shotcache::ShotcacheError;

#[test]
fn error_display() {
    let err = ShotcacheError::Api {
        status: 500,
        message: "internal".to_string(),
    };
    assert_eq!(err.to_string(), "API error (500): internal");

    let err = ShotcacheError::Remote {
        code: Some(102),
        message: "bad script key".to_string(),
    };
    assert_eq!(err.to_string(), "remote service error: bad script key");

    let err = ShotcacheError::CacheConnection("refused".to_string());
    assert_eq!(err.to_string(), "cache connection error: refused");

    let err = ShotcacheError::InvalidInput("'ttl' must be a number".to_string());
    assert_eq!(err.to_string(), "invalid input: 'ttl' must be a number");
}

#[test]
fn cache_failures_are_classified() {
    assert!(ShotcacheError::CacheConnection("x".into()).is_cache_failure());
    assert!(ShotcacheError::CacheData("x".into()).is_cache_failure());

    assert!(!ShotcacheError::Http("x".into()).is_cache_failure());
    assert!(
        !ShotcacheError::Api {
            status: 404,
            message: "x".into()
        }
        .is_cache_failure()
    );
    assert!(!ShotcacheError::Configuration("x".into()).is_cache_failure());
}

#[test]
fn kind_labels() {
    assert_eq!(ShotcacheError::Http("x".into()).kind(), "http");
    assert_eq!(ShotcacheError::CacheConnection("x".into()).kind(), "connection");
    assert_eq!(ShotcacheError::CacheData("x".into()).kind(), "data");
    assert_eq!(ShotcacheError::InvalidInput("x".into()).kind(), "invalid_input");
}

#[test]
fn json_error_converts() {
    let err: ShotcacheError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, ShotcacheError::Json(_)));
    assert_eq!(err.kind(), "json");
}

#[test]
fn redis_errors_split_by_cause() {
    let refused: ShotcacheError = redis::RedisError::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "refused",
    ))
    .into();
    assert!(matches!(refused, ShotcacheError::CacheConnection(_)));

    let wrong_type: ShotcacheError =
        redis::RedisError::from((redis::ErrorKind::TypeError, "WRONGTYPE")).into();
    assert!(matches!(wrong_type, ShotcacheError::CacheData(_)));
}
