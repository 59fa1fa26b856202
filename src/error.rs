//! Shotcache error types

/// Shotcache error types
#[derive(Debug, thiserror::Error)]
pub enum ShotcacheError {
    // Remote service errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The remote service answered, but reported a failure in its payload.
    #[error("remote service error: {message}")]
    Remote { code: Option<i64>, message: String },

    // Fast store errors
    /// The fast store could not be reached (refused, dropped, timed out).
    #[error("cache connection error: {0}")]
    CacheConnection(String),

    /// A stored entry could not be decoded, or the store rejected a command.
    #[error("cache data error: {0}")]
    CacheData(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ShotcacheError {
    /// Whether this error originated in the fast store.
    ///
    /// The coordinator treats every such error as "store unavailable".
    pub fn is_cache_failure(&self) -> bool {
        matches!(self, Self::CacheConnection(_) | Self::CacheData(_))
    }

    /// Short label used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::Remote { .. } => "remote",
            Self::CacheConnection(_) => "connection",
            Self::CacheData(_) => "data",
            Self::Json(_) => "json",
            Self::InvalidInput(_) => "invalid_input",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<redis::RedisError> for ShotcacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            ShotcacheError::CacheConnection(err.to_string())
        } else {
            ShotcacheError::CacheData(err.to_string())
        }
    }
}

impl From<reqwest::Error> for ShotcacheError {
    fn from(err: reqwest::Error) -> Self {
        ShotcacheError::Http(err.to_string())
    }
}

/// Result type alias for Shotcache operations
pub type Result<T> = std::result::Result<T, ShotcacheError>;
