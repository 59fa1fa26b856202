//! HTTP client for a Shotgun-style JSON API.
//!
//! Sends each `find` as a JSON-RPC style request to `<base_url>/api3/json`:
//!
//! ```text
//! {"method_name": "find",
//!  "params": [{"script_name": "...", "script_key": "..."},
//!             {"args": [...], "options": {...}}]}
//! ```
//!
//! and expects `{"results": [...]}` back. A body with `"exception": true`
//! is a service-side failure.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::RemoteService;
use crate::types::{Query, Record};
use crate::{Result, ShotcacheError};

/// Path of the JSON endpoint, relative to the base URL.
const API_PATH: &str = "/api3/json";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the remote record service.
#[derive(Clone)]
pub struct ShotgunClient {
    base_url: String,
    script_name: String,
    api_key: String,
    http: Client,
}

impl ShotgunClient {
    /// Create a client for `base_url`, authenticating as `script_name`.
    pub fn new(
        base_url: impl Into<String>,
        script_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timeout(base_url, script_name, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        script_name: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            ShotcacheError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_http_client(base_url, script_name, api_key, http))
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_http_client(
        base_url: impl Into<String>,
        script_name: impl Into<String>,
        api_key: impl Into<String>,
        http: Client,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            script_name: script_name.into(),
            api_key: api_key.into(),
            http,
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Script name used to authenticate.
    pub fn script_name(&self) -> &str {
        &self.script_name
    }
}

#[async_trait]
impl RemoteService for ShotgunClient {
    fn name(&self) -> &str {
        "shotgun"
    }

    async fn find(&self, query: &Query) -> Result<Vec<Record>> {
        let url = format!("{}{API_PATH}", self.base_url);
        let request = RpcRequest {
            method_name: "find",
            params: (
                Credentials {
                    script_name: &self.script_name,
                    script_key: &self.api_key,
                },
                FindParams {
                    args: &query.args,
                    options: &query.options,
                },
            ),
        };

        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ShotcacheError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RpcResponse = response.json().await?;
        if body.exception {
            return Err(ShotcacheError::Remote {
                code: body.error_code,
                message: body
                    .message
                    .unwrap_or_else(|| "unknown remote error".to_string()),
            });
        }
        body.results.ok_or_else(|| ShotcacheError::Remote {
            code: None,
            message: "response carried no results".to_string(),
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct RpcRequest<'a> {
    method_name: &'static str,
    params: (Credentials<'a>, FindParams<'a>),
}

#[derive(Serialize)]
struct Credentials<'a> {
    script_name: &'a str,
    script_key: &'a str,
}

#[derive(Serialize)]
struct FindParams<'a> {
    args: &'a [Value],
    options: &'a BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    results: Option<Vec<Record>>,
    #[serde(default)]
    exception: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}
