//! Server configuration.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ApiError, Result};

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
/// Default collection the endpoint answers from.
pub const DEFAULT_COLLECTION: &str = "passages";
/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Default request body limit (64 KiB; a query is a single short string).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Configuration for the HTTP query endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Keys accepted in the `apikey` header.
    pub api_keys: HashSet<String>,
    pub collection: String,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Create a config accepting the given keys, with defaults for
    /// everything else.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if no non-blank key is given.
    pub fn new<I, S>(api_keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let api_keys: HashSet<String> = api_keys
            .into_iter()
            .map(Into::into)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
        if api_keys.is_empty() {
            return Err(ApiError::Config("at least one API key is required".to_string()));
        }

        let bind = DEFAULT_BIND
            .parse()
            .map_err(|e| ApiError::Config(format!("invalid default bind address: {e}")))?;

        Ok(Self {
            bind,
            api_keys,
            collection: DEFAULT_COLLECTION.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }
}

/// Split a comma-separated key list, as read from `DOCENT_API_KEYS`.
pub fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty()).map(str::to_string).collect()
}
