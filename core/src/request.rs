//! Request descriptor and client settings shared by all workers

use std::time::Duration;

use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Immutable description of the request every worker issues
///
/// Built once before the run and shared read-only (behind an `Arc`) by all
/// workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: Method,
    url: Url,
}

impl RequestSpec {
    /// Create a request descriptor, validating the target URL
    ///
    /// Only absolute `http` and `https` URLs are accepted.
    pub fn new(method: Method, url: &str) -> Result<Self, ConfigError> {
        let parsed =
            Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("{url}: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidUrl(format!(
                    "{url}: unsupported scheme '{other}'"
                )))
            }
        }

        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!("{url}: missing host")));
        }

        Ok(Self {
            method,
            url: parsed,
        })
    }

    /// Shorthand for a GET request
    pub fn get(url: &str) -> Result<Self, ConfigError> {
        Self::new(Method::GET, url)
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Settings every per-worker HTTP client is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Accept compressed response bodies
    pub compression: bool,

    /// Follow HTTP redirects
    pub follow_redirects: bool,

    /// Connect and whole-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            compression: true,
            follow_redirects: true,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Enable or disable compression
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Enable or disable redirect following
    pub fn with_redirects(mut self, enabled: bool) -> Self {
        self.follow_redirects = enabled;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
