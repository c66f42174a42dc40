//! Backend configuration from the environment
//!
//! - `WORDPRESS_SITE_URL`, `WORDPRESS_USERNAME`, `WORDPRESS_PASSWORD`: default credentials
//! - `WORDPRESS_TIMEOUT_SECS`: per-request timeout in seconds (unset means none)

use std::time::Duration;
use wprpc_core::Credentials;

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "WORDPRESS_TIMEOUT_SECS";

/// Settings for the WordPress backend
#[derive(Debug, Clone, Default)]
pub struct WordPressConfig {
    /// Credentials used when a request carries none of its own
    pub credentials: Credentials,
    /// Upper bound on a single backend call
    pub timeout: Option<Duration>,
}

impl WordPressConfig {
    /// Create a configuration with the given default credentials
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout: None,
        }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|value| parse_timeout(&value));

        Self {
            credentials: Credentials::from_env(),
            timeout,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn parse_timeout(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(value = %value, error = %e, "Ignoring {}", TIMEOUT_ENV);
            None
        }
    }
}
