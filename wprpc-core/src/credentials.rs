//! Credentials for the content backend
//!
//! A credential set is the triple (site address, username, secret). The
//! process holds one default set read from the environment at startup; each
//! request may override any member through its params (`siteUrl`,
//! `username`, `password`). Resolution is a pure merge: request value if
//! present and non-empty, else the default.
//!
//! Credentials are never logged. The `Debug` impl redacts the secret and no
//! response type carries them.

use crate::error::{Error, Result};
use crate::types::Params;
use serde_json::Value;
use std::fmt;

/// Message returned when a request cannot be given a full credential set
pub const MISSING_CREDENTIALS: &str =
    "WordPress credentials not provided in environment variables or request parameters";

/// Environment variable holding the default site address
pub const SITE_URL_ENV: &str = "WORDPRESS_SITE_URL";
/// Environment variable holding the default username
pub const USERNAME_ENV: &str = "WORDPRESS_USERNAME";
/// Environment variable holding the default secret (an application password)
pub const PASSWORD_ENV: &str = "WORDPRESS_PASSWORD";

/// Site address, username and secret used to call the backend
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Base address of the site, e.g. `https://example.com`
    pub site_url: String,
    /// Account name
    pub username: String,
    /// Account secret
    pub password: String,
}

impl Credentials {
    /// Create a credential set
    pub fn new(
        site_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read the process-wide defaults from the environment
    ///
    /// Unset variables become empty strings; completeness is only checked
    /// per request, since any member may still arrive in the params.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self::new(var(SITE_URL_ENV), var(USERNAME_ENV), var(PASSWORD_ENV))
    }

    /// Extract whatever credential members a parameter bag carries
    ///
    /// Only non-empty string values count; anything else is treated as not
    /// provided.
    pub fn from_params(params: &Params) -> Self {
        let field = |key: &str| {
            params
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self::new(field("siteUrl"), field("username"), field("password"))
    }

    /// Fill every empty member from `defaults`
    pub fn or(self, defaults: &Credentials) -> Self {
        let pick = |own: String, fallback: &str| {
            if own.is_empty() {
                fallback.to_string()
            } else {
                own
            }
        };
        Self {
            site_url: pick(self.site_url, &defaults.site_url),
            username: pick(self.username, &defaults.username),
            password: pick(self.password, &defaults.password),
        }
    }

    /// Resolve the credentials for one request
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` with [`MISSING_CREDENTIALS`] when any
    /// member is still empty after the merge.
    pub fn resolve(params: &Params, defaults: &Credentials) -> Result<Self> {
        let resolved = Self::from_params(params).or(defaults);
        if resolved.is_complete() {
            Ok(resolved)
        } else {
            Err(Error::Validation(MISSING_CREDENTIALS.to_string()))
        }
    }

    /// Whether all three members are set
    pub fn is_complete(&self) -> bool {
        !self.site_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("site_url", &self.site_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
