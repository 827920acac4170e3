//! Client configuration.
//!
//! A `Config` is built once and handed to the client; nothing reads the
//! process environment behind the caller's back. `Config::from_env` is the
//! explicit opt-in for environment-driven setups.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";

pub const ACCESS_TOKEN_ENV: &str = "MERCADO_PAGO_ACCESS_TOKEN";
pub const BASE_URL_ENV: &str = "MERCADO_PAGO_BASE_URL";
pub const TIMEOUT_ENV: &str = "MERCADO_PAGO_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
    access_token: Option<String>,
    timeout: Option<Duration>,
}

impl Config {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()).filter(|t| !t.is_empty()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.is_empty()) {
            config.access_token = Some(token);
        }
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("{TIMEOUT_ENV}={raw:?}: {e}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Pick the token for one call: a non-empty explicit token wins over the
    /// configured one.
    pub fn resolve_token(&self, explicit: Option<&str>) -> Result<String, ApiError> {
        match explicit.filter(|t| !t.is_empty()) {
            Some(token) => Ok(token.to_string()),
            None => self.access_token.clone().ok_or(ApiError::MissingCredentials),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            timeout: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
