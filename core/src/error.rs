//! Error types for the Mercado Pago client.
//!
//! # Design
//! Only local failures live here: a request that could not be built, sent, or
//! decoded. A provider that answers with a business error (invalid field,
//! unknown preference) is not an `ApiError`; it reaches the caller as a decoded
//! response with a status above 300 and is surfaced as `Outcome::Rejected`.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The request could not be constructed or no response was obtained
    /// (invalid URL or header, DNS, connect, TLS, protocol).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The call did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body could not be decoded as JSON. When the provider
    /// answered with an error status and a non-empty body, the raw text is
    /// kept so unexpected error formats can be diagnosed.
    #[error("{}", decode_message(.source, .body))]
    ResponseDecode {
        source: serde_json::Error,
        body: Option<String>,
    },

    /// A decoded body did not match the expected payload type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("missing access token: pass one explicitly or set MERCADO_PAGO_ACCESS_TOKEN")]
    MissingCredentials,

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn decode_message(source: &serde_json::Error, body: &Option<String>) -> String {
    match body {
        Some(raw) => format!("response decode failed: {source} - response: {raw}"),
        None => format!("response decode failed: {source}"),
    }
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }
}
