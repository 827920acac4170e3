//! Response normalization.
//!
//! The provider answers with JSON objects, JSON arrays, empty bodies and,
//! occasionally, error pages that are not JSON at all. `normalize` folds all
//! of these into one `ExecutedResponse` whose decoded body is always a keyed
//! mapping; top-level values that are not objects are wrapped under `"data"`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Statuses above this are the provider's error branch, redirects included.
pub const ERROR_STATUS_THRESHOLD: u16 = 300;

/// Response as surfaced by a transport, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header pairs in arrival order; a name may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Normalized result of one completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedResponse {
    pub status: u16,
    /// First value of each response header.
    pub headers: BTreeMap<String, String>,
    pub body: Map<String, Value>,
    pub raw_body: Vec<u8>,
}

impl ExecutedResponse {
    /// True when the caller should parse an `ErrorEnvelope` instead of the
    /// success payload.
    pub fn is_error(&self) -> bool {
        self.status > ERROR_STATUS_THRESHOLD
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the raw body into a typed payload.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.raw_body).map_err(ApiError::Deserialization)
    }

    pub fn error_envelope(&self) -> Result<ErrorEnvelope, ApiError> {
        self.json()
    }
}

/// Error payload returned by the provider alongside a status above 300.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorEnvelope {
    /// Machine-readable slug, e.g. `invalid_items`.
    pub error: String,
    pub message: String,
    pub status: u16,
}

/// Classify and decode a raw response.
pub fn normalize(raw: RawResponse) -> Result<ExecutedResponse, ApiError> {
    let RawResponse {
        status,
        headers: header_pairs,
        body: raw_body,
    } = raw;

    let mut headers = BTreeMap::new();
    for (name, value) in header_pairs {
        headers.entry(name).or_insert(value);
    }

    let decoded: Value = match serde_json::from_slice(&raw_body) {
        Ok(value) => value,
        Err(source) => {
            if status >= 400 && !raw_body.is_empty() {
                let body = String::from_utf8_lossy(&raw_body).into_owned();
                tracing::warn!(status, error = %source, "error response is not JSON");
                return Err(ApiError::ResponseDecode {
                    source,
                    body: Some(body),
                });
            }
            if status <= ERROR_STATUS_THRESHOLD && raw_body.is_empty() {
                tracing::debug!(status, "empty response body");
                return Ok(ExecutedResponse {
                    status,
                    headers,
                    body: Map::new(),
                    raw_body: Vec::new(),
                });
            }
            tracing::warn!(status, error = %source, "response body is not JSON");
            return Err(ApiError::ResponseDecode { source, body: None });
        }
    };

    let body = match decoded {
        Value::Object(object) => object,
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("data".to_string(), other);
            wrapped
        }
    };

    tracing::debug!(status, bytes = raw_body.len(), "response decoded");

    Ok(ExecutedResponse {
        status,
        headers,
        body,
        raw_body,
    })
}
