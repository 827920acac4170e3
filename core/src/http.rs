//! Declarative HTTP requests.
//!
//! # Design
//! A `RequestSpec` describes one call as plain data: method, base URL, path
//! segments, query filters, headers, JSON body, timeout and basic auth.
//! `RequestSpec::build` turns it into a `PreparedRequest` without touching
//! the network, so every composition rule can be checked in isolation. A
//! `Transport` then executes the prepared request.
//!
//! Composition order:
//! 1. serialize the body (fails before any I/O);
//! 2. append path segments after trimming the base URL's trailing slash;
//! 3. append the query string when there is at least one filter;
//! 4. basic auth, then `Content-Type` / `Accept`, then caller headers.
//!
//! Caller headers replace an existing header with the same name (ASCII
//! case-insensitive), so an explicit `Authorization` header wins over basic
//! auth and an explicit `Accept` overrides the JSON default.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::param::ParamValue;

/// Applied when a request carries no timeout, or a zero timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Whether the transport sends a request body for this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username and password for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Declarative description of one outgoing call.
///
/// Constructed fresh per call and consumed by [`RequestSpec::build`].
#[derive(Debug)]
pub struct RequestSpec {
    method: HttpMethod,
    url: String,
    path: Vec<String>,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    body: Option<serde_json::Result<Vec<u8>>>,
    timeout: Option<Duration>,
    basic_auth: Option<BasicAuth>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            path: Vec::new(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
            basic_auth: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Append one path segment.
    pub fn path(mut self, segment: impl ParamValue) -> Self {
        self.path.push(segment.to_param());
        self
    }

    /// Add one query filter. A repeated name keeps the last value.
    pub fn query(mut self, name: impl Into<String>, value: impl ParamValue) -> Self {
        self.query.insert(name.into(), value.to_param());
        self
    }

    pub fn queries<I, K, V>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ParamValue,
    {
        for (name, value) in filters {
            self.query.insert(name.into(), value.to_param());
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl ParamValue) -> Self {
        self.headers.insert(name.into(), value.to_param());
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// Attach a JSON body. Serialization errors are reported by `build`.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(serde_json::to_vec(body));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn effective_timeout(&self) -> Duration {
        match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Produce the transport-ready request.
    pub fn build(self) -> Result<PreparedRequest, ApiError> {
        let timeout = self.effective_timeout();

        let body = match self.body {
            Some(encoded) => Some(encoded.map_err(ApiError::Serialization)?),
            None => None,
        };

        let url = compose_url(&self.url, &self.path, &self.query)?;

        let mut headers = Vec::with_capacity(self.headers.len() + 3);
        if let Some(auth) = &self.basic_auth {
            headers.push(("Authorization".to_string(), auth.header_value()));
        }
        set_header(&mut headers, "Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        set_header(&mut headers, "Accept".to_string(), JSON_CONTENT_TYPE.to_string());
        for (name, value) in self.headers {
            set_header(&mut headers, name, value);
        }

        tracing::debug!(method = %self.method, %url, ?timeout, "prepared request");

        Ok(PreparedRequest {
            method: self.method,
            url,
            headers,
            body,
            timeout,
        })
    }
}

/// A fully composed request, ready for a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl PreparedRequest {
    /// First header matching `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn compose_url(
    base: &str,
    segments: &[String],
    query: &BTreeMap<String, String>,
) -> Result<String, ApiError> {
    let mut url = Url::parse(base).map_err(|e| ApiError::Transport(format!("invalid url {base:?}: {e}")))?;
    if segments.is_empty() && query.is_empty() {
        return Ok(base.to_string());
    }

    if !segments.is_empty() {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("url {base:?} cannot take path segments")))?;
        path.pop_if_empty();
        path.extend(segments.iter().map(String::as_str));
    }

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter());
    }

    Ok(url.into())
}

fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}
