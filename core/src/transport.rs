//! Executing prepared requests.
//!
//! # Design
//! `Transport` is the only place that performs I/O. The production
//! implementation wraps a blocking `ureq::Agent`; tests plug in closures that
//! return canned `RawResponse` values. Every transport gets `execute`, which
//! builds, sends and normalizes one call.
//!
//! The agent never treats HTTP statuses as errors and never follows
//! redirects: a 3xx response is handed back to the caller like any other, so
//! the `status > 300` classification stays with the caller.

use std::io;

use crate::error::ApiError;
use crate::http::{HttpMethod, PreparedRequest, RequestSpec};
use crate::response::{normalize, ExecutedResponse, RawResponse};

pub trait Transport: Send + Sync {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, ApiError>;

    /// Build, send and normalize one request.
    fn execute(&self, spec: RequestSpec) -> Result<ExecutedResponse, ApiError> {
        let request = spec.build()?;
        let raw = self.send(&request)?;
        tracing::debug!(method = %request.method, url = %request.url, status = raw.status, "request completed");
        normalize(raw)
    }
}

impl<F> Transport for F
where
    F: Fn(&PreparedRequest) -> Result<RawResponse, ApiError> + Send + Sync,
{
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, ApiError> {
        self(request)
    }
}

/// Blocking HTTP transport backed by `ureq`.
///
/// Cloning is cheap; clones share the agent's connection pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }

    fn configure<B>(&self, builder: ureq::RequestBuilder<B>, request: &PreparedRequest) -> ureq::RequestBuilder<B> {
        let mut builder = builder
            .config()
            .timeout_global(Some(request.timeout))
            .build();
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, ApiError> {
        let url = request.url.as_str();

        if request.body.is_some() && !request.method.carries_body() {
            tracing::warn!(method = %request.method, url, "dropping request body for method without body");
        }

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => self.configure(self.agent.get(url), request).call(),
            (HttpMethod::Head, _) => self.configure(self.agent.head(url), request).call(),
            (HttpMethod::Delete, _) => self.configure(self.agent.delete(url), request).call(),
            (HttpMethod::Post, Some(body)) => self.configure(self.agent.post(url), request).send(body),
            (HttpMethod::Post, None) => self.configure(self.agent.post(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => self.configure(self.agent.put(url), request).send(body),
            (HttpMethod::Put, None) => self.configure(self.agent.put(url), request).send_empty(),
            (HttpMethod::Patch, Some(body)) => self.configure(self.agent.patch(url), request).send(body),
            (HttpMethod::Patch, None) => self.configure(self.agent.patch(url), request).send_empty(),
        };

        let mut response = result.map_err(|e| classify(e, request))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| classify(e, request))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(error: ureq::Error, request: &PreparedRequest) -> ApiError {
    match error {
        ureq::Error::Timeout(_) => timed_out(request),
        ureq::Error::Io(source) if source.kind() == io::ErrorKind::TimedOut => timed_out(request),
        other => {
            tracing::debug!(method = %request.method, url = %request.url, error = %other, "transport failure");
            ApiError::Transport(other.to_string())
        }
    }
}

fn timed_out(request: &PreparedRequest) -> ApiError {
    tracing::warn!(method = %request.method, url = %request.url, timeout = ?request.timeout, "request timed out");
    ApiError::Timeout(request.timeout)
}
