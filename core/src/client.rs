//! Checkout preference and catalog endpoints.
//!
//! # Design
//! Every endpoint is split like the core: a `build_*` method produces the
//! `RequestSpec` (URL, bearer token, body) without I/O, and `parse_outcome`
//! turns an `ExecutedResponse` into an `Outcome`. The convenience methods
//! (`create_payment`, `get_payment`, ...) chain build, transport and parse.
//!
//! Each method takes an optional explicit access token; when absent the
//! token from `Config` is used.

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestSpec};
use crate::response::{ErrorEnvelope, ExecutedResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    IdentificationType, PaymentMethod, PaymentRequest, PaymentResponse, PaymentSearchParams,
    PaymentSearchResponse,
};

const PREFERENCES_PATH: &str = "/checkout/preferences";
const PREFERENCES_SEARCH_PATH: &str = "/checkout/preferences/search";
const IDENTIFICATION_TYPES_PATH: &str = "/v1/identification_types";
const PAYMENT_METHODS_PATH: &str = "/v1/payment_methods";

/// Result of one endpoint call that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// The provider answered with a status above 300.
    Rejected(ErrorEnvelope),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&ErrorEnvelope> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Rejected(envelope) => Some(envelope),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorEnvelope> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Rejected(envelope) => Err(envelope),
        }
    }
}

/// Client for the payment provider's REST API.
///
/// Holds no per-call state; share it across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PaymentClient<T = UreqTransport> {
    config: Config,
    transport: T,
}

impl PaymentClient<UreqTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> PaymentClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a request against the configured base URL, authenticated with
    /// the resolved token.
    pub fn request(&self, method: HttpMethod, path: &str, token: Option<&str>) -> Result<RequestSpec, ApiError> {
        let token = self.config.resolve_token(token)?;
        let base = self.config.base_url().trim_end_matches('/');
        let mut spec = RequestSpec::new(method, format!("{base}{path}")).bearer(&token);
        if let Some(timeout) = self.config.timeout() {
            spec = spec.timeout(timeout);
        }
        Ok(spec)
    }

    pub fn build_create_payment(&self, input: &PaymentRequest, token: Option<&str>) -> Result<RequestSpec, ApiError> {
        Ok(self.request(HttpMethod::Post, PREFERENCES_PATH, token)?.json(input))
    }

    pub fn build_update_payment(
        &self,
        id: &str,
        input: &PaymentRequest,
        token: Option<&str>,
    ) -> Result<RequestSpec, ApiError> {
        Ok(self
            .request(HttpMethod::Put, PREFERENCES_PATH, token)?
            .path(id)
            .json(input))
    }

    pub fn build_get_payment(&self, id: &str, token: Option<&str>) -> Result<RequestSpec, ApiError> {
        Ok(self.request(HttpMethod::Get, PREFERENCES_PATH, token)?.path(id))
    }

    pub fn build_search_payments(
        &self,
        params: &PaymentSearchParams,
        token: Option<&str>,
    ) -> Result<RequestSpec, ApiError> {
        Ok(self
            .request(HttpMethod::Get, PREFERENCES_SEARCH_PATH, token)?
            .queries(params.iter()))
    }

    pub fn build_identification_types(&self, token: Option<&str>) -> Result<RequestSpec, ApiError> {
        self.request(HttpMethod::Get, IDENTIFICATION_TYPES_PATH, token)
    }

    pub fn build_payment_methods(&self, token: Option<&str>) -> Result<RequestSpec, ApiError> {
        self.request(HttpMethod::Get, PAYMENT_METHODS_PATH, token)
    }

    pub fn create_payment(
        &self,
        input: &PaymentRequest,
        token: Option<&str>,
    ) -> Result<Outcome<PaymentResponse>, ApiError> {
        self.call(self.build_create_payment(input, token)?)
    }

    pub fn update_payment(
        &self,
        id: &str,
        input: &PaymentRequest,
        token: Option<&str>,
    ) -> Result<Outcome<PaymentResponse>, ApiError> {
        self.call(self.build_update_payment(id, input, token)?)
    }

    pub fn get_payment(&self, id: &str, token: Option<&str>) -> Result<Outcome<PaymentResponse>, ApiError> {
        self.call(self.build_get_payment(id, token)?)
    }

    pub fn search_payments(
        &self,
        params: &PaymentSearchParams,
        token: Option<&str>,
    ) -> Result<Outcome<PaymentSearchResponse>, ApiError> {
        self.call(self.build_search_payments(params, token)?)
    }

    pub fn identification_types(&self, token: Option<&str>) -> Result<Outcome<Vec<IdentificationType>>, ApiError> {
        self.call(self.build_identification_types(token)?)
    }

    pub fn payment_methods(&self, token: Option<&str>) -> Result<Outcome<Vec<PaymentMethod>>, ApiError> {
        self.call(self.build_payment_methods(token)?)
    }

    fn call<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<Outcome<R>, ApiError> {
        let response = self.transport.execute(spec)?;
        parse_outcome(&response)
    }
}

/// Split a response into the success payload or the provider's error.
pub fn parse_outcome<R: DeserializeOwned>(response: &ExecutedResponse) -> Result<Outcome<R>, ApiError> {
    if response.is_error() {
        let envelope = response.error_envelope()?;
        tracing::warn!(
            status = response.status,
            error = %envelope.error,
            message = %envelope.message,
            "provider rejected request"
        );
        return Ok(Outcome::Rejected(envelope));
    }
    response.json().map(Outcome::Success)
}
