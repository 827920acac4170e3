//! Blocking client for the Mercado Pago REST API.
//!
//! # Overview
//! The core is a generic request executor: a declarative `RequestSpec` is
//! built into a `PreparedRequest`, sent by a `Transport`, and the reply is
//! normalized into an `ExecutedResponse` whose decoded body is always a JSON
//! object. `PaymentClient` layers the checkout preference and catalog
//! endpoints on top.
//!
//! # Design
//! - Building and normalizing are pure; only `Transport::send` does I/O, so
//!   every composition and classification rule is testable without a server.
//! - One call is one blocking round-trip. There is no retry and no state
//!   shared between calls apart from the transport's connection pool.
//! - Callers split success from provider errors on `status > 300`; that
//!   includes redirects, which the transport never follows.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod param;
pub mod response;
pub mod transport;
pub mod types;

pub use client::{parse_outcome, Outcome, PaymentClient};
pub use config::Config;
pub use error::{ApiError, Result};
pub use http::{BasicAuth, HttpMethod, PreparedRequest, RequestSpec, DEFAULT_TIMEOUT};
pub use param::ParamValue;
pub use response::{normalize, ErrorEnvelope, ExecutedResponse, RawResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    IdentificationType, Item, Payer, PayerIdentification, PaymentMethod, PaymentRequest, PaymentResponse,
    PaymentSearchParams, PaymentSearchResponse, WebhookNotification,
};
