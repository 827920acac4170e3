//! Payload types for the checkout preference and catalog endpoints.
//!
//! Request types derive `Default` so callers fill in only what they need.
//! Response types default every missing field, and every non-optional field
//! sent as `null`: the provider omits or nulls fields freely depending on the
//! preference's configuration.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::param::ParamValue;

/// Body of a create or update preference call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRequest {
    /// Caller-side identifier used to reconcile the payment.
    pub external_reference: String,
    pub items: Vec<Item>,
    pub additional_info: String,
    /// `approved` redirects only on success, `all` on every outcome.
    pub auto_return: String,
    pub back_urls: BackUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_expiration: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date_from: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date_to: Option<DateTime<FixedOffset>>,
    pub expires: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential_pricing: Option<DifferentialPricing>,
    pub marketplace: String,
    pub marketplace_fee: f64,
    pub notification_url: String,
    pub payer: Payer,
    pub payment_methods: PaymentMethods,
    /// Text shown on the buyer's card statement.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub statement_descriptor: String,
    pub shipments: Shipments,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
}

/// A checkout preference as stored by the provider.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentResponse {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub collector_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub client_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub site_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub operation_type: String,
    #[serde_as(as = "DefaultOnNull")]
    pub items: Vec<Item>,
    #[serde_as(as = "DefaultOnNull")]
    pub payer: Payer,
    #[serde_as(as = "DefaultOnNull")]
    pub back_urls: BackUrls,
    #[serde_as(as = "DefaultOnNull")]
    pub auto_return: String,
    #[serde_as(as = "DefaultOnNull")]
    pub payment_methods: PaymentMethods,
    #[serde_as(as = "DefaultOnNull")]
    pub marketplace: String,
    #[serde_as(as = "DefaultOnNull")]
    pub marketplace_fee: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub shipments: Shipments,
    #[serde_as(as = "DefaultOnNull")]
    pub notification_url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub external_reference: String,
    #[serde_as(as = "DefaultOnNull")]
    pub additional_info: String,
    #[serde_as(as = "DefaultOnNull")]
    pub expires: bool,
    pub date_of_expiration: Option<DateTime<FixedOffset>>,
    pub expiration_date_from: Option<DateTime<FixedOffset>>,
    pub expiration_date_to: Option<DateTime<FixedOffset>>,
    pub date_created: Option<DateTime<FixedOffset>>,
    /// Checkout link for the buyer.
    #[serde_as(as = "DefaultOnNull")]
    pub init_point: String,
    #[serde_as(as = "DefaultOnNull")]
    pub sandbox_init_point: String,
}

/// Where the buyer lands after checkout, per outcome.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackUrls {
    #[serde_as(as = "DefaultOnNull")]
    pub success: String,
    #[serde_as(as = "DefaultOnNull")]
    pub pending: String,
    #[serde_as(as = "DefaultOnNull")]
    pub failure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentialPricing {
    pub id: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payer {
    #[serde_as(as = "DefaultOnNull")]
    pub phone: PayerPhone,
    #[serde_as(as = "DefaultOnNull")]
    pub identification: PayerIdentification,
    #[serde_as(as = "DefaultOnNull")]
    pub address: PayerAddress,
    #[serde_as(as = "DefaultOnNull")]
    pub email: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub surname: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayerPhone {
    #[serde_as(as = "DefaultOnNull")]
    pub area_code: String,
    #[serde_as(as = "DefaultOnNull")]
    pub number: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayerIdentification {
    /// Document kind, e.g. `CPF` or `CNPJ`.
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub kind: String,
    #[serde_as(as = "DefaultOnNull")]
    pub number: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayerAddress {
    #[serde_as(as = "DefaultOnNull")]
    pub zip_code: String,
    #[serde_as(as = "DefaultOnNull")]
    pub street_name: String,
    pub street_number: Option<String>,
}

/// Payment options allowed for one preference.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethods {
    #[serde_as(as = "DefaultOnNull")]
    pub excluded_payment_methods: Vec<PaymentMethodId>,
    #[serde_as(as = "DefaultOnNull")]
    pub excluded_payment_types: Vec<PaymentMethodId>,
    pub default_payment_method_id: Option<String>,
    /// Maximum number of installments.
    pub installments: Option<u32>,
    pub default_installments: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodId {
    pub id: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub title: String,
    #[serde_as(as = "DefaultOnNull")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde_as(as = "DefaultOnNull")]
    pub picture_url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub category_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub quantity: f64,
    /// ISO-4217 code.
    #[serde_as(as = "DefaultOnNull")]
    pub currency_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub unit_price: f64,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipments {
    /// `custom`, `me2` or `not_specified`.
    #[serde_as(as = "DefaultOnNull")]
    pub mode: String,
    #[serde_as(as = "DefaultOnNull")]
    pub local_pickup: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub dimensions: String,
    #[serde_as(as = "DefaultOnNull")]
    pub default_shipping_method: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub free_methods: Vec<i64>,
    #[serde_as(as = "DefaultOnNull")]
    pub cost: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub free_shipping: bool,
    pub receiver_address: Option<Address>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde_as(as = "DefaultOnNull")]
    pub zip_code: String,
    #[serde_as(as = "DefaultOnNull")]
    pub street_name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub city_name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub state_name: String,
    pub street_number: Option<i64>,
    #[serde_as(as = "DefaultOnNull")]
    pub floor: String,
    #[serde_as(as = "DefaultOnNull")]
    pub apartment: String,
}

/// Conversion tracking run during checkout (`google_ad`, `facebook_ad`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "value")]
    pub values: String,
}

/// Criteria filters for the preference search endpoint.
///
/// Any preference field can be filtered on, e.g. `external_reference=525`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentSearchParams(BTreeMap<String, String>);

impl PaymentSearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl ParamValue) -> Self {
        self.0.insert(name.into(), value.to_param());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSearchResponse {
    #[serde_as(as = "DefaultOnNull")]
    pub next_offset: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub total: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub elements: Vec<PaymentSearchElement>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSearchElement {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub shipping_mode: String,
    #[serde_as(as = "DefaultOnNull")]
    pub collector_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub corporation_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub external_reference: String,
    pub payer_id: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub payer_email: String,
    #[serde_as(as = "DefaultOnNull")]
    pub processing_modes: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub product_id: String,
    pub date_created: Option<DateTime<FixedOffset>>,
    pub expiration_date_from: Option<DateTime<FixedOffset>>,
    pub expiration_date_to: Option<DateTime<FixedOffset>>,
    #[serde_as(as = "DefaultOnNull")]
    pub marketplace: String,
    #[serde_as(as = "DefaultOnNull")]
    pub client_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub site_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub expires: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub items: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub operation_type: String,
}

/// A kind of identity document accepted by the provider.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationType {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub kind: String,
    #[serde_as(as = "DefaultOnNull")]
    pub min_length: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub max_length: u32,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethod {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    /// `ticket`, `atm`, `credit_card`, `debit_card` or `prepaid_card`.
    #[serde_as(as = "DefaultOnNull")]
    pub payment_type_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub status: String,
    #[serde_as(as = "DefaultOnNull")]
    pub secure_thumbnail: String,
    #[serde_as(as = "DefaultOnNull")]
    pub thumbnail: String,
    #[serde_as(as = "DefaultOnNull")]
    pub deferred_capture: String,
    #[serde_as(as = "DefaultOnNull")]
    pub settings: Vec<PaymentMethodSettings>,
    #[serde_as(as = "DefaultOnNull")]
    pub additional_info_needed: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub min_allowed_amount: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub max_allowed_amount: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub accreditation_time: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub financial_institutions: Vec<FinancialInstitution>,
    #[serde_as(as = "DefaultOnNull")]
    pub processing_modes: Vec<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethodSettings {
    #[serde_as(as = "DefaultOnNull")]
    pub bin: BinSettings,
    #[serde_as(as = "DefaultOnNull")]
    pub card_number: CardNumberSettings,
    #[serde_as(as = "DefaultOnNull")]
    pub security_code: SecurityCodeSettings,
}

/// Regular expressions over card BINs.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinSettings {
    #[serde_as(as = "DefaultOnNull")]
    pub pattern: String,
    #[serde_as(as = "DefaultOnNull")]
    pub exclusion_pattern: String,
    #[serde_as(as = "DefaultOnNull")]
    pub installments_pattern: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardNumberSettings {
    #[serde_as(as = "DefaultOnNull")]
    pub length: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub validation: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityCodeSettings {
    /// `mandatory` or `optional`.
    #[serde_as(as = "DefaultOnNull")]
    pub mode: String,
    #[serde_as(as = "DefaultOnNull")]
    pub length: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub card_location: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialInstitution {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub description: String,
}

/// Notification the provider posts to a preference's `notification_url`.
///
/// Only `data.id` matters: fetch the payment with it to learn the new state.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookNotification {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub live_mode: bool,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub kind: String,
    #[serde_as(as = "DefaultOnNull")]
    pub date_created: String,
    #[serde_as(as = "DefaultOnNull")]
    pub application_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub user_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub version: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub api_version: String,
    #[serde_as(as = "DefaultOnNull")]
    pub action: String,
    #[serde_as(as = "DefaultOnNull")]
    pub data: WebhookPaymentId,
}

impl WebhookNotification {
    pub fn from_slice(body: &[u8]) -> Result<Self, crate::error::ApiError> {
        serde_json::from_slice(body).map_err(crate::error::ApiError::Deserialization)
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookPaymentId {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
}
