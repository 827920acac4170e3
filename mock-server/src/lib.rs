//! In-memory stand-in for the payment provider.
//!
//! Serves the checkout preference and catalog routes with the provider's
//! response shapes (error envelopes, top-level arrays), plus a handful of
//! `/quirks/*` routes that reproduce awkward replies: empty bodies, non-JSON
//! error pages, redirects, slow answers.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const COLLECTOR_ID: u64 = 144567999;

/// How long `/quirks/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

const CREATED_AT: &str = "2024-01-15T10:00:00.000-04:00";

/// Provider error payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub status: u16,
}

type Failure = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, error: &str, message: impl Into<String>) -> Failure {
    let body = ErrorBody {
        error: error.to_string(),
        message: message.into(),
        status: status.as_u16(),
    };
    tracing::debug!(status = body.status, error = %body.error, message = %body.message, "rejecting request");
    (status, Json(body))
}

pub type Db = Arc<RwLock<HashMap<String, Map<String, Value>>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/checkout/preferences", post(create_preference))
        .route("/checkout/preferences/search", get(search_preferences))
        .route("/checkout/preferences/{id}", get(get_preference).put(update_preference))
        .route("/v1/identification_types", get(identification_types))
        .route("/v1/payment_methods", get(payment_methods))
        .route("/quirks/empty", get(quirk_empty))
        .route("/quirks/not-json", get(quirk_not_json))
        .route("/quirks/redirect", get(quirk_redirect))
        .route("/quirks/scalar", get(quirk_scalar))
        .route("/quirks/slow", get(quirk_slow))
        .route("/quirks/echo", any(quirk_echo))
        .route("/quirks/echo/{*rest}", any(quirk_echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "must provide your access_token to proceed",
        ));
    }
    Ok(())
}

fn validate_items(preference: &Map<String, Value>) -> Result<(), Failure> {
    let items = match preference.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(failure(StatusCode::BAD_REQUEST, "invalid_items", "items needed"));
        }
    };
    for (index, item) in items.iter().enumerate() {
        for field in ["quantity", "unit_price"] {
            let value = item.get(field).and_then(Value::as_f64).unwrap_or(0.0);
            if value <= 0.0 {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    "invalid_items",
                    format!("items[{index}].{field} must be positive"),
                ));
            }
        }
    }
    Ok(())
}

async fn create_preference(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(mut input): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Map<String, Value>>), Failure> {
    authorize(&headers)?;
    validate_items(&input)?;

    let id = format!("{COLLECTOR_ID}-{}", Uuid::new_v4());
    input.insert("id".to_string(), json!(id));
    input.insert("collector_id".to_string(), json!(COLLECTOR_ID));
    input.insert("operation_type".to_string(), json!("regular_payment"));
    input.insert("date_created".to_string(), json!(CREATED_AT));
    input.insert(
        "init_point".to_string(),
        json!(format!("https://www.mercadopago.com/checkout/v1/redirect?pref_id={id}")),
    );
    input.insert(
        "sandbox_init_point".to_string(),
        json!(format!("https://sandbox.mercadopago.com/checkout/v1/redirect?pref_id={id}")),
    );

    db.write().await.insert(id.clone(), input.clone());
    tracing::debug!(%id, "preference created");
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_preference(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Map<String, Value>>, Failure> {
    authorize(&headers)?;
    let preferences = db.read().await;
    preferences
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

async fn update_preference(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Map<String, Value>>, Failure> {
    authorize(&headers)?;
    if input.contains_key("items") {
        validate_items(&input)?;
    }
    let mut preferences = db.write().await;
    let preference = preferences.get_mut(&id).ok_or_else(|| not_found(&id))?;
    for (key, value) in input {
        if key != "id" {
            preference.insert(key, value);
        }
    }
    Ok(Json(preference.clone()))
}

fn not_found(id: &str) -> Failure {
    failure(StatusCode::NOT_FOUND, "not_found", format!("preference {id} not found"))
}

async fn search_preferences(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let preferences = db.read().await;
    let mut elements: Vec<Value> = preferences
        .values()
        .filter(|preference| {
            filters
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "offset" | "limit"))
                .all(|(key, expected)| match preference.get(key) {
                    Some(Value::String(actual)) => actual == expected,
                    Some(other) => other.to_string() == *expected,
                    None => false,
                })
        })
        .map(search_element)
        .collect();
    elements.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));

    let total = elements.len();
    Ok(Json(json!({
        "next_offset": total,
        "total": total,
        "elements": elements,
    })))
}

fn search_element(preference: &Map<String, Value>) -> Value {
    let titles: Vec<Value> = preference
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|i| i.get("title").cloned()).collect())
        .unwrap_or_default();
    json!({
        "id": preference.get("id"),
        "collector_id": COLLECTOR_ID,
        "external_reference": preference.get("external_reference"),
        "date_created": CREATED_AT,
        "expires": preference.get("expires").cloned().unwrap_or(json!(false)),
        "items": titles,
        "operation_type": "regular_payment",
        "processing_modes": ["aggregator"],
        "site_id": "MLB",
    })
}

async fn identification_types(headers: HeaderMap) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    Ok(Json(json!([
        {"id": "CPF", "name": "CPF", "type": "number", "min_length": 11, "max_length": 11},
        {"id": "CNPJ", "name": "CNPJ", "type": "number", "min_length": 14, "max_length": 14},
    ])))
}

async fn payment_methods(headers: HeaderMap) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    Ok(Json(json!([
        {
            "id": "visa",
            "name": "Visa",
            "payment_type_id": "credit_card",
            "status": "active",
            "deferred_capture": "supported",
            "settings": [{
                "bin": {"pattern": "^4", "exclusion_pattern": "", "installments_pattern": "^4"},
                "card_number": {"length": 16, "validation": "standard"},
                "security_code": {"mode": "mandatory", "length": 3, "card_location": "back"}
            }],
            "additional_info_needed": ["cardholder_name", "cardholder_identification_number"],
            "min_allowed_amount": 0.5,
            "max_allowed_amount": 60000,
            "accreditation_time": 2880,
            "financial_institutions": [],
            "processing_modes": ["aggregator"]
        },
        {
            "id": "bolbradesco",
            "name": "Boleto",
            "payment_type_id": "ticket",
            "status": "active",
            "settings": [],
            "min_allowed_amount": 4,
            "max_allowed_amount": 100000,
            "accreditation_time": 4320,
            "financial_institutions": [{"id": "bradesco", "description": "Bradesco"}],
            "processing_modes": ["aggregator"]
        }
    ])))
}

async fn quirk_empty() -> StatusCode {
    StatusCode::OK
}

async fn quirk_not_json() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not json")
}

async fn quirk_redirect() -> (StatusCode, Json<Value>) {
    (StatusCode::MOVED_PERMANENTLY, Json(json!({"message": "moved permanently"})))
}

async fn quirk_scalar() -> Json<Value> {
    Json(json!(42))
}

async fn quirk_slow() -> Response {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({"slow": true})).into_response()
}

/// Reflects the request back as a JSON object.
async fn quirk_echo(method: Method, uri: Uri, headers: HeaderMap) -> Json<Value> {
    let mut echoed = Map::new();
    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| json!(String::from_utf8_lossy(v.as_bytes())))
            .collect();
        echoed.insert(name.as_str().to_string(), Value::Array(values));
    }
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": echoed,
    }))
}
