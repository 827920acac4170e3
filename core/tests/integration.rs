//! End-to-end tests against the mock provider over real HTTP.
//!
//! # Design
//! Each test starts the mock server on a random port in a background tokio
//! runtime, then drives `PaymentClient` and `UreqTransport` against it. This
//! checks request composition, the ureq transport and response normalization
//! together, including the provider quirks the normalizer exists for.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mercadopago_core::{
    ApiError, Config, Item, PaymentClient, PaymentRequest, PaymentSearchParams, RequestSpec, Transport,
    UreqTransport,
};

const TOKEN: &str = "TEST-1234936262199689";

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> PaymentClient {
    PaymentClient::new(Config::new(TOKEN).with_base_url(base_url))
}

fn plan(reference: &str) -> PaymentRequest {
    PaymentRequest {
        external_reference: reference.to_string(),
        items: vec![Item {
            title: "Monthly plan".to_string(),
            quantity: 1.0,
            unit_price: 50.0,
            currency_id: "BRL".to_string(),
            ..Item::default()
        }],
        ..PaymentRequest::default()
    }
}

#[test]
fn preference_lifecycle() {
    let base = start_server();
    let client = client(&base);

    // Step 1: create.
    let created = client
        .create_payment(&plan("test-00001"), None)
        .unwrap()
        .into_result()
        .unwrap();
    assert!(created.id.starts_with("144567999-"));
    assert_eq!(created.external_reference, "test-00001");
    assert_eq!(created.items[0].unit_price, 50.0);
    assert!(created.init_point.contains(&created.id));
    assert!(created.date_created.is_some());

    // Step 2: get.
    let fetched = client
        .get_payment(&created.id, None)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(fetched, created);

    // Step 3: update.
    let updated = client
        .update_payment(&created.id, &plan("test-00002"), None)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.external_reference, "test-00002");

    // Step 4: search by the new reference.
    let params = PaymentSearchParams::new().filter("external_reference", "test-00002");
    let found = client
        .search_payments(&params, None)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.elements[0].id, created.id);
    assert_eq!(found.elements[0].items, vec!["Monthly plan".to_string()]);

    // Step 5: an unknown preference is a provider rejection, not an error.
    let outcome = client.get_payment("does-not-exist", None).unwrap();
    let envelope = outcome.rejection().unwrap();
    assert_eq!(envelope.error, "not_found");
    assert_eq!(envelope.status, 404);
}

#[test]
fn invalid_items_are_rejected_by_provider() {
    let base = start_server();
    let mut request = plan("test-00003");
    request.items[0].unit_price = 0.0;
    request.items[0].quantity = 0.0;

    let outcome = client(&base).create_payment(&request, None).unwrap();

    let envelope = outcome.rejection().unwrap();
    assert_eq!(envelope.error, "invalid_items");
    assert_eq!(envelope.status, 400);
    assert!(envelope.message.contains("quantity"));
}

#[test]
fn catalog_endpoints_decode_top_level_arrays() {
    let base = start_server();
    let client = client(&base);

    let types = client.identification_types(None).unwrap().into_result().unwrap();
    assert_eq!(
        types.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["CPF", "CNPJ"]
    );

    let methods = client.payment_methods(None).unwrap().into_result().unwrap();
    assert_eq!(methods[0].id, "visa");
    assert_eq!(methods[0].settings[0].security_code.length, 3);
    assert_eq!(methods[1].financial_institutions[0].id, "bradesco");

    // The untyped view wraps the array under "data".
    let raw = client
        .transport()
        .execute(client.build_identification_types(None).unwrap())
        .unwrap();
    assert_eq!(raw.body["data"][1]["id"], "CNPJ");
    assert_eq!(raw.header("content-type"), Some("application/json"));
}

#[test]
fn explicit_token_and_missing_token() {
    let base = start_server();
    let anonymous = PaymentClient::new(Config::default().with_base_url(&base));

    // No token anywhere: fails locally.
    let err = anonymous.payment_methods(None).unwrap_err();
    assert!(matches!(err, ApiError::MissingCredentials));

    // Explicit token: accepted.
    let outcome = anonymous.payment_methods(Some(TOKEN)).unwrap();
    assert!(outcome.is_success());

    // No Authorization header on the wire: provider answers 401.
    let resp = UreqTransport::new()
        .execute(RequestSpec::get(format!("{base}/v1/payment_methods")))
        .unwrap();
    assert!(resp.is_error());
    assert_eq!(resp.status, 401);
    assert_eq!(resp.error_envelope().unwrap().error, "unauthorized");
}

#[test]
fn normalizer_handles_provider_quirks() {
    let base = start_server();
    let transport = UreqTransport::new();

    // Success without content.
    let resp = transport
        .execute(RequestSpec::get(format!("{base}/quirks/empty")))
        .unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.body.is_empty());
    assert!(resp.raw_body.is_empty());

    // Error page that is not JSON.
    let err = transport
        .execute(RequestSpec::get(format!("{base}/quirks/not-json")))
        .unwrap_err();
    assert!(matches!(err, ApiError::ResponseDecode { .. }));
    assert!(err.to_string().contains("not json"));

    // Redirects are not followed and land in the error branch.
    let resp = transport
        .execute(RequestSpec::get(format!("{base}/quirks/redirect")))
        .unwrap();
    assert_eq!(resp.status, 301);
    assert!(resp.is_error());
    assert_eq!(resp.body["message"], "moved permanently");

    // Scalars are wrapped like arrays.
    let resp = transport
        .execute(RequestSpec::get(format!("{base}/quirks/scalar")))
        .unwrap();
    assert_eq!(resp.body["data"], 42);
    assert_eq!(resp.raw_body, b"42".to_vec());
}

#[test]
fn request_composition_reaches_the_wire() {
    let base = start_server();

    let resp = UreqTransport::new()
        .execute(
            RequestSpec::put(format!("{base}/quirks/echo/"))
                .path("pref 1")
                .path(7)
                .query("external_reference", "ref 1")
                .query("limit", 10)
                .header("Accept", "text/plain")
                .header("X-Idempotency-Key", "key-1")
                .basic_auth("user", "pass")
                .bearer("EXPLICIT")
                .json(&serde_json::json!({"expires": true})),
        )
        .unwrap();

    assert_eq!(resp.body["method"], "PUT");
    assert_eq!(resp.body["path"], "/quirks/echo/pref%201/7");
    assert_eq!(resp.body["query"], "external_reference=ref+1&limit=10");

    let headers = &resp.body["headers"];
    assert_eq!(headers["authorization"], serde_json::json!(["Bearer EXPLICIT"]));
    assert_eq!(headers["accept"][0], "text/plain");
    assert_eq!(headers["content-type"], serde_json::json!(["application/json"]));
    assert_eq!(headers["x-idempotency-key"], serde_json::json!(["key-1"]));
}

#[test]
fn basic_auth_alone_is_sent() {
    let base = start_server();

    let resp = UreqTransport::new()
        .execute(RequestSpec::get(format!("{base}/quirks/echo")).basic_auth("user", "pass"))
        .unwrap();

    assert_eq!(
        resp.body["headers"]["authorization"],
        serde_json::json!(["Basic dXNlcjpwYXNz"])
    );
}

#[test]
fn slow_response_times_out() {
    let base = start_server();
    let timeout = Duration::from_millis(200);

    let started = Instant::now();
    let err = UreqTransport::new()
        .execute(RequestSpec::get(format!("{base}/quirks/slow")).timeout(timeout))
        .unwrap_err();

    assert!(matches!(err, ApiError::Timeout(t) if t == timeout), "got {err:?}");
    assert!(started.elapsed() < mock_server::SLOW_DELAY);
}

#[test]
fn concurrent_calls_share_one_client() {
    let base = start_server();
    let client = Arc::new(client(&base));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                let reference = format!("concurrent-{i}");
                let created = client
                    .create_payment(&plan(&reference), None)
                    .unwrap()
                    .into_result()
                    .unwrap();
                let fetched = client
                    .get_payment(&created.id, None)
                    .unwrap()
                    .into_result()
                    .unwrap();
                assert_eq!(fetched.external_reference, reference);
                created.id
            })
        })
        .collect();

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}
