use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ErrorBody};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "Bearer TEST-1234";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, TOKEN)
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, TOKEN)
        .body(String::new())
        .unwrap()
}

const PREFERENCE: &str = r#"{"external_reference":"ref-1","items":[{"title":"Plan","quantity":1,"unit_price":50}]}"#;

// --- auth ---

#[tokio::test]
async fn missing_token_returns_401_envelope() {
    let resp = app()
        .oneshot(Request::builder().uri("/v1/payment_methods").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "unauthorized");
    assert_eq!(body.status, 401);
}

// --- create ---

#[tokio::test]
async fn create_preference_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/checkout/preferences", PREFERENCE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    assert!(created["id"].as_str().unwrap().starts_with("144567999-"));
    assert_eq!(created["external_reference"], "ref-1");
    assert!(created["init_point"].as_str().unwrap().contains("pref_id="));
}

#[tokio::test]
async fn create_preference_without_price_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/checkout/preferences",
            r#"{"items":[{"title":"Plan"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "invalid_items");
}

// --- get / update ---

#[tokio::test]
async fn get_unknown_preference_returns_404() {
    let resp = app().oneshot(get_request("/checkout/preferences/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "not_found");
}

#[tokio::test]
async fn update_unknown_preference_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/checkout/preferences/nope", r#"{"expires":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- catalog ---

#[tokio::test]
async fn identification_types_is_a_top_level_array() {
    let resp = app().oneshot(get_request("/v1/identification_types")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let types: Value = body_json(resp).await;
    assert_eq!(types.as_array().unwrap().len(), 2);
    assert_eq!(types[0]["id"], "CPF");
}

// --- quirks ---

#[tokio::test]
async fn quirk_empty_has_no_body() {
    let resp = app()
        .oneshot(Request::builder().uri("/quirks/empty").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn quirk_not_json_is_plain_text() {
    let resp = app()
        .oneshot(Request::builder().uri("/quirks/not-json").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"not json");
}

#[tokio::test]
async fn quirk_redirect_carries_json() {
    let resp = app()
        .oneshot(Request::builder().uri("/quirks/redirect").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "moved permanently");
}

#[tokio::test]
async fn quirk_echo_reflects_request() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/quirks/echo/a/b?x=1")
                .header("x-trace", "t-1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "DELETE");
    assert_eq!(body["path"], "/quirks/echo/a/b");
    assert_eq!(body["query"], "x=1");
    assert_eq!(body["headers"]["x-trace"], json!(["t-1"]));
}

// --- full preference lifecycle ---

#[tokio::test]
async fn preference_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/checkout/preferences", PREFERENCE))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/checkout/preferences/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, created);

    // update: only the fields sent change
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/checkout/preferences/{id}"),
            r#"{"external_reference":"ref-2","id":"hijack"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["external_reference"], "ref-2");
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["items"], created["items"]);

    // search by the new reference
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/checkout/preferences/search?external_reference=ref-2&limit=10"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Value = body_json(resp).await;
    assert_eq!(found["total"], 1);
    assert_eq!(found["elements"][0]["id"], id.as_str());
    assert_eq!(found["elements"][0]["items"], json!(["Plan"]));

    // search by the old reference finds nothing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/checkout/preferences/search?external_reference=ref-1"))
        .await
        .unwrap();
    let found: Value = body_json(resp).await;
    assert_eq!(found["total"], 0);
    assert!(found["elements"].as_array().unwrap().is_empty());
}
