use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, ACCESS_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn bearer() -> String {
    format!("Bearer {ACCESS_TOKEN}")
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, bearer())
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, bearer())
        .body(String::new())
        .unwrap()
}

const ACTIVATE: &str = r#"[{"op":"replace","path":"/","value":{"state":"ACTIVE"}}]"#;

/// Create and activate a plan on `app`, returning its id.
async fn active_plan(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/payments/billing-plans", r#"{"name":"Gold","type":"INFINITE"}"#))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_str().unwrap().to_string();
    let resp = app
        .clone()
        .oneshot(json_request("PATCH", &format!("/v1/payments/billing-plans/{id}"), ACTIVATE))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    id
}

// --- auth ---

#[tokio::test]
async fn missing_bearer_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/payments/billing-agreements/I-1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "AUTHENTICATION_FAILURE");
}

// --- plans ---

#[tokio::test]
async fn create_plan_returns_created_plan() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v1/payments/billing-plans",
            r#"{"name":"Gold","description":"Monthly","type":"INFINITE"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let plan = body_json(resp).await;
    assert!(plan["id"].as_str().unwrap().starts_with("P-"));
    assert_eq!(plan["state"], "CREATED");
    assert_eq!(plan["name"], "Gold");
    assert!(plan["create_time"].is_string());
    assert_eq!(plan["links"][0]["rel"], "self");
}

#[tokio::test]
async fn create_plan_without_name_is_validation_error() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/payments/billing-plans", r#"{"type":"INFINITE"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Invalid plan");
}

#[tokio::test]
async fn activate_unknown_plan_returns_404() {
    let resp = app()
        .oneshot(json_request("PATCH", "/v1/payments/billing-plans/P-NOPE", ACTIVATE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["name"], "INVALID_RESOURCE_ID");
}

#[tokio::test]
async fn activate_with_other_patch_is_rejected() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/payments/billing-plans", r#"{"name":"Gold"}"#))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = app
        .oneshot(json_request(
            "PATCH",
            &format!("/v1/payments/billing-plans/{id}"),
            r#"[{"op":"replace","path":"/","value":{"state":"INACTIVE"}}]"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn activate_returns_empty_body() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/payments/billing-plans", r#"{"name":"Gold"}"#))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = app
        .oneshot(json_request("PATCH", &format!("/v1/payments/billing-plans/{id}"), ACTIVATE))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

// --- agreements ---

#[tokio::test]
async fn agreement_with_full_plan_is_rejected() {
    let app = app();
    let id = active_plan(&app).await;
    let body = json!({ "name": "Agreement", "plan": { "id": id, "name": "Gold" } }).to_string();

    let resp = app
        .oneshot(json_request("POST", "/v1/payments/billing-agreements", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agreement_for_inactive_plan_is_rejected() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/payments/billing-plans", r#"{"name":"Gold"}"#))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_str().unwrap().to_string();
    let body = json!({ "name": "Agreement", "plan": { "id": id } }).to_string();

    let resp = app
        .oneshot(json_request("POST", "/v1/payments/billing-agreements", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Plan is not active");
}

#[tokio::test]
async fn agreement_lifecycle() {
    let app = app();
    let plan_id = active_plan(&app).await;
    let body = json!({
        "name": "Agreement",
        "description": "Monthly Gold",
        "plan": { "id": plan_id },
        "payer": { "payment_method": "paypal" },
    })
    .to_string();

    // create
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/payments/billing-agreements", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["plan"]["id"], plan_id.as_str());
    let approval = created["links"][0]["href"].as_str().unwrap();
    let token = approval.split("token=").nth(1).unwrap().to_string();
    assert!(token.starts_with("EC-"));

    // execute
    let resp = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/v1/payments/billing-agreements/{token}/agreement-execute"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let executed = body_json(resp).await;
    let agreement_id = executed["id"].as_str().unwrap().to_string();
    assert!(agreement_id.starts_with("I-"));
    assert_eq!(executed["state"], "Active");

    // execute again: 200 without an id
    let resp = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/v1/payments/billing-agreements/{token}/agreement-execute"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["id"], "");

    // get
    let resp = app
        .oneshot(empty_request("GET", &format!("/v1/payments/billing-agreements/{agreement_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["id"], agreement_id.as_str());
    assert_eq!(fetched["description"], "Monthly Gold");
    assert_eq!(fetched["payer"]["payment_method"], "paypal");
}

#[tokio::test]
async fn execute_unknown_token_is_rejected() {
    let resp = app()
        .oneshot(empty_request(
            "POST",
            "/v1/payments/billing-agreements/EC-UNKNOWN/agreement-execute",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["name"], "INVALID_TOKEN");
}

#[tokio::test]
async fn get_unknown_agreement_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/v1/payments/billing-agreements/I-NOPE"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
