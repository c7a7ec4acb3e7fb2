//! In-memory stand-in for PayPal's billing plan and agreement endpoints.
//!
//! Implements just enough of the real behavior to drive the client end to
//! end: bearer-token checks, plan creation and activation, agreement
//! creation with an approval token, execution and lookup. Failures use
//! PayPal's error document shape.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// The only bearer token the mock accepts.
pub const ACCESS_TOKEN: &str = "A21AA-mock-access-token";

#[derive(Clone, Debug)]
struct Plan {
    id: String,
    state: String,
    /// The plan record as the client sent it.
    definition: Value,
    create_time: String,
    update_time: String,
}

#[derive(Clone, Debug)]
struct Agreement {
    id: String,
    state: String,
    plan_id: String,
    /// Agreement request fields other than `plan`.
    request: Value,
}

#[derive(Default)]
struct Store {
    plans: HashMap<String, Plan>,
    /// Approval token -> agreement request awaiting execution.
    pending: HashMap<String, Agreement>,
    /// Tokens that were already executed.
    consumed: HashSet<String>,
    agreements: HashMap<String, Agreement>,
}

type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/v1/payments/billing-plans", post(create_plan))
        .route("/v1/payments/billing-plans/{id}", patch(update_plan))
        .route("/v1/payments/billing-agreements", post(create_agreement))
        .route("/v1/payments/billing-agreements/{id}", get(get_agreement))
        .route(
            "/v1/payments/billing-agreements/{id}/agreement-execute",
            post(execute_agreement),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn paypal_error(status: StatusCode, name: &str, message: &str) -> Failure {
    (
        status,
        Json(json!({
            "name": name,
            "message": message,
            "debug_id": Uuid::new_v4().simple().to_string(),
        })),
    )
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(paypal_error(
            StatusCode::UNAUTHORIZED,
            "AUTHENTICATION_FAILURE",
            "Authentication failed due to invalid authentication credentials or a missing Authorization header.",
        )),
    }
}

/// PayPal-style resource id: a prefix plus 24 upper-case alphanumerics.
fn resource_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{prefix}-{}", &raw[..24])
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn plan_json(plan: &Plan) -> Value {
    let mut body = plan.definition.clone();
    body["id"] = json!(plan.id);
    body["state"] = json!(plan.state);
    body["create_time"] = json!(plan.create_time);
    body["update_time"] = json!(plan.update_time);
    body["links"] = json!([{
        "href": format!("/v1/payments/billing-plans/{}", plan.id),
        "rel": "self",
        "method": "GET",
    }]);
    body
}

fn agreement_json(agreement: &Agreement) -> Value {
    let mut body = agreement.request.clone();
    body["id"] = json!(agreement.id);
    body["state"] = json!(agreement.state);
    body["plan"] = json!({ "id": agreement.plan_id });
    body["links"] = json!([{
        "href": format!("/v1/payments/billing-agreements/{}", agreement.id),
        "rel": "self",
        "method": "GET",
    }]);
    body
}

async fn create_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    authorize(&headers)?;
    let name = input.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.is_empty() {
        return Err(paypal_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Invalid plan",
        ));
    }

    let now = timestamp(Utc::now());
    let plan = Plan {
        id: resource_id("P"),
        state: "CREATED".to_string(),
        definition: input,
        create_time: now.clone(),
        update_time: now,
    };
    info!(plan_id = %plan.id, "created billing plan");
    let body = plan_json(&plan);
    db.write().await.plans.insert(plan.id.clone(), plan);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_plan(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(operations): Json<Value>,
) -> Result<StatusCode, Failure> {
    authorize(&headers)?;
    let expected = json!([{ "op": "replace", "path": "/", "value": { "state": "ACTIVE" } }]);
    if operations != expected {
        return Err(paypal_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Only plan activation is supported",
        ));
    }

    let mut store = db.write().await;
    let plan = store.plans.get_mut(&id).ok_or_else(|| {
        paypal_error(
            StatusCode::NOT_FOUND,
            "INVALID_RESOURCE_ID",
            "Requested resource ID was not found.",
        )
    })?;
    plan.state = "ACTIVE".to_string();
    plan.update_time = timestamp(Utc::now());
    info!(plan_id = %id, "activated billing plan");
    Ok(StatusCode::OK)
}

async fn create_agreement(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    authorize(&headers)?;
    let plan = input.get("plan").and_then(Value::as_object);
    let plan_id = match plan {
        Some(fields) if fields.len() == 1 => fields.get("id").and_then(Value::as_str),
        _ => None,
    };
    let Some(plan_id) = plan_id.map(str::to_string) else {
        return Err(paypal_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "plan must contain only an id",
        ));
    };

    let mut store = db.write().await;
    match store.plans.get(&plan_id) {
        Some(plan) if plan.state == "ACTIVE" => {}
        Some(_) => {
            return Err(paypal_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Plan is not active",
            ))
        }
        None => {
            return Err(paypal_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Plan not found",
            ))
        }
    }

    let token = resource_id("EC");
    let mut request = input.clone();
    if let Some(fields) = request.as_object_mut() {
        fields.remove("plan");
    }
    let pending = Agreement {
        id: String::new(),
        state: String::new(),
        plan_id: plan_id.clone(),
        request,
    };

    let mut body = input;
    body["plan"] = json!(store.plans.get(&plan_id).map(plan_json));
    body["links"] = json!([
        {
            "href": format!("https://www.sandbox.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token={token}"),
            "rel": "approval_url",
            "method": "REDIRECT",
        },
        {
            "href": format!("/v1/payments/billing-agreements/{token}/agreement-execute"),
            "rel": "execute",
            "method": "POST",
        },
    ]);
    info!(%token, %plan_id, "created billing agreement");
    store.pending.insert(token, pending);
    Ok((StatusCode::CREATED, Json(body)))
}

/// Executing an already-executed token answers 200 without an id, which the
/// client must treat as a failure.
async fn execute_agreement(
    State(db): State<Db>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let mut store = db.write().await;
    if store.consumed.contains(&token) {
        return Ok(Json(json!({ "id": "", "state": "" })));
    }
    let mut agreement = store.pending.remove(&token).ok_or_else(|| {
        paypal_error(
            StatusCode::BAD_REQUEST,
            "INVALID_TOKEN",
            "Token is invalid or has expired.",
        )
    })?;
    agreement.id = resource_id("I");
    agreement.state = "Active".to_string();
    info!(%token, agreement_id = %agreement.id, "executed billing agreement");

    let body = agreement_json(&agreement);
    store.consumed.insert(token);
    store.agreements.insert(agreement.id.clone(), agreement);
    Ok(Json(body))
}

async fn get_agreement(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    store
        .agreements
        .get(&id)
        .map(|agreement| Json(agreement_json(agreement)))
        .ok_or_else(|| {
            paypal_error(
                StatusCode::NOT_FOUND,
                "INVALID_PROFILE_ID",
                "The profile ID is invalid",
            )
        })
}
