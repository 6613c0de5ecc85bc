//! Drives the bridge end to end through the router against an in-memory
//! database.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use gym_desk::{build_router, config::Config, db, state::AppState};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

async fn app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::connect("sqlite::memory:").await.unwrap();
    let config = Config {
        receipts_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    (build_router(AppState::new(pool, config)), dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn registration(code: &str, initial_payment: &str) -> Value {
    json!({
        "memberCode": code,
        "fullName": "Asha Rao",
        "phone": "9800000000",
        "membership": {
            "planType": "monthly",
            "registrationFee": "500",
            "packageFee": "1500",
            "discount": "100",
            "initialPayment": initial_payment,
            "paymentType": "cash"
        }
    })
}

#[tokio::test]
async fn health_reports_connected_database() {
    let (app, _dir) = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn payments_reduce_due_until_paid() {
    let (app, _dir) = app().await;

    let (status, body) = send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-001", "0"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let member = &body["data"]["member"];
    assert_eq!(member["membershipFees"], "1900.00");
    assert_eq!(member["dueAmount"], "1900.00");
    assert!(body["data"]["receipt"].is_null());
    let id = member["id"].as_str().unwrap().to_string();
    let pay_uri = format!("/api/v1/members/{id}/payments");

    let (status, body) = send(
        &app,
        Method::POST,
        &pay_uri,
        Some(json!({ "amount": "1000", "paymentType": "upi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["member"]["dueAmount"], "900.00");
    assert_eq!(body["data"]["member"]["paymentStatus"], "partial");

    let (status, body) = send(
        &app,
        Method::POST,
        &pay_uri,
        Some(json!({ "amount": "950", "paymentType": "upi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("exceeds"));

    let (status, body) = send(
        &app,
        Method::POST,
        &pay_uri,
        Some(json!({ "amount": "900", "paymentType": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["member"]["dueAmount"], "0.00");
    assert_eq!(body["data"]["member"]["paymentStatus"], "paid");

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/receipts?memberId={id}"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/api/v1/members/with-due", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_member_code_is_a_conflict() {
    let (app, _dir) = app().await;
    let (status, _) = send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-007", "0"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-007", "0"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn superseding_a_receipt_rewrites_the_due() {
    let (app, _dir) = app().await;
    let (_, body) = send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-002", "1000"))).await;
    let member_id = body["data"]["member"]["id"].as_str().unwrap().to_string();
    let receipt_id = body["data"]["receipt"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["member"]["dueAmount"], "900.00");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/receipts/{receipt_id}/supersede"),
        Some(json!({ "amountPaid": "800", "notes": "Keyed in wrong amount" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["versionNumber"], 2);
    assert_eq!(body["data"]["originalReceiptId"], receipt_id.as_str());

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/members/{member_id}"), None).await;
    assert_eq!(body["data"]["paidAmount"], "800.00");
    assert_eq!(body["data"]["dueAmount"], "1100.00");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/receipts/{receipt_id}/history"),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/receipts/{receipt_id}/supersede"),
        Some(json!({ "amountPaid": "700" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_requests_get_the_error_envelope() {
    let (app, _dir) = app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/members/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/v1/expenses?from=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/members",
        Some(json!({ "fullName": "Asha Rao" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/members")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"fullName\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn one_open_check_in_per_day() {
    let (app, _dir) = app().await;
    let (_, body) = send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-003", "0"))).await;
    let id = body["data"]["member"]["id"].as_str().unwrap().to_string();

    let check_in = format!("/api/v1/members/{id}/check-in");
    let check_out = format!("/api/v1/members/{id}/check-out");

    let (status, _) = send(&app, Method::POST, &check_in, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, &check_in, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::POST, &check_out, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["checkOutAt"].is_string());
    let (status, _) = send(&app, Method::POST, &check_out, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/v1/attendance", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn master_lists_are_keyed_by_kind() {
    let (app, _dir) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/master/payment-types",
        Some(json!({ "name": "UPI" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/master/payment-types/{item_id}/toggle"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (_, body) = send(&app, Method::GET, "/api/v1/master/payment-types?activeOnly=true", None).await;
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|item| item["name"] != "UPI")
    );

    let (status, body) = send(&app, Method::GET, "/api/v1/master/members", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("unknown variant"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/master/packages",
        Some(json!({ "name": "Quarterly Gold", "durationMonths": 3, "price": "4500" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["price"], "4500.00");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/master/tax-settings",
        Some(json!({ "name": "GST", "ratePercent": "18" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "GST");
}

#[tokio::test]
async fn renewal_keeps_the_old_balance_collectable() {
    let (app, _dir) = app().await;
    let (_, body) = send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-005", "1000"))).await;
    let id = body["data"]["member"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/members/{id}/renew"),
        Some(json!({
            "planType": "monthly",
            "fees": { "packageFee": "1500", "amountPaid": "1500", "paymentType": "cash" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["member"]["arrearsAmount"], "900.00");
    assert_eq!(body["data"]["member"]["dueAmount"], "900.00");

    let (_, body) = send(&app, Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(body["data"]["totalDue"], "900.00");
    let (_, body) = send(&app, Method::GET, "/api/v1/members/with-due", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let pay_uri = format!("/api/v1/members/{id}/payments");
    let (status, body) = send(
        &app,
        Method::POST,
        &pay_uri,
        Some(json!({ "amount": "79228162514264337593543950335", "paymentType": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        &pay_uri,
        Some(json!({ "amount": "900", "paymentType": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["member"]["dueAmount"], "0.00");
}

#[tokio::test]
async fn dashboard_counts_registered_members() {
    let (app, _dir) = app().await;
    send(&app, Method::POST, "/api/v1/members", Some(registration("GYM-004", "0"))).await;
    send(
        &app,
        Method::POST,
        "/api/v1/members/partial",
        Some(json!({ "fullName": "Lead Walk-in", "phone": "9811111111" })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalMembers"], 2);
    assert_eq!(body["data"]["partialMembers"], 1);
    assert_eq!(body["data"]["totalDue"], "1900.00");
}
