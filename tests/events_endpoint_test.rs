//! Subscription event ingestion through the HTTP surface, including
//! duplicate delivery.

use axum::http::StatusCode;
use referral_ledger::db::init_db;
use referral_ledger::domain::{PayoutStatus, ReferralId};
use referral_ledger::engine::{ClaimEngine, MembershipGate, ReferralRegistry};
use referral_ledger::wallet::RecordingWallet;
use referral_ledger::{api, Repository};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

const TERMS: &str = "2026-01";

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let wallet = Arc::new(RecordingWallet::new());
    let registry = Arc::new(ReferralRegistry::new(
        repo.clone(),
        wallet.clone(),
        TERMS.to_string(),
    ));
    let claim_engine = Arc::new(ClaimEngine::new(repo.clone(), wallet));
    let membership = Arc::new(MembershipGate::new(repo.clone()));
    let app = api::create_router(api::AppState::new(
        repo.clone(),
        registry,
        claim_engine,
        membership,
    ));

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Accept terms for alice, fetch her code, and sign bob up through it.
async fn seed_pending_referral(test_app: &TestApp) {
    post_json(
        test_app.app.clone(),
        "/v1/terms/accept",
        serde_json::json!({"userId": "alice", "version": TERMS}),
    )
    .await;
    let (_status, v) = get(test_app.app.clone(), "/v1/referral-code?user=alice").await;
    let code = v["code"].as_str().unwrap().to_string();
    let (status, _v) = post_json(
        test_app.app.clone(),
        "/v1/referrals",
        serde_json::json!({"code": code, "referredUserId": "bob"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_activation_converts_pending_referral() {
    let test_app = setup_test_app().await;
    seed_pending_referral(&test_app).await;

    let (status, v) = post_json(
        test_app.app.clone(),
        "/v1/events/subscription-activated",
        serde_json::json!({
            "referredUserId": "bob",
            "planId": "pro",
            "billingPeriod": "annual",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], true);
    assert_eq!(v["referral"]["status"], "converted");
    assert_eq!(v["referral"]["creditsAmount"], 100);

    // availableAt lands exactly seven days after conversion.
    let referral_id = ReferralId::new(v["referral"]["id"].as_str().unwrap().to_string());
    let converted_at = v["referral"]["convertedAt"].as_i64().unwrap();
    let payout = test_app
        .repo
        .get_payout_by_referral(&referral_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        payout.available_at.as_i64(),
        converted_at + 7 * 24 * 60 * 60 * 1000
    );
}

#[tokio::test]
async fn test_duplicate_activation_is_absorbed() {
    let test_app = setup_test_app().await;
    seed_pending_referral(&test_app).await;

    let event = serde_json::json!({
        "referredUserId": "bob",
        "planId": "master",
        "billingPeriod": "annual",
    });

    let (status, v) = post_json(
        test_app.app.clone(),
        "/v1/events/subscription-activated",
        event.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], true);
    assert_eq!(v["referral"]["creditsAmount"], 400);

    // At-least-once delivery: the second copy changes nothing.
    let (status, v) = post_json(
        test_app.app,
        "/v1/events/subscription-activated",
        event,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], false);
}

#[tokio::test]
async fn test_activation_for_unreferred_user_is_absorbed() {
    let test_app = setup_test_app().await;

    let (status, v) = post_json(
        test_app.app,
        "/v1/events/subscription-activated",
        serde_json::json!({
            "referredUserId": "organic",
            "planId": "pro",
            "billingPeriod": "monthly",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], false);
    assert!(v.get("referral").is_none() || v["referral"].is_null());
}

#[tokio::test]
async fn test_activation_with_unknown_plan_is_configuration_error() {
    let test_app = setup_test_app().await;
    seed_pending_referral(&test_app).await;

    let (status, v) = post_json(
        test_app.app,
        "/v1/events/subscription-activated",
        serde_json::json!({
            "referredUserId": "bob",
            "planId": "enterprise",
            "billingPeriod": "annual",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["code"], "configuration");
}

#[tokio::test]
async fn test_cancellation_inside_window_retracts_payout() {
    let test_app = setup_test_app().await;
    seed_pending_referral(&test_app).await;

    post_json(
        test_app.app.clone(),
        "/v1/events/subscription-activated",
        serde_json::json!({
            "referredUserId": "bob",
            "planId": "master",
            "billingPeriod": "annual",
        }),
    )
    .await;

    let (status, v) = post_json(
        test_app.app.clone(),
        "/v1/events/subscription-cancelled",
        serde_json::json!({"referredUserId": "bob", "withinDays": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], true);
    assert_eq!(v["referral"]["status"], "cancelled");

    let referral_id = ReferralId::new(v["referral"]["id"].as_str().unwrap().to_string());
    let payout = test_app
        .repo
        .get_payout_by_referral(&referral_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payout.status, PayoutStatus::Cancelled);

    let (_status, v) = get(test_app.app, "/v1/stats?user=alice").await;
    assert_eq!(v["creditsEarned"], 0);
}

#[tokio::test]
async fn test_cancellation_outside_window_is_absorbed() {
    let test_app = setup_test_app().await;
    seed_pending_referral(&test_app).await;

    post_json(
        test_app.app.clone(),
        "/v1/events/subscription-activated",
        serde_json::json!({
            "referredUserId": "bob",
            "planId": "pro",
            "billingPeriod": "annual",
        }),
    )
    .await;

    let (status, v) = post_json(
        test_app.app.clone(),
        "/v1/events/subscription-cancelled",
        serde_json::json!({"referredUserId": "bob", "withinDays": 30}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], false);

    let (_status, v) = get(test_app.app, "/v1/stats?user=alice").await;
    assert_eq!(v["creditsEarned"], 100);
}

#[tokio::test]
async fn test_cancellation_for_unknown_user_is_absorbed() {
    let test_app = setup_test_app().await;

    let (status, v) = post_json(
        test_app.app,
        "/v1/events/subscription-cancelled",
        serde_json::json!({"referredUserId": "nobody", "withinDays": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["applied"], false);
}

#[tokio::test]
async fn test_cancellation_rejects_negative_within_days() {
    let test_app = setup_test_app().await;

    let (status, v) = post_json(
        test_app.app,
        "/v1/events/subscription-cancelled",
        serde_json::json!({"referredUserId": "bob", "withinDays": -1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], "bad_request");
}
