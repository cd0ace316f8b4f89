//! Claim and payout-listing behavior through the HTTP surface.

use axum::http::StatusCode;
use referral_ledger::db::init_db;
use referral_ledger::domain::{BillingPeriod, PlanTier, TimeMs, UserId, HOLDBACK_MS};
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
    registry: Arc<ReferralRegistry>,
    wallet: Arc<RecordingWallet>,
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
    let claim_engine = Arc::new(ClaimEngine::new(repo.clone(), wallet.clone()));
    let membership = Arc::new(MembershipGate::new(repo.clone()));
    let app = api::create_router(api::AppState::new(
        repo.clone(),
        registry.clone(),
        claim_engine,
        membership,
    ));

    TestApp {
        app,
        repo,
        registry,
        wallet,
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

fn user(id: &str) -> UserId {
    UserId::new(id.to_string())
}

async fn seed_conversion(
    test_app: &TestApp,
    referrer: &str,
    referred: &str,
    plan: PlanTier,
    converted_at: TimeMs,
) {
    test_app
        .repo
        .insert_membership(&user(referrer), TERMS, converted_at)
        .await
        .unwrap();
    let referral = test_app
        .registry
        .create_referral(&user(referrer), &user(referred), converted_at)
        .await
        .unwrap();
    test_app
        .registry
        .convert(&referral.id, plan, BillingPeriod::Annual, converted_at)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_claim_returns_vested_total_then_zero() {
    let test_app = setup_test_app().await;

    let converted_at = TimeMs::now().plus_ms(-(HOLDBACK_MS + 1000));
    seed_conversion(&test_app, "alice", "bob", PlanTier::Pro, converted_at).await;

    let (status, v) = post_json(
        test_app.app.clone(),
        "/v1/claim",
        serde_json::json!({"userId": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["creditsClaimed"], 100);

    let (status, v) = post_json(
        test_app.app,
        "/v1/claim",
        serde_json::json!({"userId": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["creditsClaimed"], 0);

    assert_eq!(test_app.wallet.balance(&user("alice")), 100);
    assert_eq!(test_app.wallet.credit_count(&user("alice")), 1);
}

#[tokio::test]
async fn test_claim_inside_holdback_returns_zero() {
    let test_app = setup_test_app().await;

    seed_conversion(&test_app, "alice", "bob", PlanTier::Master, TimeMs::now()).await;

    let (status, v) = post_json(
        test_app.app,
        "/v1/claim",
        serde_json::json!({"userId": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["creditsClaimed"], 0);
    assert_eq!(test_app.wallet.balance(&user("alice")), 0);
}

#[tokio::test]
async fn test_claim_for_unknown_user_is_rejected() {
    let test_app = setup_test_app().await;

    let (status, v) = post_json(
        test_app.app,
        "/v1/claim",
        serde_json::json!({"userId": "stranger"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "unknown_user");
}

#[tokio::test]
async fn test_claim_with_membership_but_no_payouts_is_zero_success() {
    let test_app = setup_test_app().await;

    test_app
        .repo
        .insert_membership(&user("alice"), TERMS, TimeMs::now())
        .await
        .unwrap();

    let (status, v) = post_json(
        test_app.app,
        "/v1/claim",
        serde_json::json!({"userId": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["creditsClaimed"], 0);
}

#[tokio::test]
async fn test_list_payouts_refreshes_vested_status() {
    let test_app = setup_test_app().await;

    let converted_at = TimeMs::now().plus_ms(-(HOLDBACK_MS + 1000));
    seed_conversion(&test_app, "alice", "bob", PlanTier::Pro, converted_at).await;

    let (status, v) = get(test_app.app, "/v1/payouts?user=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["payoutCount"], 1);

    let payout = &v["payouts"][0];
    assert_eq!(payout["credits"], 100);
    // Read path refreshed the stale `pending` cache.
    assert_eq!(payout["status"], "available");
    assert!(payout["claimedAt"].is_null() || payout.get("claimedAt").is_none());
}

#[tokio::test]
async fn test_list_payouts_shows_claimed_at_after_claim() {
    let test_app = setup_test_app().await;

    let converted_at = TimeMs::now().plus_ms(-(HOLDBACK_MS + 1000));
    seed_conversion(&test_app, "alice", "bob", PlanTier::Pro, converted_at).await;

    post_json(
        test_app.app.clone(),
        "/v1/claim",
        serde_json::json!({"userId": "alice"}),
    )
    .await;

    let (_status, v) = get(test_app.app, "/v1/payouts?user=alice").await;
    let payout = &v["payouts"][0];
    assert_eq!(payout["status"], "claimed");
    assert!(payout["claimedAt"].is_i64());
}

#[tokio::test]
async fn test_claim_requires_user_id() {
    let test_app = setup_test_app().await;

    let (status, _v) = post_json(
        test_app.app,
        "/v1/claim",
        serde_json::json!({"userId": "  "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
