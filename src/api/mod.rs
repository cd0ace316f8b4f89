pub mod claim;
pub mod code;
pub mod events;
pub mod health;
pub mod payouts;
pub mod referrals;
pub mod stats;
pub mod terms;

use crate::db::Repository;
use crate::engine::{ClaimEngine, MembershipGate, ReferralRegistry};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub registry: Arc<ReferralRegistry>,
    pub claim_engine: Arc<ClaimEngine>,
    pub membership: Arc<MembershipGate>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        registry: Arc<ReferralRegistry>,
        claim_engine: Arc<ClaimEngine>,
        membership: Arc<MembershipGate>,
    ) -> Self {
        Self {
            repo,
            registry,
            claim_engine,
            membership,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/referrals",
            post(referrals::create_referral).get(referrals::list_referrals),
        )
        .route("/v1/payouts", get(payouts::list_payouts))
        .route("/v1/referral-code", get(code::get_referral_code))
        .route("/v1/stats", get(stats::get_stats))
        .route("/v1/claim", post(claim::claim))
        .route("/v1/terms/accept", post(terms::accept_terms))
        .route(
            "/v1/events/subscription-activated",
            post(events::subscription_activated),
        )
        .route(
            "/v1/events/subscription-cancelled",
            post(events::subscription_cancelled),
        )
        .layer(cors)
        .with_state(state)
}
