//! Inbound subscription events from the external billing system.
//!
//! Delivery is at-least-once; duplicates come back as `applied: false`
//! rather than errors.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::referrals::{parse_user, ReferralDto};
use crate::api::AppState;
use crate::domain::{BillingPeriod, TimeMs};
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionActivatedEvent {
    pub referred_user_id: String,
    pub plan_id: String,
    pub billing_period: BillingPeriod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCancelledEvent {
    pub referred_user_id: String,
    pub within_days: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// Whether the event changed any referral state.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<ReferralDto>,
}

pub async fn subscription_activated(
    State(state): State<AppState>,
    Json(event): Json<SubscriptionActivatedEvent>,
) -> Result<Json<EventResponse>, LedgerError> {
    let referred = parse_user(&event.referred_user_id)?;

    let outcome = state
        .registry
        .on_subscription_activated(&referred, &event.plan_id, event.billing_period, TimeMs::now())
        .await?;

    Ok(Json(match outcome {
        None => EventResponse {
            applied: false,
            referral: None,
        },
        Some((referral, applied)) => EventResponse {
            applied,
            referral: Some(referral.into()),
        },
    }))
}

pub async fn subscription_cancelled(
    State(state): State<AppState>,
    Json(event): Json<SubscriptionCancelledEvent>,
) -> Result<Json<EventResponse>, LedgerError> {
    let referred = parse_user(&event.referred_user_id)?;
    if event.within_days < 0 {
        return Err(LedgerError::BadRequest(
            "withinDays must be non-negative".to_string(),
        ));
    }

    let outcome = state
        .registry
        .on_subscription_cancelled(&referred, event.within_days, TimeMs::now())
        .await?;

    Ok(Json(match outcome {
        None => EventResponse {
            applied: false,
            referral: None,
        },
        Some((referral, applied)) => EventResponse {
            applied,
            referral: Some(referral.into()),
        },
    }))
}
