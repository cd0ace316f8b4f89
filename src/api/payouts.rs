use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::referrals::parse_user;
use crate::api::AppState;
use crate::domain::{Payout, TimeMs};
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutsQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDto {
    pub id: String,
    pub referral_id: String,
    pub credits: i64,
    pub status: String,
    pub available_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<i64>,
    pub created_at: i64,
}

impl From<Payout> for PayoutDto {
    fn from(p: Payout) -> Self {
        PayoutDto {
            id: p.id.as_str().to_string(),
            referral_id: p.referral_id.as_str().to_string(),
            credits: p.credits,
            status: p.status.as_str().to_string(),
            available_at: p.available_at.as_i64(),
            claimed_at: p.claimed_at.map(|t| t.as_i64()),
            created_at: p.created_at.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutsResponse {
    pub payout_count: i64,
    pub payouts: Vec<PayoutDto>,
}

pub async fn list_payouts(
    Query(params): Query<PayoutsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PayoutsResponse>, LedgerError> {
    let user = parse_user(&params.user)?;
    let now = TimeMs::now();

    // Cache refresh only; claimability never reads the cached status.
    state.repo.refresh_available(&user, now).await?;
    let payouts = state.repo.list_payouts(&user).await?;

    Ok(Json(PayoutsResponse {
        payout_count: payouts.len() as i64,
        payouts: payouts.into_iter().map(PayoutDto::from).collect(),
    }))
}
