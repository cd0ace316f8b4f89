use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::referrals::parse_user;
use crate::api::AppState;
use crate::domain::TimeMs;
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub credits_claimed: i64,
}

pub async fn claim(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, LedgerError> {
    let user = parse_user(&req.user_id)?;

    let result = state.claim_engine.claim(&user, TimeMs::now()).await?;

    Ok(Json(ClaimResponse {
        credits_claimed: result.credits_claimed,
    }))
}
