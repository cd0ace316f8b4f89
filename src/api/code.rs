use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::referrals::parse_user;
use crate::api::AppState;
use crate::domain::TimeMs;
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCodeQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCodeResponse {
    pub code: String,
}

pub async fn get_referral_code(
    Query(params): Query<ReferralCodeQuery>,
    State(state): State<AppState>,
) -> Result<Json<ReferralCodeResponse>, LedgerError> {
    let user = parse_user(&params.user)?;

    let code = state.registry.referral_code(&user, TimeMs::now()).await?;

    Ok(Json(ReferralCodeResponse { code }))
}
