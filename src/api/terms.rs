use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::referrals::parse_user;
use crate::api::AppState;
use crate::domain::TimeMs;
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptTermsRequest {
    pub user_id: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptTermsResponse {
    /// False when the user had already accepted this version.
    pub applied: bool,
}

pub async fn accept_terms(
    State(state): State<AppState>,
    Json(req): Json<AcceptTermsRequest>,
) -> Result<Json<AcceptTermsResponse>, LedgerError> {
    let user = parse_user(&req.user_id)?;

    let applied = state
        .membership
        .accept(&user, &req.version, TimeMs::now())
        .await?;

    Ok(Json(AcceptTermsResponse { applied }))
}
