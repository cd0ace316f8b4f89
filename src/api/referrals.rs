use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Referral, TimeMs, UserId};
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralRequest {
    /// Referral code from the signup URL parameter.
    pub code: String,
    pub referred_user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralsQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDto {
    pub id: String,
    pub referrer_id: String,
    pub referred_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_amount: Option<i64>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
}

impl From<Referral> for ReferralDto {
    fn from(r: Referral) -> Self {
        ReferralDto {
            id: r.id.as_str().to_string(),
            referrer_id: r.referrer_id.as_str().to_string(),
            referred_id: r.referred_id.as_str().to_string(),
            plan: r.plan.map(|p| p.as_str().to_string()),
            billing_period: r.billing_period.map(|b| b.as_str().to_string()),
            status: r.status.as_str().to_string(),
            credits_amount: r.credits_amount,
            created_at: r.created_at.as_i64(),
            converted_at: r.converted_at.map(|t| t.as_i64()),
            cancelled_at: r.cancelled_at.map(|t| t.as_i64()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralsResponse {
    pub referral_count: i64,
    pub referrals: Vec<ReferralDto>,
}

pub async fn create_referral(
    State(state): State<AppState>,
    Json(req): Json<CreateReferralRequest>,
) -> Result<(StatusCode, Json<ReferralDto>), LedgerError> {
    let code = req.code.trim();
    if code.is_empty() {
        return Err(LedgerError::BadRequest("code must not be empty".into()));
    }
    let referred = parse_user(&req.referred_user_id)?;

    let referrer = state
        .repo
        .find_referrer_by_code(code)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("referral code {}", code)))?;

    let referral = state
        .registry
        .create_referral(&referrer, &referred, TimeMs::now())
        .await?;

    Ok((StatusCode::CREATED, Json(referral.into())))
}

pub async fn list_referrals(
    Query(params): Query<ReferralsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ReferralsResponse>, LedgerError> {
    let user = parse_user(&params.user)?;

    let referrals = state.repo.list_referrals_by_referrer(&user).await?;

    Ok(Json(ReferralsResponse {
        referral_count: referrals.len() as i64,
        referrals: referrals.into_iter().map(ReferralDto::from).collect(),
    }))
}

pub(crate) fn parse_user(raw: &str) -> Result<UserId, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::BadRequest(
            "user id must not be empty".to_string(),
        ));
    }
    Ok(UserId::new(trimmed.to_string()))
}
