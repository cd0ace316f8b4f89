use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::referrals::parse_user;
use crate::api::AppState;
use crate::domain::TimeMs;
use crate::engine::{user_stats, Stats};
use crate::error::LedgerError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub user: String,
}

pub async fn get_stats(
    Query(params): Query<StatsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Stats>, LedgerError> {
    let user = parse_user(&params.user)?;

    let stats = user_stats(&state.repo, &user, TimeMs::now()).await?;

    Ok(Json(stats))
}
