//! Read-only stats projection over referrals and payouts.

use crate::db::Repository;
use crate::domain::{TimeMs, UserId};
use serde::Serialize;

/// Per-user referral stats, derived purely from stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_referrals: i64,
    pub converted_referrals: i64,
    /// Credits over converted referrals whose payout was not clawed back.
    pub credits_earned: i64,
    /// What a claim at `now` would return, computed with the claim
    /// predicate but without mutating anything.
    pub credits_available: i64,
}

pub async fn user_stats(
    repo: &Repository,
    user: &UserId,
    now: TimeMs,
) -> Result<Stats, sqlx::Error> {
    let (total_referrals, converted_referrals) = repo.count_referrals(user).await?;
    let credits_earned = repo.sum_credits_earned(user).await?;
    let credits_available = repo.sum_credits_available(user, now).await?;

    Ok(Stats {
        total_referrals,
        converted_referrals,
        credits_earned,
        credits_available,
    })
}
