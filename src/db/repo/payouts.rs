//! Payout reads, the claim transaction, and stats sums.

use super::Repository;
use crate::domain::{Payout, PayoutId, PayoutStatus, ReferralId, TimeMs, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

const PAYOUT_COLUMNS: &str =
    "id, user_id, referral_id, credits, status, available_at, claimed_at, created_at";

fn map_payout_row(row: &SqliteRow) -> Result<Payout, sqlx::Error> {
    let status_str: String = row.get("status");
    let status = PayoutStatus::parse(&status_str).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown payout status: {}", status_str).into())
    })?;

    Ok(Payout {
        id: PayoutId::new(row.get("id")),
        user_id: UserId::new(row.get("user_id")),
        referral_id: ReferralId::new(row.get("referral_id")),
        credits: row.get("credits"),
        status,
        available_at: TimeMs::new(row.get("available_at")),
        claimed_at: row.get::<Option<i64>, _>("claimed_at").map(TimeMs::new),
        created_at: TimeMs::new(row.get("created_at")),
    })
}

impl Repository {
    /// All payouts owed to a user, oldest first.
    pub async fn list_payouts(&self, user: &UserId) -> Result<Vec<Payout>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM payouts
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
            PAYOUT_COLUMNS
        ))
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_payout_row).collect()
    }

    /// The payout produced by a referral, if it has one.
    pub async fn get_payout_by_referral(
        &self,
        referral_id: &ReferralId,
    ) -> Result<Option<Payout>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payouts WHERE referral_id = ?",
            PAYOUT_COLUMNS
        ))
        .bind(referral_id.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_payout_row).transpose()
    }

    /// Opportunistically refresh stale `pending` statuses whose vesting
    /// deadline has passed. A display cache only; claimability never
    /// depends on it.
    pub async fn refresh_available(&self, user: &UserId, now: TimeMs) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE payouts
            SET status = 'available'
            WHERE user_id = ? AND status = 'pending' AND available_at <= ?
            "#,
        )
        .bind(user.as_str())
        .bind(now.as_i64())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    /// Atomically claim every payout of `user` that has vested by `now`.
    ///
    /// Candidates are read first, then re-checked row by row inside one
    /// transaction with a conditional UPDATE; only rows the UPDATE actually
    /// transitioned are summed. Two concurrent claims can both see the same
    /// candidate, but only one conditional UPDATE finds it still
    /// claimable, so each payout is counted at most once and the loser
    /// settles at zero.
    ///
    /// # Errors
    /// Returns an error if any statement in the transaction fails.
    pub async fn claim_payouts(&self, user: &UserId, now: TimeMs) -> Result<i64, sqlx::Error> {
        let candidates = sqlx::query(
            r#"
            SELECT id, credits
            FROM payouts
            WHERE user_id = ? AND status IN ('pending', 'available') AND available_at <= ?
            ORDER BY available_at ASC, id ASC
            "#,
        )
        .bind(user.as_str())
        .bind(now.as_i64())
        .fetch_all(self.pool())
        .await?;

        if candidates.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool().begin().await?;
        let mut total = 0i64;

        for row in &candidates {
            let id: String = row.get("id");
            let credits: i64 = row.get("credits");

            let result = sqlx::query(
                r#"
                UPDATE payouts
                SET status = 'claimed', claimed_at = ?
                WHERE id = ? AND status IN ('pending', 'available') AND available_at <= ?
                "#,
            )
            .bind(now.as_i64())
            .bind(&id)
            .bind(now.as_i64())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                total += credits;
            } else {
                debug!(payout_id = %id, user = %user, "payout lost to a concurrent claim or cancellation");
            }
        }

        tx.commit().await?;
        Ok(total)
    }

    /// Sum of credits over payouts that are not cancelled (claimed counts;
    /// a clawed-back reward does not).
    pub async fn sum_credits_earned(&self, user: &UserId) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(credits), 0) AS earned
            FROM payouts
            WHERE user_id = ? AND status != 'cancelled'
            "#,
        )
        .bind(user.as_str())
        .fetch_one(self.pool())
        .await?;

        Ok(row.get("earned"))
    }

    /// Sum of currently claimable credits: the same predicate the claim
    /// transaction uses, evaluated read-only.
    pub async fn sum_credits_available(
        &self,
        user: &UserId,
        now: TimeMs,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(credits), 0) AS available
            FROM payouts
            WHERE user_id = ? AND status IN ('pending', 'available') AND available_at <= ?
            "#,
        )
        .bind(user.as_str())
        .bind(now.as_i64())
        .fetch_one(self.pool())
        .await?;

        Ok(row.get("available"))
    }
}
