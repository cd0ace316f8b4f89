//! Referral creation, reads, and state transitions.

use super::Repository;
use crate::domain::{
    BillingPeriod, Payout, PlanTier, Referral, ReferralId, ReferralStatus, TimeMs, UserId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const REFERRAL_COLUMNS: &str = "id, referrer_id, referred_id, plan, billing_period, status, \
     credits_amount, reward_table_version, cancel_reason, created_at, converted_at, cancelled_at";

fn map_referral_row(row: &SqliteRow) -> Result<Referral, sqlx::Error> {
    let status_str: String = row.get("status");
    let status = ReferralStatus::parse(&status_str).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown referral status: {}", status_str).into())
    })?;

    let plan = match row.get::<Option<String>, _>("plan") {
        Some(p) => Some(
            PlanTier::parse(&p)
                .ok_or_else(|| sqlx::Error::Decode(format!("unknown plan tier: {}", p).into()))?,
        ),
        None => None,
    };

    let billing_period = match row.get::<Option<String>, _>("billing_period") {
        Some(b) => Some(BillingPeriod::parse(&b).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown billing period: {}", b).into())
        })?),
        None => None,
    };

    Ok(Referral {
        id: ReferralId::new(row.get("id")),
        referrer_id: UserId::new(row.get("referrer_id")),
        referred_id: UserId::new(row.get("referred_id")),
        plan,
        billing_period,
        status,
        credits_amount: row.get("credits_amount"),
        reward_table_version: row.get("reward_table_version"),
        cancel_reason: row.get("cancel_reason"),
        created_at: TimeMs::new(row.get("created_at")),
        converted_at: row.get::<Option<i64>, _>("converted_at").map(TimeMs::new),
        cancelled_at: row.get::<Option<i64>, _>("cancelled_at").map(TimeMs::new),
    })
}

impl Repository {
    /// Insert a pending referral.
    ///
    /// Returns false when a referral for this referrer/referred pair
    /// already exists (uniqueness constraint).
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_referral(&self, referral: &Referral) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO referrals (id, referrer_id, referred_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(referrer_id, referred_id) DO NOTHING
            "#,
        )
        .bind(referral.id.as_str())
        .bind(referral.referrer_id.as_str())
        .bind(referral.referred_id.as_str())
        .bind(referral.status.as_str())
        .bind(referral.created_at.as_i64())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch a referral by id.
    pub async fn get_referral(&self, id: &ReferralId) -> Result<Option<Referral>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM referrals WHERE id = ?",
            REFERRAL_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_referral_row).transpose()
    }

    /// Fetch the pending referral attributed to a referred user, if any.
    ///
    /// At most one can exist per referred user in normal operation; the
    /// newest wins if historical data disagrees.
    pub async fn get_pending_referral_by_referred(
        &self,
        referred: &UserId,
    ) -> Result<Option<Referral>, sqlx::Error> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM referrals
            WHERE referred_id = ? AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            REFERRAL_COLUMNS
        ))
        .bind(referred.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_referral_row).transpose()
    }

    /// Fetch the newest non-cancelled referral for a referred user.
    pub async fn get_active_referral_by_referred(
        &self,
        referred: &UserId,
    ) -> Result<Option<Referral>, sqlx::Error> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM referrals
            WHERE referred_id = ? AND status IN ('pending', 'converted')
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            REFERRAL_COLUMNS
        ))
        .bind(referred.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_referral_row).transpose()
    }

    /// All referrals made by a referrer, oldest first.
    pub async fn list_referrals_by_referrer(
        &self,
        referrer: &UserId,
    ) -> Result<Vec<Referral>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM referrals
            WHERE referrer_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
            REFERRAL_COLUMNS
        ))
        .bind(referrer.as_str())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_referral_row).collect()
    }

    /// Total and converted referral counts for a referrer.
    pub async fn count_referrals(&self, referrer: &UserId) -> Result<(i64, i64), sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN status = 'converted' THEN 1 ELSE 0 END), 0) AS converted
            FROM referrals
            WHERE referrer_id = ?
            "#,
        )
        .bind(referrer.as_str())
        .fetch_one(self.pool())
        .await?;

        Ok((row.get("total"), row.get("converted")))
    }

    /// Transition a pending referral to converted and create its payout,
    /// atomically in a single transaction.
    ///
    /// The UPDATE is conditional on `status = 'pending'`, so duplicate
    /// delivery of the activation event finds zero rows and returns false
    /// without touching anything. A converted referral without a payout
    /// (or vice versa) is never observable.
    ///
    /// # Errors
    /// Returns an error if any statement in the transaction fails.
    pub async fn convert_referral(
        &self,
        id: &ReferralId,
        plan: PlanTier,
        billing_period: BillingPeriod,
        credits_amount: i64,
        reward_table_version: i64,
        converted_at: TimeMs,
        payout: &Payout,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE referrals
            SET plan = ?,
                billing_period = ?,
                status = 'converted',
                credits_amount = ?,
                reward_table_version = ?,
                converted_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(plan.as_str())
        .bind(billing_period.as_str())
        .bind(credits_amount)
        .bind(reward_table_version)
        .bind(converted_at.as_i64())
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO payouts (id, user_id, referral_id, credits, status, available_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payout.id.as_str())
        .bind(payout.user_id.as_str())
        .bind(payout.referral_id.as_str())
        .bind(payout.credits)
        .bind(payout.status.as_str())
        .bind(payout.available_at.as_i64())
        .bind(payout.created_at.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Cancel a referral and, in the same transaction, its payout if that
    /// payout is still pending or available.
    ///
    /// An already-claimed payout is left untouched: once claimed, the
    /// credits are the user's. Returns false when the referral was already
    /// in a terminal state.
    ///
    /// # Errors
    /// Returns an error if any statement in the transaction fails.
    pub async fn cancel_referral(
        &self,
        id: &ReferralId,
        reason: &str,
        cancelled_at: TimeMs,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE referrals
            SET status = 'cancelled', cancel_reason = ?, cancelled_at = ?
            WHERE id = ? AND status IN ('pending', 'converted')
            "#,
        )
        .bind(reason)
        .bind(cancelled_at.as_i64())
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE payouts
            SET status = 'cancelled'
            WHERE referral_id = ? AND status IN ('pending', 'available')
            "#,
        )
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
