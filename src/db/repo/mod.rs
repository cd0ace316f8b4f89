//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by entity:
//! - `referrals.rs` - Referral creation and state transitions
//! - `payouts.rs` - Payout reads, the claim transaction, stats sums
//!
//! Membership, referral code, and signup bonus operations live here.

mod payouts;
mod referrals;

use crate::domain::{ProgramMembership, ReferralId, TimeMs, UserId};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Program membership operations
    // =========================================================================

    /// Record acceptance of a terms version idempotently.
    ///
    /// Returns false when the user had already accepted this version; the
    /// uniqueness constraint makes the duplicate a silent no-op.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_membership(
        &self,
        user: &UserId,
        terms_version: &str,
        accepted_at: TimeMs,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO program_memberships (user_id, terms_version, accepted_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id, terms_version) DO NOTHING
            "#,
        )
        .bind(user.as_str())
        .bind(terms_version)
        .bind(accepted_at.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the user has accepted the given terms version.
    pub async fn has_membership(
        &self,
        user: &UserId,
        terms_version: &str,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            "SELECT 1 FROM program_memberships WHERE user_id = ? AND terms_version = ?",
        )
        .bind(user.as_str())
        .bind(terms_version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Whether the user has any membership record at all.
    pub async fn has_any_membership(&self, user: &UserId) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM program_memberships WHERE user_id = ? LIMIT 1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// All terms acceptances for a user, newest first.
    pub async fn list_memberships(
        &self,
        user: &UserId,
    ) -> Result<Vec<ProgramMembership>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, terms_version, accepted_at
            FROM program_memberships
            WHERE user_id = ?
            ORDER BY accepted_at DESC, terms_version DESC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ProgramMembership {
                user_id: UserId::new(row.get("user_id")),
                terms_version: row.get("terms_version"),
                accepted_at: TimeMs::new(row.get("accepted_at")),
            })
            .collect())
    }

    // =========================================================================
    // Referral code operations
    // =========================================================================

    /// Store `code` for the user if they have none yet, then return the
    /// stored code. Repeat calls always return the first stored value.
    ///
    /// # Errors
    /// Returns an error if the insert or lookup fails.
    pub async fn get_or_create_referral_code(
        &self,
        user: &UserId,
        code: &str,
        created_at: TimeMs,
    ) -> Result<String, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO referral_codes (user_id, code, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user.as_str())
        .bind(code)
        .bind(created_at.as_i64())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT code FROM referral_codes WHERE user_id = ?")
            .bind(user.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("code"))
    }

    /// Resolve a referral code back to its owner for signup attribution.
    pub async fn find_referrer_by_code(&self, code: &str) -> Result<Option<UserId>, sqlx::Error> {
        let row = sqlx::query("SELECT user_id FROM referral_codes WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| UserId::new(r.get("user_id"))))
    }

    // =========================================================================
    // Signup bonus operations
    // =========================================================================

    /// Record the one-shot signup grant for a referred user.
    ///
    /// Returns false when the bonus was already granted (primary key on
    /// referred_id), so duplicate signup events never re-grant.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_signup_bonus(
        &self,
        referred: &UserId,
        referral_id: &ReferralId,
        credits: i64,
        granted_at: TimeMs,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO signup_bonuses (referred_id, referral_id, credits, granted_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(referred_id) DO NOTHING
            "#,
        )
        .bind(referred.as_str())
        .bind(referral_id.as_str())
        .bind(credits)
        .bind(granted_at.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
