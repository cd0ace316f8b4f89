//! Referral registry: creation, conversion, cancellation, and the
//! subscription event adapters.

use crate::db::Repository;
use crate::domain::{
    reward, vesting_deadline, BillingPeriod, Payout, PayoutId, PayoutStatus, PlanTier, Referral,
    ReferralId, ReferralStatus, TimeMs, UserId, CANCEL_WINDOW_DAYS, REWARD_TABLE_VERSION,
    SIGNUP_BONUS_CREDITS,
};
use crate::error::LedgerError;
use crate::wallet::Wallet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the referral state machine. Upstream event delivery is
/// at-least-once, so duplicate conversions and cancellations are absorbed
/// as no-ops (`applied = false`) rather than surfaced as errors.
#[derive(Clone)]
pub struct ReferralRegistry {
    repo: Arc<Repository>,
    wallet: Arc<dyn Wallet>,
    terms_version: String,
}

impl ReferralRegistry {
    pub fn new(repo: Arc<Repository>, wallet: Arc<dyn Wallet>, terms_version: String) -> Self {
        Self {
            repo,
            wallet,
            terms_version,
        }
    }

    /// Record a new introduction at signup time.
    ///
    /// The referrer must have accepted the current terms version, the pair
    /// must be new, and self-referral is rejected outright. The referred
    /// user's flat signup bonus is granted here, once, straight to the
    /// wallet with no holdback.
    pub async fn create_referral(
        &self,
        referrer: &UserId,
        referred: &UserId,
        now: TimeMs,
    ) -> Result<Referral, LedgerError> {
        if referrer == referred {
            return Err(LedgerError::SelfReferral);
        }
        if !self.repo.has_membership(referrer, &self.terms_version).await? {
            return Err(LedgerError::NotAMember);
        }

        let referral = Referral::new(referrer.clone(), referred.clone(), now);
        if !self.repo.insert_referral(&referral).await? {
            return Err(LedgerError::DuplicateReferral);
        }

        let granted = self
            .repo
            .insert_signup_bonus(referred, &referral.id, SIGNUP_BONUS_CREDITS, now)
            .await?;
        if granted {
            if let Err(e) = self.wallet.credit(referred, SIGNUP_BONUS_CREDITS).await {
                // The grant row is recorded; crediting is reconciled out of band.
                warn!(referred = %referred, error = %e, "signup bonus wallet credit failed");
            }
        }

        info!(
            referral_id = %referral.id,
            referrer = %referrer,
            referred = %referred,
            "referral created"
        );
        Ok(referral)
    }

    /// Convert a pending referral after the referred user's first paid
    /// subscription activates.
    ///
    /// The credit amount is fixed here from the reward table in effect at
    /// this instant and never recomputed. The payout is created in the same
    /// database transaction as the status change, vesting at
    /// `now + 7 days`.
    ///
    /// Returns `(referral, applied)`; `applied = false` means the referral
    /// had already converted (duplicate event, absorbed).
    pub async fn convert(
        &self,
        id: &ReferralId,
        plan: PlanTier,
        billing_period: BillingPeriod,
        now: TimeMs,
    ) -> Result<(Referral, bool), LedgerError> {
        let referral = self
            .repo
            .get_referral(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("referral {}", id)))?;

        match referral.status {
            ReferralStatus::Converted => Ok((referral, false)),
            ReferralStatus::Cancelled => Err(LedgerError::InvalidState(
                "cannot convert a cancelled referral".to_string(),
            )),
            ReferralStatus::Pending => {
                let credits = reward(plan, billing_period);
                let payout = Payout {
                    id: PayoutId::generate(),
                    user_id: referral.referrer_id.clone(),
                    referral_id: id.clone(),
                    credits,
                    status: PayoutStatus::Pending,
                    available_at: vesting_deadline(now),
                    claimed_at: None,
                    created_at: now,
                };

                let applied = self
                    .repo
                    .convert_referral(
                        id,
                        plan,
                        billing_period,
                        credits,
                        REWARD_TABLE_VERSION,
                        now,
                        &payout,
                    )
                    .await?;

                let current = self
                    .repo
                    .get_referral(id)
                    .await?
                    .ok_or_else(|| LedgerError::NotFound(format!("referral {}", id)))?;

                if !applied {
                    // Lost a race with a concurrent conversion or cancellation.
                    return match current.status {
                        ReferralStatus::Converted => Ok((current, false)),
                        _ => Err(LedgerError::InvalidState(
                            "cannot convert a cancelled referral".to_string(),
                        )),
                    };
                }

                info!(
                    referral_id = %id,
                    plan = %plan,
                    billing_period = %billing_period,
                    credits,
                    available_at = payout.available_at.as_i64(),
                    "referral converted"
                );
                Ok((current, true))
            }
        }
    }

    /// Cancel a referral from pending or converted.
    ///
    /// Its payout is cancelled in the same transaction if still unclaimed;
    /// a claimed payout stays with the user and only the referral is marked
    /// cancelled for audit. Double cancellation is a no-op.
    pub async fn cancel(
        &self,
        id: &ReferralId,
        reason: &str,
        now: TimeMs,
    ) -> Result<(Referral, bool), LedgerError> {
        let referral = self
            .repo
            .get_referral(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("referral {}", id)))?;

        if referral.status == ReferralStatus::Cancelled {
            return Ok((referral, false));
        }

        let applied = self.repo.cancel_referral(id, reason, now).await?;
        let current = self
            .repo
            .get_referral(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("referral {}", id)))?;

        if applied {
            info!(referral_id = %id, reason, "referral cancelled");
        }
        Ok((current, applied))
    }

    /// Inbound `subscription activated` event.
    ///
    /// Converts the referred user's pending referral if one exists. No
    /// pending referral (organic signup, or a duplicate delivery after the
    /// conversion settled) is absorbed, never an error.
    pub async fn on_subscription_activated(
        &self,
        referred: &UserId,
        plan_id: &str,
        billing_period: BillingPeriod,
        now: TimeMs,
    ) -> Result<Option<(Referral, bool)>, LedgerError> {
        let plan = PlanTier::parse(plan_id).ok_or_else(|| {
            LedgerError::Configuration(format!("unknown plan tier: {}", plan_id))
        })?;

        match self.repo.get_pending_referral_by_referred(referred).await? {
            None => {
                debug!(referred = %referred, "subscription activated without a pending referral");
                Ok(None)
            }
            Some(referral) => self
                .convert(&referral.id, plan, billing_period, now)
                .await
                .map(Some),
        }
    }

    /// Inbound `subscription cancelled` event.
    ///
    /// Retracts the referral (and its unclaimed payout) only when the
    /// cancellation lands inside the holdback window; converted referrals
    /// past holdback are immutable.
    pub async fn on_subscription_cancelled(
        &self,
        referred: &UserId,
        within_days: i64,
        now: TimeMs,
    ) -> Result<Option<(Referral, bool)>, LedgerError> {
        if within_days > CANCEL_WINDOW_DAYS {
            debug!(
                referred = %referred,
                within_days,
                "cancellation outside holdback window, referral untouched"
            );
            return Ok(None);
        }

        match self.repo.get_active_referral_by_referred(referred).await? {
            None => Ok(None),
            Some(referral) => self
                .cancel(&referral.id, "subscription_cancelled", now)
                .await
                .map(Some),
        }
    }

    /// The user's referral code, generated on first request and stable
    /// thereafter. Requires membership for the current terms version.
    pub async fn referral_code(&self, user: &UserId, now: TimeMs) -> Result<String, LedgerError> {
        if !self.repo.has_membership(user, &self.terms_version).await? {
            return Err(LedgerError::NotAMember);
        }

        let code = super::code::derive_code(user);
        Ok(self.repo.get_or_create_referral_code(user, &code, now).await?)
    }
}
