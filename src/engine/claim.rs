//! Claim engine: the one concurrency-sensitive operation.

use crate::db::Repository;
use crate::domain::{TimeMs, UserId};
use crate::error::LedgerError;
use crate::wallet::Wallet;
use std::sync::Arc;
use tracing::info;

/// Result of a claim: the balance delta handed to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimResult {
    pub credits_claimed: i64,
}

/// Moves all of a user's vested payouts into their spendable balance
/// exactly once.
#[derive(Clone)]
pub struct ClaimEngine {
    repo: Arc<Repository>,
    wallet: Arc<dyn Wallet>,
}

impl ClaimEngine {
    pub fn new(repo: Arc<Repository>, wallet: Arc<dyn Wallet>) -> Self {
        Self { repo, wallet }
    }

    /// Claim every payout of `user` that has vested by `now`.
    ///
    /// "Nothing available" is a normal zero-amount success, not an error,
    /// so callers can poll a zero balance without special-casing. The
    /// conditional transition inside [`Repository::claim_payouts`] makes
    /// concurrent claims settle each payout at most once; the wallet is
    /// credited after the transaction commits, and a failed credit is
    /// surfaced for the caller to reconcile rather than retried here with
    /// side effects re-applied.
    pub async fn claim(&self, user: &UserId, now: TimeMs) -> Result<ClaimResult, LedgerError> {
        if !self.repo.has_any_membership(user).await? {
            return Err(LedgerError::UnknownUser);
        }

        let credits_claimed = self.repo.claim_payouts(user, now).await?;

        if credits_claimed > 0 {
            self.wallet
                .credit(user, credits_claimed)
                .await
                .map_err(|e| LedgerError::Internal(e.to_string()))?;
            info!(user = %user, credits_claimed, "claim settled");
        }

        Ok(ClaimResult { credits_claimed })
    }
}
