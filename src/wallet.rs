//! Spendable-credit wallet collaborator.
//!
//! The ledger's only responsibility toward the wallet is to report a
//! positive delta to add; debiting credits for product work is a separate
//! system. Callers retry failed credits themselves; idempotency lives in
//! the ledger's conditional state transitions, never in re-applying a
//! credit.

use crate::domain::UserId;
use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Error type for wallet operations.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Wallet credit failed: {0}")]
    Credit(String),
}

/// External wallet the ledger reports credit deltas to.
#[async_trait]
pub trait Wallet: Send + Sync + fmt::Debug {
    /// Add `amount` credits to the user's spendable balance.
    async fn credit(&self, user: &UserId, amount: i64) -> Result<(), WalletError>;
}

/// Wallet that only emits a tracing event per credit.
///
/// Stands in where no wallet service is wired up; deployments supply
/// their own `Wallet` implementation.
#[derive(Debug, Default)]
pub struct TracingWallet;

impl TracingWallet {
    pub fn new() -> Self {
        TracingWallet
    }
}

#[async_trait]
impl Wallet for TracingWallet {
    async fn credit(&self, user: &UserId, amount: i64) -> Result<(), WalletError> {
        tracing::info!(user = %user, amount, "wallet credit");
        Ok(())
    }
}

/// In-memory wallet that records every credit, for tests.
#[derive(Debug, Default)]
pub struct RecordingWallet {
    credits: Mutex<Vec<(UserId, i64)>>,
}

impl RecordingWallet {
    /// Create a new recording wallet with no credits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total amount credited to a user so far.
    pub fn balance(&self, user: &UserId) -> i64 {
        self.credits
            .lock()
            .expect("wallet mutex poisoned")
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Number of credit calls received for a user.
    pub fn credit_count(&self, user: &UserId) -> usize {
        self.credits
            .lock()
            .expect("wallet mutex poisoned")
            .iter()
            .filter(|(u, _)| u == user)
            .count()
    }

    /// All recorded credits in call order.
    pub fn entries(&self) -> Vec<(UserId, i64)> {
        self.credits.lock().expect("wallet mutex poisoned").clone()
    }
}

#[async_trait]
impl Wallet for RecordingWallet {
    async fn credit(&self, user: &UserId, amount: i64) -> Result<(), WalletError> {
        self.credits
            .lock()
            .expect("wallet mutex poisoned")
            .push((user.clone(), amount));
        Ok(())
    }
}
