//! Program membership gate: accepted-terms records.

use crate::db::Repository;
use crate::domain::{ProgramMembership, TimeMs, UserId};
use crate::error::LedgerError;
use std::sync::Arc;
use tracing::info;

/// Gates referral-program participation on a versioned terms document.
#[derive(Clone)]
pub struct MembershipGate {
    repo: Arc<Repository>,
}

impl MembershipGate {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Record acceptance of a terms version.
    ///
    /// Idempotent: a repeat acceptance returns success with
    /// `applied = false` and leaves the original record untouched.
    pub async fn accept(
        &self,
        user: &UserId,
        terms_version: &str,
        now: TimeMs,
    ) -> Result<bool, LedgerError> {
        if terms_version.trim().is_empty() {
            return Err(LedgerError::BadRequest(
                "terms version must not be empty".to_string(),
            ));
        }

        let applied = self.repo.insert_membership(user, terms_version, now).await?;
        if applied {
            info!(user = %user, terms_version, "program terms accepted");
        }
        Ok(applied)
    }

    /// Whether the user has accepted the given terms version.
    pub async fn is_member(&self, user: &UserId, terms_version: &str) -> Result<bool, LedgerError> {
        Ok(self.repo.has_membership(user, terms_version).await?)
    }

    /// All acceptances for a user, newest first.
    pub async fn memberships(&self, user: &UserId) -> Result<Vec<ProgramMembership>, LedgerError> {
        Ok(self.repo.list_memberships(user).await?)
    }
}
