//! Program membership: a user's accepted-terms record.

use crate::domain::{TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// Acceptance of a versioned terms document. One row per
/// `(user_id, terms_version)`; accepting the same version twice is a
/// no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramMembership {
    pub user_id: UserId,
    pub terms_version: String,
    pub accepted_at: TimeMs,
}
