//! Payout entity: one vesting reward owed to a referrer.

use crate::domain::{PayoutId, ReferralId, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// Payout lifecycle state.
///
/// The stored `available` state is a cache refreshed opportunistically on
/// read; the authoritative claimability test is always the comparison of
/// wall-clock time against `available_at` (see [`Payout::is_claimable`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Available,
    Claimed,
    Cancelled,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Available => "available",
            PayoutStatus::Claimed => "claimed",
            PayoutStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PayoutStatus::Pending),
            "available" => Some(PayoutStatus::Available),
            "claimed" => Some(PayoutStatus::Claimed),
            "cancelled" => Some(PayoutStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states can never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Claimed | PayoutStatus::Cancelled)
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One vesting reward produced by exactly one converted referral.
///
/// `credits` is copied from the referral at creation and immutable;
/// `available_at` is stored at creation from the holdback constant in
/// effect at that moment and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    /// The referrer who receives the credits.
    pub user_id: UserId,
    pub referral_id: ReferralId,
    pub credits: i64,
    pub status: PayoutStatus,
    pub available_at: TimeMs,
    /// Some if and only if the payout has been claimed.
    pub claimed_at: Option<TimeMs>,
    pub created_at: TimeMs,
}

impl Payout {
    /// Whether this payout can be claimed at `now`.
    ///
    /// Time comparison is authoritative; a stale `pending` status past its
    /// vesting deadline still qualifies.
    pub fn is_claimable(&self, now: TimeMs) -> bool {
        !self.status.is_terminal() && self.available_at <= now
    }
}
