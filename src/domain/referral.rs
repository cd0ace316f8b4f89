//! Referral entity: one introduction from a referrer to a referred user.

use crate::domain::{PlanTier, ReferralId, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// Referral lifecycle state.
///
/// `pending → converted` on the referred user's first paid subscription,
/// `pending → cancelled` or `converted → cancelled` while the payout is
/// still inside its holdback window. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Converted,
    Cancelled,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Converted => "converted",
            ReferralStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReferralStatus::Pending),
            "converted" => Some(ReferralStatus::Converted),
            "cancelled" => Some(ReferralStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing period of the subscription the referred user converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Annual,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(BillingPeriod::Monthly),
            "annual" => Some(BillingPeriod::Annual),
            _ => None,
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded introduction between a referrer and a referred user.
///
/// Plan, billing period, and credit amount are snapshots taken at the
/// moment of conversion; they are never recomputed, even if the reward
/// table changes afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer_id: UserId,
    pub referred_id: UserId,
    /// Plan the referred user subscribed to; set only at conversion.
    pub plan: Option<PlanTier>,
    /// Billing period at conversion time.
    pub billing_period: Option<BillingPeriod>,
    pub status: ReferralStatus,
    /// Credit reward, fixed exactly once when the referral converts.
    /// Some if and only if the referral has converted.
    pub credits_amount: Option<i64>,
    /// Version of the reward table the amount was computed from.
    pub reward_table_version: Option<i64>,
    pub cancel_reason: Option<String>,
    pub created_at: TimeMs,
    pub converted_at: Option<TimeMs>,
    pub cancelled_at: Option<TimeMs>,
}

impl Referral {
    /// Create a new pending referral.
    pub fn new(referrer_id: UserId, referred_id: UserId, created_at: TimeMs) -> Self {
        Referral {
            id: ReferralId::generate(),
            referrer_id,
            referred_id,
            plan: None,
            billing_period: None,
            status: ReferralStatus::Pending,
            credits_amount: None,
            reward_table_version: None,
            cancel_reason: None,
            created_at,
            converted_at: None,
            cancelled_at: None,
        }
    }
}
