//! Reward table: plan tier and billing period → credit amount.

use crate::domain::BillingPeriod;
use serde::{Deserialize, Serialize};

/// Version stamped onto each referral at conversion so historical credit
/// amounts remain explainable after table changes.
pub const REWARD_TABLE_VERSION: i64 = 1;

/// Flat one-shot grant for the referred user at signup. Immediate, not
/// subject to holdback.
pub const SIGNUP_BONUS_CREDITS: i64 = 10;

/// Closed set of sellable plan tiers. Plans are provisioned before sale,
/// so an unknown tier string at conversion time is a deployment bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
    Premier,
    Master,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Pro => "pro",
            PlanTier::Premier => "premier",
            PlanTier::Master => "master",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(PlanTier::Basic),
            "pro" => Some(PlanTier::Pro),
            "premier" => Some(PlanTier::Premier),
            "master" => Some(PlanTier::Master),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit reward for a conversion.
///
/// Monthly amounts are round(0.30 × annual) by rule, tabulated
/// independently so each entry can be audited on its own.
pub fn reward(tier: PlanTier, period: BillingPeriod) -> i64 {
    let (annual, monthly) = match tier {
        PlanTier::Basic => (40, 12),
        PlanTier::Pro => (100, 30),
        PlanTier::Premier => (200, 60),
        PlanTier::Master => (400, 120),
    };

    match period {
        BillingPeriod::Annual => annual,
        BillingPeriod::Monthly => monthly,
    }
}
