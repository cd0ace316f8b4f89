//! Domain types for the referral reward ledger.
//!
//! This module provides:
//! - Domain primitives: TimeMs, UserId, ReferralId, PayoutId
//! - Referral and Payout entities with their state machines
//! - The reward table (plan tier → credit amount)
//! - Holdback/vesting time math

pub mod holdback;
pub mod membership;
pub mod payout;
pub mod primitives;
pub mod referral;
pub mod rewards;

pub use holdback::{vesting_deadline, CANCEL_WINDOW_DAYS, HOLDBACK_MS};
pub use membership::ProgramMembership;
pub use payout::{Payout, PayoutStatus};
pub use primitives::{PayoutId, ReferralId, TimeMs, UserId};
pub use referral::{BillingPeriod, Referral, ReferralStatus};
pub use rewards::{reward, PlanTier, REWARD_TABLE_VERSION, SIGNUP_BONUS_CREDITS};
