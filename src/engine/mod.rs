//! Ledger operations over the repository: referral state machine, the
//! claim transaction, membership gate, and read-only stats.

pub mod claim;
pub mod code;
pub mod membership;
pub mod registry;
pub mod stats;

pub use claim::{ClaimEngine, ClaimResult};
pub use code::derive_code;
pub use membership::MembershipGate;
pub use registry::ReferralRegistry;
pub use stats::{user_stats, Stats};
