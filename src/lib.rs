pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod wallet;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    BillingPeriod, Payout, PayoutStatus, PlanTier, ProgramMembership, Referral, ReferralId,
    ReferralStatus, TimeMs, UserId,
};
pub use engine::{ClaimEngine, ClaimResult, MembershipGate, ReferralRegistry, Stats};
pub use error::LedgerError;
pub use wallet::{RecordingWallet, TracingWallet, Wallet};
