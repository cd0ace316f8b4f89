//! Holdback (vesting) time math.
//!
//! Pure functions of stored timestamps; there is no background job. A
//! payout's deadline is computed once at creation from the constant in
//! effect at that moment and stored, so later rule changes never move
//! in-flight deadlines.

use crate::domain::TimeMs;

/// Holdback duration: 7 days in milliseconds.
pub const HOLDBACK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Subscription cancellations within this many days of conversion retract
/// the referral's payout.
pub const CANCEL_WINDOW_DAYS: i64 = 7;

/// Vesting deadline for a conversion at `converted_at`.
pub fn vesting_deadline(converted_at: TimeMs) -> TimeMs {
    converted_at.plus_ms(HOLDBACK_MS)
}
