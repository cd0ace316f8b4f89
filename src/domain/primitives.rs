//! Domain primitives: TimeMs, UserId, ReferralId, PayoutId.

use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// This time shifted forward by `ms` milliseconds.
    pub fn plus_ms(&self, ms: i64) -> Self {
        TimeMs(self.0 + ms)
    }
}

/// Opaque user identifier, issued by the external identity system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: String) -> Self {
        UserId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Referral record identifier (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferralId(pub String);

impl ReferralId {
    pub fn generate() -> Self {
        ReferralId(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: String) -> Self {
        ReferralId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferralId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payout record identifier (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayoutId(pub String);

impl PayoutId {
    pub fn generate() -> Self {
        PayoutId(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: String) -> Self {
        PayoutId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
    }

    #[test]
    fn test_timems_plus_ms() {
        let t = TimeMs::new(1000);
        assert_eq!(t.plus_ms(500), TimeMs::new(1500));
    }

    #[test]
    fn test_user_id_display() {
        let user = UserId::new("u-42".to_string());
        assert_eq!(user.to_string(), "u-42");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ReferralId::generate(), ReferralId::generate());
        assert_ne!(PayoutId::generate(), PayoutId::generate());
    }
}
