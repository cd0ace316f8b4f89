//! Referral code derivation.

use crate::domain::UserId;

/// Derive the referral code for a user.
///
/// Deterministic: a truncated SHA-256 of the user id, so repeat calls
/// produce the same code before it is ever persisted. 48 bits of digest
/// keeps codes short enough for a URL parameter while staying far below
/// the birthday bound at realistic user counts.
pub fn derive_code(user: &UserId) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(user.as_str().as_bytes());
    let hash = hasher.finalize();
    format!("ref-{}", hex::encode(&hash[..6]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_deterministic() {
        let user = UserId::new("alice".to_string());
        assert_eq!(derive_code(&user), derive_code(&user));
    }

    #[test]
    fn test_code_differs_per_user() {
        let a = derive_code(&UserId::new("alice".to_string()));
        let b = derive_code(&UserId::new("bob".to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_code_shape() {
        let code = derive_code(&UserId::new("alice".to_string()));
        assert!(code.starts_with("ref-"));
        assert_eq!(code.len(), "ref-".len() + 12);
    }
}
