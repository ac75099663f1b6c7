//! Password hashing for account credentials.
//!
//! Uses Argon2id with per-password random salts. Verification failure is a
//! boolean, not an error: the caller decides whether to surface 401.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::error::Error;

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Check a plaintext password against a stored hash.
///
/// An unparseable stored hash counts as a mismatch; it is logged so corrupt
/// rows surface in operations rather than as login failures only.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash is unparseable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse").expect("hashing succeeds");
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
    }

    #[rstest]
    fn hashes_are_salted() {
        let first = hash_password("same password").expect("hashing succeeds");
        let second = hash_password("same password").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[rstest]
    fn unparseable_hash_is_a_mismatch() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
