//! Argon2id password hashes in PHC string format.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use crate::common::{Error, Result};

/// Well-formed hash that matches no password. Verified against when a login
/// names an unknown email so both paths cost one Argon2 run.
pub const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Internal(format!("password salt: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("password hash: {}", e)))
}

/// False for a wrong password and for any stored value that is not a PHC string.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_correct_password() {
        let stored = hash_password("correct horse battery").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &stored));
        assert!(!verify_password("wrong horse battery", &stored));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(
            hash_password("hunter22").unwrap(),
            hash_password("hunter22").unwrap()
        );
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$abc"));
        assert!(!verify_password("x", "sha256$10000$salt$digest"));
    }

    #[test]
    fn unmatchable_hash_parses_but_rejects() {
        assert!(PasswordHash::new(UNMATCHABLE_HASH).is_ok());
        assert!(!verify_password("", UNMATCHABLE_HASH));
        assert!(!verify_password("correct horse battery", UNMATCHABLE_HASH));
    }
}
