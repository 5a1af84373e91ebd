//! Password hashing and verification.
//!
//! Uses Argon2id with fixed cost parameters and a random per-hash salt.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

/// Memory cost in KiB (19 MiB).
const MEMORY_COST_KIB: u32 = 19 * 1024;
/// Number of passes.
const TIME_COST: u32 = 2;
/// Degree of parallelism.
const PARALLELISM: u32 = 1;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Stored hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password does not match the stored hash.
    #[error("password verification failed")]
    VerificationFailed,
}

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted string that embeds the salt and parameters.
///
/// # Examples
///
/// ```
/// use filevault::auth::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// The cost parameters are read from the stored hash, so hashes produced
/// with older parameters keep verifying.
///
/// # Examples
///
/// ```
/// use filevault::auth::{hash_password, verify_password};
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(verify_password("my_secure_password", &hash).is_ok());
/// assert!(verify_password("wrong_password", &hash).is_err());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
    }

    #[test]
    fn test_hash_never_equals_plaintext() {
        let password = "admin123";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(!hash.contains(password));
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_and_wrong() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).is_ok());
        assert!(matches!(
            verify_password("correct_passwor", &hash),
            Err(PasswordError::VerificationFailed)
        ));
        assert!(matches!(
            verify_password("", &hash),
            Err(PasswordError::VerificationFailed)
        ));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let result = verify_password("any_password", "not_a_valid_hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_unicode_password() {
        let password = "пароль-密码-🔑";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }

    #[test]
    fn test_cost_parameters_embedded() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }
}
