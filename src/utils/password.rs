use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use rand::{distr::Alphanumeric, rng, Rng};

use crate::service::error::ServiceError;

/// Random credential for first-time customers; mailed once, then expected
/// to be changed on first login.
pub fn generate_temporary_password() -> String {
    let mut rng = rng();
    (0..12).map(|_| rng.sample(Alphanumeric) as char).collect()
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Other(format!("Failed to hash password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_passwords_are_distinct() {
        let first = generate_temporary_password();
        let second = generate_temporary_password();
        assert_eq!(first.len(), 12);
        assert_ne!(first, second);
    }

    #[test]
    fn test_hashing_produces_phc_string() {
        let hash = hash_password("temporary123").unwrap();
        assert!(hash.starts_with("$argon2"));
    }
}
