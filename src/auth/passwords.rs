use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;

use crate::auth::{AuthError, AuthResult};

/// Memory cost in KiB.
pub const MEMORY_COST: u32 = 19 * 1024;
pub const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id hashing for album editor accounts, stored as PHC strings in
/// `users.password_hash`.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> AuthResult<Self> {
        Self::with_costs(MEMORY_COST, TIME_COST)
    }

    pub fn with_costs(memory_kib: u32, time_cost: u32) -> AuthResult<Self> {
        let params = Params::new(memory_kib, time_cost, PARALLELISM, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    /// `Ok(false)` for a wrong password; `Err` when the stored hash is unusable.
    pub fn verify_password(&self, password: &str, encoded: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(encoded)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AuthError::from(err)),
        }
    }

    /// Whether a stored hash was produced with another algorithm or weaker
    /// costs than this service uses, and should be replaced on next login.
    pub fn needs_rehash(&self, encoded: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(encoded)?;
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return Ok(true);
        }

        let stored = Params::try_from(&parsed)?;
        let current = self.argon2.params();
        Ok(stored.m_cost() != current.m_cost()
            || stored.t_cost() != current.t_cost()
            || stored.p_cost() != current.p_cost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordService {
        PasswordService::with_costs(8 * 1024, 1).expect("cheap password service")
    }

    #[test]
    fn hashes_and_verifies_passwords() {
        let service = PasswordService::new().expect("password service");
        let hash = service.hash_password("gopher-photos").expect("hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify_password("gopher-photos", &hash).expect("verify"));
        assert!(!service.verify_password("ferris-photos", &hash).expect("verify"));
        assert!(!service.needs_rehash(&hash).expect("inspect"));
    }

    #[test]
    fn weaker_hashes_are_flagged_for_rehash() {
        let legacy = cheap().hash_password("gopher-photos").expect("hash");
        let service = PasswordService::new().expect("password service");

        assert!(service.verify_password("gopher-photos", &legacy).expect("verify"));
        assert!(service.needs_rehash(&legacy).expect("inspect"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let service = PasswordService::new().expect("password service");
        assert!(matches!(
            service.verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash(_))
        ));
        assert!(service.needs_rehash("not-a-phc-string").is_err());
    }
}
