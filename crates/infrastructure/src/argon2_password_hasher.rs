//! Argon2id password hashing for contractor and admin accounts.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use fieldtrack_application::PasswordHasher as PasswordHasherPort;
use fieldtrack_core::{AppError, AppResult};

const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id hasher (m=19456 KiB, t=2, p=1).
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the default cost parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        // Seeded or imported rows may carry malformed hashes; treat them as a mismatch.
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return Ok(false);
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "failed to verify password: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use fieldtrack_application::PasswordHasher as PasswordHasherPort;
    use fieldtrack_core::AppResult;

    use super::Argon2PasswordHasher;

    #[test]
    fn hashes_verify_only_the_original_password() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("pole-planter-42")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("pole-planter-42", &hash)?);
        assert!(!hasher.verify_password("pole-planter-43", &hash)?);
        Ok(())
    }

    #[test]
    fn malformed_hashes_never_verify() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        assert!(!hasher.verify_password("anything", "plain:anything")?);
        Ok(())
    }
}
