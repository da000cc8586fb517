//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with cost parameters fixed at construction
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP minimum for Argon2id)
    pub fn new() -> Self {
        // m=19MiB, t=2 iterations, p=1 lane
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Create hasher from configured cost parameters
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a freshly generated salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// The salt and cost embedded in `hashed` are used. A malformed hash
    /// verifies as `false`.
    pub fn verify(&self, hashed: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hashed) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
