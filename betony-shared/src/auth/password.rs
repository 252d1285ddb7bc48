/// Credential hashing using Argon2id
///
/// Passwords are stored as PHC strings (algorithm, parameters, salt and hash
/// in one value). Hashing is deliberately slow and memory-hard; every hash
/// gets a fresh random salt.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Default cost**: 64 MB memory, 3 passes, 4 lanes, 32-byte output
/// - **Verification**: constant-time, parameters are read from the stored hash
///
/// # Example
///
/// ```
/// use betony_shared::auth::password::CredentialHasher;
/// use betony_shared::config::HashingConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = CredentialHasher::new(HashingConfig::minimal())?;
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash));
/// assert!(!hasher.verify("wrong_password", &hash));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use tracing::{debug, warn};

use crate::config::HashingConfig;

/// Length of the raw Argon2 output in bytes
const HASH_OUTPUT_LEN: usize = 32;

/// Error type for password hashing operations
///
/// Both variants are infrastructure failures: a caller cannot fix them by
/// retrying with different input.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Cost parameters rejected by Argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// One-way password hasher
///
/// Cheap to clone; holds nothing but the configured Argon2 instance.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Builds a hasher with the given cost parameters
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if Argon2 rejects the parameters
    /// (e.g. memory below `8 * parallelism` KiB).
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(HASH_OUTPUT_LEN),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a plaintext password
    ///
    /// # Returns
    ///
    /// PHC string format hash, e.g.
    /// ```text
    /// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    /// Verifies a plaintext candidate against a stored hash
    ///
    /// Never fails: a malformed or unsupported stored hash yields `false`,
    /// exactly like a wrong password.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        // Parameters are embedded in the hash
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Password verification failed unexpectedly");
                false
            }
        }
    }
}
