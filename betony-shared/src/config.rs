/// Process-wide authentication settings
///
/// These structs are built once at startup (see `betony-api`'s `Config`)
/// and handed to the token issuer, credential hasher and identity service.
/// Nothing in the business logic reads the environment directly.
///
/// # Example
///
/// ```
/// use betony_shared::config::{AuthConfig, HashingConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthConfig::new("a-very-long-secret-key-used-for-signing!!", "HS256", 30)?;
/// assert_eq!(auth.access_token_ttl().num_minutes(), 30);
///
/// let hashing = HashingConfig::default();
/// assert_eq!(hashing.memory_kib, 65536);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::fmt;
use std::str::FromStr;

/// Default lifetime of an access token
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

/// Default signing algorithm identifier
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Minimum accepted length of the signing secret
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound for the token TTL (one year)
const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Error type for invalid authentication settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Signing secret is too short to be safe for HMAC
    #[error("signing secret must be at least {MIN_SECRET_LEN} characters long")]
    SecretTooShort,

    /// Algorithm is unknown or not an HMAC algorithm
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// TTL is zero, negative or absurdly large
    #[error("access token TTL must be between 1 and {MAX_ACCESS_TOKEN_TTL_MINUTES} minutes, got {0}")]
    InvalidTtl(i64),
}

/// Token signing configuration
///
/// Only the HMAC family (HS256, HS384, HS512) is accepted since tokens are
/// signed and verified with one shared secret.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    algorithm: Algorithm,
    access_token_ttl: Duration,
}

impl AuthConfig {
    /// Validates and builds the signing configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret is shorter than [`MIN_SECRET_LEN`],
    /// the algorithm is not HS256/HS384/HS512, or the TTL is out of range.
    pub fn new(
        secret: impl Into<String>,
        algorithm: &str,
        ttl_minutes: i64,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let algorithm = Algorithm::from_str(algorithm.trim())
            .map_err(|_| ConfigError::UnsupportedAlgorithm(algorithm.to_string()))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(ConfigError::InvalidTtl(ttl_minutes));
        }

        Ok(Self {
            secret,
            algorithm,
            access_token_ttl: Duration::minutes(ttl_minutes),
        })
    }

    /// Shared signing secret
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Signing algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Lifetime of freshly issued access tokens
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}

// Never print the secret, not even in debug logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl_minutes", &self.access_token_ttl.num_minutes())
            .finish()
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MB
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl HashingConfig {
    /// Cheapest parameters Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::new(SECRET, DEFAULT_ALGORITHM, DEFAULT_ACCESS_TOKEN_TTL_MINUTES)
            .expect("valid config");
        assert_eq!(config.algorithm(), Algorithm::HS256);
        assert_eq!(config.access_token_ttl(), Duration::minutes(30));
        assert_eq!(config.secret(), SECRET);
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = AuthConfig::new("short", "HS256", 30);
        assert!(matches!(result, Err(ConfigError::SecretTooShort)));
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let result = AuthConfig::new(SECRET, "RS256", 30);
        assert!(matches!(result, Err(ConfigError::UnsupportedAlgorithm(_))));

        let result = AuthConfig::new(SECRET, "nonsense", 30);
        assert!(matches!(result, Err(ConfigError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_hmac_variants_accepted() {
        for alg in ["HS256", "HS384", "HS512"] {
            assert!(AuthConfig::new(SECRET, alg, 30).is_ok(), "{} should be accepted", alg);
        }
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        assert!(matches!(
            AuthConfig::new(SECRET, "HS256", 0),
            Err(ConfigError::InvalidTtl(0))
        ));
        assert!(matches!(
            AuthConfig::new(SECRET, "HS256", -5),
            Err(ConfigError::InvalidTtl(-5))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new(SECRET, "HS256", 30).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains(SECRET));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_hashing_config_default() {
        let config = HashingConfig::default();
        assert_eq!(config.memory_kib, 65536);
        assert_eq!(config.iterations, 3);
        assert_eq!(config.parallelism, 4);
    }
}
