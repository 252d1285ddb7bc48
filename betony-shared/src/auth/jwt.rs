/// Session token issuing and verification
///
/// Session tokens are self-contained JWTs binding an account id to an
/// absolute expiry instant. Nothing is persisted server-side.
///
/// # Security
///
/// - **Algorithm**: HMAC (HS256 by default, HS384/HS512 allowed)
/// - **Expiration**: `now + access_token_ttl` (default 30 minutes), checked
///   against the injected clock with zero leeway
/// - **Validation**: signature, issuer and expiry
///
/// The verifier distinguishes *why* a token was rejected ([`TokenError`]) so
/// the reason can be logged. Callers crossing a trust boundary must collapse
/// every variant into one "invalid session" outcome.
///
/// # Example
///
/// ```
/// use betony_shared::auth::jwt::TokenIssuer;
/// use betony_shared::config::AuthConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AuthConfig::new("your-secret-key-at-least-32-bytes-long", "HS256", 30)?;
/// let issuer = TokenIssuer::new(config);
///
/// let token = issuer.issue(42)?;
/// assert_eq!(issuer.verify(&token)?, 42);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Issuer claim stamped into and required from every token
pub const ISSUER: &str = "betony";

/// Error type for token operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token could not be signed
    #[error("Failed to create token: {0}")]
    Encode(String),

    /// Token is not a structurally valid token from this service
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not match the configured secret
    #[error("Token signature mismatch")]
    BadSignature,

    /// Expiry instant has passed
    #[error("Token has expired")]
    Expired,
}

/// JWT claims
///
/// - `sub`: account id, as a decimal string
/// - `iss`: always [`ISSUER`]
/// - `iat`: issued at (Unix timestamp)
/// - `exp`: expiration (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Creates and validates signed, time-limited session tokens
///
/// Built once at startup from [`AuthConfig`]; cloning shares the clock.
#[derive(Clone)]
pub struct TokenIssuer {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TokenIssuer {
    /// Creates an issuer reading time from the system clock
    pub fn new(config: AuthConfig) -> Self {
        Self::with_clock(config, Arc::new(DefaultClock))
    }

    /// Creates an issuer with an explicit clock
    pub fn with_clock(config: AuthConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret().as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret().as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            clock,
        }
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.config.access_token_ttl()
    }

    /// Issues a token for an account
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails
    pub fn issue(&self, account_id: i64) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: account_id.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl()).timestamp(),
        };

        encode(&Header::new(self.config.algorithm()), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verifies a token and returns the account id it binds
    ///
    /// Never panics on arbitrary input.
    ///
    /// # Errors
    ///
    /// - `TokenError::BadSignature` if the signature does not match
    /// - `TokenError::Expired` if `now >= exp`
    /// - `TokenError::Malformed` for anything else (bad encoding, wrong
    ///   algorithm or issuer, missing claims, non-numeric subject)
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(self.config.algorithm());
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is checked below against our own clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?
            .claims;

        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed("subject is not an account id".to_string()))
    }
}
