/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing and verification
/// - [`jwt`]: Signed, time-limited session tokens
/// - [`token_source`]: Finding the token on a request (bearer header or cookie)
///
/// All of these are pure with respect to the database; the
/// [`IdentityService`](crate::identity::IdentityService) wires them to the stores.
///
/// # Example
///
/// ```
/// use betony_shared::auth::{jwt::TokenIssuer, password::CredentialHasher};
/// use betony_shared::config::{AuthConfig, HashingConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = CredentialHasher::new(HashingConfig::minimal())?;
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash));
///
/// let issuer = TokenIssuer::new(AuthConfig::new("secret-key-that-is-at-least-32-bytes", "HS256", 30)?);
/// let token = issuer.issue(1)?;
/// assert_eq!(issuer.verify(&token)?, 1);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod token_source;
