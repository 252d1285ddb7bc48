/// Identity service: registration, login and current-account resolution
///
/// Every operation opens its own [`UnitOfWork`], so one call is one
/// transaction. Domain failures come back as named [`IdentityError`]
/// variants; store and connection failures are passed through untouched
/// and reported by [`IdentityError::is_internal`].
///
/// Authentication failures are deliberately uniform. An unknown email, a
/// wrong password, and a token that is expired, tampered, malformed or
/// points at a missing account all surface as
/// [`IdentityError::InvalidCredentials`]. The specific reason is only
/// logged at debug level.
///
/// # Example
///
/// ```no_run
/// use betony_shared::auth::{jwt::TokenIssuer, password::CredentialHasher};
/// use betony_shared::config::{AuthConfig, HashingConfig};
/// use betony_shared::identity::{IdentityService, RegisterAccount};
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let service = IdentityService::new(
///     pool,
///     CredentialHasher::new(HashingConfig::default())?,
///     TokenIssuer::new(AuthConfig::new("a-very-long-secret-key-used-for-signing!!", "HS256", 30)?),
/// );
///
/// let registered = service
///     .register(RegisterAccount {
///         email: "alice@x.com".to_string(),
///         password: "pw123456".to_string(),
///         name: "Alice".to_string(),
///     })
///     .await?;
///
/// let me = service.resolve_current_account(&registered.access_token).await?;
/// assert_eq!(me.id, registered.account.id);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::auth::jwt::{TokenError, TokenIssuer};
use crate::auth::password::{CredentialHasher, PasswordError};
use crate::db::{StoreError, UnitOfWork};
use crate::models::account::{Account, CreateAccount};
use crate::models::role::Role;

/// Error type for identity operations
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// An account with this email already exists
    #[error("an account with this email already exists")]
    AlreadyExists,

    /// Unknown email, wrong password, or an unusable token
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The caller is authenticated but not allowed to do this
    #[error("operation not permitted")]
    Forbidden,

    /// The requested account does not exist
    #[error("account not found")]
    NotFound,

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Hashing primitive failure
    #[error(transparent)]
    Hashing(#[from] PasswordError),

    /// Token could not be signed
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl IdentityError {
    /// Whether this is an infrastructure failure rather than a domain outcome
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            IdentityError::Store(_) | IdentityError::Hashing(_) | IdentityError::Token(_)
        )
    }
}

/// Registration input
///
/// Field-level rules (email syntax, name and password length) belong to
/// the transport that builds this value. The service only trims and
/// lower-cases the email before it is looked up or stored.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAccount {
    /// Login key
    pub email: String,

    /// Plaintext password; hashed before it reaches the store
    pub password: String,

    /// Display name
    pub name: String,
}

/// An account together with a freshly issued access token
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account: Account,
    pub access_token: String,
}

/// Canonical form of an email used as the login key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Orchestrates hashing, tokens and the account/role stores
#[derive(Clone)]
pub struct IdentityService {
    pool: SqlitePool,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl IdentityService {
    pub fn new(pool: SqlitePool, hasher: CredentialHasher, tokens: TokenIssuer) -> Self {
        Self {
            pool,
            hasher,
            tokens,
        }
    }

    /// Lifetime of the tokens this service issues
    pub fn token_ttl(&self) -> Duration {
        self.tokens.ttl()
    }

    /// Makes sure the default role exists
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Store` on storage failure
    pub async fn ensure_default_role(&self) -> Result<Role, IdentityError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let role = uow.roles().ensure_default_role().await?;
        uow.commit().await?;

        Ok(role)
    }

    /// Registers a new account and signs it in
    ///
    /// The very first account in an empty store becomes an admin. The count
    /// is taken inside the same unit as the insert, but two concurrent
    /// first registrations with different emails can both see an empty
    /// store; that race is accepted.
    ///
    /// # Errors
    ///
    /// - `IdentityError::AlreadyExists` if the email is taken, including when
    ///   a concurrent registration wins between our check and our insert
    /// - internal variants on storage, hashing or signing failure
    pub async fn register(&self, input: RegisterAccount) -> Result<AuthenticatedAccount, IdentityError> {
        let input = RegisterAccount {
            email: normalize_email(&input.email),
            ..input
        };

        // Hash before the unit starts: its first statement takes the write lock
        let password_hash = self.hasher.hash(&input.password)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let role = uow.roles().ensure_default_role().await?;

        if uow.accounts().find_by_email(&input.email).await?.is_some() {
            debug!(unit_of_work = %uow.id(), "Registration rejected: email already registered");
            return Err(IdentityError::AlreadyExists);
        }

        let is_admin = uow.accounts().count().await? == 0;

        let account = uow
            .accounts()
            .insert(CreateAccount {
                name: input.name,
                email: input.email,
                password_hash,
                is_admin,
                role_id: role.id,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => IdentityError::AlreadyExists,
                other => IdentityError::Store(other),
            })?;

        uow.commit().await?;

        if account.is_admin {
            info!(account_id = account.id, "First account registered as admin");
        } else {
            info!(account_id = account.id, "Account registered");
        }

        let access_token = self.tokens.issue(account.id)?;

        Ok(AuthenticatedAccount {
            account,
            access_token,
        })
    }

    /// Checks credentials and issues a token
    ///
    /// # Errors
    ///
    /// - `IdentityError::InvalidCredentials` for an unknown email or a wrong
    ///   password, indistinguishably
    /// - internal variants on storage or signing failure
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedAccount, IdentityError> {
        let email = normalize_email(email);

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let account = uow.accounts().find_by_email(&email).await?;

        let account = match account {
            Some(account) if self.hasher.verify(password, &account.password_hash) => account,
            Some(account) => {
                debug!(account_id = account.id, "Login rejected: password mismatch");
                return Err(IdentityError::InvalidCredentials);
            }
            None => {
                debug!("Login rejected: unknown email");
                return Err(IdentityError::InvalidCredentials);
            }
        };

        let access_token = self.tokens.issue(account.id)?;
        debug!(account_id = account.id, "Login succeeded");

        Ok(AuthenticatedAccount {
            account,
            access_token,
        })
    }

    /// Maps a token back to the account it was issued for
    ///
    /// # Errors
    ///
    /// - `IdentityError::InvalidCredentials` if the token is malformed,
    ///   tampered with, expired, or its account no longer exists
    /// - `IdentityError::Store` on storage failure
    pub async fn resolve_current_account(&self, token: &str) -> Result<Account, IdentityError> {
        let account_id = self.tokens.verify(token).map_err(|e| {
            debug!(reason = %e, "Token rejected");
            IdentityError::InvalidCredentials
        })?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let account = uow.accounts().find_by_id(account_id).await?;

        account.ok_or_else(|| {
            debug!(account_id, "Token rejected: account no longer exists");
            IdentityError::InvalidCredentials
        })
    }

    /// Looks up an account by id
    ///
    /// # Errors
    ///
    /// - `IdentityError::NotFound` if there is no such account
    /// - `IdentityError::Store` on storage failure
    pub async fn get_account(&self, id: i64) -> Result<Account, IdentityError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        uow.accounts()
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::NotFound)
    }

    /// Lists all accounts
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Store` on storage failure
    pub async fn list_accounts(&self) -> Result<Vec<Account>, IdentityError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        Ok(uow.accounts().list_all().await?)
    }

    /// Grants or revokes admin rights on behalf of `actor`
    ///
    /// # Errors
    ///
    /// - `IdentityError::Forbidden` if `actor` is not an admin
    /// - `IdentityError::NotFound` if the target account does not exist
    /// - `IdentityError::Store` on storage failure
    pub async fn set_admin(
        &self,
        actor: &Account,
        account_id: i64,
        is_admin: bool,
    ) -> Result<Account, IdentityError> {
        if !actor.is_admin {
            warn!(actor_id = actor.id, account_id, "Non-admin tried to change admin flag");
            return Err(IdentityError::Forbidden);
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let account = uow
            .accounts()
            .set_admin(account_id, is_admin)
            .await?
            .ok_or(IdentityError::NotFound)?;
        uow.commit().await?;

        info!(actor_id = actor.id, account_id, is_admin, "Admin flag changed");

        Ok(account)
    }
}
