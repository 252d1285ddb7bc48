/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new account
/// - `POST /auth/login` - Log in, get a token and the `access_token` cookie
/// - `POST /auth/logout` - Clear the `access_token` cookie
/// - `GET /auth/me` - Current account
/// - `GET /auth/users` - List accounts
/// - `GET /auth/users/:id` - Look up one account
/// - `PUT /auth/users/:id/admin` - Grant or revoke admin (admins only)
///
/// Protected endpoints accept the token either as `Authorization: Bearer`
/// or as the `access_token` cookie; the header wins when both are sent.

use crate::{
    app::{AppState, CurrentAccount},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use betony_shared::{
    auth::token_source::{clear_session_cookie, session_cookie},
    identity::{AuthenticatedAccount, RegisterAccount},
    models::account::Account,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, max = 128, message = "Password must be 6 to 128 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 4, max = 15, message = "Name must be 4 to 15 characters"))]
    pub name: String,
}

/// Login request
///
/// Not validated beyond deserialization: a malformed email is simply an
/// unknown one and gets the same 401.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Admin flag update request
#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    /// New value of the admin flag
    pub is_admin: bool,
}

/// Public view of an account
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            is_admin: account.is_admin,
            role_id: account.role_id,
            created_at: account.created_at,
        }
    }
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Signed access token
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,

    /// The authenticated account
    pub user: AccountResponse,
}

impl From<AuthenticatedAccount> for AuthResponse {
    fn from(authenticated: AuthenticatedAccount) -> Self {
        Self {
            access_token: authenticated.access_token,
            token_type: "bearer".to_string(),
            user: authenticated.account.into(),
        }
    }
}

/// Register a new account
///
/// The first account ever registered becomes an admin.
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "alice@x.com",
///   "password": "pw123456",
///   "name": "Alice"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with an [`AuthResponse`].
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let registered = state
        .identity
        .register(RegisterAccount {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(registered))))
}

/// Log in with email and password
///
/// On success the token is returned in the body and also set as an
/// HttpOnly `access_token` cookie that lives as long as the token.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same response)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let authenticated = state.identity.login(&req.email, &req.password).await?;

    let cookie = session_cookie(
        &authenticated.access_token,
        state.identity.token_ttl().num_seconds(),
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(authenticated)),
    ))
}

/// Clear the session cookie
///
/// Tokens are stateless, so a bearer token stays valid until it expires.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
}

/// Current account
pub async fn me(Extension(CurrentAccount(account)): Extension<CurrentAccount>) -> Json<AccountResponse> {
    Json(account.into())
}

/// List all accounts
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = state.identity.list_accounts().await?;

    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// Look up one account
///
/// # Errors
///
/// - `404 Not Found`: No such account
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state.identity.get_account(id).await?;

    Ok(Json(account.into()))
}

/// Grant or revoke admin rights
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: No such account
pub async fn set_admin(
    State(state): State<AppState>,
    Extension(CurrentAccount(actor)): Extension<CurrentAccount>,
    Path(id): Path<i64>,
    Json(req): Json<SetAdminRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state.identity.set_admin(&actor, id, req.is_admin).await?;

    Ok(Json(account.into()))
}
