/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use betony_api::{app::{build_router, AppState}, config::Config};
/// use betony_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use betony_shared::{
    auth::{jwt::TokenIssuer, password::CredentialHasher, token_source::token_from_headers},
    identity::IdentityService,
    models::account::Account,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Identity service bound to `db`
    pub identity: Arc<IdentityService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Returns an error if the configured hashing parameters are invalid
    pub fn new(db: SqlitePool, config: Config) -> anyhow::Result<Self> {
        let hasher = CredentialHasher::new(config.hashing)?;
        let tokens = TokenIssuer::new(config.auth.clone());
        let identity = IdentityService::new(db.clone(), hasher, tokens);

        Ok(Self {
            db,
            identity: Arc::new(identity),
            config: Arc::new(config),
        })
    }
}

/// The account a request was authenticated as
///
/// Inserted into request extensions by the authentication layer.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                  # Health check (public)
/// └── /auth/
///     ├── POST /register            # public
///     ├── POST /login               # public, sets access_token cookie
///     ├── POST /logout              # public, clears the cookie
///     ├── GET  /me                  # authenticated
///     ├── GET  /users               # authenticated
///     ├── GET  /users/:id           # authenticated
///     └── PUT  /users/:id/admin     # authenticated, admin only
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout));

    let protected_auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/users", get(routes::auth::list_users))
        .route("/users/:id", get(routes::auth::get_user))
        .route("/users/:id/admin", put(routes::auth::set_admin))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware layer
///
/// Takes the token from the `Authorization: Bearer` header or, failing
/// that, the `access_token` cookie, resolves it to an account and injects
/// [`CurrentAccount`] into request extensions. A missing token gets the
/// same 401 as a bad one.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_headers(req.headers())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Unauthorized(crate::error::INVALID_CREDENTIALS.to_string()))?;

    let account = state.identity.resolve_current_account(&token).await?;

    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}
