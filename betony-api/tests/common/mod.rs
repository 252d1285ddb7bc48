//! Common test utilities for integration tests
//!
//! Each `TestContext` owns a fresh, migrated SQLite file in a temporary
//! directory and a router built exactly as the binary builds it, with
//! cheap hashing parameters.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use betony_api::app::{build_router, AppState};
use betony_api::config::Config;
use betony_shared::config::HashingConfig;
use betony_shared::db::migrations::run_migrations;
use betony_shared::db::pool::{create_pool, DatabaseConfig};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "api-integration-test-secret-0123456789";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
    _dir: TempDir,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}", dir.path().join("api-test.db").display());

        let vars: HashMap<String, String> = [
            ("SECRET_KEY", TEST_SECRET),
            ("DATABASE_URL", url.as_str()),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut config = Config::from_vars(vars)?;
        config.hashing = HashingConfig::minimal();

        let db = create_pool(DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: 4,
            ..Default::default()
        })
        .await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone())?;
        state.identity.ensure_default_role().await?;
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            _dir: dir,
        })
    }

    /// Sends one request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail")
    }

    /// POSTs a JSON body
    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// GETs with a bearer token
    pub async fn get_with_token(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Registers an account and returns its access token
    pub async fn register(&self, email: &str, name: &str) -> String {
        let response = self
            .post_json(
                "/auth/register",
                json!({ "email": email, "password": "pw123456", "name": name }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        body["access_token"]
            .as_str()
            .expect("access_token should be a string")
            .to_string()
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!("Response is not JSON: {}", String::from_utf8_lossy(&body))
    })
}
