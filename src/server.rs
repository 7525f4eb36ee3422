use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenKeys;
use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{identity_middleware, ApiResponse};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenKeys>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            pool,
            tokens: Arc::new(TokenKeys::new(&config.security)),
            bcrypt_cost: config.security.bcrypt_cost,
        }
    }

    /// Connect to the configured database and build the state.
    pub async fn connect(config: &AppConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect(&config.database).await?;
        Ok(Self::new(pool, config))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(collection_routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), identity_middleware))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/token", post(auth::token_post))
        .route("/auth/register", post(auth::register_post))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:username",
            get(users::show).patch(users::update).delete(users::remove),
        )
}

fn collection_routes() -> Router<AppState> {
    use protected::collections;

    Router::new()
        .route("/collections", get(collections::list).post(collections::create))
        .route("/collections/users/:username", get(collections::list_by_user))
        .route(
            "/collections/:id",
            get(collections::show)
                .patch(collections::rename)
                .delete(collections::remove),
        )
        .route("/collections/:id/colors", post(collections::add_color))
        .route("/collections/:id/colors/:hex", delete(collections::remove_color))
}

async fn root() -> ApiResponse {
    ApiResponse::success("name", "Colors API")
        .and("version", env!("CARGO_PKG_VERSION"))
        .and(
            "endpoints",
            json!({
                "auth": "/auth/token, /auth/register (public)",
                "users": "/users[/:username] (admin, or self)",
                "collections": "/collections[/:id[/colors[/:hex]]] (owner or admin)",
                "health": "/health (public)",
            }),
        )
}

async fn health(State(state): State<AppState>) -> ApiResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => ApiResponse::success("status", "ok")
            .and("database", "ok")
            .and("timestamp", now),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiResponse::with_status(StatusCode::SERVICE_UNAVAILABLE)
                .and("status", "degraded")
                .and("database", "unavailable")
                .and("timestamp", now)
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::connect(&config).await?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Colors API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
pub(crate) fn lazy_state() -> AppState {
    let config = AppConfig::from_lookup(|name| match name {
        "APP_ENV" => Some("test".to_string()),
        "DATABASE_URL" => Some("postgres://nobody@127.0.0.1:1/nowhere".to_string()),
        _ => None,
    })
    .expect("test config");
    let pool = DatabaseManager::connect_lazy(&config.database).expect("lazy pool");
    AppState::new(pool, &config)
}
