// handlers/public/auth/token.rs - POST /auth/token handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;

use crate::database::users;
use crate::handlers::validate;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Exchange a username/password pair for a signed token.
///
/// Input: `{ "username": "...", "password": "..." }`
/// Output: `{ "token": "..." }`
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    validate::username(&request.username)?;
    validate::password(&request.password)?;

    let user = users::authenticate(&state.pool, &request.username, &request.password).await?;
    let token = state.tokens.issue(&user.username, user.is_admin)?;

    tracing::info!("Issued token for '{}'", user.username);
    Ok(ApiResponse::success("token", token))
}
