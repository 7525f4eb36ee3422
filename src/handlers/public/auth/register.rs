// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;

use crate::database::models::NewUser;
use crate::database::users;
use crate::handlers::validate;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

/// Self-registration body. There is no `isAdmin`; accounts made here never are.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), crate::error::ApiError> {
        validate::username(&self.username)?;
        validate::password(&self.password)?;
        validate::length("firstName", &self.first_name, validate::NAME)?;
        validate::length("lastName", &self.last_name, validate::NAME)
    }
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        NewUser {
            username: request.username,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            is_admin: false,
        }
    }
}

/// Create a non-admin account and log it in.
///
/// Output: `201 { "token": "..." }`
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    request.validate()?;

    let user = users::register(&state.pool, &request.into(), state.bcrypt_cost).await?;
    let token = state.tokens.issue(&user.username, user.is_admin)?;

    tracing::info!("Registered user '{}'", user.username);
    Ok(ApiResponse::created("token", token))
}
