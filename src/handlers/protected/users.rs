// handlers/protected/users.rs - /users endpoints
//
// Admin-only: POST /users, GET /users
// Self or admin: GET/PATCH/DELETE /users/:username

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;

use crate::auth::{ensure_admin, ensure_self_or_admin, Identity};
use crate::database::models::{NewUser, UserUpdate};
use crate::database::users;
use crate::error::ApiError;
use crate::handlers::validate;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

fn validate_new_user(user: &NewUser) -> Result<(), ApiError> {
    validate::username(&user.username)?;
    validate::password(&user.password)?;
    validate::length("firstName", &user.first_name, validate::NAME)?;
    validate::length("lastName", &user.last_name, validate::NAME)
}

fn validate_update(update: &UserUpdate) -> Result<(), ApiError> {
    if let Some(first_name) = &update.first_name {
        validate::length("firstName", first_name, validate::NAME)?;
    }
    if let Some(last_name) = &update.last_name {
        validate::length("lastName", last_name, validate::NAME)?;
    }
    if let Some(password) = &update.password {
        validate::password(password)?;
    }
    Ok(())
}

/// POST /users - admin creates an account (admin or not) and gets its token.
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult {
    ensure_admin(&identity)?;
    let Json(new_user) = payload?;
    validate_new_user(&new_user)?;

    let user = users::register(&state.pool, &new_user, state.bcrypt_cost).await?;
    let token = state.tokens.issue(&user.username, user.is_admin)?;

    Ok(ApiResponse::created("user", user).and("token", token))
}

/// GET /users
pub async fn list(State(state): State<AppState>, identity: Identity) -> ApiResult {
    ensure_admin(&identity)?;
    let users = users::find_all(&state.pool).await?;
    Ok(ApiResponse::success("users", users))
}

/// GET /users/:username - profile plus collection summaries
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = path?;
    ensure_self_or_admin(&identity, &username)?;

    let user = users::get(&state.pool, &username).await?;
    Ok(ApiResponse::success("user", user))
}

/// PATCH /users/:username
///
/// Any subset of `firstName`, `lastName`, `password`, `isAdmin`; other keys
/// are ignored. A body with none of them is a 400.
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult {
    let Path(username) = path?;
    ensure_self_or_admin(&identity, &username)?;
    let Json(update) = payload?;
    validate_update(&update)?;

    let user = users::update(&state.pool, &username, update, state.bcrypt_cost).await?;
    Ok(ApiResponse::success("user", user))
}

/// DELETE /users/:username - also removes the user's collections
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = path?;
    ensure_self_or_admin(&identity, &username)?;

    users::remove(&state.pool, &username).await?;
    Ok(ApiResponse::success("deleted", username))
}
