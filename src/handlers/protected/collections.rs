// handlers/protected/collections.rs - /collections endpoints
//
// Routes addressed by collection id require a logged-in caller who owns the
// collection or is an admin. An unknown id is a 404 for any logged-in caller.

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::Deserialize;

use crate::auth::{ensure_admin, ensure_logged_in, ensure_owner_or_admin, ensure_self_or_admin, Identity};
use crate::database::collections;
use crate::handlers::validate;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRequest {
    pub color_hex: String,
}

/// Resolve the id and run the LoggedIn + OwnerOrAdmin checks.
async fn owned_collection(
    state: &AppState,
    identity: &Identity,
    path: Result<Path<i32>, PathRejection>,
) -> Result<i32, crate::error::ApiError> {
    ensure_logged_in(identity)?;
    let Path(id) = path?;
    ensure_owner_or_admin(identity, &state.pool, id).await?;
    Ok(id)
}

/// POST /collections - owned by the caller
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult {
    let user = ensure_logged_in(&identity)?;
    let Json(request) = payload?;
    validate::title(&request.title)?;

    let collection = collections::create(&state.pool, &request.title, &user.username).await?;
    Ok(ApiResponse::created("collection", collection))
}

/// GET /collections - every collection, admin only
pub async fn list(State(state): State<AppState>, identity: Identity) -> ApiResult {
    ensure_admin(&identity)?;
    let collections = collections::get_all(&state.pool).await?;
    Ok(ApiResponse::success("collections", collections))
}

/// GET /collections/users/:username
pub async fn list_by_user(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(username) = path?;
    ensure_self_or_admin(&identity, &username)?;

    let collections = collections::get_all_by_user(&state.pool, &username).await?;
    Ok(ApiResponse::success("collections", collections))
}

/// GET /collections/:id - with colors in insertion order
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult {
    let id = owned_collection(&state, &identity, path).await?;
    let collection = collections::get_single(&state.pool, id).await?;
    Ok(ApiResponse::success("collection", collection))
}

/// PATCH /collections/:id - `{ "title": "..." }`
pub async fn rename(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult {
    let id = owned_collection(&state, &identity, path).await?;
    let Json(request) = payload?;
    validate::title(&request.title)?;

    let collection = collections::rename(&state.pool, id, &request.title).await?;
    Ok(ApiResponse::success("collection", collection))
}

/// DELETE /collections/:id
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult {
    let id = owned_collection(&state, &identity, path).await?;
    let removed = collections::remove(&state.pool, id).await?;
    Ok(ApiResponse::success("deleted", removed.deleted))
}

/// POST /collections/:id/colors - `{ "colorHex": "1a2b3c" }`
pub async fn add_color(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ColorRequest>, JsonRejection>,
) -> ApiResult {
    let id = owned_collection(&state, &identity, path).await?;
    let Json(request) = payload?;
    validate::color_hex(&request.color_hex)?;

    let color = collections::add_color(&state.pool, id, &request.color_hex).await?;
    Ok(ApiResponse::created("color", color))
}

/// DELETE /collections/:id/colors/:hex
pub async fn remove_color(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<(i32, String)>, PathRejection>,
) -> ApiResult {
    ensure_logged_in(&identity)?;
    let Path((id, color_hex)) = path?;
    ensure_owner_or_admin(&identity, &state.pool, id).await?;
    validate::color_hex(&color_hex)?;

    let removed = collections::remove_color(&state.pool, id, &color_hex).await?;
    Ok(ApiResponse::success("deleted", removed.deleted))
}
