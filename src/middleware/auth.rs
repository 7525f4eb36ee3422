use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::Identity;
use crate::server::AppState;

/// Decode the bearer token (if any) and attach the caller's `Identity`.
///
/// Never rejects a request: a missing or invalid token just leaves the caller
/// anonymous, and the route's guard decides what that means.
pub async fn identity_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = state.tokens.decode(extract_bearer_token(&headers));
    request.extensions_mut().insert(identity);

    next.run(request).await
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Handlers take `Identity` directly; without the middleware the caller is anonymous.
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}
