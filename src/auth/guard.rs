//! Authorization checks run before a handler touches a repository.
//!
//! Every check either returns the authenticated caller or fails with
//! `AuthError::Authorization`. None of them has side effects.

use async_trait::async_trait;
use sqlx::PgPool;

use super::token::{AuthUser, Identity};
use super::AuthError;
use crate::database::{collections, DatabaseError};

/// Resolves the owner of a collection.
#[async_trait]
pub trait CollectionOwners: Send + Sync {
    /// Fails with `DatabaseError::NotFound` when the collection does not exist.
    async fn owner_of(&self, collection_id: i32) -> Result<String, DatabaseError>;
}

#[async_trait]
impl CollectionOwners for PgPool {
    async fn owner_of(&self, collection_id: i32) -> Result<String, DatabaseError> {
        collections::owner_of(self, collection_id).await
    }
}

/// Any authenticated caller.
pub fn ensure_logged_in(identity: &Identity) -> Result<&AuthUser, AuthError> {
    identity.user().ok_or_else(AuthError::unauthorized)
}

/// Authenticated admins only.
pub fn ensure_admin(identity: &Identity) -> Result<&AuthUser, AuthError> {
    match identity.user() {
        Some(user) if user.is_admin => Ok(user),
        _ => Err(AuthError::unauthorized()),
    }
}

/// The user named by the route, or an admin.
pub fn ensure_self_or_admin<'a>(
    identity: &'a Identity,
    target_username: &str,
) -> Result<&'a AuthUser, AuthError> {
    match identity.user() {
        Some(user) if user.is_admin || user.username == target_username => Ok(user),
        _ => Err(AuthError::unauthorized()),
    }
}

/// The owner of the collection, or an admin.
///
/// The owner is resolved first, so an unknown collection id fails with
/// `NotFound` rather than `Authorization`.
pub async fn ensure_owner_or_admin<'a, O>(
    identity: &'a Identity,
    owners: &O,
    collection_id: i32,
) -> Result<&'a AuthUser, AuthError>
where
    O: CollectionOwners + ?Sized,
{
    let owner = owners.owner_of(collection_id).await?;

    match identity.user() {
        Some(user) if user.is_admin || user.username == owner => Ok(user),
        _ => Err(AuthError::Authorization(
            "Unauthorized: current user does not own this collection".to_string(),
        )),
    }
}
