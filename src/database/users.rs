use serde_json::Value;
use sqlx::PgPool;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    CollectionSummary, NewUser, PublicUser, UserCredentials, UserDetail, UserUpdate,
};
use crate::database::partial_update::compile_update;

const PUBLIC_COLUMNS: &str = "username, first_name, last_name, is_admin";

fn no_user(username: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("No user: {}", username))
}

/// Check a username/password pair.
///
/// Unknown users and wrong passwords fail identically.
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<PublicUser, AuthError> {
    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT username, password_digest, first_name, last_name, is_admin
         FROM users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?;

    if let Some(user) = user {
        if verify_password(password, &user.password_digest).await? {
            return Ok(user.into());
        }
    }

    tracing::debug!("Failed login attempt for '{}'", username);
    Err(AuthError::invalid_credentials())
}

/// Create a user, storing a digest of the password.
pub async fn register(pool: &PgPool, new_user: &NewUser, cost: u32) -> Result<PublicUser, AuthError> {
    let duplicate = || format!("Duplicate username: {}", new_user.username);

    if exists(pool, &new_user.username).await? {
        return Err(DatabaseError::Duplicate(duplicate()).into());
    }

    let digest = hash_password(&new_user.password, cost).await?;

    // ON CONFLICT covers a concurrent registration of the same name.
    let user = sqlx::query_as::<_, PublicUser>(&format!(
        "INSERT INTO users (username, password_digest, first_name, last_name, is_admin)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (username) DO NOTHING
         RETURNING {PUBLIC_COLUMNS}"
    ))
    .bind(&new_user.username)
    .bind(&digest)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(new_user.is_admin)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| DatabaseError::Duplicate(duplicate()))?;

    tracing::info!("Registered user '{}' (admin: {})", user.username, user.is_admin);
    Ok(user)
}

/// All users ordered by username.
pub async fn find_all(pool: &PgPool) -> Result<Vec<PublicUser>, DatabaseError> {
    let users = sqlx::query_as::<_, PublicUser>(&format!(
        "SELECT {PUBLIC_COLUMNS} FROM users ORDER BY username"
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// A user with the id/title of every collection they own.
pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
    let user = sqlx::query_as::<_, PublicUser>(&format!(
        "SELECT {PUBLIC_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| no_user(username))?;

    let collections = sqlx::query_as::<_, CollectionSummary>(
        "SELECT id, title
         FROM collections
         WHERE creator_username = $1
         ORDER BY id",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(UserDetail { user, collections })
}

/// Apply a partial update. A supplied password is digested before storage.
pub async fn update(
    pool: &PgPool,
    username: &str,
    changes: UserUpdate,
    cost: u32,
) -> Result<PublicUser, AuthError> {
    let mut fields = changes.into_fields();

    if let Some(Value::String(password)) = fields.get("password").cloned() {
        let digest = hash_password(&password, cost).await?;
        fields.insert("password".to_string(), Value::String(digest));
    }

    let update = compile_update(&fields, UserUpdate::COLUMNS)?;
    let sql = format!(
        "UPDATE users SET {} WHERE username = ${} RETURNING {PUBLIC_COLUMNS}",
        update.set_clause,
        update.next_placeholder()
    );

    let user = update
        .bind_to(sqlx::query_as::<_, PublicUser>(&sql))
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| no_user(username))?;

    Ok(user)
}

/// Delete a user; owned collections go with it.
pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
    let deleted: Option<(String,)> =
        sqlx::query_as("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    match deleted {
        Some(_) => {
            tracing::info!("Removed user '{}'", username);
            Ok(())
        }
        None => Err(no_user(username)),
    }
}

pub async fn exists(pool: &PgPool, username: &str) -> Result<bool, DatabaseError> {
    let found: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}
