use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Collection, CollectionDetail, CollectionId, ColorMembership, Deleted,
};
use crate::database::partial_update::compile_update;
use crate::database::users;

const COLUMNS: &str = "id, title, creator_username";

fn no_collection(id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("No collection: {}", id))
}

fn no_user(username: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("No user: {}", username))
}

/// Create a collection owned by an existing user.
pub async fn create(pool: &PgPool, title: &str, owner: &str) -> Result<Collection, DatabaseError> {
    // The owner check and the insert are one statement; the foreign key
    // catches an owner deleted in between.
    let collection = sqlx::query_as::<_, Collection>(&format!(
        "INSERT INTO collections (title, creator_username)
         SELECT $1, username FROM users WHERE username = $2
         RETURNING {COLUMNS}"
    ))
    .bind(title)
    .bind(owner)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_write(
            e,
            || format!("Duplicate collection: {}", title),
            || format!("No user: {}", owner),
        )
    })?
    .ok_or_else(|| no_user(owner))?;

    tracing::info!("Created collection {} for '{}'", collection.id, owner);
    Ok(collection)
}

/// A collection with its colors, oldest first.
pub async fn get_single(pool: &PgPool, id: i32) -> Result<CollectionDetail, DatabaseError> {
    let collection = find(pool, id).await?;

    let colors: Vec<(String,)> = sqlx::query_as(
        "SELECT color_hex
         FROM collections_colors
         WHERE collection_id = $1
         ORDER BY position",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(CollectionDetail {
        collection,
        colors: colors.into_iter().map(|(hex,)| hex).collect(),
    })
}

/// Every collection owned by `owner`. Fails if the user does not exist.
pub async fn get_all_by_user(pool: &PgPool, owner: &str) -> Result<Vec<Collection>, DatabaseError> {
    if !users::exists(pool, owner).await? {
        return Err(no_user(owner));
    }

    let collections = sqlx::query_as::<_, Collection>(&format!(
        "SELECT {COLUMNS} FROM collections WHERE creator_username = $1 ORDER BY id"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(collections)
}

pub async fn get_all(pool: &PgPool) -> Result<Vec<Collection>, DatabaseError> {
    let collections =
        sqlx::query_as::<_, Collection>(&format!("SELECT {COLUMNS} FROM collections ORDER BY id"))
            .fetch_all(pool)
            .await?;

    Ok(collections)
}

/// Change a collection's title. The owner never changes.
pub async fn rename(pool: &PgPool, id: i32, new_title: &str) -> Result<Collection, DatabaseError> {
    let mut fields = Map::new();
    fields.insert("title".to_string(), Value::String(new_title.to_string()));

    let update = compile_update(&fields, &[])?;
    let sql = format!(
        "UPDATE collections SET {} WHERE id = ${} RETURNING {COLUMNS}",
        update.set_clause,
        update.next_placeholder()
    );

    update
        .bind_to(sqlx::query_as::<_, Collection>(&sql))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| no_collection(id))
}

/// Add a color to a collection. Each color appears at most once per collection.
pub async fn add_color(pool: &PgPool, id: i32, color_hex: &str) -> Result<ColorMembership, DatabaseError> {
    find(pool, id).await?;

    let duplicate = || format!("Duplicate color {} in collection {}", color_hex, id);

    // Relies on the (collection_id, color_hex) primary key rather than a
    // separate existence check.
    sqlx::query_as::<_, ColorMembership>(
        "INSERT INTO collections_colors (collection_id, color_hex)
         VALUES ($1, $2)
         ON CONFLICT (collection_id, color_hex) DO NOTHING
         RETURNING collection_id AS id, color_hex",
    )
    .bind(id)
    .bind(color_hex)
    .fetch_optional(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, duplicate, || format!("No collection: {}", id)))?
    .ok_or_else(|| DatabaseError::Duplicate(duplicate()))
}

pub async fn remove_color(
    pool: &PgPool,
    id: i32,
    color_hex: &str,
) -> Result<Deleted<ColorMembership>, DatabaseError> {
    sqlx::query_as::<_, ColorMembership>(
        "DELETE FROM collections_colors
         WHERE collection_id = $1 AND color_hex = $2
         RETURNING collection_id AS id, color_hex",
    )
    .bind(id)
    .bind(color_hex)
    .fetch_optional(pool)
    .await?
    .map(Deleted::new)
    .ok_or_else(|| DatabaseError::NotFound(format!("No color {} in collection {}", color_hex, id)))
}

/// Delete a collection and its color memberships.
pub async fn remove(pool: &PgPool, id: i32) -> Result<Deleted<CollectionId>, DatabaseError> {
    let deleted = sqlx::query_as::<_, CollectionId>("DELETE FROM collections WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| no_collection(id))?;

    tracing::info!("Removed collection {}", id);
    Ok(Deleted::new(deleted))
}

/// Username of the collection's owner.
pub async fn owner_of(pool: &PgPool, id: i32) -> Result<String, DatabaseError> {
    Ok(find(pool, id).await?.owner_username)
}

async fn find(pool: &PgPool, id: i32) -> Result<Collection, DatabaseError> {
    sqlx::query_as::<_, Collection>(&format!("SELECT {COLUMNS} FROM collections WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| no_collection(id))
}
