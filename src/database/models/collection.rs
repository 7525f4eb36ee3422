use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i32,
    pub title: String,
    #[serde(rename = "username")]
    #[sqlx(rename = "creator_username")]
    pub owner_username: String,
}

/// A collection with its colors in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub colors: Vec<String>,
}

/// Bare id/title pair listed under a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CollectionSummary {
    pub id: i32,
    pub title: String,
}

/// One (collection, color) membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ColorMembership {
    pub id: i32,
    pub color_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CollectionId {
    pub id: i32,
}

/// `{ "deleted": ... }` result of a removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted<T> {
    pub deleted: T,
}

impl<T> Deleted<T> {
    pub fn new(deleted: T) -> Self {
        Self { deleted }
    }
}
