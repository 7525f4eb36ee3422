use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::collection::CollectionSummary;

/// User fields safe to return to clients (no password digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// Full user row, only used while checking credentials.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub username: String,
    pub password_digest: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl From<UserCredentials> for PublicUser {
    fn from(row: UserCredentials) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            is_admin: row.is_admin,
        }
    }
}

/// A user together with the collections they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: PublicUser,
    pub collections: Vec<CollectionSummary>,
}

/// Registration input. `is_admin` has no default; callers must decide.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// Partial update of a user. Unknown JSON keys are ignored on deserialize.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Logical field name -> column name for the users table.
    pub const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("password", "password_digest"),
        ("isAdmin", "is_admin"),
    ];

    /// The fields that were supplied, keyed by their logical names.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(first_name) = self.first_name {
            fields.insert("firstName".to_string(), Value::String(first_name));
        }
        if let Some(last_name) = self.last_name {
            fields.insert("lastName".to_string(), Value::String(last_name));
        }
        if let Some(password) = self.password {
            fields.insert("password".to_string(), Value::String(password));
        }
        if let Some(is_admin) = self.is_admin {
            fields.insert("isAdmin".to_string(), Value::Bool(is_admin));
        }
        fields
    }
}
