pub mod guard;
pub mod password;
pub mod token;

use thiserror::Error;

use crate::database::DatabaseError;

pub use guard::{
    ensure_admin, ensure_logged_in, ensure_owner_or_admin, ensure_self_or_admin,
    CollectionOwners,
};
pub use token::{AuthUser, Identity, TokenClaims, TokenKeys};

/// Message returned for any failed credential check.
pub const INVALID_CREDENTIALS: &str = "Invalid username/password";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad credentials.
    #[error("{0}")]
    Authentication(String),

    /// Caller (anonymous or not) lacks permission.
    #[error("{0}")]
    Authorization(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token generation failed: {0}")]
    Token(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl AuthError {
    pub fn unauthorized() -> Self {
        AuthError::Authorization("Unauthorized".to_string())
    }

    pub fn invalid_credentials() -> Self {
        AuthError::Authentication(INVALID_CREDENTIALS.to_string())
    }
}
