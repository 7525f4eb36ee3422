use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::SecurityConfig;

/// Identity claims carried by a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub username: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// `is_admin` is required so that no caller gets a silent non-admin default.
    ///
    /// Fails with `AuthError::Token` when the expiry does not fit a timestamp.
    pub fn new(
        username: impl Into<String>,
        is_admin: bool,
        expiry_hours: u64,
    ) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::Token(format!("Token expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            username: username.into(),
            is_admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

/// Authenticated caller extracted from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<TokenClaims> for AuthUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// The caller of a request. Missing and invalid tokens both yield `Anonymous`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(AuthUser),
}

impl Identity {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Anonymous => None,
        }
    }
}

/// Signing and verification keys, built once from configuration.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl TokenKeys {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret_key.as_bytes()),
            expiry_hours: config.jwt_expiry_hours,
        }
    }

    /// Sign a token for `username` with an explicit admin flag.
    pub fn issue(&self, username: &str, is_admin: bool) -> Result<String, AuthError> {
        self.sign(&TokenClaims::new(username, is_admin, self.expiry_hours)?)
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Decode a bearer token into an identity.
    ///
    /// Absent, malformed, badly signed and expired tokens all become
    /// `Identity::Anonymous`; callers cannot tell them apart.
    pub fn decode(&self, token: Option<&str>) -> Identity {
        let Some(token) = token else {
            return Identity::Anonymous;
        };

        match decode::<TokenClaims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Identity::User(data.claims.into()),
            Err(e) => {
                tracing::debug!("Ignoring invalid token: {}", e);
                Identity::Anonymous
            }
        }
    }
}
