use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::auth::password::{MAX_COST, MIN_COST};

/// Signing secret used when `SECRET_KEY` is not set. Rejected in production.
pub const DEV_SECRET_KEY: &str = "secret-dev";

/// Upper bound for `JWT_EXPIRY_HOURS` (ten years).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to a non-default value in production")]
    InsecureSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

// Keep the signing secret out of startup logs.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("test") => Environment::Test,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        if config.environment == Environment::Production
            && config.security.secret_key == DEV_SECRET_KEY
        {
            return Err(ConfigError::InsecureSecret);
        }

        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECRET_KEY") {
            self.security.secret_key = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            let hours: u64 = parse("JWT_EXPIRY_HOURS", v.clone())?;
            if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
                return Err(ConfigError::InvalidValue { name: "JWT_EXPIRY_HOURS", value: v });
            }
            self.security.jwt_expiry_hours = hours;
        }
        if let Some(v) = lookup("BCRYPT_WORK_FACTOR") {
            let cost: u32 = parse("BCRYPT_WORK_FACTOR", v.clone())?;
            if !(MIN_COST..=MAX_COST).contains(&cost) {
                return Err(ConfigError::InvalidValue { name: "BCRYPT_WORK_FACTOR", value: v });
            }
            self.security.bcrypt_cost = cost;
        }

        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse("PORT", v)?;
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "postgres:///colors".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 12,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            database: DatabaseConfig {
                url: "postgres:///colors_test".to_string(),
                max_connections: 5,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 1,
                // Speed up bcrypt during tests
                bcrypt_cost: MIN_COST,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "postgres:///colors".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 12,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
        }
    }

    pub fn is_test(&self) -> bool {
        self.environment == Environment::Test
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_development() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database.url, "postgres:///colors");
        assert_eq!(config.security.bcrypt_cost, 12);
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_environment_lowers_work_factor() {
        let config = AppConfig::from_lookup(lookup_from(&[("APP_ENV", "test")])).unwrap();
        assert!(config.is_test());
        assert_eq!(config.security.bcrypt_cost, MIN_COST);
        assert_eq!(config.database.url, "postgres:///colors_test");
    }

    #[test]
    fn env_overrides_win() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/colors_other"),
            ("PORT", "8080"),
            ("SECRET_KEY", "hunter2"),
            ("BCRYPT_WORK_FACTOR", "6"),
        ]))
        .unwrap();
        assert_eq!(config.database.url, "postgres://db/colors_other");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.secret_key, "hunter2");
        assert_eq!(config.security.bcrypt_cost, 6);
    }

    #[test]
    fn rejects_unparsable_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err =
            AppConfig::from_lookup(lookup_from(&[("BCRYPT_WORK_FACTOR", "99")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "BCRYPT_WORK_FACTOR", .. }));
    }

    #[test]
    fn rejects_out_of_range_token_expiry() {
        for hours in ["0", "10000000000", "87601"] {
            let err = AppConfig::from_lookup(lookup_from(&[("JWT_EXPIRY_HOURS", hours)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "JWT_EXPIRY_HOURS", .. }), "{}", hours);
        }

        let config = AppConfig::from_lookup(lookup_from(&[("JWT_EXPIRY_HOURS", "87600")])).unwrap();
        assert_eq!(config.security.jwt_expiry_hours, MAX_JWT_EXPIRY_HOURS);
    }

    #[test]
    fn production_requires_real_secret() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_ENV", "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "prod"),
            ("SECRET_KEY", "a-long-random-secret"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = AppConfig::from_lookup(lookup_from(&[("SECRET_KEY", "topsecret")])).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
