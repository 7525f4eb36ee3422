use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors raised by the repositories and the pool manager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    InvalidUpdate(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// Classify a failed write. Constraint violations become typed failures so a
    /// lost check-then-act race still surfaces as `Duplicate` or `NotFound`.
    pub(crate) fn from_write(
        err: sqlx::Error,
        duplicate: impl FnOnce() -> String,
        missing: impl FnOnce() -> String,
    ) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => DatabaseError::Duplicate(duplicate()),
            Some(FOREIGN_KEY_VIOLATION) => DatabaseError::NotFound(missing()),
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Connection pool construction and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool and wait for the first connection.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Build a pool that connects on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        Ok(Self::pool_options(config).connect_lazy(&config.url)?)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier to prevent injection
    pub(crate) fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
