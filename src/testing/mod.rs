use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, MIN_COST};
use crate::database::models::{Collection, PublicUser};
use crate::database::{collections, DatabaseManager};

/// Database fixture for repository tests.
///
/// Needs `DATABASE_URL`; without it `new` returns `None` and the calling test
/// returns early. Rows use unique names, so tests can share one database.
pub struct TestContext {
    pub pool: PgPool,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            println!("DATABASE_URL not set; skipping database test");
            return None;
        };

        let pool = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
        DatabaseManager::migrate(&pool).await.expect("apply migrations");
        Some(Self { pool })
    }

    /// `prefix` plus a random suffix, short enough for the username column.
    pub fn unique_name(&self, prefix: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}_{}", &prefix[..prefix.len().min(12)], &suffix[..10])
    }

    /// Insert a user whose password is `password`.
    pub async fn create_user(&self, prefix: &str, is_admin: bool) -> PublicUser {
        let username = self.unique_name(prefix);
        let digest = hash_password("password", MIN_COST).await.expect("hash");

        sqlx::query_as::<_, PublicUser>(
            "INSERT INTO users (username, password_digest, first_name, last_name, is_admin)
             VALUES ($1, $2, 'First', 'Last', $3)
             RETURNING username, first_name, last_name, is_admin",
        )
        .bind(&username)
        .bind(&digest)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .expect("insert test user")
    }

    pub async fn create_collection(&self, owner: &str, title: &str) -> Collection {
        collections::create(&self.pool, title, owner)
            .await
            .expect("insert test collection")
    }
}
