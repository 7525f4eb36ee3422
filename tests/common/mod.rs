#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

use colors_api::config::AppConfig;
use colors_api::database::DatabaseManager;
use colors_api::server::{self, AppState};

/// Nothing listens here; routes that never reach the database still work.
const UNREACHABLE_DATABASE: &str = "postgres://nobody@127.0.0.1:1/nowhere";

/// The full router served on a free local port, one per test.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn(database_url: &str) -> Result<Self> {
        let config = AppConfig::from_lookup(|name| match name {
            "APP_ENV" => Some("test".to_string()),
            "DATABASE_URL" => Some(database_url.to_string()),
            _ => None,
        })?;
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        let state = AppState::new(pool, &config);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let app = server::app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            client: reqwest::Client::new(),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.state.pool
    }

    /// Sign a token directly, without a user row behind it.
    pub fn token_for(&self, username: &str, is_admin: bool) -> String {
        self.state.tokens.issue(username, is_admin).expect("sign token")
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.context("response body is not JSON")?;
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Register through `/auth/register` and return the issued token.
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "username": username,
                    "password": password,
                    "firstName": "First",
                    "lastName": "Last"
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        token_of(&body)
    }

    /// Create an admin row directly and log in as it.
    pub async fn admin(&self) -> Result<(String, String)> {
        let username = unique_name("admin");
        let new_user = colors_api::database::models::NewUser {
            username: username.clone(),
            password: "password".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            is_admin: true,
        };
        colors_api::database::users::register(self.pool(), &new_user, self.state.bcrypt_cost).await?;

        let (status, body) = self
            .post("/auth/token", None, json!({ "username": username, "password": "password" }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "admin login failed: {} {}", status, body);
        Ok((username.clone(), token_of(&body)?))
    }
}

/// A server whose database is unreachable.
pub async fn offline_server() -> Result<TestServer> {
    TestServer::spawn(UNREACHABLE_DATABASE).await
}

/// A migrated server on `DATABASE_URL`, or `None` when it is unset.
pub async fn database_server() -> Result<Option<TestServer>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        println!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let server = TestServer::spawn(&url).await?;
    DatabaseManager::migrate(server.pool()).await?;
    Ok(Some(server))
}

/// Short unique name that fits the username column.
pub fn unique_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..10])
}

pub fn token_of(body: &Value) -> Result<String> {
    body["token"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("no token in {}", body))
}

pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
