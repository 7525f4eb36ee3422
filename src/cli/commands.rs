use anyhow::Context;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{NewUser, PublicUser};
use crate::database::{users, DatabaseManager};
use crate::handlers::validate;
use crate::server;

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    migrate(&config).await?;
    server::serve(config).await
}

pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to database")?;
    DatabaseManager::migrate(&pool).await.context("applying migrations")?;
    Ok(())
}

/// Bootstrap path for the first admin, since `POST /users` already needs one.
pub async fn create_user(
    config: &AppConfig,
    new_user: NewUser,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    validate::username(&new_user.username)?;
    validate::password(&new_user.password)?;
    validate::length("firstName", &new_user.first_name, validate::NAME)?;
    validate::length("lastName", &new_user.last_name, validate::NAME)?;

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to database")?;
    let user = users::register(&pool, &new_user, config.security.bcrypt_cost).await?;

    print_user(&user, output_format)
}

fn print_user(user: &PublicUser, output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
        OutputFormat::Text => println!(
            "Created user {} ({} {}){}",
            user.username,
            user.first_name,
            user.last_name,
            if user.is_admin { " [admin]" } else { "" }
        ),
    }
    Ok(())
}
