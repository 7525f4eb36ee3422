use clap::Parser;
use tracing_subscriber::EnvFilter;

use colors_api::cli::{self, Cli};
use colors_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let default_filter = if config.is_test() {
        "off"
    } else {
        "colors_api=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("Starting Colors API in {:?} mode", config.environment);
    tracing::debug!("Configuration: {:?}", config);

    if let Err(e) = cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
