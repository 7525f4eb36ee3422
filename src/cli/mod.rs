pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "colors-api")]
#[command(about = "Colors API - users and their color collections over HTTP")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply migrations and serve the HTTP API (default)")]
    Serve,

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Create a user directly in the database")]
    CreateUser {
        #[arg(help = "Username (1-25 characters)")]
        username: String,
        #[arg(long, help = "Password (5-20 characters)")]
        password: String,
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Grant admin rights")]
        admin: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve(config).await,
        Commands::Migrate => commands::migrate(&config).await,
        Commands::CreateUser {
            username,
            password,
            first_name,
            last_name,
            admin,
        } => {
            let new_user = crate::database::models::NewUser {
                username,
                password,
                first_name,
                last_name,
                is_admin: admin,
            };
            commands::create_user(&config, new_user, output_format).await
        }
    }
}
