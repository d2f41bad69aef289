//! CLI command definitions and dispatch.

pub mod cleanup;
pub mod expiry;
pub mod migrate;
pub mod pending;
pub mod stats;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use healthbridge_core::error::AppError;

/// HealthBridge — medicine donation matching platform
#[derive(Debug, Parser)]
#[command(name = "healthbridge", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (reads config/default.toml plus
    /// config/<env>.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Alert donors about soon-to-expire donations
    CheckExpiry(expiry::CheckExpiryArgs),
    /// Remove long-expired donations with cascading cleanup
    CleanupExpired(cleanup::CleanupExpiredArgs),
    /// List submissions awaiting admin review
    Pending,
    /// Show platform statistics
    Stats,
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.env).await,
            Commands::CheckExpiry(args) => expiry::execute(args, &self.env, self.format).await,
            Commands::CleanupExpired(args) => cleanup::execute(args, &self.env, self.format).await,
            Commands::Pending => pending::execute(&self.env, self.format).await,
            Commands::Stats => stats::execute(&self.env).await,
        }
    }
}

/// Helper: load configuration for the selected environment.
pub fn load_config(env: &str) -> Result<healthbridge_core::config::AppConfig, AppError> {
    healthbridge_core::config::AppConfig::load(env)
}

/// Helper: create a database pool from config.
pub async fn create_db_pool(
    config: &healthbridge_core::config::AppConfig,
) -> Result<sqlx::PgPool, AppError> {
    let pool = healthbridge_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
