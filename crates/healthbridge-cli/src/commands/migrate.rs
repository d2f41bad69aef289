//! Migration CLI command.

use healthbridge_core::error::AppError;

/// Run pending database migrations.
pub async fn execute(env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    healthbridge_database::migration::run_migrations(&pool).await?;

    println!("Migrations applied.");
    Ok(())
}
