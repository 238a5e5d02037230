//! Database migration command.
//!
//! Applies the storefront's embedded migrations to the database named by
//! `FABRICO_DATABASE_URL` (or `DATABASE_URL`). Safe to re-run; migrations
//! that have already been applied are skipped.
//!
//! # Usage
//!
//! ```bash
//! fabrico-cli migrate
//! ```

use thiserror::Error;
use tracing::info;

use fabrico_storefront::db;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// No database URL in the environment.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if no database URL is configured, the database
/// is unreachable, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url =
        super::database_url().ok_or(MigrationError::MissingEnvVar("FABRICO_DATABASE_URL"))?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
