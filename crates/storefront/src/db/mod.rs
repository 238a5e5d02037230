//! Database operations for the storefront `SQLite` database.
//!
//! # Tables
//!
//! - `users` - Accounts, login state and the unseen-cart counter
//! - `products` / `product_variants` - Catalog (written only by the seeding CLI)
//! - `cart_lines` - One row per (user, product); quantity and chosen variant
//! - `addresses` - Saved shipping addresses (max 3 per user, one default)
//! - `pincodes` - Serviceable-pincode registry
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded via
//! [`MIGRATOR`], and run via:
//! ```bash
//! cargo run -p fabrico-cli -- migrate
//! ```

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub mod addresses;
pub mod cart;
pub mod pincodes;
pub mod products;
pub mod users;

pub use addresses::AddressRepository;
pub use cart::CartRepository;
pub use pincodes::PincodeRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded migrations, shared by the server, the CLI and the test suites.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors returned by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data failed validation when loading
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Entity not found
    #[error("Not found")]
    NotFound,

    /// Unique or domain constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; WAL keeps readers from blocking
/// the single writer.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10));

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
