//! CLI subcommand implementations.

use secrecy::SecretString;

pub mod migrate;
pub mod seed;

/// Resolve the database URL the way the server does: the project-specific
/// variable first, then the generic one shared with the sqlx tooling.
pub(crate) fn database_url() -> Option<SecretString> {
    std::env::var("FABRICO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
