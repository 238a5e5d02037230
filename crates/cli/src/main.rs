//! Fabrico CLI - Database migrations and seeding tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fabrico-cli migrate
//!
//! # Seed the catalog from a YAML fixture
//! fabrico-cli seed catalog --file seeds/catalog.yaml
//!
//! # Seed the serviceable-pincode registry
//! fabrico-cli seed pincodes --file seeds/pincodes.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed catalog` - Load products and variants from a YAML file
//! - `seed pincodes` - Load the pincode registry from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fabrico-cli")]
#[command(author, version, about = "Fabrico CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database from YAML fixtures
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load products and their color variants
    Catalog {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,
    },
    /// Load the serviceable-pincode registry
    Pincodes {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
            SeedTarget::Pincodes { file } => commands::seed::pincodes(&file).await?,
        },
    }
    Ok(())
}
