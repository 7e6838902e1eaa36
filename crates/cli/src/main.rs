//! Showroom CLI - session migrations and operator checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the site session table
//! showroom-cli migrate site
//!
//! # Create the admin session table
//! showroom-cli migrate admin
//!
//! # Create both
//! showroom-cli migrate all
//!
//! # Check that the backend answers its health probe
//! showroom-cli backend ping
//!
//! # Verify admin credentials against the backend
//! ADMIN_CHECK_PASSWORD=... showroom-cli admin check-login -e staff@dealer.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create session tables
//! - `backend ping` - Probe backend connectivity
//! - `admin check-login` - Verify an admin login

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "showroom-cli")]
#[command(author, version, about = "Showroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Backend connectivity
    Backend {
        #[command(subcommand)]
        action: BackendAction,
    },
    /// Admin account checks
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the site session table
    Site,
    /// Create the admin session table
    Admin,
    /// Create all session tables
    All,
}

#[derive(Subcommand)]
enum BackendAction {
    /// Probe the backend health endpoint
    Ping,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in with `ADMIN_CHECK_PASSWORD` and report the granted role
    CheckLogin {
        /// Admin email address
        #[arg(short, long)]
        email: String,
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Site => commands::migrate::site().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::site().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Backend { action } => match action {
            BackendAction::Ping => commands::backend::ping().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::CheckLogin { email } => commands::admin::check_login(&email).await?,
        },
    }
    Ok(())
}
