//! Session table migrations.
//!
//! Business data lives in the backend service; the only tables either web
//! binary owns are their session stores.
//!
//! # Usage
//!
//! ```bash
//! showroom-cli migrate site
//! showroom-cli migrate admin
//! showroom-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string for the site
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin panel
//!
//! Both fall back to `DATABASE_URL`.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// No connection string for the target.
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session store setup failed.
    #[error("Session store error: {0}")]
    Store(String),
}

fn database_url(primary: &'static str) -> Result<String, MigrationError> {
    dotenvy::dotenv().ok();
    std::env::var(primary)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar(primary))
}

/// Create the site session table (`tower_sessions.session`).
///
/// # Errors
///
/// Returns an error if the database is unreachable or the DDL fails.
pub async fn site() -> Result<(), MigrationError> {
    let url = database_url("SITE_DATABASE_URL")?;

    tracing::info!("Connecting to site database...");
    let pool = PgPool::connect(&url).await?;

    tracing::info!("Creating site session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Site migrations complete");
    Ok(())
}

/// Create the admin session table (`admin.session`).
///
/// # Errors
///
/// Returns an error if the database is unreachable or the DDL fails.
pub async fn admin() -> Result<(), MigrationError> {
    let url = database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(&url).await?;

    tracing::info!("Creating admin session table...");
    let store = PostgresStore::new(pool)
        .with_schema_name("admin")
        .map_err(|e| MigrationError::Store(e.to_string()))?
        .with_table_name("session")
        .map_err(|e| MigrationError::Store(e.to_string()))?;
    store.migrate().await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
