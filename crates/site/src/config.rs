//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string for visitor sessions
//!   (falls back to `DATABASE_URL`)
//! - `SITE_BASE_URL` - Public URL for the site
//! - `BACKEND_URL` - Base URL of the backend RPC service
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `BACKEND_SERVICE_KEY` - Shared key sent to the backend (high entropy)
//! - `DEALER_NAME`, `DEALER_PHONE`, `DEALER_EMAIL`, `DEALER_ADDRESS` - Shown in
//!   the header, footer and contact page
//! - `DEALER_CURRENCY` - ISO code used to format prices (default: USD)
//! - `CREDIT_ANNUAL_RATE` - Fixed annual rate for credit simulations as a
//!   fraction (default: 0.1899)
//! - `CREDIT_MAX_TERM_MONTHS` - Longest term offered (default: 72)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use showroom_backend::BackendConfig;
use showroom_core::CurrencyCode;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Longest term accepted for `CREDIT_MAX_TERM_MONTHS`.
const TERM_CEILING_MONTHS: u32 = 120;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Backend RPC service
    pub backend: BackendConfig,
    /// Dealership identity shown on every page
    pub dealer: DealerConfig,
    /// Credit simulation terms
    pub credit: CreditConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Dealership identity.
#[derive(Debug, Clone)]
pub struct DealerConfig {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub currency: CurrencyCode,
}

impl Default for DealerConfig {
    fn default() -> Self {
        Self {
            name: "Showroom".to_string(),
            phone: None,
            email: None,
            address: None,
            currency: CurrencyCode::default(),
        }
    }
}

/// Terms offered by the credit simulator.
#[derive(Debug, Clone, Copy)]
pub struct CreditConfig {
    /// Fixed annual interest rate as a fraction, e.g. `0.1899`.
    pub annual_rate: Decimal,
    /// Longest term a visitor may pick.
    pub max_term_months: u32,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            annual_rate: Decimal::new(1899, 4),
            max_term_months: 72,
        }
    }
}

impl CreditConfig {
    /// Term choices offered in the simulator, in steps of 12 months.
    #[must_use]
    pub fn term_choices(&self) -> Vec<u32> {
        let mut terms: Vec<u32> = (1..)
            .map(|years| years * 12)
            .take_while(|&months| months <= self.max_term_months)
            .collect();
        if terms.last() != Some(&self.max_term_months) {
            terms.push(self.max_term_months);
        }
        terms
    }

    /// The annual rate as a percentage label, e.g. `18.99%`.
    #[must_use]
    pub fn rate_label(&self) -> String {
        format!("{}%", (self.annual_rate * Decimal::ONE_HUNDRED).normalize())
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the service key fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SITE_BASE_URL")?;
        let backend = backend_from_env()?;
        let dealer = DealerConfig::from_env()?;
        let credit = parse_credit(
            get_optional_env("CREDIT_ANNUAL_RATE").as_deref(),
            get_optional_env("CREDIT_MAX_TERM_MONTHS").as_deref(),
        )?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            backend,
            dealer,
            credit,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl DealerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency = get_env_or_default("DEALER_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("DEALER_CURRENCY".to_string(), e.to_string()))?;

        Ok(Self {
            name: get_env_or_default("DEALER_NAME", "Showroom"),
            phone: get_optional_env("DEALER_PHONE").filter(|s| !s.trim().is_empty()),
            email: get_optional_env("DEALER_EMAIL").filter(|s| !s.trim().is_empty()),
            address: get_optional_env("DEALER_ADDRESS").filter(|s| !s.trim().is_empty()),
            currency,
        })
    }
}

/// Parse the credit settings, applying defaults for unset values.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for a rate outside `0..1` or a term
/// outside `1..=120` months.
pub fn parse_credit(rate: Option<&str>, max_term: Option<&str>) -> Result<CreditConfig, ConfigError> {
    let defaults = CreditConfig::default();

    let annual_rate = match rate {
        Some(raw) => raw
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|r| !r.is_sign_negative() && *r < Decimal::ONE)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "CREDIT_ANNUAL_RATE".to_string(),
                    format!("expected a fraction between 0 and 1, got '{raw}'"),
                )
            })?,
        None => defaults.annual_rate,
    };

    let max_term_months = match max_term {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=TERM_CEILING_MONTHS).contains(m))
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "CREDIT_MAX_TERM_MONTHS".to_string(),
                    format!("expected 1 to {TERM_CEILING_MONTHS} months, got '{raw}'"),
                )
            })?,
        None => defaults.max_term_months,
    };

    Ok(CreditConfig {
        annual_rate,
        max_term_months,
    })
}

/// Read `BACKEND_URL` and the optional `BACKEND_SERVICE_KEY`.
fn backend_from_env() -> Result<BackendConfig, ConfigError> {
    let url = get_required_env("BACKEND_URL")?;
    Url::parse(&url)
        .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;

    let service_key = match get_optional_env("BACKEND_SERVICE_KEY") {
        Some(key) => {
            validate_secret_strength(&key, "BACKEND_SERVICE_KEY")?;
            Some(SecretString::from(key))
        }
        None => None,
    };

    Ok(BackendConfig { url, service_key })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
