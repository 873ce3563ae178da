//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::jwt::{MAX_TOKEN_VALIDITY, MIN_SECRET_LENGTH};
use crate::rate_limit::DEFAULT_AUTH_REQUESTS_PER_MINUTE;
use clap::Parser;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Upper bound for `--token-validity-hours`.
pub const MAX_TOKEN_VALIDITY_HOURS: u64 = MAX_TOKEN_VALIDITY.as_secs() / SECONDS_PER_HOUR;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment environment. Production turns on `Secure` cookies and quieter logs.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    fn default_log_level(self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "finboard", about = "Financial dashboard with cookie session authentication")]
pub struct Args {
    /// Base path prefix. Login at {base}/login, dashboard at {base}/dashboard
    #[arg(short, long, value_parser = validate_base_path)]
    pub base: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "finboard.db")]
    pub database: String,

    /// Deployment environment
    #[arg(short, long, env = "APP_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Hours a session token stays valid (at most one year)
    #[arg(
        long,
        default_value = "24",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TOKEN_VALIDITY_HOURS)
    )]
    pub token_validity_hours: u64,

    /// Login and signup requests allowed per minute per client IP
    #[arg(long, default_value_t = DEFAULT_AUTH_REQUESTS_PER_MINUTE)]
    pub login_rate_limit: NonZeroU32,

    /// Take the client IP from X-Forwarded-For (only behind a trusted reverse proxy)
    #[arg(long)]
    pub trust_proxy: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_base_path(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Ok(String::new());
    }

    if !s.starts_with('/') {
        return Err(format!("Base path must start with '/': {}", s));
    }

    if s.ends_with('/') {
        return Err(format!("Base path must not end with '/': {}", s));
    }

    if s.chars().any(|c| !c.is_ascii() || c.is_whitespace()) {
        return Err(format!("Base path contains invalid characters: {}", s));
    }

    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
/// `RUST_LOG` overrides the environment's default level.
pub fn init_logging(format: &LogFormat, environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_level()));

    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} bytes. Use a longer secret",
            MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        base: args.base.clone().filter(|base| !base.is_empty()),
        db,
        jwt_secret: jwt_secret.into_bytes(),
        token_validity: token_validity(args.token_validity_hours),
        secure_cookies: args.environment.is_production(),
        auth_requests_per_minute: args.login_rate_limit,
        trust_proxy: args.trust_proxy,
    }
}

/// Session token validity for the given number of hours, saturating on overflow.
/// Out-of-range values are rejected later by `TokenCodec::new`.
fn token_validity(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(SECONDS_PER_HOUR))
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
