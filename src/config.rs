//! Configuration module for environment variables and application settings

use anyhow::{Context, Result, anyhow};
use std::env;

use crate::database::DatabaseConfig;

const DEV_JWT_SECRET: &str = "dev_secret";
/// Longest accepted token lifetime: one year
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Which store implementation backs the services
    pub store: StoreBackend,

    /// Database configuration, used by the Postgres backend
    pub database: DatabaseConfig,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,

    /// Token signing configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AuthConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown STORE_BACKEND '{}', expected postgres or memory", other)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parsed = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store: StoreBackend = parsed("STORE_BACKEND", "postgres").parse()?;

        let mut database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseConfig::from_url(&url)?,
            None if store == StoreBackend::Postgres => {
                return Err(anyhow!("DATABASE_URL environment variable is required"));
            }
            None => DatabaseConfig::default(),
        };
        database.max_size = parsed("DATABASE_MAX_CONNECTIONS", "16")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        if let Some(ssl) = lookup("DATABASE_SSL") {
            database.ssl = parse_bool(&ssl).context("DATABASE_SSL must be true or false")?;
        }

        let token_ttl_hours: i64 = parsed("JWT_TTL_HOURS", "24")
            .parse()
            .context("JWT_TTL_HOURS must be an integer")?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(anyhow!(
                "JWT_TTL_HOURS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS,
                token_ttl_hours
            ));
        }

        let port = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid port number")?;

        Ok(Self {
            server: ServerConfig {
                host: parsed("SERVER_HOST", "0.0.0.0"),
                port,
                cors_origins: parsed("CORS_ORIGINS", "")
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            store,
            database,
            run_migrations: parse_bool(&parsed("DATABASE_RUN_MIGRATIONS", "true"))
                .context("DATABASE_RUN_MIGRATIONS must be true or false")?,
            auth: AuthConfig {
                jwt_secret: parsed("JWT_SECRET", DEV_JWT_SECRET),
                token_ttl_hours,
            },
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("invalid boolean '{}'", other)),
    }
}
