//! Process configuration read from environment variables.

use std::str::FromStr;

use axum::http::HeaderValue;
use services::services::rbac::RbacPolicy;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3003";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set when STORE=postgres")]
    MissingDatabaseUrl,
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<HeaderValue>,
    pub rbac: RbacPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; unset keys and
    /// blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let kind = parsed(&get, "STORE")?.unwrap_or(StoreKind::Postgres);
        let store = match kind {
            StoreKind::Postgres => StoreConfig::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?,
                max_connections: parsed(&get, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            StoreKind::Memory => StoreConfig::Memory,
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            store,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed(&get, "PORT")?.unwrap_or(DEFAULT_PORT),
            cors_origins,
            rbac: RbacPolicy {
                enforce: flag(&get, "RBAC_ENFORCE")?,
                bypass: flag(&get, "DEBUG_BYPASS_AUTH")?,
                force_saler: flag(&get, "FORCE_SALER_MODE")?,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_kind(&self) -> StoreKind {
        match self.store {
            StoreConfig::Postgres { .. } => StoreKind::Postgres,
            StoreConfig::Memory => StoreKind::Memory,
        }
    }
}

fn parsed<T, G>(get: &G, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

fn flag<G>(get: &G, name: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}
