//! Server configuration parsed from environment variables.

use std::path::PathBuf;

use axum::http::HeaderValue;
use estimate::{Catalog, EstimateError};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} required")]
    Missing(&'static str),
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error(transparent)]
    Catalog(#[from] EstimateError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub catalog_path: Option<PathBuf>,
    pub cors_allow_origin: Option<HeaderValue>,
    pub max_import_bytes: usize,
}

impl ServerConfig {
    /// Build typed server config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PRODUCT_CATALOG_PATH`: YAML catalog; built-in Praetorian line when absent
    /// - `CORS_ALLOW_ORIGIN`: single allowed origin; any origin when absent
    /// - `MAX_IMPORT_BYTES`: CSV upload limit, default 5 MiB
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?;
        let max_import_bytes = parse_or("MAX_IMPORT_BYTES", lookup("MAX_IMPORT_BYTES"), DEFAULT_MAX_IMPORT_BYTES)?;

        let catalog_path = non_blank(lookup("PRODUCT_CATALOG_PATH")).map(PathBuf::from);
        let cors_allow_origin = match non_blank(lookup("CORS_ALLOW_ORIGIN")) {
            Some(origin) if origin != "*" => Some(
                HeaderValue::from_str(&origin)
                    .map_err(|_| ConfigError::Invalid { var: "CORS_ALLOW_ORIGIN", value: origin.clone() })?,
            ),
            _ => None,
        };

        Ok(Self { database_url, port, db_max_connections, catalog_path, cors_allow_origin, max_import_bytes })
    }

    /// Load the product catalog named by `PRODUCT_CATALOG_PATH`, or the
    /// built-in one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Catalog`] if the file is unreadable or invalid.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Ok(Catalog::from_path(path)?),
            None => Ok(Catalog::builtin()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match non_blank(raw) {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
