//! Server configuration read from the process environment.
//!
//! A `.env` file in the working directory is loaded first when present, so
//! local runs and hosted deployments share the same variable names.

use std::env;
use std::path::PathBuf;

use actix_web::http::Uri;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_DATA_FILE: &str = "data/tasks.json";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = [
    "http://localhost:5173",
    "https://superlative-melba-729982.netlify.app",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            store: StoreConfig::File(PathBuf::from(DEFAULT_DATA_FILE)),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("'{raw}' is not a port number"),
            })?,
            None => defaults.port,
        };

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(parse_origin)
                .collect::<Result<_, _>>()?,
            None => defaults.allowed_origins,
        };

        let data_file = lookup("TASKDECK_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let store = match lookup("TASKDECK_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("file") => StoreConfig::File(data_file),
            Some("memory") => StoreConfig::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "TASKDECK_STORE",
                    message: format!("unknown store '{other}', expected 'file' or 'memory'"),
                })
            }
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            store,
        })
    }

    pub fn socket_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Accepts `scheme://host[:port]` only, the shape browsers send in `Origin`.
fn parse_origin(raw: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "ALLOWED_ORIGINS",
        message,
    };
    if raw == "*" {
        return Err(invalid("wildcard origin is not supported, list each origin".to_string()));
    }

    let uri: Uri = raw
        .parse()
        .map_err(|_| invalid(format!("'{raw}' is not a valid origin")))?;
    let bare = matches!(uri.scheme_str(), Some("http" | "https"))
        && uri.host().is_some()
        && uri.query().is_none()
        && !raw.ends_with('/')
        && matches!(uri.path(), "" | "/");
    if !bare {
        return Err(invalid(format!(
            "'{raw}' must look like scheme://host[:port]"
        )));
    }
    Ok(raw.to_string())
}
