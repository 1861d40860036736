use std::env;
use std::time::Duration;

use log::info;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Invalid REMOVAL_SERVICE_URL: {0}")]
    ServiceUrl(#[from] url::ParseError),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub frontend_dir: String,
    /// Upstream removal service. Without it the API answers 503.
    pub removal_service_url: Option<Url>,
    pub removal_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let frontend_dir = lookup("FRONTEND_DIR").unwrap_or_else(default_frontend_dir);

        let removal_service_url = match lookup("REMOVAL_SERVICE_URL") {
            Some(raw) if !raw.trim().is_empty() => Some(Url::parse(raw.trim())?),
            _ => {
                info!("REMOVAL_SERVICE_URL not set, removal requests will be rejected");
                None
            }
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            frontend_dir,
            removal_service_url,
            removal_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REMOVAL_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn default_frontend_dir() -> String {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
