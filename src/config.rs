use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000/api";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    NotANumber { name: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_number(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let fetch_timeout_secs =
            parse_number(&lookup, "FETCH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        let backend_url = match lookup("BACKEND_URL") {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty("BACKEND_URL")),
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => DEFAULT_BACKEND_URL.to_string(),
        };

        let backend_token = lookup("BACKEND_TOKEN").filter(|token| !token.trim().is_empty());

        Ok(Self {
            port,
            backend_url,
            backend_token,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { name, value }),
        None => Ok(None),
    }
}
