use crate::errors::ConfigError;
use std::{env, net::SocketAddr};
use url::Url;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: Url,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests do not have to
    /// touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let raw_url = lookup("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = Url::parse(raw_url.trim()).map_err(|source| {
            ConfigError::InvalidBackendUrl {
                value: raw_url.clone(),
                source,
            }
        })?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme { value: raw_url });
        }

        Ok(Self { port, backend_url })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
