use std::net::SocketAddr;

use chrono_tz::Tz;

use crate::error::ConfigError;

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "jitsilog";
pub const DEFAULT_COLLECTION: &str = "logs";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Process configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub database: String,
    pub collection: String,
    pub port: u16,
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) if raw.starts_with(':') => {
                raw[1..].parse::<u16>().map_err(|e| ConfigError::Port {
                    value: raw.clone(),
                    reason: e.to_string(),
                })?
            }
            _ => {
                tracing::info!(
                    "PORT is missing or malformed (it should look like ':8080'), using default :{}",
                    DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        };

        let tz_name = lookup("TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = tz_name
            .parse::<Tz>()
            .map_err(|e| ConfigError::Timezone {
                name: tz_name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Config {
            mongo_uri: lookup("URI_MONGODB").unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
            database: lookup("DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: lookup("COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            port,
            timezone,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Default `EnvFilter` directive when `RUST_LOG` is not set. Read before the
/// full configuration so that configuration warnings are not lost.
pub fn log_directive_from_env() -> &'static str {
    log_directive(|key| std::env::var(key).ok())
}

pub fn log_directive<F>(lookup: F) -> &'static str
where
    F: Fn(&str) -> Option<String>,
{
    if lookup("DEBUG").as_deref() == Some("true") {
        "debug"
    } else {
        "info"
    }
}
