//! Runtime settings read once at startup from the environment (or any key lookup in tests).

use crate::error::ConfigError;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    /// Full connection URL. Takes precedence over the discrete fields below.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
    /// Schema holding the resource tables.
    pub schema: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub body_limit: usize,
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database = DatabaseSettings {
            url: get("DATABASE_URL"),
            host: get("DB_SERVER").unwrap_or_else(|| "localhost".into()),
            port: parse_or("DB_PORT", get("DB_PORT"), 5432)?,
            name: get("DB_NAME").unwrap_or_else(|| "constructora".into()),
            username: get("DB_USERNAME"),
            password: get("DB_PASSWORD"),
            encrypt: parse_flag("DB_ENCRYPT", get("DB_ENCRYPT"), false)?,
            trust_server_certificate: parse_flag(
                "DB_TRUST_SERVER_CERTIFICATE",
                get("DB_TRUST_SERVER_CERTIFICATE"),
                true,
            )?,
            schema: get("DB_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into()),
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?,
            acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                get("DB_ACQUIRE_TIMEOUT_SECS"),
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?),
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let server = ServerSettings {
            bind_addr: bind_raw.parse().map_err(|e| ConfigError::InvalidSetting {
                key: "BIND_ADDR",
                reason: format!("{bind_raw}: {e}"),
            })?,
            body_limit: parse_or("REQUEST_BODY_LIMIT", get("REQUEST_BODY_LIMIT"), DEFAULT_BODY_LIMIT)?,
        };

        Ok(Config { database, server })
    }
}

impl DatabaseSettings {
    /// TLS mode derived from the encrypt / trust-certificate pair.
    pub fn ssl_mode(&self) -> PgSslMode {
        match (self.encrypt, self.trust_server_certificate) {
            (false, _) => PgSslMode::Disable,
            (true, true) => PgSslMode::Require,
            (true, false) => PgSslMode::VerifyFull,
        }
    }

    /// Credentials are applied only as a complete pair; otherwise the driver's ambient
    /// identity (PGUSER / OS user) is used.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| ConfigError::InvalidSetting {
                key: "DATABASE_URL",
                reason: e.to_string(),
            });
        }
        let mut opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .ssl_mode(self.ssl_mode())
            .application_name(env!("CARGO_PKG_NAME"));
        if let Some((user, pass)) = self.credentials() {
            opts = opts.username(user).password(pass);
        }
        Ok(opts)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::InvalidSetting {
            key,
            reason: format!("{s}: {e}"),
        }),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(s) = raw else { return Ok(default) };
    match s.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidSetting {
            key,
            reason: format!("{s}: expected yes/no"),
        }),
    }
}
