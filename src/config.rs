use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 8050;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 5;

/// Process-wide settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory store is used when absent.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    /// Upper bound on any single storage call.
    pub storage_timeout: Duration,
    pub cors_origin: Option<String>,
}

/// Reasons the environment cannot produce a `Config`.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid(name, value) => write!(f, "{} has an invalid value: {}", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}

// Secrets stay out of debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("server_port", &self.server_port)
            .field("server_host", &self.server_host)
            .field("jwt_secret", &"<redacted>")
            .field("storage_timeout", &self.storage_timeout)
            .field("cors_origin", &self.cors_origin)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let server_port = match non_empty("SERVER_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT", raw))?,
            None => DEFAULT_SERVER_PORT,
        };

        let storage_timeout_secs = match non_empty("STORAGE_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::Invalid("STORAGE_TIMEOUT_SECS", raw)),
            },
            None => DEFAULT_STORAGE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            server_port,
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            storage_timeout: Duration::from_secs(storage_timeout_secs),
            cors_origin: non_empty("CORS_ORIGIN"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
