use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a valid number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Bearer token for the initial session.
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                     |
    /// |-----------------------------------|-----------------------------|
    /// | `SCHOOLGRID_API_URL`              | `http://localhost:8080/api` |
    /// | `SCHOOLGRID_TOKEN`                | unset                       |
    /// | `SCHOOLGRID_REQUEST_TIMEOUT_SECS` | `30`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("SCHOOLGRID_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.into())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if api_url.is_empty() {
            return Err(ConfigError::Empty("SCHOOLGRID_API_URL"));
        }

        let token = lookup("SCHOOLGRID_TOKEN").filter(|t| !t.trim().is_empty());

        let request_timeout_secs = match lookup("SCHOOLGRID_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "SCHOOLGRID_REQUEST_TIMEOUT_SECS",
                    value,
                })?,
        };

        Ok(Self {
            api_url,
            token,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}
