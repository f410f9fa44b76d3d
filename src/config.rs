//! REST service configuration parsed from environment variables.

pub const API_PATH_VAR: &str = "CERT_API_PATH";
pub const API_KEY_VAR: &str = "CERT_API_KEY";
pub const CREATED_BY_VAR: &str = "CERT_CREATED_BY";
pub const REQUEST_TIMEOUT_VAR: &str = "CERT_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "CERT_CONNECT_TIMEOUT_SECS";

pub const DEFAULT_CREATED_BY: &str = "admin";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {var}; set it in the environment or .env")]
    Missing { var: &'static str },
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Service root without a trailing slash.
    pub base_url: String,
    pub api_key: String,
    /// Value sent as `createdby` on registry and template writes.
    pub created_by: String,
    pub timeouts: Timeouts,
}

impl ApiConfig {
    /// Build typed config from a variable source (the process environment,
    /// with command-line flags layered over it).
    ///
    /// Required:
    /// - `CERT_API_PATH`: service root URL
    /// - `CERT_API_KEY`: sent as the `APIKEY` query parameter
    ///
    /// Optional:
    /// - `CERT_CREATED_BY`: default `admin`
    /// - `CERT_REQUEST_TIMEOUT_SECS`: default 60
    /// - `CERT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// timeout is not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };
        let base_url = required(API_PATH_VAR)?.trim_end_matches('/').to_string();
        let api_key = required(API_KEY_VAR)?;
        let created_by = lookup(CREATED_BY_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string());
        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, REQUEST_TIMEOUT_VAR, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        Ok(Self { base_url, api_key, created_by, timeouts })
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
