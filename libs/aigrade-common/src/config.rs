// Client configuration
// Resolved from environment variables with defaults for local development

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SUBMISSIONS_URL: &str = "http://localhost:4000/api/submissions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse an optional numeric environment variable
pub fn env_number<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Duration,
    /// `None` keeps the session in memory only
    pub session_file: Option<PathBuf>,
    pub submissions_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session_file: default_session_file(),
            submissions_url: DEFAULT_SUBMISSIONS_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by AIGRADE_* environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base) = env_string("AIGRADE_API_BASE") {
            config.api_base = base;
        }
        if let Some(ms) = env_number::<u64>("AIGRADE_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(path) = env_string("AIGRADE_SESSION_FILE") {
            config.session_file = Some(PathBuf::from(path));
        }
        if let Some(url) = env_string("AIGRADE_SUBMISSIONS_URL") {
            config.submissions_url = url;
        }

        Ok(config)
    }
}

fn default_session_file() -> Option<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) => Some(PathBuf::from(home).join(".aigrade").join("session.json")),
        None => Some(PathBuf::from(".aigrade-session.json")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert!(config.session_file.is_some());
    }

    #[test]
    fn test_env_number_rejects_garbage() {
        std::env::set_var("AIGRADE_TEST_NUMBER_BAD", "soon");
        let err = env_number::<u64>("AIGRADE_TEST_NUMBER_BAD").unwrap_err();
        assert!(err.to_string().contains("AIGRADE_TEST_NUMBER_BAD"));

        std::env::set_var("AIGRADE_TEST_NUMBER_OK", " 250 ");
        assert_eq!(env_number::<u64>("AIGRADE_TEST_NUMBER_OK").unwrap(), Some(250));

        assert_eq!(env_number::<u64>("AIGRADE_TEST_NUMBER_UNSET").unwrap(), None);
    }
}
