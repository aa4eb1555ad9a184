//! Service configuration read from the environment.

use std::time::Duration;

use crate::fetch::DEFAULT_TIMEOUT;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_COMPLETION_TIMEOUT};

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Enables the model-backed path when present.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub fetch_timeout: Duration,
    pub completion_timeout: Duration,
    pub insecure_ssl: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout = |name: &'static str, default: Duration| match non_empty(name) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(ConfigError::InvalidTimeout { name, value }),
            },
            None => Ok(default),
        };
        let fetch_timeout = timeout("JOB_EXTRACT_FETCH_TIMEOUT_SECS", DEFAULT_TIMEOUT)?;
        let completion_timeout =
            timeout("JOB_EXTRACT_COMPLETION_TIMEOUT_SECS", DEFAULT_COMPLETION_TIMEOUT)?;

        Ok(Self {
            bind_addr: non_empty("JOB_EXTRACT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_empty("JOB_EXTRACT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fetch_timeout,
            completion_timeout,
            insecure_ssl: lookup("JOB_EXTRACT_INSECURE_SSL").as_deref() == Some("1"),
        })
    }
}
