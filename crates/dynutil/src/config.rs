//! Runtime settings read from the environment
//!
//! - `DYNUTIL_API_URL`: provider API base URL (default: the public DynECT endpoint)
//! - `DYNUTIL_LOG_LEVEL`: trace, debug, info, warn or error (default: warn)

use anyhow::Result;
use dynutil_provider_dynect::DYNECT_API_BASE;
use std::env;
use tracing::Level;

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub log_level: Level,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("DYNUTIL_API_URL")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DYNECT_API_BASE.to_string());

        if !api_url.starts_with("https://") && !api_url.starts_with("http://") {
            anyhow::bail!(
                "DYNUTIL_API_URL must use HTTP or HTTPS scheme. Got: {}",
                api_url
            );
        }

        let log_level = match lookup("DYNUTIL_LOG_LEVEL")
            .unwrap_or_else(|| "warn".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "DYNUTIL_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        Ok(Self { api_url, log_level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.api_url, DYNECT_API_BASE);
        assert_eq!(s.log_level, Level::WARN);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("DYNUTIL_API_URL", "http://127.0.0.1:9000"),
            ("DYNUTIL_LOG_LEVEL", "DEBUG"),
        ])
        .unwrap();
        assert_eq!(s.api_url, "http://127.0.0.1:9000");
        assert_eq!(s.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_values() {
        assert!(settings(&[("DYNUTIL_LOG_LEVEL", "chatty")]).is_err());
        assert!(settings(&[("DYNUTIL_API_URL", "ftp://example.com")]).is_err());
    }
}
