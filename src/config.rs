use reqwest::header::HeaderValue;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.freelo.io/v1";
pub const DEFAULT_RATE_LIMIT: u32 = 25;
pub const DEFAULT_RATE_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("FREELO_EMAIL and FREELO_API_KEY environment variables are required")]
    MissingCredentials,
    #[error("Invalid FREELO_API_URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("Invalid FREELO_USER_AGENT '{value}': {reason}")]
    InvalidUserAgent { value: String, reason: String },
}

/// Runtime configuration for the Freelo API client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub email: String,
    pub api_key: String,
    pub user_agent: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
    pub rate_limit: u32,
    pub rate_window_ms: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - FREELO_EMAIL [required]
    /// - FREELO_API_KEY [required]
    /// - FREELO_USER_AGENT (default: FreeloMCP/1.0 (<email>))
    /// - FREELO_API_URL (default: https://api.freelo.io/v1)
    /// - FREELO_HTTP_TIMEOUT_SECS (default: 30)
    /// - FREELO_RATE_LIMIT (default: 25 requests per window)
    /// - FREELO_RATE_WINDOW_MS (default: 60000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (email, api_key) = match (non_empty("FREELO_EMAIL"), non_empty("FREELO_API_KEY")) {
            (Some(e), Some(k)) => (e, k),
            _ => return Err(ConfigError::MissingCredentials),
        };

        let api_url = non_empty("FREELO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if let Err(e) = url::Url::parse(&api_url) {
            return Err(ConfigError::InvalidApiUrl {
                url: api_url,
                reason: e.to_string(),
            });
        }
        let api_url = api_url.trim_end_matches('/').to_string();

        let timeout_secs = non_empty("FREELO_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let rate_limit = non_empty("FREELO_RATE_LIMIT")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT);
        let rate_window_ms = non_empty("FREELO_RATE_WINDOW_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RATE_WINDOW_MS);

        let cfg = Self {
            email,
            api_key,
            user_agent: non_empty("FREELO_USER_AGENT"),
            api_url,
            timeout_secs,
            rate_limit,
            rate_window_ms,
        };
        // the default agent embeds the email, so check the resolved value
        let agent = cfg.user_agent();
        if let Err(e) = HeaderValue::from_str(&agent) {
            return Err(ConfigError::InvalidUserAgent {
                value: agent,
                reason: e.to_string(),
            });
        }
        Ok(cfg)
    }

    /// Explicit user agent, or `FreeloMCP/1.0 (<email>)`.
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("FreeloMCP/1.0 ({})", self.email))
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let err = Config::from_lookup(lookup(&[("FREELO_EMAIL", "a@b.cz")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
        let err = Config::from_lookup(lookup(&[("FREELO_EMAIL", ""), ("FREELO_API_KEY", "k")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[
            ("FREELO_EMAIL", "a@b.cz"),
            ("FREELO_API_KEY", "k"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.rate_limit, 25);
        assert_eq!(cfg.rate_window(), Duration::from_secs(60));
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.user_agent(), "FreeloMCP/1.0 (a@b.cz)");
    }

    #[test]
    fn overrides_and_url_validation() {
        let cfg = Config::from_lookup(lookup(&[
            ("FREELO_EMAIL", "a@b.cz"),
            ("FREELO_API_KEY", "k"),
            ("FREELO_API_URL", "http://127.0.0.1:9000/v1/"),
            ("FREELO_RATE_LIMIT", "5"),
            ("FREELO_RATE_WINDOW_MS", "1000"),
            ("FREELO_USER_AGENT", "custom/1"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, "http://127.0.0.1:9000/v1");
        assert_eq!(cfg.rate_limit, 5);
        assert_eq!(cfg.rate_window_ms, 1000);
        assert_eq!(cfg.user_agent(), "custom/1");

        let err = Config::from_lookup(lookup(&[
            ("FREELO_EMAIL", "a@b.cz"),
            ("FREELO_API_KEY", "k"),
            ("FREELO_API_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
    }

    #[test]
    fn header_unsafe_user_agent_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("FREELO_EMAIL", "a@b.cz"),
            ("FREELO_API_KEY", "k"),
            ("FREELO_USER_AGENT", "agent\r\nX-Injected: 1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUserAgent { .. }));
        assert!(err.to_string().starts_with("Invalid FREELO_USER_AGENT"));

        let err = Config::from_lookup(lookup(&[
            ("FREELO_EMAIL", "a@b.cz\n"),
            ("FREELO_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUserAgent { .. }));
    }
}
