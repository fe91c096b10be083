//! Client configuration.
//!
//! Values come either from code (`RebrandlyConfig::new` plus field updates) or
//! from the process environment via [`RebrandlyConfig::from_env`]:
//!
//! | Variable | Default |
//! |---|---|
//! | `REBRANDLY_API_KEY` | required |
//! | `REBRANDLY_BASE_URL` | `https://api.rebrandly.com/v1` |
//! | `REBRANDLY_DEFAULT_DOMAIN` | unset |
//! | `REBRANDLY_HTTP_TIMEOUT` | `30` (seconds) |
//! | `REBRANDLY_RETRY_TIMES` | `3` |
//! | `REBRANDLY_RETRY_DELAY` | `100` (milliseconds) |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RebrandlyError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.rebrandly.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, PartialEq, Eq)]
pub struct RebrandlyConfig {
    pub api_key: String,
    pub base_url: String,
    /// Applied to new links that do not name a domain.
    pub default_domain: Option<String>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Additional attempts after a network failure.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl RebrandlyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_domain: None,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Read the configuration from the environment, loading `.env` first if
    /// one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get("REBRANDLY_API_KEY")
            .ok_or_else(|| RebrandlyError::Config("REBRANDLY_API_KEY is not set".to_string()))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = get("REBRANDLY_BASE_URL") {
            config.base_url = base_url;
        }
        config.default_domain = get("REBRANDLY_DEFAULT_DOMAIN");
        if let Some(secs) = get("REBRANDLY_HTTP_TIMEOUT") {
            config.timeout = Duration::from_secs(parse_number("REBRANDLY_HTTP_TIMEOUT", &secs)?);
        }
        if let Some(retries) = get("REBRANDLY_RETRY_TIMES") {
            config.retries = parse_number("REBRANDLY_RETRY_TIMES", &retries)?;
        }
        if let Some(millis) = get("REBRANDLY_RETRY_DELAY") {
            config.retry_delay = Duration::from_millis(parse_number("REBRANDLY_RETRY_DELAY", &millis)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RebrandlyError::Config("API key must not be empty".to_string()));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(RebrandlyError::Config(format!(
                "base URL '{}' is not a valid URL",
                self.base_url
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for RebrandlyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RebrandlyConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("default_domain", &self.default_domain)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RebrandlyError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}
