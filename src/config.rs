use std::time::Duration;

use crate::deadline::DEFAULT_TIMEOUT;
use crate::error::ConfigError;
use crate::secret::Secret;

/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "CONSOLE_API_URL";
/// Environment variable holding the backend API key.
pub const ENV_API_KEY: &str = "CONSOLE_API_KEY";
/// Environment variable overriding the guarded-call deadline.
pub const ENV_TIMEOUT_MS: &str = "CONSOLE_TIMEOUT_MS";

/// Header carrying the API key on every backend call.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Immutable settings for a [`GuardedClient`](crate::GuardedClient).
///
/// Built once at process start and moved into the client; request logic never
/// reads the environment.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use console_guard::ConsoleConfig;
///
/// let config = ConsoleConfig::new("https://console.example.com/")
///     .with_api_key("sk-live")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://console.example.com");
/// assert_eq!(format!("{:?}", config.api_key()), "Some([REDACTED])");
/// assert_eq!(config.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug)]
pub struct ConsoleConfig {
    base_url: String,
    api_key: Option<Secret<String>>,
    timeout: Duration,
}

impl ConsoleConfig {
    /// Creates a configuration with no API key and the default deadline.
    ///
    /// A trailing `/` on `base_url` is stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API key. An empty key is treated as absent.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then(|| Secret::new(api_key));
        self
    }

    /// Overrides the default 15 second deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `CONSOLE_API_URL` is missing or not an
    /// http(s) URL, or when `CONSOLE_TIMEOUT_MS` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_API_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                key: ENV_API_URL.to_string(),
            })?;

        let base_url = base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_API_URL.to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let mut config = Self::new(base_url);

        if let Some(api_key) = lookup(ENV_API_KEY) {
            config = config.with_api_key(api_key);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let timeout_ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_MS.to_string(),
                    reason: "must be a positive integer".to_string(),
                })?;
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }

        if config.api_key.is_none() {
            tracing::warn!(
                key = ENV_API_KEY,
                "no API key configured; backend calls will be unauthenticated"
            );
        }

        Ok(config)
    }

    /// Backend base URL, without a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The API key, if one is configured.
    pub fn api_key(&self) -> Option<&Secret<String>> {
        self.api_key.as_ref()
    }

    /// Deadline applied to every guarded call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
