//! External verification provider configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::env_or;

/// Credentials, timeouts and retry policy for the e-KYC provider API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Provider base URL, trailing slash is ignored
    pub base_url: String,

    /// API key sent as `x-api-key`
    pub api_key: String,

    /// API secret used only for the credential exchange
    pub api_secret: String,

    /// Value of the `x-api-version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-call HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// Total attempts per provider call, including the first
    pub max_retries: u32,

    /// Delay before the first retry; doubles on every further retry
    pub initial_backoff_ms: u64,

    /// Access token validity when the provider does not report one
    pub token_validity_secs: u64,

    /// Refresh the token this long before it actually expires
    pub token_buffer_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_version: default_api_version(),
            request_timeout_secs: 10,
            max_retries: 3,
            initial_backoff_ms: 1000,
            token_validity_secs: 86_400,
            token_buffer_secs: 300,
        }
    }
}

impl ProviderConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("KYC_PROVIDER_URL").unwrap_or_default(),
            api_key: std::env::var("KYC_PROVIDER_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("KYC_PROVIDER_API_SECRET").unwrap_or_default(),
            api_version: std::env::var("KYC_PROVIDER_API_VERSION").unwrap_or(defaults.api_version),
            request_timeout_secs: env_or("KYC_PROVIDER_TIMEOUT_SECS", defaults.request_timeout_secs),
            max_retries: env_or("KYC_PROVIDER_MAX_RETRIES", defaults.max_retries),
            initial_backoff_ms: env_or("KYC_PROVIDER_INITIAL_BACKOFF_MS", defaults.initial_backoff_ms),
            token_validity_secs: env_or("KYC_PROVIDER_TOKEN_VALIDITY_SECS", defaults.token_validity_secs),
            token_buffer_secs: env_or("KYC_PROVIDER_TOKEN_BUFFER_SECS", defaults.token_buffer_secs),
        }
    }

    /// Point the config at a base URL with the given credentials
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Default::default()
        }
    }

    pub fn with_initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether URL, key and secret are all present
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Base URL with any trailing slash removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_api_version() -> String {
    String::from("2.0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_provider_policy() {
        let config = ProviderConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.token_validity_secs - config.token_buffer_secs, 86_100);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ProviderConfig::new("https://api.example.com/", "key", "secret");
        assert_eq!(config.normalized_base_url(), "https://api.example.com");
        assert!(config.is_configured());
    }
}
