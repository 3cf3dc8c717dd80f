// ── Runtime connection configuration ──
//
// Describes how to reach the backend. Carries credentials and transport
// tuning but never touches disk; the CLI/TUI build a `ControllerConfig`
// from their profiles and hand it in.

use std::time::Duration;

use campusdesk_api::{DEFAULT_BASE_URL, RetryPolicy, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Configuration for one backend connection.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API base URL (e.g. `https://aaurms.eotcssu.et/api/`).
    pub api_url: Url,
    /// Token from a previous login, if one was stored.
    pub token: Option<SecretString>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ControllerConfig {
    /// Configuration for `api_url` with default transport settings.
    pub fn new(api_url: &str) -> Result<Self, CoreError> {
        let api_url = Url::parse(api_url).map_err(|e| CoreError::Config {
            message: format!("invalid API URL '{api_url}': {e}"),
        })?;
        let transport = TransportConfig::default();
        Ok(Self {
            api_url,
            token: None,
            timeout: transport.timeout,
            retry: transport.retry,
        })
    }

    /// Configuration for the production backend.
    pub fn production() -> Result<Self, CoreError> {
        Self::new(DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_retry(self.retry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_parses_and_keeps_defaults() {
        let cfg = ControllerConfig::new("http://localhost:8000/api").unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://localhost:8000/api");
        assert!(cfg.token.is_none());
        assert_eq!(cfg.timeout, TransportConfig::default().timeout);
    }

    #[test]
    fn rejects_garbage_url() {
        let err = ControllerConfig::new("not a url").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: invalid API URL"));
    }

    #[test]
    fn production_points_at_default_base() {
        let cfg = ControllerConfig::production().unwrap();
        assert_eq!(cfg.api_url.as_str(), DEFAULT_BASE_URL);
    }
}
