//! Configuration for the command client.

use crate::errors::RemoteError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the JSON-RPC command service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service host name or address.
    pub host: String,
    /// Base port of the installation.
    pub base_port: u16,
    /// Offset from the base port to the command service.
    #[serde(default = "default_command_port_offset")]
    pub command_port_offset: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_command_port_offset() -> u16 {
    2
}

fn default_timeout() -> f64 {
    300.0
}

fn default_user_agent() -> String {
    concat!("cryoflow/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ClientConfig {
    /// Creates a configuration with defaults for the given installation.
    #[must_use]
    pub fn new(host: impl Into<String>, base_port: u16) -> Self {
        Self {
            host: host.into(),
            base_port,
            command_port_offset: default_command_port_offset(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration. The timeout must be positive and finite.
    pub fn timeout(&self) -> Result<Duration, RemoteError> {
        let seconds = self.timeout_seconds;
        Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| {
                RemoteError::InvalidConfig(format!(
                    "timeout must be a positive number of seconds, got {seconds}"
                ))
            })
    }

    /// The command service endpoint.
    #[must_use]
    pub fn api_url(&self) -> String {
        let port = self.base_port.saturating_add(self.command_port_offset);
        format!("http://{}:{port}/api", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_uses_command_port() {
        let config = ClientConfig::new("10.0.0.5", 39000);
        assert_eq!(config.api_url(), "http://10.0.0.5:39002/api");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"host": "cs", "base_port": 61000}"#).unwrap();
        assert_eq!(config.command_port_offset, 2);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(300));
        assert!(config.user_agent.starts_with("cryoflow/"));
    }

    #[test]
    fn test_fractional_timeout() {
        let config = ClientConfig::new("cs", 39000).with_timeout(2.5);
        assert_eq!(config.timeout().unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn test_unusable_timeouts_are_errors() {
        for seconds in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = ClientConfig::new("cs", 39000)
                .with_timeout(seconds)
                .timeout()
                .unwrap_err();
            assert!(matches!(err, RemoteError::InvalidConfig(_)), "{seconds}");
        }
    }
}
