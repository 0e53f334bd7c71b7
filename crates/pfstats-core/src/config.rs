//! Configuration types for the pfstats system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Default identity lookup endpoint (name → id)
pub const DEFAULT_IDENTITY_URL: &str = "https://api.mojang.com/users/profiles/minecraft";

/// Default statistics endpoint (id → dungeon payload)
pub const DEFAULT_STATS_URL: &str = "https://sbd.evankhell.workers.dev/player";

/// Main pfstats configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PfStatsConfig {
    /// Remote endpoint settings
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Fixed marker strings shown to the host
    #[serde(default)]
    pub display: DisplayConfig,

    /// Coordinator settings
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

impl PfStatsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.endpoints.validate()?;
        self.coordinator.validate()?;
        Ok(())
    }
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the identity service; the player name is appended as a path segment
    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    /// Base URL of the statistics service; the player id is appended as a path segment
    #[serde(default = "default_stats_url")]
    pub stats_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl EndpointConfig {
    /// Point both services at custom base URLs
    pub fn with_urls(identity_url: impl Into<String>, stats_url: impl Into<String>) -> Self {
        Self {
            identity_url: identity_url.into(),
            stats_url: stats_url.into(),
            user_agent: default_user_agent(),
        }
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the endpoint configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_url("identity", &self.identity_url)?;
        validate_url("stats", &self.stats_url)?;
        if self.user_agent.trim().is_empty() {
            return Err(crate::Error::config("User-Agent cannot be empty"));
        }
        Ok(())
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            identity_url: default_identity_url(),
            stats_url: default_stats_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn validate_url(name: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} URL cannot be empty", name)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} URL must use HTTP or HTTPS scheme. Got: {}",
            name, url
        )));
    }
    Ok(())
}

/// Marker strings appended to the host's line in place of real stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Shown while a lookup is in flight
    #[serde(default = "default_pending_marker")]
    pub pending_marker: String,

    /// Cached for players whose lookup failed
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,

    /// Cached when the stats were fetched but the line could not be assembled
    #[serde(default = "default_format_error_marker")]
    pub format_error_marker: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pending_marker: default_pending_marker(),
            failure_marker: default_failure_marker(),
            format_error_marker: default_format_error_marker(),
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Capacity of the lookup event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl CoordinatorConfig {
    /// Validate the coordinator configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}

fn default_stats_url() -> String {
    DEFAULT_STATS_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("pfstats/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_pending_marker() -> String {
    " [...]".to_string()
}

fn default_failure_marker() -> String {
    " [?]".to_string()
}

fn default_format_error_marker() -> String {
    " (API Error)".to_string()
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = PfStatsConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.display.failure_marker, " [?]");
        assert!(config.endpoints.user_agent.starts_with("pfstats/"));
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let mut config = PfStatsConfig::new();
        config.endpoints.stats_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_user_agent() {
        let endpoints = EndpointConfig::default().with_user_agent("  ");
        assert!(endpoints.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut config = PfStatsConfig::new();
        config.coordinator.event_channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "endpoints": { "stats_url": "http://localhost:8080/player" } }"#;
        let config: PfStatsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.endpoints.stats_url, "http://localhost:8080/player");
        assert_eq!(config.endpoints.identity_url, DEFAULT_IDENTITY_URL);
        assert_eq!(config.coordinator.event_channel_capacity, 1000);
    }
}
