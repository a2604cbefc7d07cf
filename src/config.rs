//! Bus configuration
//!
//! `BusConfig` carries the defaults applied by `EventBus::subscribe` when a
//! caller does not pick a priority or cancellation policy. It is immutable
//! once built; use `to_builder` to derive a modified copy.

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default subscription priority
pub const DEFAULT_PRIORITY: i32 = 0;

/// Whether subscriptions accept cancelled events by default
pub const DEFAULT_ACCEPTS_CANCELLED: bool = false;

/// Default subscription settings for an `EventBus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusConfig {
    /// Priority used when none is given
    priority: i32,

    /// Cancellation policy used when none is given
    accepts_cancelled: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            accepts_cancelled: DEFAULT_ACCEPTS_CANCELLED,
        }
    }
}

impl BusConfig {
    /// Start building a configuration from the defaults
    pub fn builder() -> BusConfigBuilder {
        BusConfigBuilder::default()
    }

    /// Start building from this configuration's values
    pub fn to_builder(&self) -> BusConfigBuilder {
        BusConfigBuilder {
            priority: self.priority,
            accepts_cancelled: self.accepts_cancelled,
        }
    }

    /// Default subscription priority
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Default cancellation policy
    pub fn accepts_cancelled(&self) -> bool {
        self.accepts_cancelled
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::Config(format!(
                "Failed to read bus config {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            priority = config.priority,
            accepts_cancelled = config.accepts_cancelled,
            "Bus config loaded"
        );
        Ok(config)
    }
}

/// Builder for `BusConfig`
#[derive(Debug, Clone)]
pub struct BusConfigBuilder {
    priority: i32,
    accepts_cancelled: bool,
}

impl Default for BusConfigBuilder {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            accepts_cancelled: DEFAULT_ACCEPTS_CANCELLED,
        }
    }
}

impl BusConfigBuilder {
    /// Set the default priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the default cancellation policy
    pub fn accepts_cancelled(mut self, accepts_cancelled: bool) -> Self {
        self.accepts_cancelled = accepts_cancelled;
        self
    }

    /// Finish the configuration
    pub fn build(self) -> BusConfig {
        BusConfig {
            priority: self.priority,
            accepts_cancelled: self.accepts_cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BusConfig::default();
        assert_eq!(config.priority(), 0);
        assert!(!config.accepts_cancelled());
        assert_eq!(BusConfig::builder().build(), config);
    }

    #[test]
    fn test_builder_and_to_builder() {
        let config = BusConfig::builder()
            .priority(10)
            .accepts_cancelled(true)
            .build();
        assert_eq!(config.priority(), 10);
        assert!(config.accepts_cancelled());

        let derived = config.to_builder().priority(-1).build();
        assert_eq!(derived.priority(), -1);
        assert!(derived.accepts_cancelled());
        assert_eq!(config.priority(), 10);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let config = BusConfig::builder().priority(3).build();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"priority\":3"));
        assert!(json.contains("\"acceptsCancelled\":false"));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = BusConfig::from_json(r#"{"acceptsCancelled": true}"#).unwrap();
        assert_eq!(config.priority(), DEFAULT_PRIORITY);
        assert!(config.accepts_cancelled());

        let empty = BusConfig::from_json("{}").unwrap();
        assert_eq!(empty, BusConfig::default());
    }

    #[test]
    fn test_config_from_invalid_json() {
        let err = BusConfig::from_json(r#"{"priority": "high"}"#).unwrap_err();
        assert!(matches!(err, DispatchError::Serialization(_)));
    }

    #[test]
    fn test_config_from_file() {
        let path = std::env::temp_dir().join(format!(
            "a3s-dispatch-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"priority": 7}"#).unwrap();

        let config = BusConfig::from_file(&path).unwrap();
        assert_eq!(config.priority(), 7);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_config_from_missing_file() {
        let err = BusConfig::from_file("/nonexistent/a3s-dispatch.json").unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
    }
}
