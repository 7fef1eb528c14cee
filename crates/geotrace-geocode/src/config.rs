//! Reverse-geocoding configuration.
//!
//! Values come from built-in defaults overridden by environment variables:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `GEOTRACE_GEOCODE_ENABLED` | `true`/`false` | `true` |
//! | `GEOTRACE_GEOCODE_URL` | reverse endpoint | Nominatim public instance |
//! | `GEOTRACE_GEOCODE_ZOOM` | detail level 0-18 | `18` |
//! | `GEOTRACE_GEOCODE_TIMEOUT_SECS` | per-request timeout | `10` |
//! | `GEOTRACE_USER_AGENT` | client identifier | `geotrace/<version>` |

use std::env;
use std::time::Duration;

use geotrace_core::defaults;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const ENV_ENABLED: &str = "GEOTRACE_GEOCODE_ENABLED";
pub const ENV_URL: &str = "GEOTRACE_GEOCODE_URL";
pub const ENV_ZOOM: &str = "GEOTRACE_GEOCODE_ZOOM";
pub const ENV_TIMEOUT_SECS: &str = "GEOTRACE_GEOCODE_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "GEOTRACE_USER_AGENT";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reverse-geocoding client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Whether lookups are attempted at all.
    pub enabled: bool,
    /// Reverse endpoint URL (query parameters are appended).
    pub base_url: String,
    /// Detail level requested from the service.
    pub zoom: u8,
    /// Client identifier sent as `User-Agent`.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: defaults::GEOCODE_URL.to_string(),
            zoom: defaults::GEOCODE_ZOOM,
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_secs: defaults::GEOCODE_TIMEOUT_SECS,
        }
    }
}

impl GeocodeConfig {
    /// Defaults overridden by any `GEOTRACE_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_ENABLED) {
            config.enabled = parse_bool(ENV_ENABLED, &v)?;
        }
        if let Some(v) = lookup(ENV_URL) {
            config.base_url = v;
        }
        if let Some(v) = lookup(ENV_ZOOM) {
            config.zoom = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_ZOOM.to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_TIMEOUT_SECS.to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_USER_AGENT) {
            config.user_agent = v;
        }

        config.validate()?;
        debug!(
            enabled = config.enabled,
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "Loaded geocode configuration"
        );
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "geocode base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.zoom > 18 {
            return Err(ConfigError::Validation(format!(
                "geocode zoom must be between 0 and 18, got: {}",
                self.zoom
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "geocode timeout must be at least 1 second".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user agent cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GeocodeConfig::default();
        assert!(config.enabled);
        assert_eq!(config.base_url, defaults::GEOCODE_URL);
        assert_eq!(config.zoom, 18);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = GeocodeConfig::from_lookup(lookup_from(&[
            (ENV_URL, "http://localhost:8080/reverse"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_ENABLED, "false"),
            (ENV_USER_AGENT, "lab-workstation/2.0"),
        ]))
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.base_url, "http://localhost:8080/reverse");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.user_agent, "lab-workstation/2.0");
    }

    #[test]
    fn test_invalid_timeout_value() {
        let err = GeocodeConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: ENV_TIMEOUT_SECS.to_string(),
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_bool() {
        let err =
            GeocodeConfig::from_lookup(lookup_from(&[(ENV_ENABLED, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = GeocodeConfig {
            base_url: "nominatim.local".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = GeocodeConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zoom_out_of_range() {
        let config = GeocodeConfig {
            zoom: 19,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
