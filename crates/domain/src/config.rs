//! Environment configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

/// Deployment settings for the request layer.
///
/// Resolved once at startup and shared read-only afterwards; nothing in the
/// workspace mutates a loaded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Prefix joined with every relative request URL
    pub base_url: String,
    /// Transport timeout applied to each request
    pub timeout_ms: u64,
    /// Production builds log failures tersely
    pub production: bool,
}

impl EnvironmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn environment_name(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "development"
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            production: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.base_url, "http://localhost:8090");
        assert_eq!(config.timeout(), Duration::from_millis(3000));
        assert_eq!(config.environment_name(), "development");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EnvironmentConfig =
            serde_json::from_str(r#"{"production": true}"#).unwrap();
        assert!(config.production);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
