//! Engine configuration

use serde::{Deserialize, Serialize};

/// Tunables shared by every tree built with them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scalar parameter name that makes a class identity-bearing
    pub identity_parameter: String,
    /// Maximum containment depth (the root sits at depth 0)
    pub max_depth: usize,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With identity parameter name
    #[inline]
    #[must_use]
    pub fn with_identity_parameter(mut self, name: impl Into<String>) -> Self {
        self.identity_parameter = name.into();
        self
    }

    /// With maximum depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            identity_parameter: "id".to_string(),
            max_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.identity_parameter, "id");
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str("max_depth = 3").unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.identity_parameter, "id");
    }

    #[test]
    fn builder_overrides() {
        let config = EngineConfig::new()
            .with_identity_parameter("name")
            .with_max_depth(5);
        assert_eq!(config.identity_parameter, "name");
        assert_eq!(config.max_depth, 5);
    }
}
