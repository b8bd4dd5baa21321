//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::DialogueError;

/// Policies the conversation engine applies during transitions.
///
/// Can be read from a TOML table; missing keys take their defaults:
///
/// ```toml
/// chain_prerequisites = true
/// restrict_to_prompts = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Re-check the prerequisite of a `next` target as soon as it is reached,
    /// redirecting to its fallback when it fails.
    pub chain_prerequisites: bool,

    /// Reject choices that are not among the prompts currently offered.
    pub restrict_to_prompts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain_prerequisites: true,
            restrict_to_prompts: false,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, DialogueError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.chain_prerequisites);
        assert!(!config.restrict_to_prompts);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("restrict_to_prompts = true").unwrap();
        assert!(config.chain_prerequisites);
        assert!(config.restrict_to_prompts);

        let empty = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let err = EngineConfig::from_toml_str("chain_prerequisites = \"yes\"").unwrap_err();
        assert!(matches!(err, DialogueError::Config(_)));
    }
}
