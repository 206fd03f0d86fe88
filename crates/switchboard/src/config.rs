//! Switchboard configuration.

use serde::{Deserialize, Serialize};

use crate::error::SwitchboardError;

/// How local commands are pushed to the remote platform.
///
/// A deployment picks exactly one strategy: additive runs leave orphaned remote commands that
/// the other strategies would delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileStrategy {
    /// Create every local command; never delete remote commands.
    Additive,
    /// Delete remote commands missing locally, then create every local command.
    Full,
    /// Replace each touched scope with one overwrite call.
    #[default]
    BulkOverwrite,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwitchboardConfig {
    /// Whether every option must carry a description. The hosted platform rejects options without
    /// one.
    pub require_descriptions: bool,
    /// Strategy used by [`crate::Switchboard::reconcile`].
    pub strategy: ReconcileStrategy,
}

impl Default for SwitchboardConfig {
    fn default() -> Self {
        Self {
            require_descriptions: true,
            strategy: ReconcileStrategy::default(),
        }
    }
}

impl SwitchboardConfig {
    /// Parses configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::Config`] for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, SwitchboardError> {
        toml::from_str(raw).map_err(|err| SwitchboardError::Config {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = SwitchboardConfig::from_toml_str("").expect("parse");
        assert_eq!(config, SwitchboardConfig::default());
        assert!(config.require_descriptions);
        assert_eq!(config.strategy, ReconcileStrategy::BulkOverwrite);
    }

    #[test]
    fn parses_explicit_values() {
        let config = SwitchboardConfig::from_toml_str(
            r#"
require_descriptions = false
strategy = "additive"
"#,
        )
        .expect("parse");
        assert_eq!(
            config,
            SwitchboardConfig {
                require_descriptions: false,
                strategy: ReconcileStrategy::Additive,
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SwitchboardConfig::from_toml_str("strategy = \"full\"\nretries = 3")
            .expect_err("should fail");
        assert!(matches!(err, SwitchboardError::Config { .. }));
    }
}
