//! Interpreter configuration.
//!
//! [`CommanderConfig`] carries the few knobs a hosting application may want
//! to set. It derives serde traits so hosts can embed it in their own
//! configuration files; loading and file format stay the host's concern.

use serde::{Deserialize, Serialize};

/// Settings for one commander.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    /// Display name of the command set.
    pub name: String,
    /// Description rendered at the top of the command set's help.
    pub description: Option<String>,
    /// Lines starting with this marker are skipped without resolution.
    pub comment_marker: String,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            name: "commander".to_owned(),
            description: None,
            comment_marker: "#".to_owned(),
        }
    }
}

impl CommanderConfig {
    /// Creates a config with the given name and default settings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attaches a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the comment marker.
    pub fn comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = marker.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = CommanderConfig::default();
        assert_eq!(config.name, "commander");
        assert_eq!(config.comment_marker, "#");
        assert_eq!(config.description, None);
    }

    #[test]
    fn test_deserialize_with_partial_fields() {
        let config: CommanderConfig =
            serde_json::from_str(r#"{"name": "router", "comment_marker": "//"}"#).unwrap();
        assert_eq!(config.name, "router");
        assert_eq!(config.comment_marker, "//");
        assert_eq!(config.description, None);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = CommanderConfig::named("router").describe("routes things");
        let text = serde_json::to_string(&config).unwrap();
        let parsed: CommanderConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.name, config.name);
        assert_eq!(parsed.description, config.description);
    }
}
