//! User configuration
//!
//! Read from `~/.config/webchord/config.yaml`:
//!
//! ```yaml
//! variables:
//!   home-page: "https://example.org/"
//! webjumps:
//!   ddg: { url: "https://duckduckgo.com/?q=%s", doc: "DuckDuckGo" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::Application;
use crate::variables::{Value, Variables};
use crate::webjump::WebJumps;

/// A webjump declared in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebJumpConfig {
    pub url: String,
    #[serde(default)]
    pub doc: String,
}

/// Contents of `config.yaml`; every section is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub webjumps: BTreeMap<String, WebJumpConfig>,
}

impl AppConfig {
    /// Parse a config document
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load config from `path`, or return defaults if it is missing or broken
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load the user config from the config directory
    pub fn load_user() -> Self {
        match crate::config_paths::config_file() {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Set the configured variables; invalid ones are reported and skipped
    ///
    /// Returns the number of variables applied.
    pub fn apply_variables(&self, variables: &mut Variables) -> usize {
        let mut applied = 0;
        for (name, value) in &self.variables {
            match variables.set(name, value.clone()) {
                Ok(_) => applied += 1,
                Err(e) => tracing::warn!("Ignoring config variable: {}", e),
            }
        }
        applied
    }

    pub fn apply_webjumps(&self, webjumps: &mut WebJumps) {
        for (name, jump) in &self.webjumps {
            webjumps.define(name, &jump.url, &jump.doc);
        }
        if !self.webjumps.is_empty() {
            tracing::info!("Defined {} webjumps from config", self.webjumps.len());
        }
    }

    /// Apply the whole config to a running application
    pub fn apply(&self, app: &mut Application) {
        for (name, value) in &self.variables {
            if let Err(e) = app.set_variable(name, value.clone()) {
                tracing::warn!("Ignoring config variable: {}", e);
            }
        }
        self.apply_webjumps(&mut app.webjumps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{HOME_PAGE, MINIBUFFER_HEIGHT};

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert!(config.variables.is_empty());
        assert!(config.webjumps.is_empty());
    }

    #[test]
    fn test_invalid_variable_is_skipped() {
        let config = AppConfig::parse(
            r#"
variables:
  home-page: "https://example.org/"
  minibuffer-height: 0
  no-such-variable: 1
"#,
        )
        .unwrap();
        let mut variables = Variables::with_builtins();
        assert_eq!(config.apply_variables(&mut variables), 1);
        assert_eq!(variables.get_str(HOME_PAGE), "https://example.org/");
        assert_eq!(variables.get_int(MINIBUFFER_HEIGHT), Some(25));
    }

    #[test]
    fn test_webjumps_section() {
        let config = AppConfig::parse(
            r#"
webjumps:
  ddg:
    url: "https://duckduckgo.com/?q=%s"
    doc: DuckDuckGo
"#,
        )
        .unwrap();
        let mut webjumps = WebJumps::new();
        config.apply_webjumps(&mut webjumps);
        let jump = webjumps.get("ddg").unwrap();
        assert_eq!(jump.doc, "DuckDuckGo");
        assert!(jump.allow_args());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.yaml"));
        assert!(config.variables.is_empty());
    }
}
