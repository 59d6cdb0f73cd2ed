//! YAML configuration parsing for keymaps
//!
//! A keymap file lists keymaps by name with their bindings:
//!
//! ```yaml
//! keymaps:
//!   - name: global
//!     bindings:
//!       - key: "C-x C-c"
//!         command: quit
//!   - name: hint
//!     parent: minibuffer
//!     bindings: []
//! ```
//!
//! Sections naming an unknown keymap create it. A binding whose command is
//! `unbound` removes the sequence instead.

use std::path::Path;

use serde::Deserialize;

use super::keymap::{Keymap, Keymaps};
use super::types::{parse_key_sequence, KeyParseError};

/// Command name that removes a binding when merging
pub const UNBOUND: &str = "unbound";

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub keymaps: Vec<KeymapSection>,
}

/// One keymap in a YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapSection {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub command: String,
}

/// Load a keymap file from disk
pub fn load_keymap_file(path: &Path) -> Result<KeymapConfig, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse a keymap YAML document
pub fn parse_keymap_yaml(yaml: &str) -> Result<KeymapConfig, KeymapError> {
    serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))
}

/// Apply a parsed file on top of `keymaps`. Returns the number of bindings
/// defined or removed.
///
/// Every key string is validated before anything is applied, so a file with a
/// bad chord leaves the registry untouched.
pub fn apply_keymap_config(
    keymaps: &mut Keymaps,
    config: &KeymapConfig,
) -> Result<usize, KeymapError> {
    for section in &config.keymaps {
        for binding in &section.bindings {
            parse_key_sequence(&binding.key)?;
        }
    }

    let mut applied = 0;
    for section in &config.keymaps {
        let parent = match &section.parent {
            Some(name) => Some(keymaps.require(name)?),
            None => None,
        };

        let id = match keymaps.by_name(&section.name) {
            Some(id) => {
                if parent.is_some() {
                    keymaps.get_mut(id).set_parent(parent);
                }
                id
            }
            None => {
                let mut keymap = Keymap::new(section.name.clone());
                if let Some(parent) = parent {
                    keymap = keymap.with_parent(parent);
                }
                keymaps.register(keymap)?
            }
        };

        if let Some(doc) = &section.doc {
            keymaps.get_mut(id).set_doc(doc.clone());
        }

        for binding in &section.bindings {
            let keymap = keymaps.get_mut(id);
            if binding.command == UNBOUND {
                if !keymap.undefine_key(&binding.key)? {
                    tracing::debug!(
                        "'{}' was not bound in keymap {}",
                        binding.key,
                        section.name
                    );
                }
            } else {
                keymap.define_key(&binding.key, binding.command.as_str())?;
            }
            applied += 1;
        }
    }

    Ok(applied)
}

/// Errors that can occur when building keymaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidKey(KeyParseError),
    InvalidBinding(String),
    DuplicateKeymap(String),
    UnknownKeymap(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidKey(e) => write!(f, "Invalid key: {}", e),
            KeymapError::InvalidBinding(k) => {
                write!(f, "Invalid binding for '{}': expected a command name or action", k)
            }
            KeymapError::DuplicateKeymap(name) => write!(f, "Keymap already defined: {}", name),
            KeymapError::UnknownKeymap(name) => write!(f, "No such keymap: {}", name),
        }
    }
}

impl std::error::Error for KeymapError {}

impl From<KeyParseError> for KeymapError {
    fn from(e: KeyParseError) -> Self {
        KeymapError::InvalidKey(e)
    }
}
