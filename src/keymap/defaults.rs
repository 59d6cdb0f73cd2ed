//! Default keymaps shipped with the browser
//!
//! The named bindings come from the embedded keymap.yaml; a few inline
//! actions (full-screen exit) are added in code. The user's keymap.yaml is
//! merged on top.

use std::path::Path;

use super::binding::Binding;
use super::config::{apply_keymap_config, load_keymap_file, parse_keymap_yaml, KeymapError};
use super::keymap::{KeymapId, Keymaps};

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Get the embedded default keymap YAML
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Ids of the keymaps the dispatch core refers to directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinKeymaps {
    pub global: KeymapId,
    pub webbuffer: KeymapId,
    pub content_edit: KeymapId,
    pub caret_browsing: KeymapId,
    pub fullscreen: KeymapId,
    pub minibuffer: KeymapId,
    pub empty: KeymapId,
    pub hint: KeymapId,
    pub buffer_list: KeymapId,
    pub yes_no: KeymapId,
    pub isearch: KeymapId,
}

impl BuiltinKeymaps {
    /// Resolve the builtin ids by name
    pub fn resolve(keymaps: &Keymaps) -> Result<Self, KeymapError> {
        Ok(Self {
            global: keymaps.require("global")?,
            webbuffer: keymaps.require("webbuffer")?,
            content_edit: keymaps.require("webcontent-edit")?,
            caret_browsing: keymaps.require("caret-browsing")?,
            fullscreen: keymaps.require("video-fullscreen")?,
            minibuffer: keymaps.require("minibuffer")?,
            empty: keymaps.require("empty")?,
            hint: keymaps.require("hint")?,
            buffer_list: keymaps.require("buffer-list")?,
            yes_no: keymaps.require("yes-no")?,
            isearch: keymaps.require("i-search")?,
        })
    }
}

/// Build the default keymaps from the embedded YAML
pub fn default_keymaps() -> Result<(Keymaps, BuiltinKeymaps), KeymapError> {
    let mut keymaps = Keymaps::new();
    let config = parse_keymap_yaml(DEFAULT_KEYMAP_YAML)?;
    let count = apply_keymap_config(&mut keymaps, &config)?;
    tracing::info!("Loaded embedded default keymaps ({} bindings)", count);

    let builtin = BuiltinKeymaps::resolve(&keymaps)?;

    let fullscreen = keymaps.get_mut(builtin.fullscreen);
    for key in ["q", "C-g", "Esc"] {
        fullscreen.define_key(key, Binding::action(crate::commands::exit_full_screen))?;
    }

    Ok((keymaps, builtin))
}

/// Merge a user keymap file on top of `keymaps`
///
/// A missing file is silently skipped; a broken one is logged and ignored.
pub fn merge_user_keymap(keymaps: &mut Keymaps, path: &Path) {
    if !path.exists() {
        return;
    }
    let result = load_keymap_file(path).and_then(|config| apply_keymap_config(keymaps, &config));
    match result {
        Ok(count) => {
            tracing::info!(
                "Merged user keymap from {} ({} bindings)",
                path.display(),
                count
            );
        }
        Err(e) => {
            tracing::warn!("Failed to load user keymap from {}: {}", path.display(), e);
        }
    }
}
