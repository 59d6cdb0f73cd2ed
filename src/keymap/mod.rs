//! Keymaps: chords, prefix trees and the registry of named keymaps
//!
//! This module provides a data-driven keybinding system that:
//! - Parses Emacs-style chord strings (`C-x C-f`, `M-<`, `S-a`)
//! - Stores bindings in prefix trees with parent keymap fallback
//! - Enables user customization via YAML config files
//!
//! # Architecture
//!
//! ```text
//! winit::KeyEvent → KeyPress → Keymaps::lookup() → Binding → Command
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Embedded defaults
//! let (mut keymaps, builtin) = default_keymaps()?;
//!
//! // User overrides
//! merge_user_keymap(&mut keymaps, &config_paths::keymap_file().unwrap());
//! ```

mod binding;
mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;
mod winit_adapter;

pub use binding::Binding;
pub use config::{
    apply_keymap_config, load_keymap_file, parse_keymap_yaml, BindingConfig, KeymapConfig,
    KeymapError, KeymapSection, UNBOUND,
};
pub use defaults::{default_keymaps, get_default_keymap_yaml, merge_user_keymap, BuiltinKeymaps};
pub use keymap::{Entry, Keymap, KeymapId, KeymapNode, Keymaps, LookupResult};
pub use types::{
    format_key_sequence, parse_key_sequence, KeyCode, KeyEventKind, KeyParseError, KeyPress,
    Modifiers, SyntheticKeyEvent,
};
pub use winit_adapter::keypress_from_winit;
