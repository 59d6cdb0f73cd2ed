//! webchord - keyboard-driven input dispatch for an Emacs-style browser
//!
//! This crate turns key presses into commands: chords are resolved through
//! prefix-tree keymaps (local keymap first, then global), the resolved
//! commands run against the [`Application`], and prompts read their
//! arguments in a per-window minibuffer with completion and history.
//! Rendering is not part of the crate; pages are reached through the
//! [`bridge::PageBridge`] trait.

pub mod app;
pub mod bridge;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod headless;
pub mod hooks;
pub mod keyboard;
pub mod keymap;
pub mod local_keymap;
pub mod minibuffer;
pub mod model;
pub mod prompts;
pub mod tracing;
pub mod variables;
pub mod webjump;

// Re-export commonly used types
pub use app::Application;
pub use bridge::{PageBridge, RecordingBridge};
pub use commands::{CommandContext, CommandRegistry};
pub use config::AppConfig;
pub use keyboard::{KeyAction, KeyboardHandler};
pub use keymap::{Binding, KeyPress, Keymap, KeymapId, Keymaps, LookupResult};
pub use variables::{Value, Variables};
