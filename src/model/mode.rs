//! Buffer modes: which keymap a buffer uses in each keymap mode

use crate::keymap::{BuiltinKeymaps, KeymapId};

pub const STANDARD_MODE: &str = "standard-mode";
pub const NO_KEYBINDINGS_MODE: &str = "no-keybindings";

/// What a buffer is currently doing, as far as keymaps are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeymapMode {
    #[default]
    Normal,
    /// An editable element of the page has focus
    ContentEdit,
    CaretBrowsing,
    /// A page element is shown full screen
    Fullscreen,
}

/// A named set of keymaps, one per keymap mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub name: String,
    pub description: String,
    normal: KeymapId,
    content_edit: KeymapId,
    caret_browsing: KeymapId,
    fullscreen: KeymapId,
}

impl Mode {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        normal: KeymapId,
        content_edit: KeymapId,
        caret_browsing: KeymapId,
        fullscreen: KeymapId,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            normal,
            content_edit,
            caret_browsing,
            fullscreen,
        }
    }

    /// A mode using `keymap` whatever the keymap mode
    pub fn uniform(
        name: impl Into<String>,
        description: impl Into<String>,
        keymap: KeymapId,
    ) -> Self {
        Self::new(name, description, keymap, keymap, keymap, keymap)
    }

    pub fn keymap_for(&self, mode: KeymapMode) -> KeymapId {
        match mode {
            KeymapMode::Normal => self.normal,
            KeymapMode::ContentEdit => self.content_edit,
            KeymapMode::CaretBrowsing => self.caret_browsing,
            KeymapMode::Fullscreen => self.fullscreen,
        }
    }
}

/// Registry of the defined modes
#[derive(Debug, Clone, Default)]
pub struct Modes {
    modes: Vec<Mode>,
}

impl Modes {
    /// `standard-mode` and `no-keybindings`
    pub fn with_builtins(builtin: &BuiltinKeymaps) -> Self {
        let mut modes = Self::default();
        modes.define(Mode::new(
            STANDARD_MODE,
            "standard navigation mode",
            builtin.webbuffer,
            builtin.content_edit,
            builtin.caret_browsing,
            builtin.fullscreen,
        ));
        modes.define(Mode::uniform(
            NO_KEYBINDINGS_MODE,
            "no-keybindings navigation mode",
            builtin.empty,
        ));
        modes
    }

    /// Add a mode, replacing one with the same name
    pub fn define(&mut self, mode: Mode) {
        match self.modes.iter_mut().find(|m| m.name == mode.name) {
            Some(existing) => *existing = mode,
            None => self.modes.push(mode),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|m| m.name.as_str())
    }
}
