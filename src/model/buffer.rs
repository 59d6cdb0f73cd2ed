//! Web buffer state kept by the dispatch core

use super::mode::{KeymapMode, Mode};
use super::BufferId;
use crate::keymap::KeymapId;

/// A loaded page, independent of the view showing it
#[derive(Debug, Clone)]
pub struct Buffer {
    pub id: BufferId,
    pub url: String,
    pub title: String,
    mode: Mode,
    keymap_mode: KeymapMode,
    /// Selection anchor inside an editable element
    pub text_edit_mark: bool,
    /// Selection anchor while caret browsing
    pub caret_browsing_mark: bool,
}

impl Buffer {
    pub fn new(id: BufferId, url: impl Into<String>, mode: Mode) -> Self {
        Self {
            id,
            url: url.into(),
            title: String::new(),
            mode,
            keymap_mode: KeymapMode::Normal,
            text_edit_mark: false,
            caret_browsing_mark: false,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Switch mode, returning the previous one
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        std::mem::replace(&mut self.mode, mode)
    }

    pub fn keymap_mode(&self) -> KeymapMode {
        self.keymap_mode
    }

    pub fn set_keymap_mode(&mut self, mode: KeymapMode) {
        self.keymap_mode = mode;
    }

    /// Keymap for the normal keymap mode
    pub fn keymap(&self) -> KeymapId {
        self.mode.keymap_for(KeymapMode::Normal)
    }

    pub fn content_edit_keymap(&self) -> KeymapId {
        self.mode.keymap_for(KeymapMode::ContentEdit)
    }

    /// Keymap for the current keymap mode
    pub fn active_keymap(&self) -> KeymapId {
        self.mode.keymap_for(self.keymap_mode)
    }

    /// Title if known, else the url
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}
