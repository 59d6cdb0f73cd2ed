//! Local keymap selection from focus and page events
//!
//! The local keymap follows the focused widget:
//!
//! | Event                                         | Local keymap                    |
//! |-----------------------------------------------|---------------------------------|
//! | a view gains focus                            | its buffer's active keymap      |
//! | the minibuffer input gains focus              | the input keymap (prompt's)     |
//! | the input loses focus, popup hidden           | the current buffer's keymap     |
//! | edit/caret/full screen on, current buffer     | the buffer's keymap for it      |
//! | edit/caret/full screen off, input not focused | the buffer's normal keymap      |
//!
//! While the minibuffer input has focus, clicks on views are eaten.

use crate::app::Application;
use crate::model::{BufferId, FocusTarget, KeymapMode, Mode, ViewId, WindowId};

/// Where a mouse button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseTarget {
    View(ViewId),
    MinibufferInput(WindowId),
    /// A row of the completion popup of a window
    CompletionRow(WindowId, usize),
}

impl Application {
    /// True while a minibuffer input has keyboard focus
    pub fn minibuffer_focused(&self) -> bool {
        matches!(self.focus, FocusTarget::MinibufferInput(_))
    }

    fn buffer_keymap(&self, buffer: BufferId) -> Option<crate::keymap::KeymapId> {
        self.buffer(buffer).map(|b| b.active_keymap())
    }

    pub(crate) fn minibuffer_input_focus_changed(&mut self, window: WindowId, focused: bool) {
        let Some(minibuffer) = self.minibuffer(window) else {
            return;
        };
        if focused {
            let keymap = minibuffer.input.keymap();
            self.set_local_keymap(Some(keymap));
        } else if !minibuffer.input.popup().is_visible() {
            if let Some(keymap) = self
                .current_buffer(window)
                .and_then(|b| self.buffer_keymap(b))
            {
                self.set_local_keymap(Some(keymap));
            }
        }
    }

    pub(crate) fn view_focus_changed(&mut self, view: ViewId) {
        if self.minibuffer_focused() {
            return;
        }
        if let Some(keymap) = self
            .view(view)
            .and_then(|v| self.buffer_keymap(v.buffer))
        {
            self.set_local_keymap(Some(keymap));
        }
    }

    /// A buffer was just put in `view`
    pub(crate) fn buffer_opened_in_view(&mut self, view: ViewId) {
        if self.focus == FocusTarget::View(view) {
            self.view_focus_changed(view);
        }
    }

    /// Buffer of the current view of the current window
    fn is_current_buffer(&self, buffer: BufferId) -> bool {
        self.current_buffer(self.current_window) == Some(buffer)
    }

    /// Change the keymap mode of a buffer and follow it locally
    pub(crate) fn set_keymap_mode(&mut self, buffer: BufferId, mode: KeymapMode) {
        let Some(b) = self.buffer_mut(buffer) else {
            return;
        };
        b.set_keymap_mode(mode);
        let keymap = b.active_keymap();
        tracing::debug!("buffer {} keymap mode: {:?}", buffer.0, mode);

        if !self.is_current_buffer(buffer) {
            return;
        }
        if mode != KeymapMode::Normal || !self.minibuffer_focused() {
            self.set_local_keymap(Some(keymap));
        }
    }

    /// An editable element of the page gained or lost focus
    pub fn content_edit_focus_changed(&mut self, buffer: BufferId, enabled: bool) {
        let mode = if enabled {
            KeymapMode::ContentEdit
        } else {
            KeymapMode::Normal
        };
        self.set_keymap_mode(buffer, mode);
    }

    pub fn caret_browsing_changed(&mut self, buffer: BufferId, enabled: bool) {
        let mode = if enabled {
            KeymapMode::CaretBrowsing
        } else {
            KeymapMode::Normal
        };
        self.set_keymap_mode(buffer, mode);
    }

    /// Follow a mode switch if the local keymap came from the old mode
    pub(crate) fn buffer_mode_changed(&mut self, buffer: BufferId, old: &Mode) {
        let Some(b) = self.buffer(buffer) else {
            return;
        };
        let old_keymap = old.keymap_for(b.keymap_mode());
        let keymap = b.active_keymap();
        if self.local_keymap() == Some(old_keymap) {
            self.set_local_keymap(Some(keymap));
        }
    }

    /// A mouse press; returns true when the press is eaten
    pub fn mouse_press(&mut self, target: MouseTarget) -> bool {
        match target {
            MouseTarget::CompletionRow(window, row) => {
                if let Some(minibuffer) = self.minibuffer_mut(window) {
                    minibuffer.input.activate_row(row, true);
                }
                self.sync_minibuffer(window);
                true
            }
            MouseTarget::MinibufferInput(window) => {
                if let Some(minibuffer) = self.minibuffer_mut(window) {
                    minibuffer.input.popup_mut().hide();
                }
                false
            }
            MouseTarget::View(view) => {
                if let FocusTarget::MinibufferInput(window) = self.focus {
                    if let Some(minibuffer) = self.minibuffer_mut(window) {
                        minibuffer.input.popup_mut().hide();
                    }
                    return true;
                }
                self.set_focus(FocusTarget::View(view));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;
    use crate::model::NO_KEYBINDINGS_MODE;

    fn app() -> Application {
        Application::with_defaults(Box::new(RecordingBridge::new())).unwrap()
    }

    #[test]
    fn test_content_edit_focus() {
        let mut app = app();
        let buffer = app.current_buffer(app.current_window()).unwrap();
        app.content_edit_focus_changed(buffer, true);
        assert_eq!(app.local_keymap(), Some(app.builtin.content_edit));
        app.content_edit_focus_changed(buffer, false);
        assert_eq!(app.local_keymap(), Some(app.builtin.webbuffer));
    }

    #[test]
    fn test_other_buffer_only_changes_its_mode() {
        let mut app = app();
        let other = app.create_buffer("https://a.org/");
        app.caret_browsing_changed(other, true);
        assert_eq!(app.local_keymap(), Some(app.builtin.webbuffer));
        assert_eq!(
            app.buffer(other).unwrap().keymap_mode(),
            KeymapMode::CaretBrowsing
        );
    }

    #[test]
    fn test_mode_change_follows_derived_keymap() {
        let mut app = app();
        let buffer = app.current_buffer(app.current_window()).unwrap();
        app.set_buffer_mode(buffer, NO_KEYBINDINGS_MODE).unwrap();
        assert_eq!(app.local_keymap(), Some(app.builtin.empty));
        assert!(app.set_buffer_mode(buffer, "nope").is_err());
    }

    #[test]
    fn test_view_clicks_eaten_while_prompting() {
        let mut app = app();
        let window = app.current_window();
        let view = app.current_view(window).unwrap();
        assert!(!app.mouse_press(MouseTarget::View(view)));

        app.set_focus(FocusTarget::MinibufferInput(window));
        assert!(app.mouse_press(MouseTarget::View(view)));
        assert!(app.minibuffer_focused());
    }
}
