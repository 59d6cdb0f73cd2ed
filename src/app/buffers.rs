//! Buffers, views and the page-side calls made on their behalf

use anyhow::Context as _;

use super::Application;
use crate::bridge::PageAction;
use crate::keymap::{KeyEventKind, KeyPress};
use crate::model::{
    Buffer, BufferId, FocusTarget, KeymapMode, Mode, SplitDirection, View, ViewId, WindowId,
    STANDARD_MODE,
};
use crate::prompts::BufferRow;

/// Url of a buffer with nothing loaded
pub const BLANK_URL: &str = "about:blank";

impl Application {
    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn buffer(&self, buffer: BufferId) -> Option<&Buffer> {
        self.buffers.get(&buffer)
    }

    pub fn buffer_mut(&mut self, buffer: BufferId) -> Option<&mut Buffer> {
        self.buffers.get_mut(&buffer)
    }

    pub fn view(&self, view: ViewId) -> Option<&View> {
        self.views.get(&view)
    }

    pub fn current_view(&self, window: WindowId) -> Option<ViewId> {
        self.windows.get(&window).map(|w| w.current_view())
    }

    /// Buffer shown in the current view of `window`
    pub fn current_buffer(&self, window: WindowId) -> Option<BufferId> {
        let view = self.current_view(window)?;
        self.views.get(&view).map(|v| v.buffer)
    }

    /// The view showing `buffer`, if any
    pub fn view_of(&self, buffer: BufferId) -> Option<ViewId> {
        self.views
            .values()
            .find(|v| v.buffer == buffer)
            .map(|v| v.id)
    }

    pub fn is_buffer_visible(&self, buffer: BufferId) -> bool {
        self.view_of(buffer).is_some()
    }

    /// Buffer ids, most recently shown first
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.buffer_order.clone()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Rows for the buffer list prompt, most recently shown first
    pub fn buffer_rows(&self) -> Vec<BufferRow> {
        self.buffer_order
            .iter()
            .filter_map(|id| self.buffers.get(id))
            .map(|b| BufferRow {
                id: b.id,
                url: b.url.clone(),
                title: b.title.clone(),
                visible: self.is_buffer_visible(b.id),
            })
            .collect()
    }

    /// Move `buffer` to the front of the most recently used list
    pub(crate) fn touch_buffer(&mut self, buffer: BufferId) {
        self.buffer_order.retain(|b| *b != buffer);
        self.buffer_order.insert(0, buffer);
    }

    // =========================================================================
    // Buffers
    // =========================================================================

    fn default_mode(&self) -> Mode {
        self.modes
            .get(STANDARD_MODE)
            .cloned()
            .unwrap_or_else(|| Mode::uniform(STANDARD_MODE, "", self.builtin.webbuffer))
    }

    /// Create a buffer (not shown anywhere yet); loads `url` unless empty
    pub fn create_buffer(&mut self, url: &str) -> BufferId {
        let id = BufferId(self.alloc_id());
        let buffer = Buffer::new(id, url, self.default_mode());
        self.buffers.insert(id, buffer);
        self.buffer_order.push(id);
        if !url.is_empty() {
            self.bridge.load_url(id, url);
        }
        tracing::debug!("buffer {} created for {:?}", id.0, url);
        self.hooks.buffer_created.fire(&id);
        self.update_right_labels();
        id
    }

    pub fn load_url(&mut self, buffer: BufferId, url: &str) {
        if let Some(b) = self.buffers.get_mut(&buffer) {
            b.url = url.to_string();
            self.bridge.load_url(buffer, url);
        }
    }

    /// Show `buffer` in `view`
    ///
    /// A buffer is in at most one view: when another view shows it, that
    /// view gets the buffer `view` was showing.
    pub fn set_view_buffer(&mut self, view: ViewId, buffer: BufferId) {
        if !self.buffers.contains_key(&buffer) {
            return;
        }
        let Some(previous) = self.views.get(&view).map(|v| v.buffer) else {
            return;
        };
        if previous != buffer {
            if let Some(other) = self.view_of(buffer) {
                if let Some(v) = self.views.get_mut(&other) {
                    v.buffer = previous;
                }
            }
            if let Some(v) = self.views.get_mut(&view) {
                v.buffer = buffer;
            }
        }
        self.touch_buffer(buffer);
        self.buffer_opened_in_view(view);
        self.update_right_labels();
    }

    /// Close a buffer; refused for the last one
    ///
    /// A view showing the buffer switches to the most recent hidden buffer,
    /// or is closed when every other buffer is already on screen.
    pub fn close_buffer(&mut self, buffer: BufferId) -> bool {
        if self.buffers.len() < 2 || !self.buffers.contains_key(&buffer) {
            return false;
        }

        if let Some(view) = self.view_of(buffer) {
            let replacement = self
                .buffer_order
                .iter()
                .copied()
                .find(|b| *b != buffer && !self.is_buffer_visible(*b));
            match replacement {
                Some(other) => self.set_view_buffer(view, other),
                None => {
                    let Some(window) = self.views.get(&view).map(|v| v.window) else {
                        return false;
                    };
                    if !self.close_view(window, view) {
                        return false;
                    }
                }
            }
        }

        if let Some(closed) = self.buffers.remove(&buffer) {
            tracing::debug!("buffer {} closed ({})", buffer.0, closed.url);
            if !closed.url.is_empty() {
                self.closed_buffers.push(closed.url);
            }
        }
        self.buffer_order.retain(|b| *b != buffer);
        self.update_right_labels();
        true
    }

    /// Reopen the most recently closed buffer in the current view
    pub fn revive_buffer(&mut self, window: WindowId) -> Option<BufferId> {
        let view = self.current_view(window)?;
        let url = self.closed_buffers.pop()?;
        let buffer = self.create_buffer(&url);
        self.set_view_buffer(view, buffer);
        Some(buffer)
    }

    /// Switch a buffer to the mode named `name`
    pub fn set_buffer_mode(&mut self, buffer: BufferId, name: &str) -> anyhow::Result<()> {
        let mode = self
            .modes
            .get(name)
            .cloned()
            .with_context(|| format!("No such mode: {}", name))?;
        let old = self
            .buffers
            .get_mut(&buffer)
            .context("no such buffer")?
            .set_mode(mode);
        self.buffer_mode_changed(buffer, &old);
        self.update_right_labels();
        Ok(())
    }

    /// Page element full screen on or off
    pub fn set_fullscreen(&mut self, buffer: BufferId, enabled: bool) {
        let mode = if enabled {
            KeymapMode::Fullscreen
        } else {
            KeymapMode::Normal
        };
        self.set_keymap_mode(buffer, mode);
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Focus the next view of the window
    pub fn other_view(&mut self, window: WindowId) {
        let Some(next) = self.windows.get(&window).map(|w| w.next_view()) else {
            return;
        };
        if let Some(w) = self.windows.get_mut(&window) {
            w.set_current_view(next);
        }
        if matches!(self.focus, FocusTarget::View(_)) {
            self.set_focus(FocusTarget::View(next));
        }
    }

    /// Split the current view; the new view shows the next hidden buffer,
    /// or a new buffer on the current url
    pub fn split_view(&mut self, window: WindowId, direction: SplitDirection) -> Option<ViewId> {
        let current = self.current_buffer(window)?;
        let start = self
            .buffer_order
            .iter()
            .position(|b| *b == current)
            .map_or(0, |p| p + 1);
        let hidden = self.buffer_order[start..]
            .iter()
            .chain(self.buffer_order[..start].iter())
            .copied()
            .find(|b| !self.is_buffer_visible(*b));
        let buffer = match hidden {
            Some(buffer) => buffer,
            None => {
                let url = self
                    .buffers
                    .get(&current)
                    .map(|b| b.url.clone())
                    .unwrap_or_default();
                self.create_buffer(&url)
            }
        };

        let view = ViewId(self.alloc_id());
        self.views.insert(
            view,
            View {
                id: view,
                window,
                buffer,
                split: Some(direction),
            },
        );
        if let Some(w) = self.windows.get_mut(&window) {
            w.insert_view(view);
        }
        tracing::debug!("view {} split off ({:?})", view.0, direction);
        Some(view)
    }

    /// Close a view; the last view of a window stays
    pub fn close_view(&mut self, window: WindowId, view: ViewId) -> bool {
        let Some(w) = self.windows.get_mut(&window) else {
            return false;
        };
        if !w.remove_view(view) {
            return false;
        }
        let current = w.current_view();
        self.views.remove(&view);
        if self.focus == FocusTarget::View(view) {
            self.set_focus(FocusTarget::View(current));
        }
        true
    }

    /// Close every view but the current one
    pub fn maximise_view(&mut self, window: WindowId) {
        let Some(w) = self.windows.get(&window) else {
            return;
        };
        let current = w.current_view();
        let others: Vec<ViewId> = w.views().iter().copied().filter(|v| *v != current).collect();
        for view in others {
            self.close_view(window, view);
        }
    }

    // =========================================================================
    // Page calls
    // =========================================================================

    pub fn run_script(&mut self, buffer: BufferId, script: &str) {
        self.bridge.run_script(buffer, script);
    }

    pub fn find_text(&mut self, buffer: BufferId, text: &str, backward: bool) {
        self.bridge.find_text(buffer, text, backward);
    }

    pub fn trigger_action(&mut self, buffer: BufferId, action: PageAction) {
        self.bridge.trigger_action(buffer, action);
    }

    /// Post a press and a release of `key` to the page
    pub fn send_key_event(&mut self, buffer: BufferId, key: KeyPress, shift: bool) {
        for kind in [KeyEventKind::Press, KeyEventKind::Release] {
            let mut event = key.to_synthetic(kind);
            if shift {
                event = event.with_shift();
            }
            self.bridge.post_key_event(buffer, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeCall, RecordingBridge};

    fn app() -> (Application, RecordingBridge) {
        let bridge = RecordingBridge::new();
        let app = Application::with_defaults(Box::new(bridge.clone())).unwrap();
        (app, bridge)
    }

    #[test]
    fn test_close_last_buffer_is_refused() {
        let (mut app, _) = app();
        let buffer = app.current_buffer(app.current_window()).unwrap();
        assert!(!app.close_buffer(buffer));
        assert_eq!(app.buffer_count(), 1);
    }

    #[test]
    fn test_close_visible_buffer_shows_hidden_one() {
        let (mut app, _) = app();
        let window = app.current_window();
        let first = app.current_buffer(window).unwrap();
        let second = app.create_buffer("https://example.org/");
        let view = app.current_view(window).unwrap();
        app.set_view_buffer(view, second);

        assert!(app.close_buffer(second));
        assert_eq!(app.current_buffer(window), Some(first));
        assert_eq!(app.buffer_ids(), vec![first]);

        let revived = app.revive_buffer(window).unwrap();
        assert_eq!(app.buffer(revived).unwrap().url, "https://example.org/");
        assert_eq!(app.current_buffer(window), Some(revived));
    }

    #[test]
    fn test_buffer_rows_most_recent_first() {
        let (mut app, _) = app();
        let window = app.current_window();
        let first = app.current_buffer(window).unwrap();
        let second = app.create_buffer("https://b.org/");
        let rows = app.buffer_rows();
        assert_eq!(rows[0].id, first);
        assert!(rows[0].visible);
        assert_eq!(rows[1].id, second);
        assert!(!rows[1].visible);
    }

    #[test]
    fn test_split_and_close_view() {
        let (mut app, _) = app();
        let window = app.current_window();
        let first = app.current_buffer(window).unwrap();
        let view = app.split_view(window, SplitDirection::Right).unwrap();
        // no hidden buffer: a new one on the same url
        let shown = app.view(view).unwrap().buffer;
        assert_ne!(shown, first);
        assert_eq!(app.buffer(shown).unwrap().url, BLANK_URL);
        assert_eq!(app.window(window).unwrap().views().len(), 2);

        app.other_view(window);
        assert_eq!(app.current_view(window), Some(view));
        assert!(app.close_view(window, view));
        assert_eq!(app.focus(), FocusTarget::View(app.current_view(window).unwrap()));
        assert!(!app.close_view(window, app.current_view(window).unwrap()));
    }

    #[test]
    fn test_send_key_event_press_and_release() {
        let (mut app, bridge) = app();
        let buffer = app.current_buffer(app.current_window()).unwrap();
        bridge.clear();
        app.send_key_event(buffer, "Right".parse().unwrap(), true);
        let calls = bridge.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            BridgeCall::KeyEvent { event, .. } => {
                assert_eq!(event.kind, KeyEventKind::Press);
                assert!(event.shift);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }
}
