//! Application: the single owner of all dispatch state
//!
//! Windows, views and buffers live in id-keyed arenas; the keymaps, command
//! registry, variables and keyboard handler are sub-resources handed to
//! commands through [`crate::commands::CommandContext`].
//!
//! # Architecture
//!
//! ```text
//! Application
//! ├── keymaps / builtin        Keymaps registry and the ids the core uses
//! ├── commands                 CommandRegistry
//! ├── keyboard                 KeyboardHandler (pending chord, local keymap)
//! ├── variables / webjumps / modes / histories / clipboard / hooks
//! ├── windows  ─┬─ Window ── Minibuffer ── ActivePrompt
//! ├── views    ─┘    ids
//! ├── buffers                  Buffer (mode, keymap mode, url)
//! └── bridge                   PageBridge to the rendering side
//! ```
//!
//! Behaviour is spread over several files: buffer and view management in
//! `buffers`, prompt sessions in `prompt`, page messages in `page`, key
//! dispatch in `crate::keyboard` and focus-driven keymap selection in
//! `crate::local_keymap`.

mod buffers;
mod page;
mod prompt;

use std::collections::{BTreeMap, HashMap};

use crate::bridge::PageBridge;
use crate::clipboard::Clipboard;
use crate::commands::CommandRegistry;
use crate::hooks::AppHooks;
use crate::keyboard::KeyboardHandler;
use crate::keymap::{default_keymaps, BuiltinKeymaps, KeymapError, Keymaps};
use crate::minibuffer::{Minibuffer, PromptHistories, DEFAULT_HISTORY_SIZE};
use crate::model::{Buffer, BufferId, FocusTarget, Modes, View, ViewId, Window, WindowId};
use crate::variables::{
    Value, VariableError, Variables, HOME_PAGE, MINIBUFFER_HEIGHT, MINIBUFFER_RIGHT_LABEL,
    PROMPT_HISTORY_SIZE,
};
use crate::webjump::WebJumps;

pub use buffers::BLANK_URL;

/// The complete dispatch state
pub struct Application {
    pub keymaps: Keymaps,
    pub builtin: BuiltinKeymaps,
    pub commands: CommandRegistry,
    pub variables: Variables,
    pub modes: Modes,
    pub webjumps: WebJumps,
    pub keyboard: KeyboardHandler,
    pub histories: PromptHistories,
    pub clipboard: Clipboard,
    pub hooks: AppHooks,
    pub(crate) buffers: BTreeMap<BufferId, Buffer>,
    pub(crate) views: HashMap<ViewId, View>,
    pub(crate) windows: BTreeMap<WindowId, Window>,
    /// Buffers, most recently shown first
    pub(crate) buffer_order: Vec<BufferId>,
    /// Urls of closed buffers, most recent last
    pub(crate) closed_buffers: Vec<String>,
    pub(crate) current_window: WindowId,
    pub(crate) focus: FocusTarget,
    pub(crate) bridge: Box<dyn PageBridge>,
    next_id: u64,
    quit_requested: bool,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("windows", &self.windows.len())
            .field("buffers", &self.buffers.len())
            .field("current_window", &self.current_window)
            .field("focus", &self.focus)
            .field("keyboard", &self.keyboard)
            .finish()
    }
}

impl Application {
    /// Build the application and open its first window on the home page
    pub fn new(
        keymaps: Keymaps,
        builtin: BuiltinKeymaps,
        variables: Variables,
        bridge: Box<dyn PageBridge>,
    ) -> Self {
        let history_size = variables
            .get_int(PROMPT_HISTORY_SIZE)
            .map_or(DEFAULT_HISTORY_SIZE, |n| n as usize);
        let mut app = Self {
            modes: Modes::with_builtins(&builtin),
            keymaps,
            builtin,
            commands: CommandRegistry::with_builtins(),
            variables,
            webjumps: WebJumps::with_defaults(),
            keyboard: KeyboardHandler::new(),
            histories: PromptHistories::new(history_size),
            clipboard: Clipboard::in_memory(),
            hooks: AppHooks::default(),
            buffers: BTreeMap::new(),
            views: HashMap::new(),
            windows: BTreeMap::new(),
            buffer_order: Vec::new(),
            closed_buffers: Vec::new(),
            // both replaced by open_window below
            current_window: WindowId(0),
            focus: FocusTarget::View(ViewId(0)),
            bridge,
            next_id: 0,
            quit_requested: false,
        };

        let home = app.variables.get_str(HOME_PAGE).to_string();
        app.open_window(&home);
        app
    }

    /// Embedded keymaps and built-in variables
    pub fn with_defaults(bridge: Box<dyn PageBridge>) -> Result<Self, KeymapError> {
        let (keymaps, builtin) = default_keymaps()?;
        Ok(Self::new(keymaps, builtin, Variables::with_builtins(), bridge))
    }

    pub(crate) fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // =========================================================================
    // Windows and focus
    // =========================================================================

    /// Open a window with one view on a new buffer for `url`
    pub fn open_window(&mut self, url: &str) -> WindowId {
        let window = WindowId(self.alloc_id());
        let buffer = self.create_buffer(if url.is_empty() { BLANK_URL } else { url });
        let view = ViewId(self.alloc_id());
        self.views.insert(
            view,
            View {
                id: view,
                window,
                buffer,
                split: None,
            },
        );
        let height = self.variables.get_int(MINIBUFFER_HEIGHT).unwrap_or(25);
        let minibuffer = Minibuffer::new(self.builtin.minibuffer, height);
        self.windows
            .insert(window, Window::new(window, view, minibuffer));
        self.touch_buffer(buffer);

        tracing::debug!("window {} opened", window.0);
        self.current_window = window;
        self.focus = FocusTarget::View(view);
        self.view_focus_changed(view);
        self.update_right_labels();
        window
    }

    pub fn current_window(&self) -> WindowId {
        self.current_window
    }

    pub fn window(&self, window: WindowId) -> Option<&Window> {
        self.windows.get(&window)
    }

    pub fn window_mut(&mut self, window: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&window)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn minibuffer(&self, window: WindowId) -> Option<&Minibuffer> {
        self.windows.get(&window).map(|w| &w.minibuffer)
    }

    pub fn minibuffer_mut(&mut self, window: WindowId) -> Option<&mut Minibuffer> {
        self.windows.get_mut(&window).map(|w| &mut w.minibuffer)
    }

    /// Minibuffer of the current window
    pub fn current_minibuffer(&self) -> Option<&Minibuffer> {
        self.minibuffer(self.current_window)
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    /// Move keyboard focus, notifying the widget losing it first
    pub fn set_focus(&mut self, target: FocusTarget) {
        if self.focus == target {
            return;
        }
        let old = std::mem::replace(&mut self.focus, target);
        tracing::debug!("focus: {:?} -> {:?}", old, target);

        if let FocusTarget::MinibufferInput(window) = old {
            self.minibuffer_input_focus_changed(window, false);
        }
        match target {
            FocusTarget::View(view) => {
                if let Some(window) = self.views.get(&view).map(|v| v.window) {
                    if let Some(w) = self.windows.get_mut(&window) {
                        w.set_current_view(view);
                    }
                    self.current_window = window;
                }
                self.view_focus_changed(view);
            }
            FocusTarget::MinibufferInput(window) => {
                self.current_window = window;
                self.minibuffer_input_focus_changed(window, true);
            }
        }
    }

    /// Show `text` on the info line of the current window
    pub fn show_info(&mut self, text: impl Into<String>) {
        let window = self.current_window;
        if let Some(minibuffer) = self.minibuffer_mut(window) {
            minibuffer.show_info(text);
        }
    }

    /// Refresh the right label of every minibuffer
    pub fn update_right_labels(&mut self) {
        let format = self.variables.get_str(MINIBUFFER_RIGHT_LABEL).to_string();
        let buffer_count = self.buffers.len();
        let local = self
            .keyboard
            .local_keymap()
            .map(|id| self.keymaps.name(id).to_string())
            .unwrap_or_default();

        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for window in ids {
            let mode = self
                .current_buffer(window)
                .and_then(|b| self.buffers.get(&b))
                .map(|b| b.mode().name.clone())
                .unwrap_or_default();
            if let Some(minibuffer) = self.minibuffer_mut(window) {
                minibuffer.update_right_label(&format, buffer_count, &local, &mode);
            }
        }
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Set a variable and apply what depends on it
    pub fn set_variable(&mut self, name: &str, value: Value) -> Result<(), VariableError> {
        if !self.variables.set(name, value)? {
            return Ok(());
        }
        match name {
            PROMPT_HISTORY_SIZE => {
                if let Some(size) = self.variables.get_int(name) {
                    self.histories.set_max_size(size as usize);
                }
            }
            MINIBUFFER_HEIGHT => {
                if let Some(height) = self.variables.get_int(name) {
                    for window in self.windows.values_mut() {
                        window.minibuffer.set_height(height);
                    }
                }
            }
            MINIBUFFER_RIGHT_LABEL => self.update_right_labels(),
            _ => {}
        }
        self.hooks.variable_changed.fire(&name.to_string());
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn request_quit(&mut self) {
        tracing::info!("Quit requested");
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Replace the page bridge
    pub fn set_bridge(&mut self, bridge: Box<dyn PageBridge>) {
        self.bridge = bridge;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;

    fn app() -> Application {
        Application::with_defaults(Box::new(RecordingBridge::new())).unwrap()
    }

    #[test]
    fn test_first_window_shows_home_page() {
        let app = app();
        let window = app.current_window();
        let buffer = app.current_buffer(window).unwrap();
        assert_eq!(app.buffer(buffer).unwrap().url, BLANK_URL);
        assert_eq!(app.local_keymap(), Some(app.builtin.webbuffer));
        assert_eq!(
            app.minibuffer(window).unwrap().right_label(),
            "standard-mode: webbuffer [1]"
        );
    }

    #[test]
    fn test_set_variable_side_effects() {
        let mut app = app();
        let window = app.current_window();
        app.set_variable(MINIBUFFER_RIGHT_LABEL, Value::from("[{buffer_count}]"))
            .unwrap();
        assert_eq!(app.minibuffer(window).unwrap().right_label(), "[1]");

        app.set_variable(MINIBUFFER_HEIGHT, Value::Int(40)).unwrap();
        assert_eq!(app.minibuffer(window).unwrap().height(), 40);

        assert!(app.set_variable(MINIBUFFER_HEIGHT, Value::Int(0)).is_err());
        assert_eq!(app.minibuffer(window).unwrap().height(), 40);
    }

    #[test]
    fn test_request_quit() {
        let mut app = app();
        assert!(!app.quit_requested());
        app.call_command("quit").unwrap();
        assert!(app.quit_requested());
    }
}
