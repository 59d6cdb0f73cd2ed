//! Keyboard handler: chord accumulation and dispatch
//!
//! Every key event goes through [`Application::key_press`] first. The
//! handler appends the chord to the pending sequence and looks the sequence
//! up in the active keymaps: the local keymap (set by focus changes, see
//! `local_keymap`) then the global keymap, unless a prompt disabled it.
//!
//! # Architecture
//!
//! ```text
//! KeyPress → KeyboardHandler::handle_keystroke() → KeyAction
//!              │                                     │
//!              │  C-u / digits: prefix argument      ├─ Execute   → command
//!              │                                     ├─ AwaitMore → "C-x -"
//!              └─ pending: Vec<KeyPress>             └─ NoMatch   → native key
//! ```
//!
//! The first keymap giving a partial or complete match decides; at most one
//! command runs per chord. `pending` is cleared after every command call,
//! whether it failed or not.

use crate::app::Application;
use crate::commands::{CommandContext, PrefixArg};
use crate::keymap::{
    format_key_sequence, parse_key_sequence, Binding, KeyCode, KeyParseError, KeyPress, KeymapId,
    Keymaps, LookupResult, Modifiers,
};
use crate::minibuffer::NativeKey;
use crate::model::{FocusTarget, WindowId};

/// What the handler decided for one chord
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// Run this binding; `sequence` is the full chord sequence
    Execute { binding: Binding, sequence: String },
    /// The sequence is a prefix, await more input
    AwaitMore { sequence: String },
    /// Eaten by the universal argument
    PrefixArg,
    /// Nothing bound; `undefined` is set for failed multi-chord sequences
    NoMatch { undefined: Option<String> },
}

impl KeyAction {
    /// True when the key must not reach the focused widget
    pub fn consumes(&self) -> bool {
        !matches!(self, KeyAction::NoMatch { .. })
    }
}

const UNIVERSAL_KEY: KeyPress = KeyPress::new(KeyCode::Char('u'), Modifiers::CTRL);

/// Chord state shared by all windows
#[derive(Debug, Clone)]
pub struct KeyboardHandler {
    pending: Vec<KeyPress>,
    local: Option<KeymapId>,
    use_global: bool,
    prefix_arg: Option<PrefixArg>,
    reset_prefix_arg: bool,
    describe_next: bool,
}

impl Default for KeyboardHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHandler {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            local: None,
            use_global: true,
            prefix_arg: None,
            reset_prefix_arg: false,
            describe_next: false,
        }
    }

    pub fn pending(&self) -> &[KeyPress] {
        &self.pending
    }

    pub fn local_keymap(&self) -> Option<KeymapId> {
        self.local
    }

    /// Returns whether the local keymap changed
    pub(crate) fn set_local_keymap(&mut self, keymap: Option<KeymapId>) -> bool {
        if self.local == keymap {
            return false;
        }
        self.local = keymap;
        true
    }

    pub fn global_keymap_enabled(&self) -> bool {
        self.use_global
    }

    pub fn set_global_keymap_enabled(&mut self, enabled: bool) {
        self.use_global = enabled;
    }

    /// Argument collected with `C-u` for the next command
    pub fn prefix_arg(&self) -> Option<PrefixArg> {
        self.prefix_arg
    }

    /// Report the next complete sequence instead of running it
    pub fn describe_next_sequence(&mut self) {
        self.describe_next = true;
    }

    pub fn is_describing(&self) -> bool {
        self.describe_next
    }

    fn take_describe(&mut self) -> bool {
        std::mem::take(&mut self.describe_next)
    }

    /// Keymaps consulted, in order
    pub fn active_keymaps(&self, global: KeymapId) -> Vec<KeymapId> {
        self.local
            .into_iter()
            .chain(self.use_global.then_some(global))
            .collect()
    }

    /// Clear the pending sequence
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Pending sequence for the info line
    pub fn pending_display(&self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(format_key_sequence(&self.pending))
        }
    }

    fn update_numeric_arg(&mut self, digit: u32) {
        self.prefix_arg = Some(match self.prefix_arg {
            Some(PrefixArg::Number(n)) => PrefixArg::Number(n.saturating_mul(10).saturating_add(digit)),
            _ => PrefixArg::Number(digit),
        });
    }

    /// Decide what `keystroke` does given the keymaps
    pub fn handle_keystroke(
        &mut self,
        keymaps: &Keymaps,
        global: KeymapId,
        keystroke: KeyPress,
    ) -> KeyAction {
        if std::mem::take(&mut self.reset_prefix_arg) {
            self.prefix_arg = None;
        }

        if keystroke == UNIVERSAL_KEY {
            self.prefix_arg = Some(match self.prefix_arg {
                Some(PrefixArg::Universal(n)) => PrefixArg::Universal(n.saturating_mul(4)),
                _ => {
                    self.pending.clear();
                    PrefixArg::Universal(4)
                }
            });
            return KeyAction::PrefixArg;
        }

        if self.prefix_arg.is_some() && !keystroke.has_any_modifier() {
            if let Some(digit) = keystroke.key.as_char().and_then(|c| c.to_digit(10)) {
                self.update_numeric_arg(digit);
                return KeyAction::PrefixArg;
            }
        }

        self.pending.push(keystroke);
        tracing::debug!("keychord: {}", format_key_sequence(&self.pending));

        let result = self
            .active_keymaps(global)
            .into_iter()
            .map(|id| keymaps.lookup(id, &self.pending))
            .find(LookupResult::is_match)
            .unwrap_or(LookupResult::NoMatch);

        let sequence = format_key_sequence(&self.pending);
        match result {
            LookupResult::NoMatch => {
                let undefined = (self.pending.len() > 1).then_some(sequence);
                self.pending.clear();
                KeyAction::NoMatch { undefined }
            }
            LookupResult::Partial => KeyAction::AwaitMore { sequence },
            LookupResult::Complete(binding) => {
                self.pending.clear();
                self.reset_prefix_arg = true;
                KeyAction::Execute { binding, sequence }
            }
        }
    }
}

// ============================================================================
// Dispatch on the application
// ============================================================================

impl Application {
    /// Deliver a key event: keymaps first, then the focused widget
    ///
    /// Returns whether anything handled the key.
    pub fn key_press(&mut self, key: KeyPress) -> bool {
        let consumed = self.handle_keypress(key) || self.handle_native_key(key);
        let window = self.current_window;
        self.sync_minibuffer(window);
        consumed
    }

    /// Replay a chord sequence such as `"C-x C-f"`
    pub fn key_sequence(&mut self, sequence: &str) -> Result<(), KeyParseError> {
        for key in parse_key_sequence(sequence)? {
            self.key_press(key);
        }
        Ok(())
    }

    /// Type literal text into the focused widget, one chord per character
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            match KeyPress::char(c) {
                Some(key) => {
                    self.key_press(key);
                }
                None => tracing::warn!("No key for character {:?}", c),
            }
        }
    }

    /// Run one chord through the keymaps; true when it was consumed
    pub fn handle_keypress(&mut self, key: KeyPress) -> bool {
        let window = self.current_window;
        let action = self
            .keyboard
            .handle_keystroke(&self.keymaps, self.builtin.global, key);
        let consumed = action.consumes();

        match action {
            KeyAction::PrefixArg => {}
            KeyAction::AwaitMore { sequence } => {
                self.show_info(format!("{} -", sequence));
            }
            KeyAction::NoMatch { undefined } => {
                if self.keyboard.take_describe() {
                    let sequence = undefined.unwrap_or_else(|| key.to_string());
                    self.show_info(format!("{} is undefined.", sequence));
                    return true;
                }
                if let Some(sequence) = undefined {
                    self.show_info(format!("{} is undefined.", sequence));
                }
            }
            KeyAction::Execute { binding, sequence } => {
                if self.keyboard.take_describe() {
                    self.show_info(format!("{} runs the command {}", sequence, binding.describe()));
                    return true;
                }
                self.show_info(sequence);
                let prefix_arg = self.keyboard.prefix_arg();
                if let Err(e) = self.call_binding(window, &binding, Some(key), prefix_arg) {
                    tracing::error!("Error calling command: {:#}", e);
                }
            }
        }
        consumed
    }

    /// Default handling of a key no keymap wanted
    fn handle_native_key(&mut self, key: KeyPress) -> bool {
        match self.focus {
            FocusTarget::MinibufferInput(window) => {
                if self.prompt_handle_key(window, &key) {
                    return true;
                }
                let Some(minibuffer) = self.minibuffer_mut(window) else {
                    return false;
                };
                match minibuffer.input.handle_native_key(&key) {
                    NativeKey::Ignored => false,
                    NativeKey::Handled => true,
                    NativeKey::Submit => {
                        self.submit_prompt(window);
                        true
                    }
                }
            }
            FocusTarget::View(view) => {
                let Some(buffer) = self.view(view).map(|v| v.buffer) else {
                    return false;
                };
                self.send_key_event(buffer, key, false);
                true
            }
        }
    }

    /// Call a resolved binding with a fresh context
    pub(crate) fn call_binding(
        &mut self,
        window: WindowId,
        binding: &Binding,
        keypress: Option<KeyPress>,
        prefix_arg: Option<PrefixArg>,
    ) -> anyhow::Result<()> {
        let mut ctx = CommandContext::new(self, window)
            .with_keypress(keypress)
            .with_prefix_arg(prefix_arg);
        match binding {
            Binding::Command(name) => {
                let command = ctx.app.commands.require(name)?.clone();
                command.call(&mut ctx)
            }
            Binding::Action(f) => f(&mut ctx),
        }
    }

    /// Run a command by name in the current window
    pub fn call_command(&mut self, name: &str) -> anyhow::Result<()> {
        let window = self.current_window;
        let prefix_arg = self.keyboard.prefix_arg();
        self.call_binding(window, &Binding::from(name), None, prefix_arg)
    }

    pub fn local_keymap(&self) -> Option<KeymapId> {
        self.keyboard.local_keymap()
    }

    /// Change the local keymap; hooks only fire on an actual change
    pub fn set_local_keymap(&mut self, keymap: Option<KeymapId>) {
        if !self.keyboard.set_local_keymap(keymap) {
            return;
        }
        tracing::debug!(
            "local keymap activated: {}",
            keymap.map_or("none", |id| self.keymaps.name(id))
        );
        self.hooks.local_mode_changed.fire(&keymap);
        self.update_right_labels();
    }

    pub fn set_global_keymap_enabled(&mut self, enabled: bool) {
        self.keyboard.set_global_keymap_enabled(enabled);
    }

    pub fn current_prefix_arg(&self) -> Option<PrefixArg> {
        self.keyboard.prefix_arg()
    }

    /// Sequences reaching `command` from the active keymaps
    pub fn where_is(&self, command: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for keymap in self.keyboard.active_keymaps(self.builtin.global) {
            for sequence in self.keymaps.where_is(keymap, command) {
                if !found.contains(&sequence) {
                    found.push(sequence);
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Keymap;

    fn kp(s: &str) -> KeyPress {
        s.parse().unwrap()
    }

    fn setup() -> (Keymaps, KeymapId, KeymapId) {
        let mut keymaps = Keymaps::new();
        let global = keymaps.register(Keymap::new("global")).unwrap();
        let local = keymaps.register(Keymap::new("local")).unwrap();
        keymaps.define_key("global", "C-x C-c", "quit").unwrap();
        keymaps.define_key("global", "C-x b", "switch-buffer").unwrap();
        keymaps.define_key("global", "M-x", "M-x").unwrap();
        keymaps.define_key("local", "g", "go-to").unwrap();
        keymaps.define_key("local", "C-x b", "local-switch").unwrap();
        (keymaps, global, local)
    }

    #[test]
    fn test_multi_chord_sequence() {
        let (keymaps, global, _) = setup();
        let mut handler = KeyboardHandler::new();

        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("C-x")),
            KeyAction::AwaitMore {
                sequence: "C-x".to_string()
            }
        );
        assert_eq!(handler.pending(), &[kp("C-x")]);
        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("C-c")),
            KeyAction::Execute {
                binding: Binding::from("quit"),
                sequence: "C-x C-c".to_string()
            }
        );
        assert!(handler.pending().is_empty());

        // C-c alone is not bound
        let action = handler.handle_keystroke(&keymaps, global, kp("C-c"));
        assert_eq!(action, KeyAction::NoMatch { undefined: None });
        assert!(!action.consumes());
    }

    #[test]
    fn test_failed_sequence_reports_undefined() {
        let (keymaps, global, _) = setup();
        let mut handler = KeyboardHandler::new();
        handler.handle_keystroke(&keymaps, global, kp("C-x"));
        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("z")),
            KeyAction::NoMatch {
                undefined: Some("C-x z".to_string())
            }
        );
        assert!(handler.pending().is_empty());
    }

    #[test]
    fn test_local_keymap_shadows_global() {
        let (keymaps, global, local) = setup();
        let mut handler = KeyboardHandler::new();
        assert!(handler.set_local_keymap(Some(local)));
        assert!(!handler.set_local_keymap(Some(local)));

        handler.handle_keystroke(&keymaps, global, kp("C-x"));
        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("b")),
            KeyAction::Execute {
                binding: Binding::from("local-switch"),
                sequence: "C-x b".to_string()
            }
        );
        // falls through to the global keymap
        assert!(matches!(
            handler.handle_keystroke(&keymaps, global, kp("M-x")),
            KeyAction::Execute { .. }
        ));
    }

    #[test]
    fn test_disabled_global_keymap() {
        let (keymaps, global, local) = setup();
        let mut handler = KeyboardHandler::new();
        handler.set_local_keymap(Some(local));
        handler.set_global_keymap_enabled(false);
        assert_eq!(handler.active_keymaps(global), vec![local]);
        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("M-x")),
            KeyAction::NoMatch { undefined: None }
        );
    }

    #[test]
    fn test_universal_argument() {
        let (keymaps, global, local) = setup();
        let mut handler = KeyboardHandler::new();
        handler.set_local_keymap(Some(local));

        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("C-u")),
            KeyAction::PrefixArg
        );
        assert_eq!(handler.prefix_arg(), Some(PrefixArg::Universal(4)));
        handler.handle_keystroke(&keymaps, global, kp("C-u"));
        assert_eq!(handler.prefix_arg(), Some(PrefixArg::Universal(16)));

        assert!(matches!(
            handler.handle_keystroke(&keymaps, global, kp("g")),
            KeyAction::Execute { .. }
        ));
        // still visible to the command, reset by the next key
        assert_eq!(handler.prefix_arg(), Some(PrefixArg::Universal(16)));
        handler.handle_keystroke(&keymaps, global, kp("z"));
        assert_eq!(handler.prefix_arg(), None);
    }

    #[test]
    fn test_numeric_argument_digits_not_pending() {
        let (keymaps, global, _) = setup();
        let mut handler = KeyboardHandler::new();
        handler.handle_keystroke(&keymaps, global, kp("C-u"));
        assert_eq!(
            handler.handle_keystroke(&keymaps, global, kp("1")),
            KeyAction::PrefixArg
        );
        handler.handle_keystroke(&keymaps, global, kp("2"));
        assert_eq!(handler.prefix_arg(), Some(PrefixArg::Number(12)));
        assert!(handler.pending().is_empty());
    }

    #[test]
    fn test_universal_key_clears_pending() {
        let (keymaps, global, _) = setup();
        let mut handler = KeyboardHandler::new();
        handler.handle_keystroke(&keymaps, global, kp("C-x"));
        handler.handle_keystroke(&keymaps, global, kp("C-u"));
        assert!(handler.pending().is_empty());
    }
}
