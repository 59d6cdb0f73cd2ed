//! The prompt interface and the plain text prompt
//!
//! A prompt parameterises one minibuffer session: label, completion
//! options, model, keymap and history. The application drives the session
//! and calls back into the prompt through [`PromptEnv`], which lends it the
//! minibuffer widgets and the page bridge for the duration of the call.

use std::any::Any;

use super::completion::{CompleteOptions, CompletionSource};
use super::input::{EchoMode, MinibufferInput};
use crate::bridge::{BridgeMessage, PageBridge};
use crate::keymap::{BuiltinKeymaps, KeyPress, KeymapId};
use crate::model::BufferId;

/// What a prompt wants after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Continue,
    /// Validate the prompt with its current value
    Finish,
    /// Close without a value
    Abort,
}

/// Value produced by a validated prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    Text(String),
    Bool(bool),
    /// A page object, such as the hint chosen by a follow prompt
    Object(serde_json::Value),
}

impl PromptValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PromptValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PromptValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// Minibuffer state lent to a prompt callback
pub struct PromptEnv<'a> {
    pub label: &'a mut String,
    pub input: &'a mut MinibufferInput,
    pub bridge: &'a mut dyn PageBridge,
    /// Buffer of the window's current view
    pub buffer: BufferId,
    /// Activation counter of this session
    pub generation: u64,
}

impl PromptEnv<'_> {
    pub fn run_script(&mut self, script: &str) {
        self.bridge.run_script(self.buffer, script);
    }

    /// Run `script` and have its value sent back to this session
    pub fn eval_script(&mut self, request: u64, script: &str) {
        self.bridge
            .eval_script(self.buffer, script, request, self.generation);
    }

    pub fn find_text(&mut self, text: &str, backward: bool) {
        self.bridge.find_text(self.buffer, text, backward);
    }
}

/// Result handed to the command that opened a prompt
pub struct PromptOutcome {
    pub value: PromptValue,
    /// Source row of the last activated completion
    pub index: Option<usize>,
    pub prompt: Box<dyn Prompt>,
}

impl PromptOutcome {
    pub fn text(&self) -> &str {
        self.value.as_text().unwrap_or_default()
    }

    /// The prompt as its concrete type
    pub fn prompt_as<T: Prompt + 'static>(&self) -> Option<&T> {
        self.prompt.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for PromptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptOutcome")
            .field("value", &self.value)
            .field("index", &self.index)
            .finish()
    }
}

/// Upcast helper so prompts can be recovered from `dyn Prompt`
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A minibuffer session
///
/// Every method but [`Prompt::label`] has a default, so a prompt only
/// overrides what it customises.
pub trait Prompt: AsAny {
    fn label(&self) -> String;

    fn complete_options(&self) -> CompleteOptions {
        CompleteOptions::default()
    }

    /// Keymap overlaying the minibuffer keymap
    fn keymap(&self, _builtin: &BuiltinKeymaps) -> Option<KeymapId> {
        None
    }

    /// Name of the history this prompt records into
    fn history(&self) -> Option<&str> {
        None
    }

    /// Turn the global keymap off for the session
    fn disables_global_keymap(&self) -> bool {
        false
    }

    fn completer_model(&mut self) -> Option<Box<dyn CompletionSource>> {
        None
    }

    /// Called once the input is reset, shown and focused
    fn enable(&mut self, _env: &mut PromptEnv<'_>) {}

    /// The user edited the input text
    fn text_edited(&mut self, _env: &mut PromptEnv<'_>) -> PromptAction {
        PromptAction::Continue
    }

    /// A key no keymap handled; return true to keep it from the input
    fn handle_key(&mut self, _env: &mut PromptEnv<'_>, _key: &KeyPress) -> bool {
        false
    }

    /// A completion was written into the input; `index` is its source row
    fn completion_activated(&mut self, _env: &mut PromptEnv<'_>, _index: usize) {}

    /// A page message for the buffer this prompt belongs to
    fn page_message(&mut self, _env: &mut PromptEnv<'_>, _message: &BridgeMessage) -> PromptAction {
        PromptAction::Continue
    }

    /// Checked on Return; an error keeps the prompt open
    fn validate(&self, _text: &str) -> Result<(), String> {
        Ok(())
    }

    fn value(&self, input: &MinibufferInput) -> PromptValue {
        PromptValue::Text(input.text().to_string())
    }

    /// Release what the prompt set up in the page
    fn close(&mut self, _env: &mut PromptEnv<'_>) {}
}

impl dyn Prompt {
    pub fn downcast_ref<T: Prompt + 'static>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Prompt + 'static>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut::<T>()
    }
}

// ============================================================================
// Free text prompt
// ============================================================================

/// Prompt for arbitrary text, optionally masked
#[derive(Debug, Clone, Default)]
pub struct TextPrompt {
    label: String,
    initial: String,
    history: Option<String>,
    password: bool,
}

impl TextPrompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn password(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            password: true,
            ..Self::default()
        }
    }

    /// Start with `text` in the input, fully selected
    pub fn with_initial_text(mut self, text: impl Into<String>) -> Self {
        self.initial = text.into();
        self
    }

    pub fn with_history(mut self, name: impl Into<String>) -> Self {
        self.history = Some(name.into());
        self
    }
}

impl Prompt for TextPrompt {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn history(&self) -> Option<&str> {
        // passwords never go to history
        if self.password {
            None
        } else {
            self.history.as_deref()
        }
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        if self.password {
            env.input.set_echo_mode(EchoMode::Password);
        }
        if !self.initial.is_empty() {
            let len = self.initial.chars().count();
            env.input.set_text(self.initial.clone());
            env.input.set_selection(0, len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_prompt() {
        let mut prompt: Box<dyn Prompt> = Box::new(TextPrompt::new("name: "));
        assert!(prompt.downcast_ref::<TextPrompt>().is_some());
        assert!(prompt.downcast_mut::<TextPrompt>().is_some());
        assert_eq!(prompt.label(), "name: ");
    }

    #[test]
    fn test_password_prompt_has_no_history() {
        let prompt = TextPrompt::password("password: ").with_history("secrets");
        assert_eq!(prompt.history(), None);
        let prompt = TextPrompt::new("name: ").with_history("names");
        assert_eq!(prompt.history(), Some("names"));
    }
}
