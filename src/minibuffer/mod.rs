//! Minibuffer: the one-line prompt area at the bottom of a window
//!
//! # Architecture
//!
//! ```text
//! Minibuffer
//! ├── label / right label      info line, prompt label, "[N]" buffer count
//! ├── MinibufferInput          line editor + completion popup
//! │   ├── LineEdit             cursor, mark selection, undo/redo
//! │   └── CompletionPopup      filter over a CompletionSource
//! └── ActivePrompt             the prompt session, if any
//! ```
//!
//! Sessions are started and closed by the application (see `app::prompt`),
//! which owns focus and the keymap state they depend on.

pub mod completion;
pub mod history;
pub mod input;
pub mod line_edit;
pub mod prompt;

pub use completion::{
    CompleteOptions, CompletionPopup, CompletionSource, FileSystemModel, MatchMode, TableModel,
};
pub use history::{PromptHistories, PromptHistory, DEFAULT_HISTORY_SIZE};
pub use input::{EchoMode, InputValidator, MinibufferInput, NativeKey};
pub use line_edit::LineEdit;
pub use prompt::{
    AsAny, Prompt, PromptAction, PromptEnv, PromptOutcome, PromptValue, TextPrompt,
};

use std::fmt;

use crate::app::Application;
use crate::keymap::KeymapId;

/// Called with the outcome of a validated prompt
pub type Continuation = Box<dyn FnOnce(&mut Application, PromptOutcome) -> anyhow::Result<()>>;

/// Called when a prompt is closed without a value
pub type AbortHandler = Box<dyn FnOnce(&mut Application)>;

/// A prompt attached to a minibuffer
pub struct ActivePrompt {
    pub prompt: Box<dyn Prompt>,
    pub generation: u64,
    pub on_finished: Option<Continuation>,
    pub on_aborted: Option<AbortHandler>,
}

impl fmt::Debug for ActivePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivePrompt")
            .field("label", &self.prompt.label())
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Debug)]
pub struct Minibuffer {
    pub label: String,
    rlabel: String,
    pub input: MinibufferInput,
    pub(crate) prompt: Option<ActivePrompt>,
    generation: u64,
    height: i64,
}

impl Minibuffer {
    /// `keymap` is the base keymap of the input
    pub fn new(keymap: KeymapId, height: i64) -> Self {
        Self {
            label: String::new(),
            rlabel: "[0]".to_string(),
            input: MinibufferInput::new(keymap),
            prompt: None,
            generation: 0,
            height,
        }
    }

    /// Show `text` on the info line, unless a prompt is being typed in
    pub fn show_info(&mut self, text: impl Into<String>) {
        if !self.input.is_visible() {
            self.label = text.into();
        }
    }

    pub fn right_label(&self) -> &str {
        &self.rlabel
    }

    /// Render the right label from its format
    ///
    /// `{buffer_count}`, `{local_keymap}` and `{mode}` are substituted.
    pub fn update_right_label(
        &mut self,
        format: &str,
        buffer_count: usize,
        local_keymap: &str,
        mode: &str,
    ) {
        self.rlabel = format
            .replace("{buffer_count}", &buffer_count.to_string())
            .replace("{local_keymap}", local_keymap)
            .replace("{mode}", mode);
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn set_height(&mut self, height: i64) {
        self.height = height;
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn prompt(&self) -> Option<&(dyn Prompt + 'static)> {
        self.prompt.as_ref().map(|active| active.prompt.as_ref())
    }

    pub fn prompt_mut(&mut self) -> Option<&mut (dyn Prompt + 'static)> {
        match self.prompt.as_mut() {
            Some(active) => Some(active.prompt.as_mut()),
            None => None,
        }
    }

    /// Generation of the active session, if any
    pub fn prompt_generation(&self) -> Option<u64> {
        self.prompt.as_ref().map(|active| active.generation)
    }

    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minibuffer() -> Minibuffer {
        let (_, builtin) = crate::keymap::default_keymaps().unwrap();
        Minibuffer::new(builtin.minibuffer, 25)
    }

    #[test]
    fn test_show_info_only_while_input_hidden() {
        let mut mb = minibuffer();
        mb.show_info("C-x -");
        assert_eq!(mb.label, "C-x -");
        mb.input.show();
        mb.show_info("ignored");
        assert_eq!(mb.label, "C-x -");
    }

    #[test]
    fn test_right_label_format() {
        let mut mb = minibuffer();
        assert_eq!(mb.right_label(), "[0]");
        mb.update_right_label(
            "{mode}: {local_keymap} [{buffer_count}]",
            3,
            "webbuffer",
            "standard-mode",
        );
        assert_eq!(mb.right_label(), "standard-mode: webbuffer [3]");
    }
}
