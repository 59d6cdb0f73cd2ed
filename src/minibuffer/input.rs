//! Minibuffer input: a line editor hosting the completion popup
//!
//! Edits made by the user (typing, deleting, pasting) mark the input as
//! edited; the application picks that flag up after each key and runs the
//! filtering and prompt callbacks. Programmatic changes (history, chosen
//! completions) do not count as edits.

use std::fmt;
use std::rc::Rc;

use super::completion::{CompleteOptions, CompletionPopup, CompletionSource, MatchMode};
use super::line_edit::LineEdit;
use crate::clipboard::Clipboard;
use crate::keymap::{KeyCode, KeyPress, KeymapId};

/// Accepts or rejects the text an edit would produce
pub type InputValidator = Rc<dyn Fn(&str) -> bool>;

/// How the input text is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    #[default]
    Normal,
    Password,
}

/// What the input did with a key no keymap handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKey {
    Ignored,
    Handled,
    /// Return was pressed
    Submit,
}

pub struct MinibufferInput {
    line: LineEdit,
    visible: bool,
    keymap: KeymapId,
    prompt_keymap: Option<KeymapId>,
    echo_mode: EchoMode,
    validator: Option<InputValidator>,
    right_italic_text: String,
    popup: CompletionPopup,
    options: CompleteOptions,
    mark: bool,
    /// Source row of the last activated completion
    activated: Option<usize>,
    pending_activation: bool,
    edited: bool,
    last_edit_inserted: bool,
}

impl MinibufferInput {
    /// `keymap` applies whenever the active prompt has none of its own
    pub fn new(keymap: KeymapId) -> Self {
        Self {
            line: LineEdit::new(),
            visible: false,
            keymap,
            prompt_keymap: None,
            echo_mode: EchoMode::Normal,
            validator: None,
            right_italic_text: String::new(),
            popup: CompletionPopup::new(),
            options: CompleteOptions::default(),
            mark: false,
            activated: None,
            pending_activation: false,
            edited: false,
            last_edit_inserted: false,
        }
    }

    // === Text ===

    pub fn text(&self) -> &str {
        self.line.text()
    }

    pub fn line(&self) -> &LineEdit {
        &self.line
    }

    /// Replace the text without counting as a user edit
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.line.set_text(text);
    }

    pub fn set_selection(&mut self, start: usize, length: usize) {
        self.line.set_selection(start, length);
    }

    pub fn deselect(&mut self) {
        self.line.deselect();
    }

    /// Text as drawn, masked in password mode
    pub fn display_text(&self) -> String {
        match self.echo_mode {
            EchoMode::Normal => self.line.text().to_string(),
            EchoMode::Password => "*".repeat(self.line.text().chars().count()),
        }
    }

    pub fn echo_mode(&self) -> EchoMode {
        self.echo_mode
    }

    pub fn set_echo_mode(&mut self, mode: EchoMode) {
        self.echo_mode = mode;
    }

    pub fn set_validator(&mut self, validator: Option<InputValidator>) {
        self.validator = validator;
    }

    pub fn right_italic_text(&self) -> &str {
        &self.right_italic_text
    }

    pub fn set_right_italic_text(&mut self, text: impl Into<String>) {
        self.right_italic_text = text.into();
    }

    /// Reset what a previous prompt may have changed
    pub fn reinit(&mut self) {
        self.line.set_text("");
        self.echo_mode = EchoMode::Normal;
        self.validator = None;
        self.right_italic_text.clear();
        self.activated = None;
        self.pending_activation = false;
        self.edited = false;
    }

    // === Widget state ===

    pub fn keymap(&self) -> KeymapId {
        self.prompt_keymap.unwrap_or(self.keymap)
    }

    pub fn set_prompt_keymap(&mut self, keymap: Option<KeymapId>) {
        self.prompt_keymap = keymap;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn mark(&self) -> bool {
        self.mark
    }

    /// Set the mark, or toggle it with `None`; returns the new state
    pub fn set_mark(&mut self, value: Option<bool>) -> bool {
        self.mark = value.unwrap_or(!self.mark);
        self.mark
    }

    /// True once after each user edit
    pub fn take_edited(&mut self) -> bool {
        std::mem::take(&mut self.edited)
    }

    /// Source row of a completion activated since the last call
    pub fn take_activation(&mut self) -> Option<usize> {
        if std::mem::take(&mut self.pending_activation) {
            self.activated
        } else {
            None
        }
    }

    /// Source row of the last activated completion
    pub fn activated_index(&self) -> Option<usize> {
        self.activated
    }

    // === Completion ===

    pub fn popup(&self) -> &CompletionPopup {
        &self.popup
    }

    pub fn popup_mut(&mut self) -> &mut CompletionPopup {
        &mut self.popup
    }

    pub fn set_completer_model(&mut self, model: Option<Box<dyn CompletionSource>>) {
        self.popup.set_source(model);
    }

    /// Detach the completer model, dropping it
    pub fn clear_completer_model(&mut self) {
        drop(self.popup.take_source());
    }

    pub fn completer_model(&self) -> Option<&dyn CompletionSource> {
        self.popup.source()
    }

    pub fn configure_completer(&mut self, options: CompleteOptions) {
        self.options = options.normalized();
        self.popup.max_visible_items = self.options.max_visible_items;
    }

    pub fn options(&self) -> &CompleteOptions {
        &self.options
    }

    /// Change the match mode, re-filtering a visible popup
    pub fn set_match(&mut self, mode: MatchMode) {
        self.options.match_mode = mode;
        if self.popup.is_visible() {
            let text = self.text().to_string();
            self.filter_and_show(&text, false);
        }
    }

    fn filter_and_show(&mut self, text: &str, force: bool) {
        let force = force || self.options.complete_empty;
        self.popup.filter(self.options.match_mode, text);
        if self.popup.row_count() == 0 || (text.is_empty() && !force) {
            self.popup.hide();
        } else {
            self.popup.show();
        }
    }

    /// Filter with the current text and show the popup even when empty
    pub fn show_completions(&mut self) {
        let text = self.text().to_string();
        self.filter_and_show(&text, true);
    }

    /// Refresh completions after a user edit
    pub fn update_completions(&mut self) {
        let text = self.text().to_string();
        if let Some(source) = self.popup.source_mut() {
            source.text_changed(&text);
        }
        self.filter_and_show(&text, false);
        if self.options.autocomplete && self.last_edit_inserted && self.popup.is_visible() {
            self.preview_first_row(&text);
        }
    }

    /// Inline preview: show the first candidate with the completed part
    /// selected, so that typing on replaces it
    fn preview_first_row(&mut self, typed: &str) {
        let Some(candidate) = self.popup.candidate(0).map(str::to_string) else {
            return;
        };
        let typed_len = typed.chars().count();
        let extends = candidate.chars().count() > typed_len
            && candidate.to_lowercase().starts_with(&typed.to_lowercase());
        if !extends {
            return;
        }
        self.popup.select_row(0);
        let total = candidate.chars().count();
        self.line.set_text(candidate);
        self.line.set_selection(typed_len, total - typed_len);
    }

    /// Select a filtered row; with autocomplete the row is mirrored at once
    pub fn select_row(&mut self, row: usize) {
        if self.popup.select_row(row) && self.options.autocomplete {
            self.complete(false);
        }
    }

    /// Move the popup selection, wrapping at both ends
    pub fn select_next_completion(&mut self, forward: bool) {
        let entries = self.popup.row_count();
        if entries == 0 {
            return;
        }
        let row = match self.popup.current() {
            None if forward => 0,
            None => entries - 1,
            Some(row) if forward => (row + 1) % entries,
            Some(row) => (row + entries - 1) % entries,
        };
        self.select_row(row);
    }

    pub fn select_first_completion(&mut self) {
        if self.popup.row_count() > 0 {
            self.select_row(0);
        }
    }

    pub fn select_last_completion(&mut self) {
        let entries = self.popup.row_count();
        if entries > 0 {
            self.select_row(entries - 1);
        }
    }

    /// Move the selection one page, stopping at the ends
    pub fn select_next_page_completion(&mut self, forward: bool) {
        let entries = self.popup.row_count();
        if entries == 0 {
            return;
        }
        let page = self.popup.max_visible_items.max(1);
        let row = match self.popup.current() {
            None if forward => 0,
            None => entries - 1,
            Some(row) if forward => (row + page).min(entries - 1),
            Some(row) => row.saturating_sub(page),
        };
        self.select_row(row);
    }

    /// Adopt the selected row, or the only row with autocomplete-single
    pub fn complete(&mut self, hide_popup: bool) {
        if !self.popup.is_visible() {
            return;
        }
        if let Some(row) = self.popup.current() {
            self.activate_row(row, hide_popup);
        } else if self.options.autocomplete_single && self.popup.row_count() == 1 {
            self.activate_row(0, hide_popup);
        }
    }

    /// Write column 0 of a filtered row into the input
    pub fn activate_row(&mut self, row: usize, hide_popup: bool) {
        let (Some(candidate), Some(source_row)) = (
            self.popup.candidate(row).map(str::to_string),
            self.popup.source_row(row),
        ) else {
            return;
        };
        if hide_popup {
            self.popup.hide();
        }
        self.line.set_text(candidate);
        self.activated = Some(source_row);
        self.pending_activation = true;
    }

    // === Motion ===

    pub fn cursor_forward(&mut self) {
        self.line.cursor_forward(self.mark, 1);
    }

    pub fn cursor_backward(&mut self) {
        self.line.cursor_backward(self.mark, 1);
    }

    pub fn word_forward(&mut self) {
        self.line.cursor_word_forward(self.mark);
    }

    pub fn word_backward(&mut self) {
        self.line.cursor_word_backward(self.mark);
    }

    pub fn home(&mut self) {
        self.line.home(self.mark);
    }

    pub fn end(&mut self) {
        self.line.end(self.mark);
    }

    // === User edits ===

    fn edited(&mut self, changed: bool, inserted: bool) -> bool {
        if changed {
            self.edited = true;
            self.last_edit_inserted = inserted;
        }
        changed
    }

    /// Type text at the cursor; rejected by the validator, nothing changes
    pub fn insert_text(&mut self, text: &str) -> bool {
        if let Some(validator) = &self.validator {
            if !validator(&self.line.text_after_insert(text)) {
                return false;
            }
        }
        let changed = self.line.insert(text);
        self.edited(changed, true)
    }

    pub fn backspace(&mut self) -> bool {
        let changed = self.line.backspace();
        self.edited(changed, false)
    }

    pub fn delete_char(&mut self) -> bool {
        let changed = self.line.del();
        self.edited(changed, false)
    }

    /// Delete up to the next (or previous) word boundary
    pub fn delete_word(&mut self, forward: bool) -> bool {
        self.line.deselect();
        if forward {
            self.line.cursor_word_forward(true);
        } else {
            self.line.cursor_word_backward(true);
        }
        if !self.line.has_selected_text() {
            return false;
        }
        let changed = self.line.del();
        self.edited(changed, false)
    }

    /// Copy the selection; nothing is copied in password mode
    pub fn copy(&self, clipboard: &mut Clipboard) -> bool {
        if self.echo_mode == EchoMode::Password || !self.line.has_selected_text() {
            return false;
        }
        clipboard.set_text(&self.line.selected_text());
        true
    }

    pub fn cut(&mut self, clipboard: &mut Clipboard) -> bool {
        if !self.copy(clipboard) {
            return false;
        }
        let changed = self.line.del();
        self.edited(changed, false)
    }

    pub fn paste(&mut self, clipboard: &mut Clipboard) -> bool {
        match clipboard.get_text() {
            Some(text) if !text.is_empty() => {
                let line: String = text.lines().next().unwrap_or_default().to_string();
                self.insert_text(&line)
            }
            _ => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.line.undo();
        self.edited(changed, false)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.line.redo();
        self.edited(changed, false)
    }

    /// Default line-edit behaviour for a key no keymap handled
    pub fn handle_native_key(&mut self, key: &KeyPress) -> NativeKey {
        if key.has_any_modifier() {
            return NativeKey::Ignored;
        }
        match key.key {
            KeyCode::Return | KeyCode::Enter => return NativeKey::Submit,
            KeyCode::Backspace => {
                self.backspace();
            }
            KeyCode::Delete => {
                self.delete_char();
            }
            KeyCode::Left => self.cursor_backward(),
            KeyCode::Right => self.cursor_forward(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => match key.text() {
                Some(text) => {
                    self.insert_text(&text);
                }
                None => return NativeKey::Ignored,
            },
        }
        NativeKey::Handled
    }
}

impl fmt::Debug for MinibufferInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinibufferInput")
            .field("text", &self.display_text())
            .field("visible", &self.visible)
            .field("keymap", &self.keymap())
            .field("popup", &self.popup)
            .field("mark", &self.mark)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minibuffer::completion::TableModel;

    fn input_with(candidates: &[&str], options: CompleteOptions) -> MinibufferInput {
        let (keymaps, builtin) = crate::keymap::default_keymaps().unwrap();
        drop(keymaps);
        let mut input = MinibufferInput::new(builtin.minibuffer);
        input.set_completer_model(Some(Box::new(TableModel::from_strings(
            candidates.iter().copied(),
        ))));
        input.configure_completer(options);
        input
    }

    fn type_text(input: &mut MinibufferInput, text: &str) {
        for c in text.chars() {
            input.insert_text(&c.to_string());
            if input.take_edited() {
                input.update_completions();
            }
        }
    }

    #[test]
    fn test_empty_text_hides_popup() {
        let mut input = input_with(&["quit", "query"], CompleteOptions::default());
        type_text(&mut input, "q");
        assert!(input.popup().is_visible());
        assert_eq!(input.popup().row_count(), 2);
        input.backspace();
        input.update_completions();
        assert!(!input.popup().is_visible());
    }

    #[test]
    fn test_complete_single_row() {
        let mut input = input_with(&["quit", "reload"], CompleteOptions::default());
        type_text(&mut input, "qu");
        input.complete(true);
        assert_eq!(input.text(), "quit");
        assert!(!input.popup().is_visible());
        assert_eq!(input.take_activation(), Some(0));
        assert_eq!(input.take_activation(), None);
    }

    #[test]
    fn test_select_next_wraps() {
        let mut input = input_with(&["a1", "a2", "a3"], CompleteOptions::default());
        input.show_completions();
        input.select_next_completion(false);
        assert_eq!(input.popup().current(), Some(2));
        input.select_next_completion(true);
        assert_eq!(input.popup().current(), Some(0));
    }

    #[test]
    fn test_autocomplete_preview_and_follow() {
        let options = CompleteOptions::fuzzy().with_autocomplete();
        let mut input = input_with(&["google", "duckduckgo"], options);
        type_text(&mut input, "go");
        assert_eq!(input.text(), "google");
        assert_eq!(input.line().selected_text(), "ogle");
        assert!(input.popup().is_visible());

        input.select_next_completion(true);
        assert_eq!(input.text(), "duckduckgo");
        assert!(input.popup().is_visible());
        assert_eq!(input.take_activation(), Some(1));
    }

    #[test]
    fn test_validator_rejects_edit() {
        let mut input = input_with(&[], CompleteOptions::default());
        input.set_validator(Some(Rc::new(|text: &str| {
            matches!(text, "y" | "Y" | "n" | "N")
        })));
        assert!(!input.insert_text("x"));
        assert!(!input.take_edited());
        assert!(input.insert_text("y"));
        assert!(input.take_edited());
    }

    #[test]
    fn test_mark_toggle() {
        let mut input = input_with(&[], CompleteOptions::default());
        input.set_text("hello world");
        input.home();
        assert!(input.set_mark(None));
        input.word_forward();
        assert_eq!(input.line().selected_text(), "hello");
        assert!(!input.set_mark(None));
    }

    #[test]
    fn test_delete_word_backward() {
        let mut input = input_with(&[], CompleteOptions::default());
        input.set_text("https://example.org/path");
        assert!(input.delete_word(false));
        assert_eq!(input.text(), "https://example.org/");
        assert!(input.take_edited());
    }

    #[test]
    fn test_cut_and_paste() {
        let mut clipboard = Clipboard::in_memory();
        let mut input = input_with(&[], CompleteOptions::default());
        input.set_text("abc");
        input.set_selection(1, 2);
        assert!(input.cut(&mut clipboard));
        assert_eq!(input.text(), "a");
        input.home();
        assert!(input.paste(&mut clipboard));
        assert_eq!(input.text(), "bca");
    }

    #[test]
    fn test_password_mode_masks_and_refuses_copy() {
        let mut clipboard = Clipboard::in_memory();
        let mut input = input_with(&[], CompleteOptions::default());
        input.set_echo_mode(EchoMode::Password);
        input.set_text("secret");
        input.set_selection(0, 6);
        assert_eq!(input.display_text(), "******");
        assert!(!input.copy(&mut clipboard));
    }
}
