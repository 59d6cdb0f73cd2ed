//! Single-line text editor used by the minibuffer input
//!
//! Positions are character indices. A selection runs from an anchor to the
//! cursor; moving with `mark` set extends it, moving without clears it.

/// Characters that word motion steps over like whitespace
pub const WORD_SEPS: &str = "#/.-_:";

fn is_word_sep(c: char) -> bool {
    c.is_whitespace() || WORD_SEPS.contains(c)
}

/// A single edit that can be undone/redone
#[derive(Debug, Clone, PartialEq, Eq)]
struct EditOperation {
    /// Character offset where the edit occurred
    offset: usize,
    deleted_text: String,
    inserted_text: String,
    cursor_before: usize,
    cursor_after: usize,
}

impl EditOperation {
    fn inverse(&self) -> Self {
        Self {
            offset: self.offset,
            deleted_text: self.inserted_text.clone(),
            inserted_text: self.deleted_text.clone(),
            cursor_before: self.cursor_after,
            cursor_after: self.cursor_before,
        }
    }
}

/// Undo/redo stacks
#[derive(Debug, Clone, Default)]
struct EditHistory {
    undo_stack: Vec<EditOperation>,
    redo_stack: Vec<EditOperation>,
}

impl EditHistory {
    const MAX_SIZE: usize = 200;

    fn push(&mut self, op: EditOperation) {
        self.redo_stack.clear();
        self.undo_stack.push(op);
        if self.undo_stack.len() > Self::MAX_SIZE {
            self.undo_stack.remove(0);
        }
    }

    fn pop_undo(&mut self) -> Option<EditOperation> {
        let op = self.undo_stack.pop()?;
        self.redo_stack.push(op.inverse());
        Some(op)
    }

    fn pop_redo(&mut self) -> Option<EditOperation> {
        let op = self.redo_stack.pop()?;
        self.undo_stack.push(op.inverse());
        Some(op)
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Editable line with cursor, selection and undo history
#[derive(Debug, Clone, Default)]
pub struct LineEdit {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    history: EditHistory,
}

impl LineEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(pos)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text.chars().nth(pos)
    }

    /// Replace the whole text; the cursor goes to the end and the undo
    /// history is dropped
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.len();
        self.anchor = None;
        self.history.clear();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.len());
        self.anchor = None;
    }

    /// Selected range as (start, end)
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn has_selected_text(&self) -> bool {
        self.selection().is_some()
    }

    pub fn selected_text(&self) -> String {
        match self.selection() {
            Some((start, end)) => self.text.chars().skip(start).take(end - start).collect(),
            None => String::new(),
        }
    }

    pub fn deselect(&mut self) {
        self.anchor = None;
    }

    /// Select `length` characters from `start`; the cursor ends after them
    pub fn set_selection(&mut self, start: usize, length: usize) {
        let len = self.len();
        let start = start.min(len);
        self.anchor = Some(start);
        self.cursor = (start + length).min(len);
    }

    pub fn select_all(&mut self) {
        self.set_selection(0, self.len());
    }

    fn move_to(&mut self, pos: usize, mark: bool) {
        if mark {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
        self.cursor = pos.min(self.len());
    }

    pub fn cursor_forward(&mut self, mark: bool, steps: usize) {
        self.move_to(self.cursor.saturating_add(steps), mark);
    }

    pub fn cursor_backward(&mut self, mark: bool, steps: usize) {
        self.move_to(self.cursor.saturating_sub(steps), mark);
    }

    /// Move past the next word, stepping over separators first
    pub fn cursor_word_forward(&mut self, mark: bool) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos < chars.len() && is_word_sep(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && !is_word_sep(chars[pos]) {
            pos += 1;
        }
        self.move_to(pos, mark);
    }

    /// Move to the start of the previous word, stepping over separators first
    pub fn cursor_word_backward(&mut self, mark: bool) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor.min(chars.len());
        while pos > 0 && is_word_sep(chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && !is_word_sep(chars[pos - 1]) {
            pos -= 1;
        }
        self.move_to(pos, mark);
    }

    pub fn home(&mut self, mark: bool) {
        self.move_to(0, mark);
    }

    pub fn end(&mut self, mark: bool) {
        self.move_to(self.len(), mark);
    }

    /// Replace `start..end` with `inserted`, recording it for undo
    fn replace_range(&mut self, start: usize, end: usize, inserted: &str) {
        let cursor_before = self.cursor;
        let (bs, be) = (self.byte_offset(start), self.byte_offset(end));
        let deleted = self.text[bs..be].to_string();
        self.text.replace_range(bs..be, inserted);
        self.cursor = start + inserted.chars().count();
        self.anchor = None;
        self.history.push(EditOperation {
            offset: start,
            deleted_text: deleted,
            inserted_text: inserted.to_string(),
            cursor_before,
            cursor_after: self.cursor,
        });
    }

    /// Text after inserting `s` at the cursor (replacing the selection)
    pub fn text_after_insert(&self, s: &str) -> String {
        let (start, end) = self.selection().unwrap_or((self.cursor, self.cursor));
        let mut text = self.text.clone();
        text.replace_range(self.byte_offset(start)..self.byte_offset(end), s);
        text
    }

    /// Insert at the cursor, replacing the selection
    pub fn insert(&mut self, s: &str) -> bool {
        let (start, end) = self.selection().unwrap_or((self.cursor, self.cursor));
        if s.is_empty() && start == end {
            return false;
        }
        self.replace_range(start, end, s);
        true
    }

    /// Delete the selection, or the character before the cursor
    pub fn backspace(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.replace_range(start, end, "");
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.replace_range(self.cursor - 1, self.cursor, "");
        true
    }

    /// Delete the selection, or the character after the cursor
    pub fn del(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.replace_range(start, end, "");
            return true;
        }
        if self.cursor >= self.len() {
            return false;
        }
        self.replace_range(self.cursor, self.cursor + 1, "");
        true
    }

    /// Revert `op`: remove what it inserted and restore what it deleted
    fn revert(&mut self, op: &EditOperation) {
        let start = self.byte_offset(op.offset);
        let end = self.byte_offset(op.offset + op.inserted_text.chars().count());
        self.text.replace_range(start..end, &op.deleted_text);
        self.cursor = op.cursor_before.min(self.len());
        self.anchor = None;
    }

    pub fn undo(&mut self) -> bool {
        match self.history.pop_undo() {
            Some(op) => {
                self.revert(&op);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        // the redo stack holds inverses, so reverting one replays the edit
        match self.history.pop_redo() {
            Some(op) => {
                self.revert(&op);
                true
            }
            None => false,
        }
    }

    pub fn char_before_cursor(&self) -> Option<char> {
        self.cursor.checked_sub(1).and_then(|p| self.char_at(p))
    }
}
