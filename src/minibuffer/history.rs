//! In-memory history of prompt values

use std::collections::{HashMap, VecDeque};

/// Default number of entries kept by a history
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// Bounded history with a navigation cursor
///
/// While "in the user value" the cursor is parked outside the ring and
/// navigation returns what the user typed before browsing. Moving past
/// either end of the ring returns to the user value.
#[derive(Debug, Clone)]
pub struct PromptHistory {
    entries: VecDeque<String>,
    max_size: usize,
    in_user_value: bool,
    user_value: String,
    cursor: usize,
}

impl Default for PromptHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl PromptHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size: max_size.max(1),
            in_user_value: true,
            user_value: String::new(),
            cursor: 0,
        }
    }

    /// Leave navigation: back in the (empty) user value
    pub fn reset(&mut self) {
        self.in_user_value = true;
        self.user_value.clear();
        self.cursor = 0;
    }

    /// Append a value, skipping a repeat of the newest entry
    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.entries.back() == Some(&text) {
            return;
        }
        self.entries.push_back(text);
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.clamp_cursor();
    }

    pub fn in_user_value(&self) -> bool {
        self.in_user_value
    }

    pub fn set_user_value(&mut self, text: impl Into<String>) {
        self.user_value = text.into();
    }

    pub fn user_value(&self) -> &str {
        &self.user_value
    }

    /// Change the bound, evicting the oldest entries if needed
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.clamp_cursor();
    }

    /// Eviction keeps the cursor index; only an index past the end moves
    fn clamp_cursor(&mut self) {
        if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len().saturating_sub(1);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    fn step(&mut self, forward: bool) -> String {
        let size = self.entries.len();
        if size == 0 {
            return self.user_value.clone();
        }

        if self.in_user_value {
            self.in_user_value = false;
            self.cursor = if forward { 0 } else { size - 1 };
        } else {
            let next = if forward {
                self.cursor.checked_add(1).filter(|c| *c < size)
            } else {
                self.cursor.checked_sub(1)
            };
            match next {
                Some(cursor) => self.cursor = cursor,
                None => {
                    self.in_user_value = true;
                    return self.user_value.clone();
                }
            }
        }

        self.entries[self.cursor].clone()
    }

    /// Newer entry, or the oldest one when starting from the user value
    pub fn get_next(&mut self) -> String {
        self.step(true)
    }

    /// Older entry, or the newest one when starting from the user value
    pub fn get_previous(&mut self) -> String {
        self.step(false)
    }
}

/// Histories shared by prompts of the same kind, keyed by name
#[derive(Debug, Clone, Default)]
pub struct PromptHistories {
    histories: HashMap<String, PromptHistory>,
    max_size: usize,
}

impl PromptHistories {
    pub fn new(max_size: usize) -> Self {
        Self {
            histories: HashMap::new(),
            max_size,
        }
    }

    /// The history named `key`, created on first use
    pub fn get_mut(&mut self, key: &str) -> &mut PromptHistory {
        let max_size = self.max_size;
        self.histories
            .entry(key.to_string())
            .or_insert_with(|| PromptHistory::new(max_size))
    }

    pub fn get(&self, key: &str) -> Option<&PromptHistory> {
        self.histories.get(key)
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        for history in self.histories.values_mut() {
            history.set_max_size(max_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let mut h = PromptHistory::default();
        assert_eq!(h.get_next(), "");
        assert_eq!(h.get_previous(), "");
    }

    #[test]
    fn test_navigation_and_user_value() {
        let mut h = PromptHistory::new(10);
        for i in 0..12 {
            h.push(format!("test_{}", i));
        }
        assert_eq!(h.len(), 10);

        assert_eq!(h.get_previous(), "test_11");
        assert_eq!(h.get_previous(), "test_10");
        assert_eq!(h.get_next(), "test_11");
        assert_eq!(h.get_next(), "");

        h.set_user_value("foobar");
        assert_eq!(h.get_next(), "test_2");
        assert_eq!(h.get_previous(), "foobar");
        assert_eq!(h.get_next(), "test_2");

        h.reset();
        assert_eq!(h.get_next(), "test_2");
        assert_eq!(h.get_previous(), "");
    }

    #[test]
    fn test_push_skips_repeat() {
        let mut h = PromptHistory::default();
        h.push("a");
        h.push("a");
        h.push("b");
        h.push("a");
        assert_eq!(h.entries().collect::<Vec<_>>(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_previous_then_next_returns_user_value() {
        let mut h = PromptHistory::default();
        for v in ["a", "b", "c"] {
            h.push(v);
        }
        h.set_user_value("typed");
        for _ in 0..3 {
            h.get_previous();
        }
        for _ in 0..2 {
            h.get_next();
        }
        assert_eq!(h.get_next(), "typed");
        assert!(h.in_user_value());
    }

    #[test]
    fn test_shrinking_evicts_oldest() {
        let mut h = PromptHistory::new(5);
        for v in ["a", "b", "c", "d"] {
            h.push(v);
        }
        h.set_max_size(2);
        assert_eq!(h.entries().collect::<Vec<_>>(), vec!["c", "d"]);
    }

    #[test]
    fn test_push_while_navigating_keeps_cursor_index() {
        let mut h = PromptHistory::new(3);
        for v in ["a", "b", "c"] {
            h.push(v);
        }
        assert_eq!(h.get_previous(), "c");
        assert_eq!(h.get_previous(), "b");

        // "a" is evicted; the cursor index now points at "c"
        h.push("d");
        assert_eq!(h.entries().collect::<Vec<_>>(), vec!["b", "c", "d"]);
        assert_eq!(h.get_previous(), "b");
        assert_eq!(h.get_next(), "c");
    }

    #[test]
    fn test_shrinking_clamps_cursor_past_end() {
        let mut h = PromptHistory::new(5);
        for v in ["a", "b", "c", "d"] {
            h.push(v);
        }
        assert_eq!(h.get_previous(), "d");
        h.set_max_size(2);
        assert_eq!(h.get_previous(), "c");
    }

    #[test]
    fn test_histories_by_key() {
        let mut all = PromptHistories::new(3);
        all.get_mut("go-to").push("x");
        assert_eq!(all.get("go-to").map(PromptHistory::len), Some(1));
        assert!(all.get("M-x").is_none());
    }
}
