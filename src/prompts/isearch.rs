//! Incremental search in the current page
//!
//! Every edit of the input searches the page again. The scroll position at
//! the start of the search is fetched from the page so an aborted search
//! (or an emptied input) can put the page back where it was.

use crate::bridge::BridgeMessage;
use crate::keymap::{BuiltinKeymaps, KeymapId};
use crate::minibuffer::{Prompt, PromptAction, PromptEnv};

/// Request tag of the scroll position query
pub const SCROLL_POS_REQUEST: u64 = 1;

const SCROLL_POS_SCRIPT: &str = "[window.scrollX, window.scrollY];";

const CARET_BROWSING_SHUTDOWN: &str = "CaretBrowsing.shutdown();";
const CARET_BROWSING_INIT: &str = "CaretBrowsing.setInitialCursor();";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    fn name(self) -> &'static str {
        match self {
            SearchDirection::Forward => "forward",
            SearchDirection::Backward => "backward",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ISearchPrompt {
    direction: SearchDirection,
    /// Caret browsing was active when the search started
    caret_browsing: bool,
    /// Page scroll position when the search started
    scroll_pos: (f64, f64),
}

impl ISearchPrompt {
    pub fn new(direction: SearchDirection, caret_browsing: bool) -> Self {
        Self {
            direction,
            caret_browsing,
            scroll_pos: (0.0, 0.0),
        }
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn scroll_pos(&self) -> (f64, f64) {
        self.scroll_pos
    }

    pub fn set_direction(&mut self, env: &mut PromptEnv<'_>, direction: SearchDirection) {
        self.direction = direction;
        *env.label = self.label();
    }

    /// Search the input text in the current direction
    pub fn find(&self, env: &mut PromptEnv<'_>) {
        let text = env.input.text().to_string();
        env.find_text(&text, self.direction == SearchDirection::Backward);
    }

    pub fn restore_scroll_pos(&self, env: &mut PromptEnv<'_>) {
        env.run_script(&scroll_to_script(self.scroll_pos));
    }
}

/// Script putting the page back at `pos`
pub fn scroll_to_script(pos: (f64, f64)) -> String {
    format!("window.scrollTo({}, {});", pos.0, pos.1)
}

fn parse_scroll_pos(value: &serde_json::Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [x, y] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

impl Prompt for ISearchPrompt {
    fn label(&self) -> String {
        format!("ISearch ({}):", self.direction.name())
    }

    fn keymap(&self, builtin: &BuiltinKeymaps) -> Option<KeymapId> {
        Some(builtin.isearch)
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        if self.caret_browsing {
            env.run_script(CARET_BROWSING_SHUTDOWN);
        }
        env.eval_script(SCROLL_POS_REQUEST, SCROLL_POS_SCRIPT);
    }

    fn text_edited(&mut self, env: &mut PromptEnv<'_>) -> PromptAction {
        self.find(env);
        if env.input.text().is_empty() {
            self.restore_scroll_pos(env);
        }
        PromptAction::Continue
    }

    fn page_message(&mut self, _env: &mut PromptEnv<'_>, message: &BridgeMessage) -> PromptAction {
        if let BridgeMessage::ScriptResult {
            request: SCROLL_POS_REQUEST,
            value,
            ..
        } = message
        {
            match parse_scroll_pos(value) {
                Some(pos) => self.scroll_pos = pos,
                None => tracing::warn!("unexpected scroll position {}", value),
            }
        }
        PromptAction::Continue
    }

    fn close(&mut self, env: &mut PromptEnv<'_>) {
        if self.caret_browsing {
            env.run_script(CARET_BROWSING_INIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_follows_direction() {
        assert_eq!(
            ISearchPrompt::new(SearchDirection::Forward, false).label(),
            "ISearch (forward):"
        );
        assert_eq!(
            ISearchPrompt::new(SearchDirection::Backward, false).label(),
            "ISearch (backward):"
        );
    }

    #[test]
    fn test_parse_scroll_pos() {
        assert_eq!(parse_scroll_pos(&json!([0, 120.5])), Some((0.0, 120.5)));
        assert_eq!(parse_scroll_pos(&json!([1])), None);
        assert_eq!(parse_scroll_pos(&json!({"x": 1, "y": 2})), None);
        assert_eq!(scroll_to_script((0.0, 120.0)), "window.scrollTo(0, 120);");
    }
}
