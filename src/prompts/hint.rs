//! Hint prompts: pick a page element by number or by filtering text
//!
//! The page numbers the matching elements; digits select a hint, other text
//! filters them. The page reports the active element with a
//! `browserObjectActivated` message.

use super::js_string;
use crate::bridge::BridgeMessage;
use crate::keymap::{BuiltinKeymaps, KeyCode, KeyPress, KeymapId};
use crate::minibuffer::{MinibufferInput, Prompt, PromptAction, PromptEnv, PromptValue};

/// Clickable elements
pub const SELECTOR_CLICKABLE: &str = "//*[@onclick or @onmouseover or @onmousedown or @onmouseup or \
@oncommand or @role='link' or @role='button' or @role='menuitem'] \
| //input[not(@type='hidden')] | //a[@href] | //area | //iframe | //textarea \
| //button | //select | //*[@contenteditable = 'true']";

/// Links only
pub const SELECTOR_LINK: &str = "//a[@href]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    Follow,
    CopyLink,
}

#[derive(Debug, Clone)]
pub struct HintPrompt {
    kind: HintKind,
    label: String,
    selector: &'static str,
    pub new_buffer: bool,
    /// Digits typed so far
    pub numbers: String,
    /// Last object reported by the page
    pub browser_object: serde_json::Value,
    /// Url of the hinted buffer
    pub buffer_url: String,
}

impl HintPrompt {
    pub fn follow(new_buffer: bool) -> Self {
        Self {
            kind: HintKind::Follow,
            label: if new_buffer {
                "follow: (new buffer)".to_string()
            } else {
                "follow:".to_string()
            },
            // only links make sense in another buffer
            selector: if new_buffer {
                SELECTOR_LINK
            } else {
                SELECTOR_CLICKABLE
            },
            new_buffer,
            numbers: String::new(),
            browser_object: serde_json::Value::Null,
            buffer_url: String::new(),
        }
    }

    pub fn copy_link(buffer_url: impl Into<String>) -> Self {
        Self {
            kind: HintKind::CopyLink,
            label: "copy link:".to_string(),
            selector: SELECTOR_LINK,
            new_buffer: false,
            numbers: String::new(),
            browser_object: serde_json::Value::Null,
            buffer_url: buffer_url.into(),
        }
    }

    pub fn kind(&self) -> HintKind {
        self.kind
    }

    /// Url of the chosen object, if it has one
    pub fn object_url(&self) -> Option<&str> {
        self.browser_object.get("url").and_then(|v| v.as_str())
    }

    fn update_label(&self, env: &mut PromptEnv<'_>) {
        *env.label = if self.numbers.is_empty() {
            self.label.clone()
        } else {
            format!("{} #{}", self.label, self.numbers)
        };
    }
}

impl Prompt for HintPrompt {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn keymap(&self, builtin: &BuiltinKeymaps) -> Option<KeymapId> {
        Some(builtin.hint)
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        env.run_script(&format!(
            "hints.selectBrowserObjects({});",
            js_string(self.selector)
        ));
    }

    fn text_edited(&mut self, env: &mut PromptEnv<'_>) -> PromptAction {
        let script = format!("hints.filterSelection({});", js_string(env.input.text()));
        env.run_script(&script);
        PromptAction::Continue
    }

    fn handle_key(&mut self, env: &mut PromptEnv<'_>, key: &KeyPress) -> bool {
        if let KeyCode::Char(c) = key.key {
            if c.is_ascii_digit() && !key.has_any_modifier() {
                self.numbers.push(c);
                env.run_script(&format!(
                    "hints.selectVisibleHint({});",
                    js_string(&self.numbers)
                ));
                self.update_label(env);
                if self.kind == HintKind::CopyLink && self.numbers == "0" {
                    // "0" stands for the page itself
                    env.input.set_right_italic_text(self.buffer_url.clone());
                }
                return true;
            }
        }
        if !matches!(key.key, KeyCode::Return | KeyCode::Enter) {
            self.numbers.clear();
            self.update_label(env);
        }
        false
    }

    fn page_message(&mut self, env: &mut PromptEnv<'_>, message: &BridgeMessage) -> PromptAction {
        if let BridgeMessage::BrowserObjectActivated { object } = message {
            self.browser_object = object.clone();
            let url = self.object_url().unwrap_or_default().to_string();
            env.input.set_right_italic_text(url);
        }
        PromptAction::Continue
    }

    fn value(&self, _input: &MinibufferInput) -> PromptValue {
        PromptValue::Object(self.browser_object.clone())
    }

    fn close(&mut self, env: &mut PromptEnv<'_>) {
        env.run_script("hints.clearBrowserObjects();");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_follow_in_new_buffer_hints_links() {
        let prompt = HintPrompt::follow(true);
        assert_eq!(prompt.selector, SELECTOR_LINK);
        assert_eq!(prompt.label(), "follow: (new buffer)");
        assert_eq!(HintPrompt::follow(false).selector, SELECTOR_CLICKABLE);
    }

    #[test]
    fn test_object_url() {
        let mut prompt = HintPrompt::copy_link("https://a.org");
        assert_eq!(prompt.object_url(), None);
        prompt.browser_object = json!({"url": "https://b.org", "id": 2});
        assert_eq!(prompt.object_url(), Some("https://b.org"));
    }
}
