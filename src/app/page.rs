//! Messages coming back from pages

use serde_json::json;

use super::Application;
use crate::bridge::BridgeMessage;
use crate::minibuffer::PromptOutcome;
use crate::model::{BufferId, FocusTarget, WindowId};
use crate::prompts::YesNoPrompt;

impl Application {
    /// Parse and handle a JSON message sent by the page of `buffer`
    pub fn page_message_json(
        &mut self,
        buffer: BufferId,
        json: &str,
    ) -> Result<(), serde_json::Error> {
        let message = BridgeMessage::from_json(json)?;
        self.page_message(buffer, message);
        Ok(())
    }

    /// Handle a message sent by the page of `buffer`
    pub fn page_message(&mut self, buffer: BufferId, message: BridgeMessage) {
        if self.buffer(buffer).is_none() {
            tracing::debug!("message for closed buffer {}: {:?}", buffer.0, message);
            return;
        }
        tracing::debug!("page message from buffer {}: {:?}", buffer.0, message);

        match message {
            BridgeMessage::TextFocus { enabled } => {
                self.content_edit_focus_changed(buffer, enabled);
            }
            BridgeMessage::CaretBrowsing { enabled } => {
                self.caret_browsing_changed(buffer, enabled);
            }
            BridgeMessage::BufferFocus => {
                if !self.minibuffer_focused() {
                    if let Some(view) = self.view_of(buffer) {
                        self.set_focus(FocusTarget::View(view));
                    }
                }
            }
            BridgeMessage::FullScreenRequested { enabled } => {
                self.set_fullscreen(buffer, enabled);
            }
            BridgeMessage::CopyToClipboard { text } => {
                self.clipboard.set_text(&text);
            }
            BridgeMessage::UrlChanged { url } => {
                if let Some(b) = self.buffer_mut(buffer) {
                    b.url = url;
                }
            }
            BridgeMessage::TitleChanged { title } => {
                if let Some(b) = self.buffer_mut(buffer) {
                    b.title = title;
                }
            }
            BridgeMessage::JsAlert { message } => {
                self.show_info(format!("[js-alert] {}", message));
            }
            BridgeMessage::LinkHovered { url } => {
                self.show_info(url);
            }
            BridgeMessage::JsConfirm { message, request } => {
                self.js_confirm(buffer, &message, request);
            }
            BridgeMessage::ScriptResult { generation, .. } => {
                let Some(window) = self.prompt_window_for(buffer) else {
                    tracing::debug!("script result without a prompt, dropped");
                    return;
                };
                let current = self
                    .minibuffer(window)
                    .and_then(|m| m.prompt_generation());
                if current != Some(generation) {
                    tracing::debug!(
                        "stale script result (generation {}, current {:?}), dropped",
                        generation,
                        current
                    );
                    return;
                }
                self.prompt_page_message(window, &message);
            }
            BridgeMessage::BrowserObjectActivated { .. } => {
                if let Some(window) = self.prompt_window_for(buffer) {
                    self.prompt_page_message(window, &message);
                }
            }
        }
    }

    /// Window whose active prompt works on `buffer`
    fn prompt_window_for(&self, buffer: BufferId) -> Option<WindowId> {
        self.windows
            .values()
            .find(|w| w.minibuffer.has_prompt() && self.current_buffer(w.id) == Some(buffer))
            .map(|w| w.id)
    }

    fn prompt_page_message(&mut self, window: WindowId, message: &BridgeMessage) {
        let action = self.with_prompt(window, |prompt, env| prompt.page_message(env, message));
        self.apply_prompt_action(window, action);
    }

    /// Ask the page's yes/no question and answer it; an abort answers no
    fn js_confirm(&mut self, buffer: BufferId, message: &str, request: u64) {
        let window = self
            .view_of(buffer)
            .and_then(|v| self.view(v))
            .map_or(self.current_window, |v| v.window);

        self.do_prompt(
            window,
            Box::new(YesNoPrompt::new(format!("[js-confirm] {} ", message))),
            Some(Box::new(move |app: &mut Application, outcome: PromptOutcome| {
                let yes = outcome.value.as_bool().unwrap_or(false);
                app.bridge.reply(buffer, request, json!(yes));
                Ok(())
            })),
        );
        self.on_prompt_aborted(
            window,
            Box::new(move |app: &mut Application| {
                app.bridge.reply(buffer, request, json!(false));
            }),
        );
    }
}
