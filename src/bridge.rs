//! Page bridge: calls into the rendered page and messages coming back
//!
//! The rendering engine is an external collaborator. Outgoing requests go
//! through the [`PageBridge`] trait; incoming events arrive as JSON
//! [`BridgeMessage`]s tagged by `"type"`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::keymap::SyntheticKeyEvent;
use crate::model::BufferId;

/// Engine-side actions on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Back,
    Forward,
    Reload,
    ReloadNoCache,
    Copy,
    Cut,
    Paste,
    SelectAll,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomNormal,
    ExitFullScreen,
}

/// Outgoing calls to the page side
pub trait PageBridge {
    /// Deliver a key event to the page, bypassing the keyboard handler
    fn post_key_event(&mut self, buffer: BufferId, event: SyntheticKeyEvent);

    /// Evaluate a script in the page, ignoring its value
    fn run_script(&mut self, buffer: BufferId, script: &str);

    /// Evaluate a script; its value comes back as a `scriptResult` message
    /// carrying `request` and `generation`
    fn eval_script(&mut self, buffer: BufferId, script: &str, request: u64, generation: u64);

    /// Highlight matches of `text` and move to the next one; an empty text
    /// clears the highlight
    fn find_text(&mut self, buffer: BufferId, text: &str, backward: bool);

    fn load_url(&mut self, buffer: BufferId, url: &str);

    fn trigger_action(&mut self, buffer: BufferId, action: PageAction);

    /// Answer a page request such as `jsConfirm`
    fn reply(&mut self, buffer: BufferId, request: u64, value: serde_json::Value);
}

/// A call recorded by [`RecordingBridge`]
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    KeyEvent {
        buffer: BufferId,
        event: SyntheticKeyEvent,
    },
    Script {
        buffer: BufferId,
        script: String,
    },
    EvalScript {
        buffer: BufferId,
        script: String,
        request: u64,
        generation: u64,
    },
    FindText {
        buffer: BufferId,
        text: String,
        backward: bool,
    },
    LoadUrl {
        buffer: BufferId,
        url: String,
    },
    Action {
        buffer: BufferId,
        action: PageAction,
    },
    Reply {
        buffer: BufferId,
        request: u64,
        value: serde_json::Value,
    },
}

/// Bridge that records every call instead of rendering
///
/// Used by the headless binary and by tests; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    calls: Rc<RefCell<Vec<BridgeCall>>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls so far
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Scripts sent so far, in order
    pub fn scripts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                BridgeCall::Script { script, .. } => Some(script.clone()),
                _ => None,
            })
            .collect()
    }

    /// Texts searched so far, with their direction
    pub fn finds(&self) -> Vec<(String, bool)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                BridgeCall::FindText { text, backward, .. } => Some((text.clone(), *backward)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BridgeCall) {
        tracing::debug!("bridge: {:?}", call);
        self.calls.borrow_mut().push(call);
    }
}

impl PageBridge for RecordingBridge {
    fn post_key_event(&mut self, buffer: BufferId, event: SyntheticKeyEvent) {
        self.record(BridgeCall::KeyEvent { buffer, event });
    }

    fn run_script(&mut self, buffer: BufferId, script: &str) {
        self.record(BridgeCall::Script {
            buffer,
            script: script.to_string(),
        });
    }

    fn eval_script(&mut self, buffer: BufferId, script: &str, request: u64, generation: u64) {
        self.record(BridgeCall::EvalScript {
            buffer,
            script: script.to_string(),
            request,
            generation,
        });
    }

    fn find_text(&mut self, buffer: BufferId, text: &str, backward: bool) {
        self.record(BridgeCall::FindText {
            buffer,
            text: text.to_string(),
            backward,
        });
    }

    fn load_url(&mut self, buffer: BufferId, url: &str) {
        self.record(BridgeCall::LoadUrl {
            buffer,
            url: url.to_string(),
        });
    }

    fn trigger_action(&mut self, buffer: BufferId, action: PageAction) {
        self.record(BridgeCall::Action { buffer, action });
    }

    fn reply(&mut self, buffer: BufferId, request: u64, value: serde_json::Value) {
        self.record(BridgeCall::Reply {
            buffer,
            request,
            value,
        });
    }
}

/// Messages sent by a page (or the engine) about one buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    /// An editable element gained or lost focus
    #[serde(rename = "onTextFocus")]
    TextFocus { enabled: bool },
    #[serde(rename = "onCaretBrowsing")]
    CaretBrowsing { enabled: bool },
    /// The page got keyboard focus
    #[serde(rename = "onBufferFocus")]
    BufferFocus,
    /// A hint became the active browser object
    #[serde(rename = "browserObjectActivated")]
    BrowserObjectActivated { object: serde_json::Value },
    #[serde(rename = "copyToClipboard")]
    CopyToClipboard { text: String },
    /// The page asks a yes/no question; answered with `reply(request, bool)`
    #[serde(rename = "jsConfirm")]
    JsConfirm { message: String, request: u64 },
    /// Result of a script run on behalf of a prompt
    #[serde(rename = "scriptResult")]
    ScriptResult {
        request: u64,
        generation: u64,
        value: serde_json::Value,
    },
    #[serde(rename = "fullScreenRequested")]
    FullScreenRequested { enabled: bool },
    #[serde(rename = "urlChanged")]
    UrlChanged { url: String },
    #[serde(rename = "titleChanged")]
    TitleChanged { title: String },
    /// `window.alert()`, shown on the info line
    #[serde(rename = "jsAlert")]
    JsAlert { message: String },
    /// The pointer entered (or left, with an empty url) a link
    #[serde(rename = "linkHovered")]
    LinkHovered { url: String },
}

impl BridgeMessage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
