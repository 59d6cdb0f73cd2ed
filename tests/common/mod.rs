//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use webchord::bridge::{BridgeCall, RecordingBridge};
use webchord::keymap::{KeyEventKind, KeyPress};
use webchord::model::{BufferId, ViewId, WindowId};
use webchord::Application;

/// Application on the embedded defaults, with a recording page bridge
pub fn test_app() -> (Application, RecordingBridge) {
    let bridge = RecordingBridge::new();
    let app = Application::with_defaults(Box::new(bridge.clone()))
        .expect("embedded keymaps should load");
    (app, bridge)
}

/// Press every chord of `sequence`
pub fn press(app: &mut Application, sequence: &str) {
    app.key_sequence(sequence).expect("valid key sequence");
}

pub fn key(chord: &str) -> KeyPress {
    chord.parse().expect("valid chord")
}

pub fn window(app: &Application) -> WindowId {
    app.current_window()
}

pub fn current_buffer(app: &Application) -> BufferId {
    app.current_buffer(app.current_window())
        .expect("current window shows a buffer")
}

pub fn current_view(app: &Application) -> ViewId {
    app.current_view(app.current_window())
        .expect("current window has a view")
}

/// Label of the current window's minibuffer
pub fn label(app: &Application) -> String {
    app.current_minibuffer()
        .map(|m| m.label.clone())
        .unwrap_or_default()
}

/// Text of the current window's minibuffer input
pub fn input_text(app: &Application) -> String {
    app.current_minibuffer()
        .map(|m| m.input.text().to_string())
        .unwrap_or_default()
}

/// Register a command counting its calls
pub fn counting_command(app: &mut Application, name: &str) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    app.commands.define(name, "Count calls.", move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    count
}

/// Key presses posted to the page, as (chord, shift)
pub fn posted_presses(bridge: &RecordingBridge) -> Vec<(String, bool)> {
    bridge
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            BridgeCall::KeyEvent { event, .. } if event.kind == KeyEventKind::Press => {
                Some((event.key.to_string(), event.shift))
            }
            _ => None,
        })
        .collect()
}
