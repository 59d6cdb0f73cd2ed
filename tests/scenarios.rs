//! End-to-end dispatch scenarios
//!
//! Chords go through the full application: keyboard handler, keymaps,
//! command registry and the minibuffer.

mod common;

use common::{counting_command, current_buffer, current_view, input_text, key, press, test_app};

use webchord::keymap::Keymap;
use webchord::minibuffer::{
    CompleteOptions, CompletionSource, Prompt, PromptHistory, TableModel, TextPrompt,
};
use webchord::model::FocusTarget;

// ========================================================================
// Multi-chord and inherited bindings
// ========================================================================

#[test]
fn test_multi_chord_runs_once() {
    let (mut app, _) = test_app();
    let count = counting_command(&mut app, "count");
    app.keymaps
        .define_key("global", "C-x C-c", "count")
        .unwrap();

    assert!(app.handle_keypress(key("C-x")));
    assert_eq!(app.keyboard.pending().len(), 1);
    assert!(app.handle_keypress(key("C-c")));
    assert_eq!(count.get(), 1);
    assert!(app.keyboard.pending().is_empty());

    // C-c alone is bound nowhere
    assert!(!app.handle_keypress(key("C-c")));
    assert_eq!(count.get(), 1);
    assert!(app.keyboard.pending().is_empty());
}

#[test]
fn test_inherited_binding_from_parent_keymap() {
    let (mut app, _) = test_app();
    let count = counting_command(&mut app, "abort");
    let parent = app.keymaps.register(Keymap::new("parent-map")).unwrap();
    app.keymaps.define_key("parent-map", "C-g", "abort").unwrap();
    let child = app
        .keymaps
        .register(Keymap::new("child-map").with_parent(parent))
        .unwrap();

    app.set_local_keymap(Some(child));
    press(&mut app, "C-g");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_local_keymap_shadows_global() {
    let (mut app, _) = test_app();
    let local = counting_command(&mut app, "local-cmd");
    let global = counting_command(&mut app, "global-cmd");
    app.keymaps.define_key("global", "C-t", "global-cmd").unwrap();
    app.keymaps.define_key("webbuffer", "C-t", "local-cmd").unwrap();

    press(&mut app, "C-t");
    assert_eq!(local.get(), 1);
    assert_eq!(global.get(), 0);
}

#[test]
fn test_failing_command_clears_pending() {
    let (mut app, _) = test_app();
    app.commands
        .define("broken", "Always fails.", |_| anyhow::bail!("boom"));
    app.keymaps.define_key("global", "C-x C-y", "broken").unwrap();

    press(&mut app, "C-x C-y");
    assert!(app.keyboard.pending().is_empty());
}

// ========================================================================
// M-x
// ========================================================================

#[test]
fn test_m_x_completes_and_runs_quit() {
    let (mut app, _) = test_app();
    let window = app.current_window();
    let view = current_view(&app);

    press(&mut app, "M-x");
    assert_eq!(common::label(&app), "M-x: ");
    assert_eq!(app.focus(), FocusTarget::MinibufferInput(window));

    app.type_text("qu");
    press(&mut app, "Tab");
    press(&mut app, "Return");

    assert!(app.quit_requested());
    let minibuffer = app.minibuffer(window).unwrap();
    assert!(!minibuffer.has_prompt());
    assert!(!minibuffer.input.is_visible());
    assert_eq!(app.focus(), FocusTarget::View(view));
}

#[test]
fn test_m_x_history() {
    let (mut app, _) = test_app();
    press(&mut app, "M-x");
    app.type_text("other-view");
    press(&mut app, "Return");
    assert!(!app.current_minibuffer().unwrap().has_prompt());

    press(&mut app, "M-x");
    press(&mut app, "M-p");
    assert_eq!(input_text(&app), "other-view");
    press(&mut app, "M-n");
    assert_eq!(input_text(&app), "");
}

// ========================================================================
// Autocomplete preview
// ========================================================================

struct EnginePrompt;

impl Prompt for EnginePrompt {
    fn label(&self) -> String {
        "engine: ".to_string()
    }

    fn complete_options(&self) -> CompleteOptions {
        CompleteOptions::fuzzy().with_autocomplete()
    }

    fn completer_model(&mut self) -> Option<Box<dyn CompletionSource>> {
        Some(Box::new(TableModel::from_strings(["google", "duckduckgo"])))
    }
}

#[test]
fn test_autocomplete_preview_follows_selection() {
    let (mut app, _) = test_app();
    let window = app.current_window();
    app.do_prompt(window, Box::new(EnginePrompt), None);

    app.type_text("go");
    let input = &app.minibuffer(window).unwrap().input;
    assert_eq!(input.text(), "google");
    assert!(input.popup().is_visible());
    assert_eq!(input.popup().current(), Some(0));

    press(&mut app, "Down");
    let input = &app.minibuffer(window).unwrap().input;
    assert_eq!(input.text(), "duckduckgo");
    assert!(input.popup().is_visible());
}

// ========================================================================
// Keymap restoration and history
// ========================================================================

#[test]
fn test_abort_restores_content_edit_keymap() {
    let (mut app, _) = test_app();
    let window = app.current_window();
    let buffer = current_buffer(&app);
    app.content_edit_focus_changed(buffer, true);
    assert_eq!(app.local_keymap(), Some(app.builtin.content_edit));

    app.do_prompt(window, Box::new(TextPrompt::new("text: ")), None);
    assert_eq!(app.local_keymap(), Some(app.builtin.minibuffer));

    press(&mut app, "C-g");
    assert!(!app.minibuffer(window).unwrap().has_prompt());
    assert_eq!(app.local_keymap(), Some(app.builtin.content_edit));
}

#[test]
fn test_history_navigation_keeps_user_value() {
    let mut history = PromptHistory::new(10);
    for value in ["a", "b", "c"] {
        history.push(value);
    }
    assert_eq!(history.get_previous(), "c");
    assert_eq!(history.get_previous(), "b");
    history.set_user_value("z");
    assert_eq!(history.get_next(), "c");
    assert_eq!(history.get_next(), "z");
}
