//! Built-in commands reached through their default bindings

mod common;

use common::{current_buffer, current_view, input_text, label, posted_presses, press, test_app};

use webchord::app::BLANK_URL;
use webchord::bridge::{BridgeCall, PageAction};

// ========================================================================
// Buffers
// ========================================================================

#[test]
fn test_switch_buffer_preselects_hidden_buffer() {
    let (mut app, _) = test_app();
    let home = current_buffer(&app);
    let other = app.create_buffer("https://a.org/");

    press(&mut app, "C-x b");
    assert_eq!(label(&app), "switch to buffer:");
    press(&mut app, "Return");

    assert_eq!(current_buffer(&app), other);
    assert!(!app.is_buffer_visible(home));
    assert!(!app.current_minibuffer().unwrap().has_prompt());
}

#[test]
fn test_close_last_buffer_is_refused() {
    let (mut app, _) = test_app();
    let buffer = current_buffer(&app);
    press(&mut app, "C-x k");
    assert_eq!(label(&app), "Can not close the last buffer.");
    assert_eq!(current_buffer(&app), buffer);
    assert_eq!(app.buffer_count(), 1);
}

#[test]
fn test_close_and_revive_buffer() {
    let (mut app, _) = test_app();
    let home = current_buffer(&app);
    app.create_buffer("https://a.org/");
    press(&mut app, "C-x b");
    press(&mut app, "Return");

    press(&mut app, "C-x k");
    assert_eq!(app.buffer_count(), 1);
    assert_eq!(current_buffer(&app), home);

    press(&mut app, "C-x r");
    assert_eq!(app.buffer_count(), 2);
    let revived = current_buffer(&app);
    assert_ne!(revived, home);
    assert_eq!(app.buffer(revived).unwrap().url, "https://a.org/");

    // nothing left to revive
    press(&mut app, "C-x r");
    assert_eq!(label(&app), "No closed buffer to revive.");
}

// ========================================================================
// Views
// ========================================================================

#[test]
fn test_split_other_and_close_view() {
    let (mut app, _) = test_app();
    let window = app.current_window();
    let first = current_view(&app);

    press(&mut app, "C-x 3");
    assert_eq!(app.window(window).unwrap().views().len(), 2);
    // the split view shows a new buffer on the same url
    assert_eq!(app.buffer_count(), 2);

    press(&mut app, "C-x o");
    let second = current_view(&app);
    assert_ne!(second, first);

    press(&mut app, "C-x 0");
    assert_eq!(app.window(window).unwrap().views(), &[first]);
    assert_eq!(current_view(&app), first);
}

#[test]
fn test_maximise_view() {
    let (mut app, _) = test_app();
    let window = app.current_window();
    press(&mut app, "C-x 2");
    press(&mut app, "C-x 3");
    assert_eq!(app.window(window).unwrap().views().len(), 3);
    press(&mut app, "C-x 1");
    assert_eq!(app.window(window).unwrap().views().len(), 1);
}

// ========================================================================
// Urls and page actions
// ========================================================================

#[test]
fn test_go_to_loads_webjump_search() {
    let (mut app, bridge) = test_app();
    let window = app.current_window();
    let buffer = current_buffer(&app);

    press(&mut app, "g");
    assert_eq!(label(&app), "url/webjump:");
    app.minibuffer_mut(window)
        .unwrap()
        .input
        .set_text("duckduckgo rust");
    bridge.clear();
    press(&mut app, "Return");

    assert_eq!(
        bridge.calls(),
        vec![BridgeCall::LoadUrl {
            buffer,
            url: "https://www.duckduckgo.com/?q=rust".to_string(),
        }]
    );
    assert_eq!(
        app.buffer(buffer).unwrap().url,
        "https://www.duckduckgo.com/?q=rust"
    );
}

#[test]
fn test_go_to_selected_url_starts_with_current_url() {
    let (mut app, _) = test_app();
    press(&mut app, "G");
    assert_eq!(input_text(&app), BLANK_URL);
    press(&mut app, "C-g");
    assert!(!app.current_minibuffer().unwrap().has_prompt());
}

#[test]
fn test_page_actions_and_scripts() {
    let (mut app, bridge) = test_app();
    let buffer = current_buffer(&app);
    bridge.clear();

    press(&mut app, "F");
    press(&mut app, "r");
    app.call_command("scroll-top").unwrap();

    let calls = bridge.calls();
    assert_eq!(
        calls[0],
        BridgeCall::Action {
            buffer,
            action: PageAction::Forward,
        }
    );
    assert_eq!(
        calls[1],
        BridgeCall::Action {
            buffer,
            action: PageAction::Reload,
        }
    );
    assert_eq!(bridge.scripts(), vec!["window.scrollTo(0, 0);"]);
}

#[test]
fn test_send_key_commands_post_to_page() {
    let (mut app, bridge) = test_app();
    bridge.clear();
    press(&mut app, "n");
    press(&mut app, "C-g");
    assert_eq!(
        posted_presses(&bridge),
        vec![("Down".to_string(), false), ("Esc".to_string(), false)]
    );
}

#[test]
fn test_copy_current_buffer_url() {
    let (mut app, _) = test_app();
    press(&mut app, "c u");
    assert_eq!(app.clipboard.get_text().as_deref(), Some(BLANK_URL));
    assert_eq!(label(&app), format!("Copied: {}", BLANK_URL));
}

// ========================================================================
// Content edit
// ========================================================================

#[test]
fn test_content_edit_motion_extends_selection_with_mark() {
    let (mut app, bridge) = test_app();
    let buffer = current_buffer(&app);
    app.content_edit_focus_changed(buffer, true);
    bridge.clear();

    press(&mut app, "C-f");
    press(&mut app, "C-Space");
    assert!(app.buffer(buffer).unwrap().text_edit_mark);
    press(&mut app, "C-f");

    assert_eq!(
        posted_presses(&bridge),
        vec![("Right".to_string(), false), ("Right".to_string(), true)]
    );
}

// ========================================================================
// Help
// ========================================================================

#[test]
fn test_describe_key_does_not_run_the_command() {
    let (mut app, _) = test_app();
    press(&mut app, "C-h k");
    assert_eq!(label(&app), "Describe key:");
    press(&mut app, "C-x C-c");
    assert_eq!(label(&app), "C-x C-c runs the command quit");
    assert!(!app.quit_requested());
}

#[test]
fn test_describe_command_through_prompt() {
    let (mut app, _) = test_app();
    let window = app.current_window();
    press(&mut app, "C-h c");
    app.minibuffer_mut(window)
        .unwrap()
        .input
        .set_text("quit");
    press(&mut app, "Return");
    assert_eq!(label(&app), "quit (C-x C-c): Quit the application.");
}
