//! Startup from user files and headless replay

use std::path::PathBuf;

use webchord::bridge::RecordingBridge;
use webchord::cli::{Query, StartupConfig, Step};
use webchord::headless::{build_app, run};
use webchord::variables::WEBJUMP_DEFAULT;

fn startup(config_file: Option<PathBuf>, keymap_file: Option<PathBuf>) -> StartupConfig {
    StartupConfig {
        steps: Vec::new(),
        query: Query::Run,
        config_file,
        keymap_file,
        system_clipboard: false,
    }
}

// ========================================================================
// User files
// ========================================================================

#[test]
fn test_user_files_apply_together() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let keymap = dir.path().join("keymap.yaml");
    std::fs::write(
        &config,
        r#"
variables:
  webjump-default: ddg
webjumps:
  ddg:
    url: "https://duckduckgo.com/?q=%s"
    doc: DuckDuckGo
"#,
    )
    .unwrap();
    std::fs::write(
        &keymap,
        r#"
keymaps:
  - name: global
    bindings:
      - key: "C-q"
        command: quit
"#,
    )
    .unwrap();

    let mut app = build_app(&startup(Some(config), Some(keymap)), RecordingBridge::new()).unwrap();
    assert_eq!(app.variables.get_str(WEBJUMP_DEFAULT), "ddg");
    assert!(app.webjumps.get("ddg").is_some());

    app.key_sequence("C-q").unwrap();
    assert!(app.quit_requested());
}

#[test]
fn test_broken_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let keymap = dir.path().join("keymap.yaml");
    std::fs::write(&config, "variables: [not, a, mapping]\n").unwrap();
    std::fs::write(&keymap, "keymaps: 12\n").unwrap();

    let mut app = build_app(&startup(Some(config), Some(keymap)), RecordingBridge::new()).unwrap();
    app.key_sequence("C-x C-c").unwrap();
    assert!(app.quit_requested());
}

#[test]
fn test_missing_files_are_fine() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(
        &startup(
            Some(dir.path().join("config.yaml")),
            Some(dir.path().join("keymap.yaml")),
        ),
        RecordingBridge::new(),
    )
    .unwrap();
    assert_eq!(app.buffer_count(), 1);
}

// ========================================================================
// Replay
// ========================================================================

#[test]
fn test_replay_m_x_quit() {
    let mut config = startup(None, None);
    config.steps = vec![
        Step::Keys("M-x".to_string()),
        Step::Text("quit".to_string()),
        Step::Keys("Return".to_string()),
        // never reached
        Step::Keys("Q-q".to_string()),
    ];
    let mut out = Vec::new();
    let report = run(&config, &mut out).unwrap().unwrap();
    assert!(report.quit);
    assert_eq!(report.label, "");
}

#[test]
fn test_replay_reports_page_calls() {
    let mut config = startup(None, None);
    config.steps = vec![Step::Keys("F".to_string())];
    let mut out = Vec::new();
    let report = run(&config, &mut out).unwrap().unwrap();
    assert_eq!(report.calls.len(), 2);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Forward"));
    // the info line echoes the last sequence run
    assert!(text.ends_with("minibuffer: F\nquit: no\n"));
}

#[test]
fn test_list_queries_write_output() {
    let mut out = Vec::new();
    let mut config = startup(None, None);
    config.query = Query::ListKeymaps;
    assert!(run(&config, &mut out).unwrap().is_none());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("hint (parent: minibuffer)"));
    assert!(text.contains("C-x C-c"));

    let mut out = Vec::new();
    config.query = Query::ListCommands;
    run(&config, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().any(|line| line.starts_with("quit ")));
}
