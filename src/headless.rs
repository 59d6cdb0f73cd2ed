//! Headless runs: build the application from the startup config and replay
//! input against it, with a recording page bridge in place of a renderer

use std::io::Write;

use anyhow::Context;

use crate::app::Application;
use crate::bridge::{BridgeCall, RecordingBridge};
use crate::clipboard::Clipboard;
use crate::cli::{Query, StartupConfig, Step};
use crate::config::AppConfig;
use crate::keymap::{default_keymaps, format_key_sequence, merge_user_keymap};
use crate::variables::Variables;

/// Final state of a replay
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Minibuffer label of the current window
    pub label: String,
    pub quit: bool,
    pub calls: Vec<BridgeCall>,
}

/// Keymaps, then the user keymap, then the configured variables
pub fn build_app(config: &StartupConfig, bridge: RecordingBridge) -> anyhow::Result<Application> {
    let (mut keymaps, builtin) = default_keymaps().context("Embedded keymap is invalid")?;
    if let Some(path) = &config.keymap_file {
        merge_user_keymap(&mut keymaps, path);
    }

    let app_config = config
        .config_file
        .as_deref()
        .map(AppConfig::load)
        .unwrap_or_default();
    let mut variables = Variables::with_builtins();
    let applied = app_config.apply_variables(&mut variables);
    if applied > 0 {
        tracing::info!("Applied {} config variables", applied);
    }

    let mut app = Application::new(keymaps, builtin, variables, Box::new(bridge));
    if config.system_clipboard {
        app.clipboard = Clipboard::system();
    }
    app_config.apply_webjumps(&mut app.webjumps);
    Ok(app)
}

/// Replay the steps in order
pub fn replay(app: &mut Application, steps: &[Step]) -> anyhow::Result<()> {
    for step in steps {
        match step {
            Step::Keys(sequence) => app
                .key_sequence(sequence)
                .with_context(|| format!("Invalid key sequence {:?}", sequence))?,
            Step::Text(text) => app.type_text(text),
        }
        if app.quit_requested() {
            break;
        }
    }
    Ok(())
}

/// Build the application, answer the query and write the result to `out`
pub fn run(config: &StartupConfig, out: &mut dyn Write) -> anyhow::Result<Option<RunReport>> {
    let bridge = RecordingBridge::new();
    let mut app = build_app(config, bridge.clone())?;

    match &config.query {
        Query::ListCommands => {
            for command in app.commands.iter() {
                let keys = app.where_is(&command.name).join(", ");
                writeln!(out, "{:<32} {:<16} {}", command.name, keys, command.doc)?;
            }
        }
        Query::ListKeymaps => {
            for name in app.keymaps.names() {
                let id = app.keymaps.require(name)?;
                let keymap = app.keymaps.get(id);
                match keymap.parent() {
                    Some(parent) => {
                        writeln!(out, "{} (parent: {})", name, app.keymaps.name(parent))?
                    }
                    None => writeln!(out, "{}", name)?,
                }
                let mut lines = Vec::new();
                app.keymaps.traverse(id, |keys, binding| {
                    let sequence = format_key_sequence(keys);
                    lines.push(format!("  {:<16} {}", sequence, binding.describe()));
                });
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        Query::ListVariables => {
            for variable in app.variables.iter() {
                writeln!(out, "{} = {}", variable.name(), variable.value())?;
                writeln!(out, "    {}", variable.doc())?;
            }
        }
        Query::DescribeKey(sequence) => {
            app.keyboard.describe_next_sequence();
            app.key_sequence(sequence)
                .with_context(|| format!("Invalid key sequence {:?}", sequence))?;
            let label = app
                .current_minibuffer()
                .map(|m| m.label.clone())
                .unwrap_or_default();
            writeln!(out, "{}", label)?;
        }
        Query::Run => {
            replay(&mut app, &config.steps)?;
            let report = RunReport {
                label: app
                    .current_minibuffer()
                    .map(|m| m.label.clone())
                    .unwrap_or_default(),
                quit: app.quit_requested(),
                calls: bridge.calls(),
            };
            for call in &report.calls {
                writeln!(out, "page: {:?}", call)?;
            }
            writeln!(out, "minibuffer: {}", report.label)?;
            writeln!(out, "quit: {}", if report.quit { "yes" } else { "no" })?;
            return Ok(Some(report));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;

    fn config(args: &[&str]) -> StartupConfig {
        let mut argv = vec!["webchord", "--no-user-config"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_startup(argv).unwrap()
    }

    #[test]
    fn test_quit_sequence() {
        let mut out = Vec::new();
        let report = run(&config(&["--keys", "C-x C-c"]), &mut out)
            .unwrap()
            .unwrap();
        assert!(report.quit);
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("quit: yes\n"));
    }

    #[test]
    fn test_undefined_sequence_is_reported() {
        let mut out = Vec::new();
        let report = run(&config(&["--keys", "C-x C-z"]), &mut out)
            .unwrap()
            .unwrap();
        assert!(!report.quit);
        assert_eq!(report.label, "C-x C-z is undefined.");
    }

    #[test]
    fn test_invalid_sequence_is_an_error() {
        let mut out = Vec::new();
        assert!(run(&config(&["--keys", "Q-x"]), &mut out).is_err());
    }

    #[test]
    fn test_describe_key() {
        let mut out = Vec::new();
        run(&config(&["--describe-key", "C-x C-c"]), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "C-x C-c runs the command quit\n"
        );
    }

    #[test]
    fn test_config_file_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "variables:\n  home-page: \"https://example.org/\"\n").unwrap();

        let config = config(&["--config", path.to_str().unwrap()]);
        let app = build_app(&config, RecordingBridge::new()).unwrap();
        let buffer = app.current_buffer(app.current_window()).unwrap();
        assert_eq!(app.buffer(buffer).unwrap().url, "https://example.org/");
    }
}
