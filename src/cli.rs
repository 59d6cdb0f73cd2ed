//! Command-line argument parsing
//!
//! Supports:
//! - Replaying chord sequences and typed text against a headless application
//! - Listing commands, keymaps and variables
//! - Describing what a key sequence runs
//! - Choosing or skipping the user configuration

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Keyboard-driven input dispatch for an Emacs-style browser
#[derive(Parser, Debug)]
#[command(
    name = "webchord",
    version,
    about = "Keyboard-driven input dispatch for an Emacs-style browser"
)]
pub struct CliArgs {
    /// Key sequence to replay, e.g. "C-x b" (repeatable)
    #[arg(long, value_name = "SEQUENCE")]
    pub keys: Vec<String>,

    /// Literal text typed into the focused widget (repeatable)
    #[arg(long = "type", value_name = "TEXT")]
    pub text: Vec<String>,

    /// List the registered commands
    #[arg(long)]
    pub list_commands: bool,

    /// List the keymaps and their bindings
    #[arg(long)]
    pub list_keymaps: bool,

    /// Tell what a key sequence runs
    #[arg(long, value_name = "SEQUENCE")]
    pub describe_key: Option<String>,

    /// List the variables and their values
    #[arg(long)]
    pub list_variables: bool,

    /// Read configuration from this file instead of the user config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ignore the user config and keymap files
    #[arg(long)]
    pub no_user_config: bool,
}

/// One input replayed against the application, in command-line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Keys(String),
    Text(String),
}

/// What the binary should do once the application is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Replay the steps and report the final state
    Run,
    ListCommands,
    ListKeymaps,
    ListVariables,
    DescribeKey(String),
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub steps: Vec<Step>,
    pub query: Query,
    /// Config file to read; `None` skips it
    pub config_file: Option<PathBuf>,
    /// User keymap file to merge; `None` skips it
    pub keymap_file: Option<PathBuf>,
    /// Copy and paste through the system clipboard
    pub system_clipboard: bool,
}

impl CliArgs {
    /// Parse the process arguments, exiting on error like `Parser::parse`
    pub fn parse_startup() -> StartupConfig {
        match Self::try_parse_startup(std::env::args_os()) {
            Ok(config) => config,
            Err(e) => e.exit(),
        }
    }

    pub fn try_parse_startup<I, T>(args: I) -> Result<StartupConfig, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let parsed = Self::from_arg_matches(&matches)?;
        let steps = ordered_steps(&matches, &parsed);
        Ok(parsed.into_config(steps))
    }

    /// Convert parsed CLI args into startup configuration
    pub fn into_config(self, steps: Vec<Step>) -> StartupConfig {
        let query = if self.list_commands {
            Query::ListCommands
        } else if self.list_keymaps {
            Query::ListKeymaps
        } else if self.list_variables {
            Query::ListVariables
        } else if let Some(sequence) = self.describe_key {
            Query::DescribeKey(sequence)
        } else {
            Query::Run
        };

        let (config_file, keymap_file) = if self.no_user_config {
            (self.config, None)
        } else {
            (
                self.config.or_else(crate::config_paths::config_file),
                crate::config_paths::keymap_file(),
            )
        };

        StartupConfig {
            steps,
            query,
            config_file,
            keymap_file,
            system_clipboard: false,
        }
    }
}

/// Interleave `--keys` and `--type` values by their position on the command line
fn ordered_steps(matches: &ArgMatches, args: &CliArgs) -> Vec<Step> {
    let keys = matches
        .indices_of("keys")
        .into_iter()
        .flatten()
        .zip(args.keys.iter().cloned().map(Step::Keys));
    let text = matches
        .indices_of("text")
        .into_iter()
        .flatten()
        .zip(args.text.iter().cloned().map(Step::Text));

    let mut steps: Vec<(usize, Step)> = keys.chain(text).collect();
    steps.sort_by_key(|(index, _)| *index);
    steps.into_iter().map(|(_, step)| step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> StartupConfig {
        let mut argv = vec!["webchord"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_startup(argv).unwrap()
    }

    #[test]
    fn test_no_args_runs_nothing() {
        let config = parse(&[]);
        assert_eq!(config.query, Query::Run);
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_steps_keep_command_line_order() {
        let config = parse(&["--keys", "M-x", "--type", "quit", "--keys", "Return"]);
        assert_eq!(
            config.steps,
            vec![
                Step::Keys("M-x".to_string()),
                Step::Text("quit".to_string()),
                Step::Keys("Return".to_string()),
            ]
        );
    }

    #[test]
    fn test_describe_key_query() {
        let config = parse(&["--describe-key", "C-x C-c"]);
        assert_eq!(config.query, Query::DescribeKey("C-x C-c".to_string()));
    }

    #[test]
    fn test_no_user_config_skips_files() {
        let config = parse(&["--no-user-config"]);
        assert!(config.config_file.is_none());
        assert!(config.keymap_file.is_none());

        let config = parse(&["--no-user-config", "--config", "/tmp/c.yaml"]);
        assert_eq!(config.config_file, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(config.keymap_file.is_none());
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        assert!(CliArgs::try_parse_startup(["webchord", "--bogus"]).is_err());
    }
}
