//! Binding: what a complete key sequence resolves to

use std::fmt;
use std::rc::Rc;

use crate::commands::{CommandContext, CommandFn};

/// The leaf of a keymap: a registered command name or an inline action
#[derive(Clone)]
pub enum Binding {
    /// Resolved through the command registry at call time
    Command(String),
    /// Called directly with the command context
    Action(CommandFn),
}

impl Binding {
    /// Wrap a closure as an inline action
    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>) -> anyhow::Result<()> + 'static,
    {
        Binding::Action(Rc::new(f))
    }

    /// The command name, for named bindings
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Binding::Command(name) => Some(name),
            Binding::Action(_) => None,
        }
    }

    /// Human readable description used by describe-key and keymap listings
    pub fn describe(&self) -> String {
        match self {
            Binding::Command(name) => name.clone(),
            Binding::Action(_) => "<anonymous>".to_string(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Command(name) => f.debug_tuple("Command").field(name).finish(),
            Binding::Action(_) => f.write_str("Action(..)"),
        }
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Binding::Command(a), Binding::Command(b)) => a == b,
            (Binding::Action(a), Binding::Action(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Binding {
    fn from(name: &str) -> Self {
        Binding::Command(name.to_string())
    }
}

impl From<String> for Binding {
    fn from(name: String) -> Self {
        Binding::Command(name)
    }
}

impl From<CommandFn> for Binding {
    fn from(f: CommandFn) -> Self {
        Binding::Action(f)
    }
}
