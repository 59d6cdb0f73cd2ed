//! Named commands and the registry they live in
//!
//! A command is a binding (a closure over [`CommandContext`]) plus an
//! optional prompt factory. Commands with a prompt open it first and run the
//! binding once the prompt is validated, with the outcome in
//! `ctx.prompt`; an aborted prompt never reaches the binding.
//!
//! The built-in commands are grouped by what they act on: the application
//! ([`global`]), the web page ([`webbuffer`], [`content_edit`],
//! [`caret_browsing`], [`follow`]) and the minibuffer ([`minibuffer`]).

pub mod caret_browsing;
pub mod content_edit;
pub mod follow;
pub mod global;
pub mod minibuffer;
pub mod webbuffer;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use anyhow::Context as _;

use crate::app::Application;
use crate::bridge::PageAction;
use crate::keymap::KeyPress;
use crate::minibuffer::{Minibuffer, MinibufferInput, Prompt, PromptOutcome};
use crate::model::{BufferId, ViewId, WindowId};

/// The callable part of a command or an inline keymap action
pub type CommandFn = Rc<dyn Fn(&mut CommandContext<'_>) -> anyhow::Result<()>>;

/// Builds the prompt a command asks its argument with
pub type PromptFactory = Rc<dyn Fn(&CommandContext<'_>) -> anyhow::Result<Box<dyn Prompt>>>;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    NoSuchCommand(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NoSuchCommand(name) => write!(f, "No such command: {}", name),
        }
    }
}

impl std::error::Error for CommandError {}

// ============================================================================
// Prefix argument
// ============================================================================

/// Argument given with `C-u` before a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixArg {
    /// `C-u` pressed n times: 4^n
    Universal(u32),
    /// Digits typed after `C-u`
    Number(u32),
}

impl PrefixArg {
    pub fn value(self) -> u32 {
        match self {
            PrefixArg::Universal(n) | PrefixArg::Number(n) => n,
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Everything a command can reach while it runs
pub struct CommandContext<'a> {
    pub app: &'a mut Application,
    /// Window the command was invoked from
    pub window: WindowId,
    /// Last chord of the invoking sequence
    pub keypress: Option<KeyPress>,
    pub prefix_arg: Option<PrefixArg>,
    /// Outcome of the command's prompt, once validated
    pub prompt: Option<PromptOutcome>,
}

impl<'a> CommandContext<'a> {
    pub fn new(app: &'a mut Application, window: WindowId) -> Self {
        Self {
            app,
            window,
            keypress: None,
            prefix_arg: None,
            prompt: None,
        }
    }

    pub fn with_keypress(mut self, keypress: Option<KeyPress>) -> Self {
        self.keypress = keypress;
        self
    }

    pub fn with_prefix_arg(mut self, prefix_arg: Option<PrefixArg>) -> Self {
        self.prefix_arg = prefix_arg;
        self
    }

    /// True for a single `C-u`
    pub fn universal_arg(&self) -> bool {
        self.prefix_arg == Some(PrefixArg::Universal(4))
    }

    /// Buffer shown in the current view of the window
    pub fn buffer(&self) -> anyhow::Result<BufferId> {
        self.app
            .current_buffer(self.window)
            .context("no current buffer")
    }

    pub fn view(&self) -> anyhow::Result<ViewId> {
        self.app.current_view(self.window).context("no current view")
    }

    pub fn minibuffer(&mut self) -> anyhow::Result<&mut Minibuffer> {
        self.app
            .minibuffer_mut(self.window)
            .context("no minibuffer for this window")
    }

    pub fn input(&mut self) -> anyhow::Result<&mut MinibufferInput> {
        Ok(&mut self.minibuffer()?.input)
    }

    pub fn show_info(&mut self, text: impl Into<String>) {
        if let Some(minibuffer) = self.app.minibuffer_mut(self.window) {
            minibuffer.show_info(text);
        }
    }

    /// Run a script in the current buffer
    pub fn run_script(&mut self, script: &str) -> anyhow::Result<()> {
        let buffer = self.buffer()?;
        self.app.run_script(buffer, script);
        Ok(())
    }

    pub fn trigger_action(&mut self, action: PageAction) -> anyhow::Result<()> {
        let buffer = self.buffer()?;
        self.app.trigger_action(buffer, action);
        Ok(())
    }

    /// Post a chord to the current buffer's page
    pub fn send_key(&mut self, key: &str) -> anyhow::Result<()> {
        let buffer = self.buffer()?;
        let key: KeyPress = key.parse()?;
        self.app.send_key_event(buffer, key, false);
        Ok(())
    }

    /// The validated prompt outcome
    pub fn outcome(&self) -> anyhow::Result<&PromptOutcome> {
        self.prompt.as_ref().context("command expects a prompt value")
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A registered command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub doc: String,
    binding: CommandFn,
    prompt: Option<PromptFactory>,
    /// Listed by `M-x`
    pub visible: bool,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, doc: impl Into<String>, binding: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            doc: doc.into(),
            binding: Rc::new(binding),
            prompt: None,
            visible: true,
        }
    }

    /// Ask for an argument with the prompt built by `factory` first
    pub fn with_prompt<P>(&mut self, factory: P) -> &mut Self
    where
        P: Fn(&CommandContext<'_>) -> anyhow::Result<Box<dyn Prompt>> + 'static,
    {
        self.prompt = Some(Rc::new(factory));
        self
    }

    /// Keep the command out of the `M-x` list
    pub fn hidden(&mut self) -> &mut Self {
        self.visible = false;
        self
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    /// Run the command, or open its prompt and run it on validation
    pub fn call(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
        let Some(factory) = &self.prompt else {
            return (self.binding)(ctx);
        };

        let prompt = factory(ctx)?;
        let binding = Rc::clone(&self.binding);
        let (window, keypress, prefix_arg) = (ctx.window, ctx.keypress, ctx.prefix_arg);
        ctx.app.do_prompt(
            window,
            prompt,
            Some(Box::new(move |app: &mut Application, outcome| {
                let mut ctx = CommandContext::new(app, window)
                    .with_keypress(keypress)
                    .with_prefix_arg(prefix_arg);
                ctx.prompt = Some(outcome);
                binding(&mut ctx)
            })),
        );
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("prompt", &self.prompt.is_some())
            .field("visible", &self.visible)
            .finish()
    }
}

/// Commands by name
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        global::register(&mut registry);
        webbuffer::register(&mut registry);
        content_edit::register(&mut registry);
        caret_browsing::register(&mut registry);
        follow::register(&mut registry);
        minibuffer::register(&mut registry);
        tracing::debug!("Registered {} built-in commands", registry.len());
        registry
    }

    /// Register a command; a previous command of the same name is replaced
    pub fn define<F>(&mut self, name: &str, doc: &str, binding: F) -> &mut Command
    where
        F: Fn(&mut CommandContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.insert(Command::new(name, doc, binding))
    }

    pub fn insert(&mut self, command: Command) -> &mut Command {
        match self.commands.entry(command.name.clone()) {
            Entry::Occupied(mut entry) => {
                tracing::debug!("Redefining command {}", entry.key());
                entry.insert(command);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(command),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// The command named `name`, or `NoSuchCommand`
    pub fn require(&self, name: &str) -> Result<&Command, CommandError> {
        self.get(name)
            .ok_or_else(|| CommandError::NoSuchCommand(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All command names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Names listed by `M-x`, sorted
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.commands
            .values()
            .filter(|c| c.visible)
            .map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Leave full screen; bound inline in the full-screen keymap
pub fn exit_full_screen(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    ctx.trigger_action(PageAction::ExitFullScreen)?;
    let buffer = ctx.buffer()?;
    ctx.app.set_fullscreen(buffer, false);
    Ok(())
}
