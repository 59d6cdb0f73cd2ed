//! The url/webjump prompt behind `go-to` and `search-default`

use crate::minibuffer::{
    CompleteOptions, CompletionSource, Prompt, PromptEnv, TableModel,
};
use crate::webjump::WebJumps;

/// Prompt for an url or a webjump, completing webjump names
#[derive(Debug, Clone)]
pub struct WebJumpPrompt {
    /// (name, doc, suffix) of every webjump
    jumps: Vec<(String, String, &'static str)>,
    /// Open the result in a new buffer
    pub new_buffer: bool,
    initial: Option<String>,
    select_initial: bool,
}

impl WebJumpPrompt {
    pub fn new(webjumps: &WebJumps) -> Self {
        Self {
            jumps: webjumps
                .iter()
                .map(|j| (j.name.clone(), j.doc.clone(), j.completion_suffix()))
                .collect(),
            new_buffer: false,
            initial: None,
            select_initial: false,
        }
    }

    pub fn in_new_buffer(mut self, new_buffer: bool) -> Self {
        self.new_buffer = new_buffer;
        self
    }

    /// Start with the url of the current buffer, selected
    pub fn with_current_url(mut self, url: impl Into<String>) -> Self {
        self.initial = Some(url.into());
        self.select_initial = true;
        self
    }

    /// Start with the default webjump, ready for its argument
    pub fn with_default_webjump(mut self, name: &str) -> Self {
        if name.is_empty() {
            return self;
        }
        let text = match self.suffix_of(name) {
            Some(suffix) => format!("{}{}", name, suffix),
            None => name.to_string(),
        };
        self.initial = Some(text);
        self.select_initial = false;
        self
    }

    fn suffix_of(&self, name: &str) -> Option<&'static str> {
        self.jumps
            .iter()
            .find(|(jump, _, _)| jump == name)
            .map(|(_, _, suffix)| *suffix)
    }
}

impl Prompt for WebJumpPrompt {
    fn label(&self) -> String {
        if self.new_buffer {
            "url/webjump: (new buffer)".to_string()
        } else {
            "url/webjump:".to_string()
        }
    }

    fn complete_options(&self) -> CompleteOptions {
        CompleteOptions::default().with_autocomplete()
    }

    fn history(&self) -> Option<&str> {
        Some("webjump")
    }

    fn completer_model(&mut self) -> Option<Box<dyn CompletionSource>> {
        let rows = self
            .jumps
            .iter()
            .map(|(name, doc, _)| vec![name.clone(), doc.clone()])
            .collect();
        Some(Box::new(TableModel::new(rows)))
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        if let Some(text) = &self.initial {
            env.input.set_text(text.clone());
            if self.select_initial {
                env.input.set_selection(0, text.chars().count());
            }
        }
    }

    fn completion_activated(&mut self, env: &mut PromptEnv<'_>, _index: usize) {
        let chosen = env.input.text().to_string();
        if let Some(suffix) = self.suffix_of(&chosen) {
            env.input.set_text(format!("{}{}", chosen, suffix));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_marks_new_buffer() {
        let jumps = WebJumps::with_defaults();
        assert_eq!(WebJumpPrompt::new(&jumps).label(), "url/webjump:");
        assert_eq!(
            WebJumpPrompt::new(&jumps).in_new_buffer(true).label(),
            "url/webjump: (new buffer)"
        );
    }

    #[test]
    fn test_default_webjump_gets_suffix() {
        let jumps = WebJumps::with_defaults();
        let prompt = WebJumpPrompt::new(&jumps).with_default_webjump("google");
        assert_eq!(prompt.initial.as_deref(), Some("google "));
        let prompt = WebJumpPrompt::new(&jumps).with_default_webjump("file");
        assert_eq!(prompt.initial.as_deref(), Some("file://"));
    }
}
