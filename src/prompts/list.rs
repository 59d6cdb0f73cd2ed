//! Prompt choosing one name from a fixed list

use crate::minibuffer::{
    CompleteOptions, CompletionSource, Prompt, PromptEnv, TableModel,
};

/// Fuzzy prompt over a list of names, shown as soon as it opens
///
/// Used for `M-x` and for the describe and mode commands. With
/// `require_match`, Return is refused until the text names an item.
#[derive(Debug, Clone)]
pub struct ListPrompt {
    label: String,
    items: Vec<(String, String)>,
    history: Option<String>,
    require_match: bool,
    initial: Option<String>,
}

impl ListPrompt {
    pub fn new<I, S>(label: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            items: items
                .into_iter()
                .map(|name| (name.into(), String::new()))
                .collect(),
            history: None,
            require_match: false,
            initial: None,
        }
    }

    /// Items with a second, descriptive column
    pub fn with_descriptions(label: impl Into<String>, items: Vec<(String, String)>) -> Self {
        Self {
            items,
            ..Self::new(label, Vec::<String>::new())
        }
    }

    /// The `M-x` prompt over visible command names
    pub fn commands<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        Self::new("M-x: ", names).with_history("commands")
    }

    pub fn with_history(mut self, name: impl Into<String>) -> Self {
        self.history = Some(name.into());
        self
    }

    pub fn require_match(mut self) -> Self {
        self.require_match = true;
        self
    }

    /// Preselect the row whose name is `name`
    pub fn with_initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(name, _)| name.as_str())
    }
}

impl Prompt for ListPrompt {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn complete_options(&self) -> CompleteOptions {
        CompleteOptions::fuzzy().with_complete_empty()
    }

    fn history(&self) -> Option<&str> {
        self.history.as_deref()
    }

    fn completer_model(&mut self) -> Option<Box<dyn CompletionSource>> {
        let with_docs = self.items.iter().any(|(_, doc)| !doc.is_empty());
        let rows = self
            .items
            .iter()
            .map(|(name, doc)| {
                if with_docs {
                    vec![name.clone(), doc.clone()]
                } else {
                    vec![name.clone()]
                }
            })
            .collect();
        Some(Box::new(TableModel::new(rows)))
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        let Some(initial) = &self.initial else {
            return;
        };
        if let Some(row) = self.items.iter().position(|(name, _)| name == initial) {
            env.input.select_row(row);
        }
    }

    fn validate(&self, text: &str) -> Result<(), String> {
        if !self.require_match || self.items.iter().any(|(name, _)| name == text) {
            Ok(())
        } else {
            Err(format!("[No match: {}]", text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_prompt_is_sorted() {
        let prompt = ListPrompt::commands(["quit", "go-to", "M-x"]);
        assert_eq!(prompt.items().collect::<Vec<_>>(), ["M-x", "go-to", "quit"]);
        assert_eq!(prompt.label(), "M-x: ");
        assert_eq!(prompt.history(), Some("commands"));
    }

    #[test]
    fn test_require_match() {
        let prompt = ListPrompt::new("describe variable: ", ["home-page"]).require_match();
        assert!(prompt.validate("home-page").is_ok());
        assert!(prompt.validate("home").is_err());
    }
}
