//! y/n question prompt

use std::rc::Rc;

use crate::keymap::{BuiltinKeymaps, KeymapId};
use crate::minibuffer::{MinibufferInput, Prompt, PromptAction, PromptEnv, PromptValue};

/// Asks a yes/no question; the first `y`/`n` typed answers it
///
/// Global bindings are off while the question is open, and the input only
/// accepts one of `yYnN`.
#[derive(Debug, Clone)]
pub struct YesNoPrompt {
    label: String,
    pub yes: bool,
}

impl YesNoPrompt {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self {
            label: format!("{}[y/n]", label.as_ref()),
            yes: false,
        }
    }
}

impl Prompt for YesNoPrompt {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn keymap(&self, builtin: &BuiltinKeymaps) -> Option<KeymapId> {
        Some(builtin.yes_no)
    }

    fn disables_global_keymap(&self) -> bool {
        true
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        env.input.set_validator(Some(Rc::new(|text: &str| {
            matches!(text, "y" | "Y" | "n" | "N")
        })));
    }

    fn text_edited(&mut self, env: &mut PromptEnv<'_>) -> PromptAction {
        self.yes = matches!(env.input.text(), "y" | "Y");
        PromptAction::Finish
    }

    fn value(&self, _input: &MinibufferInput) -> PromptValue {
        PromptValue::Bool(self.yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_suffix() {
        let prompt = YesNoPrompt::new("[js-confirm] Leave page? ");
        assert_eq!(prompt.label(), "[js-confirm] Leave page? [y/n]");
        assert!(prompt.disables_global_keymap());
    }
}
