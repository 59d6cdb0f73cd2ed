//! Local file path prompt

use std::path::Path;

use crate::minibuffer::{CompletionSource, FileSystemModel, Prompt, PromptEnv};

/// Prompt for a path, completing over the typed directory
#[derive(Debug, Clone)]
pub struct FilePrompt {
    label: String,
    start_dir: String,
}

impl FilePrompt {
    /// Start in `dir` (the home directory when `None`)
    pub fn new(label: impl Into<String>, dir: Option<&Path>) -> Self {
        let dir = dir
            .map(Path::to_path_buf)
            .or_else(dirs::home_dir)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let start_dir = if dir.is_empty() || dir.ends_with('/') {
            dir
        } else {
            format!("{}/", dir)
        };
        Self {
            label: label.into(),
            start_dir,
        }
    }

    pub fn start_dir(&self) -> &str {
        &self.start_dir
    }
}

impl Prompt for FilePrompt {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn history(&self) -> Option<&str> {
        Some("files")
    }

    fn completer_model(&mut self) -> Option<Box<dyn CompletionSource>> {
        Some(Box::new(FileSystemModel::new()))
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        if self.start_dir.is_empty() {
            return;
        }
        env.input.set_text(self.start_dir.clone());
        if let Some(model) = env.input.popup_mut().source_mut() {
            model.text_changed(&self.start_dir);
        }
    }
}
