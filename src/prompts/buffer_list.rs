//! Buffer switcher prompt

use crate::keymap::{BuiltinKeymaps, KeymapId};
use crate::minibuffer::{
    CompleteOptions, CompletionSource, Prompt, PromptEnv, TableModel,
};
use crate::model::BufferId;

/// One row of the buffer list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferRow {
    pub id: BufferId,
    pub url: String,
    pub title: String,
    /// Shown in some view
    pub visible: bool,
}

/// Fuzzy prompt over the open buffers, most recently used first
#[derive(Debug, Clone)]
pub struct BufferListPrompt {
    label: String,
    buffers: Vec<BufferRow>,
    select_first: bool,
}

impl BufferListPrompt {
    pub fn new(label: impl Into<String>, buffers: Vec<BufferRow>) -> Self {
        Self {
            label: label.into(),
            buffers,
            select_first: false,
        }
    }

    /// Preselect the first row (the current buffer) instead
    pub fn select_first(mut self) -> Self {
        self.select_first = true;
        self
    }

    /// Buffer at a source row
    pub fn buffer_at(&self, row: usize) -> Option<BufferId> {
        self.buffers.get(row).map(|b| b.id)
    }

    /// Forget a row after its buffer was closed
    pub fn remove_row(&mut self, row: usize) {
        if row < self.buffers.len() {
            self.buffers.remove(row);
        }
    }
}

impl Prompt for BufferListPrompt {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn complete_options(&self) -> CompleteOptions {
        CompleteOptions::fuzzy().with_complete_empty()
    }

    fn keymap(&self, builtin: &BuiltinKeymaps) -> Option<KeymapId> {
        Some(builtin.buffer_list)
    }

    fn completer_model(&mut self) -> Option<Box<dyn CompletionSource>> {
        let rows = self
            .buffers
            .iter()
            .map(|b| vec![b.url.clone(), b.title.clone()])
            .collect();
        Some(Box::new(TableModel::new(rows)))
    }

    fn enable(&mut self, env: &mut PromptEnv<'_>) {
        let row = if self.select_first {
            Some(0).filter(|_| !self.buffers.is_empty())
        } else {
            // the most recent buffer not already on screen
            self.buffers.iter().position(|b| !b.visible)
        };
        if let Some(row) = row {
            env.input.select_row(row);
        }
    }
}
