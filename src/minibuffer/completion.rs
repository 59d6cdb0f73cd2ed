//! Completion sources, match modes and the filtered popup model
//!
//! A [`CompletionSource`] is a read-only table; column 0 of a row is the
//! candidate written into the input when the row is chosen. The
//! [`CompletionPopup`] keeps the filtered view of a source: the list of
//! source rows whose cells match the typed text, plus the current row.

use std::fmt;
use std::path::{Path, PathBuf};

/// How typed text is matched against candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The candidate starts with the typed text
    #[default]
    Simple,
    /// Every whitespace-separated part of the typed text occurs, in order
    Fuzzy,
}

/// Completion behaviour requested by a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteOptions {
    pub match_mode: MatchMode,
    /// Show the popup even when the input is empty
    pub complete_empty: bool,
    /// Mirror the selected row into the input as the selection moves
    pub autocomplete: bool,
    /// `complete` adopts the only remaining row
    pub autocomplete_single: bool,
    pub max_visible_items: usize,
}

impl Default for CompleteOptions {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Simple,
            complete_empty: false,
            autocomplete: false,
            autocomplete_single: true,
            max_visible_items: 10,
        }
    }
}

impl CompleteOptions {
    pub fn fuzzy() -> Self {
        Self {
            match_mode: MatchMode::Fuzzy,
            ..Self::default()
        }
    }

    pub fn with_complete_empty(mut self) -> Self {
        self.complete_empty = true;
        self
    }

    /// Turn on selection-follows preview; this turns off autocomplete-single
    pub fn with_autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self.autocomplete_single = false;
        self
    }

    /// Options with the autocomplete/autocomplete-single exclusion applied
    pub fn normalized(mut self) -> Self {
        if self.autocomplete {
            self.autocomplete_single = false;
        }
        self
    }
}

/// A tabular, read-only source of candidates
pub trait CompletionSource {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize {
        1
    }

    /// Cell text; `None` outside the table
    fn data(&self, row: usize, column: usize) -> Option<&str>;

    /// Called with the input text on every user edit, before filtering
    fn text_changed(&mut self, _text: &str) {}

    /// Drop a row (e.g. a closed buffer); returns whether it was removed
    fn remove_row(&mut self, _row: usize) -> bool {
        false
    }
}

/// Rows of strings held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    rows: Vec<Vec<String>>,
}

impl TableModel {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Single column model
    pub fn from_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: items.into_iter().map(|s| vec![s.into()]).collect(),
        }
    }
}

impl CompletionSource for TableModel {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    fn data(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    fn remove_row(&mut self, row: usize) -> bool {
        if row < self.rows.len() {
            self.rows.remove(row);
            true
        } else {
            false
        }
    }
}

/// Directory listing that follows the typed path
///
/// The listed directory is the typed text when it ends with `/`, otherwise
/// its parent. Candidates are full paths.
#[derive(Debug, Clone, Default)]
pub struct FileSystemModel {
    root_dir: String,
    files: Vec<String>,
}

impl FileSystemModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }
}

impl CompletionSource for FileSystemModel {
    fn row_count(&self) -> usize {
        self.files.len()
    }

    fn data(&self, row: usize, column: usize) -> Option<&str> {
        if column != 0 {
            return None;
        }
        self.files.get(row).map(String::as_str)
    }

    fn text_changed(&mut self, text: &str) {
        let root_dir = if text.ends_with('/') {
            text.to_string()
        } else {
            Path::new(text)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        if root_dir == self.root_dir {
            return;
        }

        let entries = match std::fs::read_dir(if root_dir.is_empty() { "." } else { &root_dir }) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", root_dir, e);
                return;
            }
        };
        let mut files: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let path: PathBuf = Path::new(&root_dir).join(entry.file_name());
                path.to_string_lossy().into_owned()
            })
            .collect();
        files.sort();

        self.files = files;
        self.root_dir = root_dir;
    }
}

/// Case-insensitive matcher for one typed text
#[derive(Debug, Clone)]
pub struct Matcher {
    mode: MatchMode,
    parts: Vec<String>,
}

impl Matcher {
    pub fn new(mode: MatchMode, text: &str) -> Self {
        let parts = match mode {
            MatchMode::Simple => vec![text.to_lowercase()],
            MatchMode::Fuzzy => text.split_whitespace().map(str::to_lowercase).collect(),
        };
        Self { mode, parts }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.to_lowercase();
        match self.mode {
            MatchMode::Simple => candidate.starts_with(self.parts[0].as_str()),
            MatchMode::Fuzzy => {
                let mut rest = candidate.as_str();
                for part in &self.parts {
                    match rest.find(part.as_str()) {
                        Some(idx) => rest = &rest[idx + part.len()..],
                        None => return false,
                    }
                }
                true
            }
        }
    }
}

/// Filtered view of a completion source plus popup state
#[derive(Default)]
pub struct CompletionPopup {
    source: Option<Box<dyn CompletionSource>>,
    /// Source rows passing the filter, in source order
    rows: Vec<usize>,
    current: Option<usize>,
    visible: bool,
    pub max_visible_items: usize,
}

impl CompletionPopup {
    pub fn new() -> Self {
        Self {
            max_visible_items: 10,
            ..Self::default()
        }
    }

    pub fn set_source(&mut self, source: Option<Box<dyn CompletionSource>>) {
        self.source = source;
        self.rows.clear();
        self.current = None;
        self.visible = false;
    }

    pub fn take_source(&mut self) -> Option<Box<dyn CompletionSource>> {
        self.rows.clear();
        self.current = None;
        self.visible = false;
        self.source.take()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&dyn CompletionSource> {
        self.source.as_deref()
    }

    pub fn source_mut(&mut self) -> Option<&mut (dyn CompletionSource + 'static)> {
        self.source.as_deref_mut()
    }

    /// Recompute the filtered rows. The current row is dropped.
    pub fn filter(&mut self, mode: MatchMode, text: &str) {
        self.current = None;
        self.rows.clear();
        let Some(source) = self.source.as_deref() else {
            return;
        };
        let matcher = Matcher::new(mode, text);
        let columns = source.column_count().max(1);
        for row in 0..source.row_count() {
            let hit = (0..columns)
                .filter_map(|col| source.data(row, col))
                .any(|cell| matcher.matches(cell));
            if hit {
                self.rows.push(row);
            }
        }
    }

    /// Number of rows passing the filter
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Source row behind a filtered row
    pub fn source_row(&self, row: usize) -> Option<usize> {
        self.rows.get(row).copied()
    }

    /// Candidate text (column 0) of a filtered row
    pub fn candidate(&self, row: usize) -> Option<&str> {
        let source_row = self.source_row(row)?;
        self.source.as_deref()?.data(source_row, 0)
    }

    /// All cells of a filtered row
    pub fn row_cells(&self, row: usize) -> Vec<&str> {
        let (Some(source_row), Some(source)) = (self.source_row(row), self.source.as_deref())
        else {
            return Vec::new();
        };
        (0..source.column_count().max(1))
            .filter_map(|col| source.data(source_row, col))
            .collect()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Select a filtered row; returns whether the current row changed
    pub fn select_row(&mut self, row: usize) -> bool {
        if row >= self.rows.len() || self.current == Some(row) {
            return false;
        }
        self.current = Some(row);
        true
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Remove the current row from the source too; returns the source row
    pub fn remove_current(&mut self) -> Option<usize> {
        let row = self.current?;
        let source_row = self.source_row(row)?;
        if !self.source.as_deref_mut()?.remove_row(source_row) {
            return None;
        }
        self.rows.remove(row);
        for r in self.rows.iter_mut() {
            if *r > source_row {
                *r -= 1;
            }
        }
        self.current = if self.rows.is_empty() {
            None
        } else {
            Some(row.min(self.rows.len() - 1))
        };
        Some(source_row)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Filtered rows the popup would draw, starting at the page holding the
    /// current row
    pub fn visible_rows(&self) -> std::ops::Range<usize> {
        let page = self.max_visible_items.max(1);
        let start = self.current.map_or(0, |c| c / page * page);
        start..(start + page).min(self.rows.len())
    }
}

impl fmt::Debug for CompletionPopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionPopup")
            .field("has_source", &self.source.is_some())
            .field("rows", &self.rows)
            .field("current", &self.current)
            .field("visible", &self.visible)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_match_is_prefix() {
        let m = Matcher::new(MatchMode::Simple, "Go");
        assert!(m.matches("google"));
        assert!(!m.matches("duckduckgo"));

        let m = Matcher::new(MatchMode::Simple, "a b");
        assert!(m.matches("A B c"));
        assert!(!m.matches("xaxxb"));
    }

    #[test]
    fn test_simple_match_escapes_text() {
        let m = Matcher::new(MatchMode::Simple, "a.b");
        assert!(m.matches("a.bc"));
        assert!(!m.matches("axb"));
    }

    #[test]
    fn test_fuzzy_match_parts_in_order() {
        let m = Matcher::new(MatchMode::Fuzzy, "a b");
        assert!(m.matches("xaxxb"));
        assert!(!m.matches("xbxxa"));
        assert!(Matcher::new(MatchMode::Fuzzy, "").matches("anything"));
        assert!(Matcher::new(MatchMode::Fuzzy, "GO").matches("duckduckgo"));
    }

    #[test]
    fn test_filter_any_column() {
        let mut popup = CompletionPopup::new();
        popup.set_source(Some(Box::new(TableModel::new(vec![
            vec!["https://a.org".into(), "Alpha".into()],
            vec!["https://b.org".into(), "Beta".into()],
        ]))));
        popup.filter(MatchMode::Fuzzy, "beta");
        assert_eq!(popup.row_count(), 1);
        assert_eq!(popup.source_row(0), Some(1));
        assert_eq!(popup.candidate(0), Some("https://b.org"));
    }

    #[test]
    fn test_remove_current_row() {
        let mut popup = CompletionPopup::new();
        popup.set_source(Some(Box::new(TableModel::from_strings(["a", "b", "c"]))));
        popup.filter(MatchMode::Simple, "");
        popup.select_row(1);
        assert_eq!(popup.remove_current(), Some(1));
        assert_eq!(popup.row_count(), 2);
        assert_eq!(popup.candidate(1), Some("c"));
        assert_eq!(popup.current(), Some(1));
    }

    #[test]
    fn test_file_system_model_lists_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.txt"), "").unwrap();
        std::fs::write(dir.path().join("two.txt"), "").unwrap();

        let mut model = FileSystemModel::new();
        let root = format!("{}/", dir.path().display());
        model.text_changed(&root);
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.data(0, 0), Some(format!("{}one.txt", root).as_str()));
    }

    #[test]
    fn test_options_autocomplete_excludes_single() {
        let opts = CompleteOptions::default().with_autocomplete();
        assert!(!opts.autocomplete_single);
        let opts = CompleteOptions {
            autocomplete: true,
            ..CompleteOptions::default()
        }
        .normalized();
        assert!(!opts.autocomplete_single);
    }
}
