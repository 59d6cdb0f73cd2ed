//! Concrete prompts used by the built-in commands
//!
//! Each prompt takes a snapshot of the data it completes over when it is
//! built, so a session never borrows the application.

mod buffer_list;
mod file;
mod hint;
mod isearch;
mod list;
mod webjump;
mod yes_no;

pub use buffer_list::{BufferListPrompt, BufferRow};
pub use file::FilePrompt;
pub use hint::{HintKind, HintPrompt, SELECTOR_CLICKABLE, SELECTOR_LINK};
pub use isearch::{scroll_to_script, ISearchPrompt, SearchDirection, SCROLL_POS_REQUEST};
pub use list::ListPrompt;
pub use webjump::WebJumpPrompt;
pub use yes_no::YesNoPrompt;

/// Quote `text` as a javascript string literal
pub(crate) fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
