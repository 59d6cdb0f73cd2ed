//! Kill/yank clipboard
//!
//! Writes go to the system clipboard through arboard when one is available.
//! The last copied text is always kept in memory too, so headless sessions
//! still get working copy and paste.

/// Clipboard used by copy, cut and paste commands
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    use_system: bool,
    last: Option<String>,
}

impl Clipboard {
    /// Clipboard backed by the system clipboard
    pub fn system() -> Self {
        Self {
            use_system: true,
            last: None,
        }
    }

    /// Clipboard that never touches the system clipboard
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: &str) {
        if self.use_system {
            match arboard::Clipboard::new() {
                Ok(mut clipboard) => {
                    if let Err(e) = clipboard.set_text(text) {
                        tracing::debug!("System clipboard write failed: {}", e);
                    }
                }
                Err(e) => tracing::debug!("No system clipboard: {}", e),
            }
        }
        self.last = Some(text.to_string());
    }

    pub fn get_text(&mut self) -> Option<String> {
        if self.use_system {
            if let Ok(mut clipboard) = arboard::Clipboard::new() {
                if let Ok(text) = clipboard.get_text() {
                    return Some(text);
                }
            }
        }
        self.last.clone()
    }
}
