//! Browser entities the dispatch core reasons about
//!
//! Buffers, views and windows live in id-keyed arenas owned by the
//! application; cross references are ids, never owning pointers.

pub mod buffer;
pub mod mode;
pub mod window;

pub use buffer::Buffer;
pub use mode::{KeymapMode, Mode, Modes, NO_KEYBINDINGS_MODE, STANDARD_MODE};
pub use window::{SplitDirection, View, Window};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a web buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Unique identifier for a view (a pane showing one buffer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Unique identifier for a top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// The widget holding keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    View(ViewId),
    /// The minibuffer input of a window
    MinibufferInput(WindowId),
}
