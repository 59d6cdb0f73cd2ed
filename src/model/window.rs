//! Windows and the views they contain

use super::{BufferId, ViewId, WindowId};
use crate::minibuffer::Minibuffer;

/// How a view was split off its neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Right,
    Bottom,
}

/// A pane displaying one buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub id: ViewId,
    pub window: WindowId,
    pub buffer: BufferId,
    pub split: Option<SplitDirection>,
}

/// A top-level window: views plus a minibuffer
#[derive(Debug)]
pub struct Window {
    pub id: WindowId,
    /// Views in layout order
    views: Vec<ViewId>,
    current_view: ViewId,
    pub fullscreen: bool,
    pub minibuffer: Minibuffer,
}

impl Window {
    pub fn new(id: WindowId, first_view: ViewId, minibuffer: Minibuffer) -> Self {
        Self {
            id,
            views: vec![first_view],
            current_view: first_view,
            fullscreen: false,
            minibuffer,
        }
    }

    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    pub fn current_view(&self) -> ViewId {
        self.current_view
    }

    pub fn set_current_view(&mut self, view: ViewId) {
        if self.views.contains(&view) {
            self.current_view = view;
        }
    }

    /// Insert `view` right after the current one
    pub fn insert_view(&mut self, view: ViewId) {
        let pos = self
            .views
            .iter()
            .position(|v| *v == self.current_view)
            .map_or(self.views.len(), |p| p + 1);
        self.views.insert(pos, view);
    }

    /// The view after the current one, wrapping around
    pub fn next_view(&self) -> ViewId {
        let pos = self
            .views
            .iter()
            .position(|v| *v == self.current_view)
            .unwrap_or(0);
        self.views[(pos + 1) % self.views.len()]
    }

    /// Remove a view; the last view of a window is never removed
    pub fn remove_view(&mut self, view: ViewId) -> bool {
        if self.views.len() < 2 {
            return false;
        }
        let Some(pos) = self.views.iter().position(|v| *v == view) else {
            return false;
        };
        self.views.remove(pos);
        if self.current_view == view {
            self.current_view = self.views[pos.min(self.views.len() - 1)];
        }
        true
    }
}
