//! Typed hook lists
//!
//! A hook is an ordered list of callbacks that all receive the same event.
//! Application-level hooks are grouped in [`AppHooks`].

use std::fmt;
use std::rc::Rc;

use crate::keymap::KeymapId;
use crate::model::{BufferId, WindowId};

pub type HookFn<T> = Rc<dyn Fn(&T)>;

/// Callbacks for one kind of event
pub struct Hook<T> {
    callbacks: Vec<HookFn<T>>,
}

impl<T> Hook<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add(&mut self, callback: impl Fn(&T) + 'static) {
        self.callbacks.push(Rc::new(callback));
    }

    pub fn fire(&self, event: &T) {
        for callback in &self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> Default for Hook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({} callbacks)", self.callbacks.len())
    }
}

/// Hooks fired by the application
#[derive(Debug, Default)]
pub struct AppHooks {
    /// The local keymap changed (None: only the global keymap applies)
    pub local_mode_changed: Hook<Option<KeymapId>>,
    /// A prompt was closed, validated or not
    pub prompt_closed: Hook<WindowId>,
    pub buffer_created: Hook<BufferId>,
    /// Name of a variable whose value changed
    pub variable_changed: Hook<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_fire_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut hook: Hook<u32> = Hook::new();
        for tag in ["a", "b"] {
            let seen = seen.clone();
            hook.add(move |n| seen.borrow_mut().push(format!("{}{}", tag, n)));
        }
        hook.fire(&1);
        assert_eq!(*seen.borrow(), vec!["a1", "b1"]);
        assert_eq!(hook.len(), 2);
    }
}
