//! Prompt sessions on a window's minibuffer
//!
//! `do_prompt` attaches a prompt, `submit_prompt` validates it and runs the
//! continuation, `close_prompt` aborts it. Both exits go through the same
//! teardown, so the input, completer model, focus and keymaps are restored
//! whichever way a session ends.

use super::Application;
use crate::minibuffer::{
    AbortHandler, ActivePrompt, Continuation, Minibuffer, Prompt, PromptAction, PromptEnv,
    PromptOutcome,
};
use crate::keymap::KeyPress;
use crate::model::{FocusTarget, WindowId};

impl Application {
    /// Lend the active prompt of `window` its environment
    pub(crate) fn with_prompt<R>(
        &mut self,
        window: WindowId,
        f: impl FnOnce(&mut (dyn Prompt + 'static), &mut PromptEnv<'_>) -> R,
    ) -> Option<R> {
        let buffer = self.current_buffer(window)?;
        let Application {
            windows, bridge, ..
        } = self;
        let Minibuffer {
            label,
            input,
            prompt,
            ..
        } = &mut windows.get_mut(&window)?.minibuffer;
        let active = prompt.as_mut()?;
        let mut env = PromptEnv {
            label,
            input,
            bridge: bridge.as_mut(),
            buffer,
            generation: active.generation,
        };
        Some(f(active.prompt.as_mut(), &mut env))
    }

    /// Attach `prompt` to the minibuffer of `window`
    ///
    /// A prompt already open there is aborted first. `on_finished` runs with
    /// the outcome once the prompt is validated. Returns the generation of
    /// the new session.
    pub fn do_prompt(
        &mut self,
        window: WindowId,
        mut prompt: Box<dyn Prompt>,
        on_finished: Option<Continuation>,
    ) -> u64 {
        if self.minibuffer(window).is_some_and(Minibuffer::has_prompt) {
            self.close_prompt(window);
        }

        let label = prompt.label();
        let keymap = prompt.keymap(&self.builtin);
        let options = prompt.complete_options();
        let complete_empty = options.complete_empty;
        let model = prompt.completer_model();
        if self.minibuffer(window).is_none() {
            tracing::warn!("No minibuffer for window {}", window.0);
            return 0;
        }
        if prompt.disables_global_keymap() {
            self.set_global_keymap_enabled(false);
        }

        let Some(minibuffer) = self.minibuffer_mut(window) else {
            return 0;
        };
        minibuffer.label = label.clone();
        let input = &mut minibuffer.input;
        input.set_prompt_keymap(keymap);
        input.reinit();
        input.set_mark(Some(false));
        input.show();
        let generation = minibuffer.next_generation();
        minibuffer.prompt = Some(ActivePrompt {
            prompt,
            generation,
            on_finished,
            on_aborted: None,
        });

        self.set_focus(FocusTarget::MinibufferInput(window));

        if let Some(minibuffer) = self.minibuffer_mut(window) {
            minibuffer.input.set_completer_model(model);
            minibuffer.input.configure_completer(options);
            if complete_empty {
                minibuffer.input.show_completions();
            }
        }
        self.with_prompt(window, |prompt, env| prompt.enable(env));
        // edits made by enable() are not user edits
        if let Some(minibuffer) = self.minibuffer_mut(window) {
            minibuffer.input.take_edited();
        }

        tracing::debug!("prompt {:?} opened (generation {})", label, generation);
        generation
    }

    /// Run `handler` if the active prompt of `window` is aborted
    pub fn on_prompt_aborted(&mut self, window: WindowId, handler: AbortHandler) {
        if let Some(active) = self
            .minibuffer_mut(window)
            .and_then(|m| m.prompt.as_mut())
        {
            active.on_aborted = Some(handler);
        }
    }

    /// Detach the prompt and restore the minibuffer, focus and keymaps
    fn teardown_prompt(&mut self, window: WindowId) -> Option<ActivePrompt> {
        self.with_prompt(window, |prompt, env| prompt.close(env));

        let minibuffer = self.minibuffer_mut(window)?;
        let active = minibuffer.prompt.take()?;
        minibuffer.label.clear();
        // hidden first so that losing focus restores the view keymap
        minibuffer.input.popup_mut().hide();

        if let Some(view) = self.current_view(window) {
            self.set_focus(FocusTarget::View(view));
        }

        if let Some(minibuffer) = self.minibuffer_mut(window) {
            let input = &mut minibuffer.input;
            input.hide();
            input.set_mark(Some(false));
            input.clear_completer_model();
            input.set_prompt_keymap(None);
            input.take_edited();
            input.take_activation();
        }
        self.set_global_keymap_enabled(true);
        if let Some(history) = active.prompt.history() {
            self.histories.get_mut(history).reset();
        }
        self.hooks.prompt_closed.fire(&window);
        tracing::debug!("prompt closed (generation {})", active.generation);
        Some(active)
    }

    /// Validate the prompt of `window` and hand its value to the continuation
    ///
    /// A value refused by the prompt keeps it open with the reason shown.
    pub fn submit_prompt(&mut self, window: WindowId) {
        self.sync_minibuffer(window);

        let Some(window_state) = self.windows.get_mut(&window) else {
            return;
        };
        let minibuffer = &mut window_state.minibuffer;
        let Some(active) = minibuffer.prompt.as_ref() else {
            return;
        };
        let text = minibuffer.input.text().to_string();
        if let Err(message) = active.prompt.validate(&text) {
            minibuffer.input.set_right_italic_text(message);
            return;
        }
        let value = active.prompt.value(&minibuffer.input);
        let index = minibuffer.input.activated_index();
        if let Some(history) = active.prompt.history() {
            if !text.is_empty() {
                self.histories.get_mut(history).push(text);
            }
        }

        let Some(active) = self.teardown_prompt(window) else {
            return;
        };
        let outcome = PromptOutcome {
            value,
            index,
            prompt: active.prompt,
        };
        if let Some(on_finished) = active.on_finished {
            if let Err(e) = on_finished(self, outcome) {
                tracing::error!("Error calling command: {:#}", e);
            }
        }
    }

    /// Abort the prompt of `window`
    pub fn close_prompt(&mut self, window: WindowId) {
        if let Some(active) = self.teardown_prompt(window) {
            if let Some(on_aborted) = active.on_aborted {
                on_aborted(self);
            }
        }
    }

    /// Let the prompt see a key nothing else handled
    pub(crate) fn prompt_handle_key(&mut self, window: WindowId, key: &KeyPress) -> bool {
        self.with_prompt(window, |prompt, env| prompt.handle_key(env, key))
            .unwrap_or(false)
    }

    /// Apply what the prompt asked for after an event
    pub(crate) fn apply_prompt_action(&mut self, window: WindowId, action: Option<PromptAction>) {
        match action {
            Some(PromptAction::Finish) => self.submit_prompt(window),
            Some(PromptAction::Abort) => self.close_prompt(window),
            Some(PromptAction::Continue) | None => {}
        }
    }

    /// Propagate input edits and completion activations to the prompt
    pub(crate) fn sync_minibuffer(&mut self, window: WindowId) {
        let Some(minibuffer) = self.minibuffer_mut(window) else {
            return;
        };
        let edited = minibuffer.input.take_edited();
        if !minibuffer.has_prompt() {
            minibuffer.input.take_activation();
            return;
        }

        if edited {
            minibuffer.input.update_completions();
            let action = self.with_prompt(window, |prompt, env| prompt.text_edited(env));
            if matches!(action, Some(PromptAction::Finish | PromptAction::Abort)) {
                self.apply_prompt_action(window, action);
                return;
            }
        }

        let activation = self
            .minibuffer_mut(window)
            .and_then(|m| m.input.take_activation());
        if let Some(index) = activation {
            self.with_prompt(window, |prompt, env| {
                prompt.completion_activated(env, index)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::bridge::RecordingBridge;
    use crate::minibuffer::TextPrompt;

    fn app() -> Application {
        Application::with_defaults(Box::new(RecordingBridge::new())).unwrap()
    }

    #[test]
    fn test_prompt_takes_focus_and_keymap() {
        let mut app = app();
        let window = app.current_window();
        let generation = app.do_prompt(window, Box::new(TextPrompt::new("name: ")), None);
        assert_eq!(generation, 1);
        assert_eq!(app.focus(), FocusTarget::MinibufferInput(window));
        assert_eq!(app.local_keymap(), Some(app.builtin.minibuffer));
        let minibuffer = app.minibuffer(window).unwrap();
        assert_eq!(minibuffer.label, "name: ");
        assert!(minibuffer.input.is_visible());
    }

    #[test]
    fn test_submit_runs_continuation_after_teardown() {
        let mut app = app();
        let window = app.current_window();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        app.do_prompt(
            window,
            Box::new(TextPrompt::new("name: ").with_history("names")),
            Some(Box::new(move |app: &mut Application, outcome: PromptOutcome| {
                assert!(!app.minibuffer_focused());
                *sink.borrow_mut() = Some(outcome.text().to_string());
                Ok(())
            })),
        );
        app.type_text("bob");
        app.submit_prompt(window);

        assert_eq!(seen.borrow().as_deref(), Some("bob"));
        let minibuffer = app.minibuffer(window).unwrap();
        assert!(!minibuffer.has_prompt());
        assert!(!minibuffer.input.is_visible());
        assert!(minibuffer.input.completer_model().is_none());
        assert_eq!(app.histories.get("names").unwrap().len(), 1);
        assert_eq!(app.local_keymap(), Some(app.builtin.webbuffer));
    }

    #[test]
    fn test_new_prompt_aborts_previous() {
        let mut app = app();
        let window = app.current_window();
        let aborted = Rc::new(RefCell::new(false));
        app.do_prompt(window, Box::new(TextPrompt::new("a: ")), None);
        let flag = aborted.clone();
        app.on_prompt_aborted(window, Box::new(move |_| *flag.borrow_mut() = true));
        let generation = app.do_prompt(window, Box::new(TextPrompt::new("b: ")), None);
        assert!(*aborted.borrow());
        assert_eq!(generation, 2);
        assert_eq!(app.minibuffer(window).unwrap().label, "b: ");
    }

    #[test]
    fn test_prompt_on_missing_window_keeps_global_keymap() {
        let mut app = app();
        let generation = app.do_prompt(
            WindowId(999),
            Box::new(crate::prompts::YesNoPrompt::new("sure? ")),
            None,
        );
        assert_eq!(generation, 0);
        assert!(app.keyboard.global_keymap_enabled());
        assert!(!app.minibuffer_focused());
    }
}
