//! Commands bound in the minibuffer keymap
//!
//! They all act on the input of the invoking window's minibuffer and are
//! hidden from `M-x`.

use anyhow::Context as _;

use super::{CommandContext, CommandRegistry};
use crate::app::Application;
use crate::clipboard::Clipboard;
use crate::minibuffer::MinibufferInput;

pub fn register(registry: &mut CommandRegistry) {
    registry
        .define("minibuffer-select-complete", "Complete completion.", |ctx| {
            let input = ctx.input()?;
            if input.popup().is_visible() {
                input.select_next_completion(true);
            } else {
                input.show_completions();
            }
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-select-next", "Select next completion entry.", |ctx| {
            ctx.input()?.select_next_completion(true);
            Ok(())
        })
        .hidden();
    registry
        .define(
            "minibuffer-select-prev",
            "Select previous completion entry.",
            |ctx| {
                ctx.input()?.select_next_completion(false);
                Ok(())
            },
        )
        .hidden();
    registry
        .define("minibuffer-select-first", "Select first completion entry.", |ctx| {
            ctx.input()?.select_first_completion();
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-select-last", "Select last completion entry.", |ctx| {
            ctx.input()?.select_last_completion();
            Ok(())
        })
        .hidden();
    registry
        .define(
            "minibuffer-select-next-page",
            "Move one page down in completion entry list.",
            |ctx| {
                ctx.input()?.select_next_page_completion(true);
                Ok(())
            },
        )
        .hidden();
    registry
        .define(
            "minibuffer-select-prev-page",
            "Move one page up in completion entry list.",
            |ctx| {
                ctx.input()?.select_next_page_completion(false);
                Ok(())
            },
        )
        .hidden();

    registry
        .define("minibuffer-history-next", "Insert next history value.", |ctx| {
            history_step(ctx, true)
        })
        .hidden();
    registry
        .define(
            "minibuffer-history-prev",
            "Insert previous history value.",
            |ctx| history_step(ctx, false),
        )
        .hidden();

    registry
        .define("minibuffer-validate", "Validate input in minibuffer.", |ctx| {
            let input = ctx.input()?;
            input.complete(true);
            input.popup_mut().hide();
            let window = ctx.window;
            ctx.app.submit_prompt(window);
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-abort", "Abort edition of the minibuffer.", |ctx| {
            ctx.input()?.popup_mut().hide();
            let window = ctx.window;
            ctx.app.close_prompt(window);
            Ok(())
        })
        .hidden();

    registry
        .define("minibuffer-mark", "Set or unset the edit mark.", |ctx| {
            let input = ctx.input()?;
            if !input.set_mark(None) {
                input.deselect();
            }
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-forward-char", "Move one character forward.", |ctx| {
            ctx.input()?.cursor_forward();
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-backward-char", "Move one character backward.", |ctx| {
            ctx.input()?.cursor_backward();
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-forward-word", "Move one word forward.", |ctx| {
            ctx.input()?.word_forward();
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-backward-word", "Move one word backward.", |ctx| {
            ctx.input()?.word_backward();
            Ok(())
        })
        .hidden();
    registry
        .define(
            "minibuffer-beginning-of-line",
            "Move cursor to the beginning of the line.",
            |ctx| {
                ctx.input()?.home();
                Ok(())
            },
        )
        .hidden();
    registry
        .define(
            "minibuffer-end-of-line",
            "Move cursor to the end of the line.",
            |ctx| {
                ctx.input()?.end();
                Ok(())
            },
        )
        .hidden();

    registry
        .define("minibuffer-copy", "Copy selected text in the minibuffer.", |ctx| {
            with_clipboard(ctx, |input, clipboard| {
                input.copy(clipboard);
                input.deselect();
            })
        })
        .hidden();
    registry
        .define("minibuffer-cut", "Cut selected text in the minibuffer.", |ctx| {
            with_clipboard(ctx, |input, clipboard| {
                input.cut(clipboard);
            })
        })
        .hidden();
    registry
        .define("minibuffer-paste", "Paste text in the minibuffer.", |ctx| {
            with_clipboard(ctx, |input, clipboard| {
                input.paste(clipboard);
            })
        })
        .hidden();
    registry
        .define(
            "minibuffer-delete-forward-char",
            "Delete forward character.",
            |ctx| {
                ctx.input()?.delete_char();
                Ok(())
            },
        )
        .hidden();
    registry
        .define("minibuffer-delete-forward-word", "Delete forward word.", |ctx| {
            ctx.input()?.delete_word(true);
            Ok(())
        })
        .hidden();
    registry
        .define(
            "minibuffer-delete-backward-word",
            "Delete the word backward.",
            |ctx| {
                ctx.input()?.delete_word(false);
                Ok(())
            },
        )
        .hidden();
    registry
        .define("minibuffer-undo", "Undo in the minibuffer.", |ctx| {
            ctx.input()?.undo();
            Ok(())
        })
        .hidden();
    registry
        .define("minibuffer-redo", "Redo in the minibuffer.", |ctx| {
            ctx.input()?.redo();
            Ok(())
        })
        .hidden();
}

/// Replace the input with the next or previous value of the prompt history
fn history_step(ctx: &mut CommandContext<'_>, forward: bool) -> anyhow::Result<()> {
    let window = ctx.window;
    let Application {
        windows, histories, ..
    } = &mut *ctx.app;
    let minibuffer = &mut windows.get_mut(&window).context("no such window")?.minibuffer;
    let Some(key) = minibuffer.prompt().and_then(|p| p.history()) else {
        return Ok(());
    };
    let history = histories.get_mut(key);
    if history.in_user_value() {
        history.set_user_value(minibuffer.input.text());
    }
    let text = if forward {
        history.get_next()
    } else {
        history.get_previous()
    };
    minibuffer.input.set_text(text);
    Ok(())
}

fn with_clipboard(
    ctx: &mut CommandContext<'_>,
    f: impl FnOnce(&mut MinibufferInput, &mut Clipboard),
) -> anyhow::Result<()> {
    let window = ctx.window;
    let Application {
        windows, clipboard, ..
    } = &mut *ctx.app;
    let window = windows.get_mut(&window).context("no such window")?;
    f(&mut window.minibuffer.input, clipboard);
    Ok(())
}
