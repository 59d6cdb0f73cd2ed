//! Editing commands for the focused editable element of a page
//!
//! Cursor motion is replayed to the page as synthetic keys (with shift held
//! while the buffer's text-edit mark is set); everything else runs a
//! `textedit` script.

use anyhow::Context as _;

use super::{CommandContext, CommandRegistry};
use crate::bridge::PageAction;
use crate::keymap::{KeyCode, KeyPress, Modifiers};

/// Post `key` to the current page, extending the selection when the mark is set
fn send_raw_key(
    ctx: &mut CommandContext<'_>,
    key: KeyCode,
    with_ctrl: bool,
    auto_shift: bool,
) -> anyhow::Result<()> {
    let buffer = ctx.buffer()?;
    let shift = auto_shift
        && ctx
            .app
            .buffer(buffer)
            .is_some_and(|b| b.text_edit_mark);
    let mods = if with_ctrl {
        Modifiers::CTRL
    } else {
        Modifiers::NONE
    };
    ctx.app
        .send_key_event(buffer, KeyPress::new(key, mods), shift);
    Ok(())
}

fn set_text_edit_mark(ctx: &mut CommandContext<'_>, on: bool) -> anyhow::Result<()> {
    let buffer = ctx.buffer()?;
    ctx.app
        .buffer_mut(buffer)
        .context("no such buffer")?
        .text_edit_mark = on;
    Ok(())
}

fn text_edit_mark(ctx: &CommandContext<'_>) -> bool {
    ctx.buffer()
        .ok()
        .and_then(|b| ctx.app.buffer(b))
        .is_some_and(|b| b.text_edit_mark)
}

/// Run a selecting script, then delete what it selected
fn delete_with(ctx: &mut CommandContext<'_>, script: &str) -> anyhow::Result<()> {
    ctx.run_script(script)?;
    send_raw_key(ctx, KeyCode::Backspace, false, false)?;
    set_text_edit_mark(ctx, false)
}

pub fn register(registry: &mut CommandRegistry) {
    registry.define(
        "content-edit-cancel",
        "If a mark is active, clear that but keep the focus. If there is no mark active, then just unfocus the editable js object.",
        |ctx| {
            if text_edit_mark(ctx) {
                ctx.run_script("textedit.clear_mark();")?;
            } else {
                ctx.run_script("textedit.blur();")?;
            }
            set_text_edit_mark(ctx, false)
        },
    );
    registry.define(
        "content-edit-set-mark",
        "Set or clear the mark in browser text field.",
        |ctx| {
            let mark = text_edit_mark(ctx);
            if mark {
                ctx.run_script("textedit.clear_mark();")?;
            }
            set_text_edit_mark(ctx, !mark)
        },
    );

    registry.define(
        "content-edit-forward-char",
        "Move one character forward in browser text field.",
        |ctx| send_raw_key(ctx, KeyCode::Right, false, true),
    );
    registry.define(
        "content-edit-backward-char",
        "Move one character backward in browser text field.",
        |ctx| send_raw_key(ctx, KeyCode::Left, false, true),
    );
    registry.define(
        "content-edit-forward-word",
        "Move one word forward in browser text field.",
        |ctx| send_raw_key(ctx, KeyCode::Right, true, true),
    );
    registry.define(
        "content-edit-backward-word",
        "Move one word backward in browser text field.",
        |ctx| send_raw_key(ctx, KeyCode::Left, true, true),
    );
    registry.define(
        "content-edit-beginning-of-line",
        "Move to the beginning of the line in browser text field.",
        |ctx| send_raw_key(ctx, KeyCode::Home, false, true),
    );
    registry.define(
        "content-edit-end-of-line",
        "Move to the end of the line in browser text field.",
        |ctx| send_raw_key(ctx, KeyCode::End, false, true),
    );

    registry.define(
        "content-edit-delete-forward-char",
        "Delete one character forward in browser text field.",
        |ctx| delete_with(ctx, "textedit.select_text('forward', 'character');"),
    );
    registry.define(
        "content-edit-delete-forward-word",
        "Delete one word forward in browser text field.",
        |ctx| delete_with(ctx, "textedit.select_text('forward', 'word');"),
    );
    registry.define(
        "content-edit-delete-backward-word",
        "Delete one word backward in browser text field.",
        |ctx| delete_with(ctx, "textedit.select_text('backward', 'word');"),
    );

    registry.define(
        "content-edit-copy",
        "Copy browser text field selection in the clipboard.",
        |ctx| {
            set_text_edit_mark(ctx, false)?;
            ctx.run_script("textedit.copy_text(true);")
        },
    );
    registry.define(
        "content-edit-cut",
        "Cut browser text field selection in the clipboard.",
        |ctx| delete_with(ctx, "textedit.copy_text();"),
    );

    registry.define(
        "content-edit-upcase-forward-word",
        "Upcase the word forward in browser text field.",
        |ctx| ctx.run_script("textedit.upcase_word();"),
    );
    registry.define(
        "content-edit-downcase-forward-word",
        "Downcase the word forward in browser text field.",
        |ctx| ctx.run_script("textedit.downcase_word();"),
    );
    registry.define(
        "content-edit-capitalize-forward-word",
        "Capitalize the word forward in browser text field.",
        |ctx| ctx.run_script("textedit.capitalize_word();"),
    );

    registry.define(
        "content-edit-undo",
        "Undo the last editing action.",
        |ctx| ctx.trigger_action(PageAction::Undo),
    );
    registry.define(
        "content-edit-redo",
        "Redo the last editing action.",
        |ctx| ctx.trigger_action(PageAction::Redo),
    );
}
