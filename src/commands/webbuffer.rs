//! Commands acting on the page shown in the current view

use anyhow::Context as _;

use super::{CommandContext, CommandRegistry};
use crate::bridge::PageAction;
use crate::prompts::{scroll_to_script, BufferListPrompt, ISearchPrompt, SearchDirection};

/// (name, doc, action) for the commands that only trigger an engine action
const ACTION_COMMANDS: &[(&str, &str, PageAction)] = &[
    (
        "go-forward",
        "Navigate forward in history for the current buffer.",
        PageAction::Forward,
    ),
    (
        "go-backward",
        "Navigate backward in history for the current buffer.",
        PageAction::Back,
    ),
    (
        "webcontent-copy",
        "Copy the selection in the current buffer.",
        PageAction::Copy,
    ),
    (
        "webcontent-cut",
        "Cut the selection in the current buffer.",
        PageAction::Cut,
    ),
    (
        "webcontent-paste",
        "Paste the selection in the current buffer.",
        PageAction::Paste,
    ),
    (
        "reload-buffer",
        "Reload the current buffer.",
        PageAction::Reload,
    ),
    (
        "reload-buffer-no-cache",
        "Reload the current buffer bypassing any cache.",
        PageAction::ReloadNoCache,
    ),
    (
        "select-buffer-content",
        "Select all content in the buffer.",
        PageAction::SelectAll,
    ),
    ("zoom-in", "Zoom-in in the buffer.", PageAction::ZoomIn),
    ("zoom-out", "Zoom-out in the buffer.", PageAction::ZoomOut),
    (
        "zoom-normal",
        "Zoom-normal in the buffer.",
        PageAction::ZoomNormal,
    ),
];

/// (name, doc, script)
const SCROLL_COMMANDS: &[(&str, &str, &str)] = &[
    (
        "scroll-down",
        "Scroll the current buffer down a bit.",
        "window.scrollBy(0, 20);",
    ),
    (
        "scroll-up",
        "Scroll the current buffer up a bit.",
        "window.scrollBy(0, -20);",
    ),
    (
        "scroll-top",
        "Scroll the current buffer to the top.",
        "window.scrollTo(0, 0);",
    ),
    (
        "scroll-bottom",
        "Scroll the current buffer to the bottom.",
        "window.scrollTo(0, document.body.scrollHeight);",
    ),
];

/// (name, doc, chord) for the commands replaying a key to the page
const SEND_KEY_COMMANDS: &[(&str, &str, &str)] = &[
    ("send-key-down", "Send a Down key to the page.", "Down"),
    ("send-key-up", "Send an Up key to the page.", "Up"),
    ("send-key-right", "Send a Right key to the page.", "Right"),
    ("send-key-left", "Send a Left key to the page.", "Left"),
    ("buffer-escape", "Send an Esc key to the page.", "Esc"),
];

/// Script scrolling by `pages` window heights, keeping some overlap
fn scroll_page_script(pages: i32) -> String {
    let offset = if pages > 0 { -40 } else { 40 };
    format!(
        "window.scrollTo(0, window.pageYOffset + (window.innerHeight * {}) + {});",
        pages, offset
    )
}

pub fn register(registry: &mut CommandRegistry) {
    for &(name, doc, action) in ACTION_COMMANDS {
        registry.define(name, doc, move |ctx| ctx.trigger_action(action));
    }
    for &(name, doc, script) in SCROLL_COMMANDS {
        registry.define(name, doc, move |ctx| ctx.run_script(script));
    }
    for &(name, doc, key) in SEND_KEY_COMMANDS {
        registry.define(name, doc, move |ctx| ctx.send_key(key));
    }

    registry.define(
        "scroll-page-down",
        "Scroll the current buffer one page down.",
        |ctx| ctx.run_script(&scroll_page_script(1)),
    );
    registry.define(
        "scroll-page-up",
        "Scroll the current buffer one page up.",
        |ctx| ctx.run_script(&scroll_page_script(-1)),
    );

    registry.define(
        "copy-current-buffer-url",
        "Copy the url of the current buffer.",
        |ctx| copy_buffer_field(ctx, |b| b.url.clone()),
    );
    registry.define(
        "copy-current-buffer-title",
        "Copy the title of the current buffer.",
        |ctx| copy_buffer_field(ctx, |b| b.title.clone()),
    );

    register_isearch(registry);

    registry
        .define(
            "buffer-list-close-buffer",
            "Close the buffer selected in the buffer list.",
            close_selected_buffer,
        )
        .hidden();
}

fn copy_buffer_field(
    ctx: &mut CommandContext<'_>,
    field: impl Fn(&crate::model::Buffer) -> String,
) -> anyhow::Result<()> {
    let buffer = ctx.buffer()?;
    let text = field(ctx.app.buffer(buffer).context("no such buffer")?);
    ctx.app.clipboard.set_text(&text);
    ctx.show_info(format!("Copied: {}", text));
    Ok(())
}

fn register_isearch(registry: &mut CommandRegistry) {
    registry
        .define(
            "i-search-forward",
            "Begin an incremental search (forward).",
            |_| Ok(()),
        )
        .with_prompt(|ctx| Ok(Box::new(isearch_prompt(ctx, SearchDirection::Forward))));
    registry
        .define(
            "i-search-backward",
            "Begin an incremental search (backward).",
            |_| Ok(()),
        )
        .with_prompt(|ctx| Ok(Box::new(isearch_prompt(ctx, SearchDirection::Backward))));

    registry
        .define("i-search-next", "Search the next match forward.", |ctx| {
            isearch_again(ctx, SearchDirection::Forward)
        })
        .hidden();
    registry
        .define("i-search-previous", "Search the next match backward.", |ctx| {
            isearch_again(ctx, SearchDirection::Backward)
        })
        .hidden();
    registry
        .define(
            "i-search-validate",
            "Stop searching, staying at the current match.",
            isearch_validate,
        )
        .hidden();
    registry
        .define(
            "i-search-abort",
            "Stop searching and scroll back to where the search started.",
            |ctx| {
                let pos = ctx
                    .minibuffer()?
                    .prompt()
                    .and_then(|p| p.downcast_ref::<ISearchPrompt>())
                    .map(ISearchPrompt::scroll_pos);
                isearch_validate(ctx)?;
                match pos {
                    Some(pos) => ctx.run_script(&scroll_to_script(pos)),
                    None => Ok(()),
                }
            },
        )
        .hidden();
}

fn isearch_prompt(ctx: &CommandContext<'_>, direction: SearchDirection) -> ISearchPrompt {
    let caret_browsing = ctx.app.local_keymap() == Some(ctx.app.builtin.caret_browsing);
    ISearchPrompt::new(direction, caret_browsing)
}

fn isearch_again(ctx: &mut CommandContext<'_>, direction: SearchDirection) -> anyhow::Result<()> {
    let window = ctx.window;
    ctx.app.with_prompt(window, |prompt, env| {
        if let Some(prompt) = prompt.downcast_mut::<ISearchPrompt>() {
            prompt.set_direction(env, direction);
            prompt.find(env);
        }
    });
    Ok(())
}

fn isearch_validate(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    let buffer = ctx.buffer()?;
    // an empty search clears the highlight
    ctx.app.find_text(buffer, "", false);
    let window = ctx.window;
    ctx.app.close_prompt(window);
    Ok(())
}

/// `C-k` in the buffer list: close the selected buffer, drop its row
fn close_selected_buffer(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    let minibuffer = ctx.minibuffer()?;
    let popup = minibuffer.input.popup();
    let Some(source_row) = popup.current().and_then(|row| popup.source_row(row)) else {
        return Ok(());
    };
    let Some(buffer) = minibuffer
        .prompt()
        .and_then(|p| p.downcast_ref::<BufferListPrompt>())
        .and_then(|p| p.buffer_at(source_row))
    else {
        return Ok(());
    };

    if !ctx.app.close_buffer(buffer) {
        return Ok(());
    }

    let minibuffer = ctx.minibuffer()?;
    minibuffer.input.popup_mut().remove_current();
    if let Some(prompt) = minibuffer
        .prompt_mut()
        .and_then(|p| p.downcast_mut::<BufferListPrompt>())
    {
        prompt.remove_row(source_row);
    }
    Ok(())
}
