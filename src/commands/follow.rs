//! Hint commands: follow a link or copy it, choosing it by hint number

use super::{CommandContext, CommandRegistry};
use crate::prompts::HintPrompt;

const CLICK_ACTIVE_HINT: &str =
    "if (hints.activeHint) { clickLike(hints.activeHint.obj); true; } else { false; }";

pub fn register(registry: &mut CommandRegistry) {
    registry
        .define(
            "follow",
            "Hint links in the buffer and follow them on selection.",
            follow,
        )
        .with_prompt(|ctx| Ok(Box::new(HintPrompt::follow(ctx.universal_arg()))));

    registry
        .define("copy-link", "Hint links in the buffer to copy them.", copy_link)
        .with_prompt(|ctx| {
            let url = ctx
                .buffer()
                .ok()
                .and_then(|b| ctx.app.buffer(b))
                .map(|b| b.url.clone())
                .unwrap_or_default();
            Ok(Box::new(HintPrompt::copy_link(url)))
        });

    registry
        .define("hint-abort", "Stop hinting and close the prompt.", |ctx| {
            let window = ctx.window;
            ctx.app.close_prompt(window);
            Ok(())
        })
        .hidden();
    registry
        .define("hint-select-next", "Activate the next hint.", |ctx| {
            ctx.run_script("hints.activateNextHint(false);")
        })
        .hidden();
    registry
        .define("hint-select-prev", "Activate the previous hint.", |ctx| {
            ctx.run_script("hints.activateNextHint(true);")
        })
        .hidden();
}

fn follow(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    let outcome = ctx.outcome()?;
    let Some(prompt) = outcome.prompt_as::<HintPrompt>() else {
        return Ok(());
    };
    if !prompt.new_buffer {
        return ctx.run_script(CLICK_ACTIVE_HINT);
    }
    let Some(url) = prompt.object_url().map(str::to_string) else {
        return Ok(());
    };
    let view = ctx.view()?;
    let buffer = ctx.app.create_buffer("");
    ctx.app.set_view_buffer(view, buffer);
    ctx.app.load_url(buffer, &url);
    Ok(())
}

fn copy_link(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    let outcome = ctx.outcome()?;
    let Some(prompt) = outcome.prompt_as::<HintPrompt>() else {
        return Ok(());
    };
    // "0" picks the page itself
    let url = if prompt.numbers == "0" {
        Some(prompt.buffer_url.clone())
    } else {
        prompt.object_url().map(str::to_string)
    };
    match url {
        Some(url) if !url.is_empty() => {
            ctx.app.clipboard.set_text(&url);
            ctx.show_info(format!("Copied: {}", url));
        }
        _ => {}
    }
    Ok(())
}
