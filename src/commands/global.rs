//! Application-wide commands: quitting, urls, buffers, views and help

use std::path::Path;

use anyhow::{bail, Context as _};

use super::{CommandContext, CommandRegistry};
use crate::model::{BufferId, SplitDirection};
use crate::prompts::{BufferListPrompt, FilePrompt, ListPrompt, WebJumpPrompt};
use crate::variables::WEBJUMP_DEFAULT;

pub fn register(registry: &mut CommandRegistry) {
    registry.define("quit", "Quit the application.", |ctx| {
        ctx.app.request_quit();
        Ok(())
    });

    registry
        .define("M-x", "Prompt for a command name to execute.", |ctx| {
            let name = ctx.outcome()?.text().to_string();
            // unknown names are ignored
            let Some(command) = ctx.app.commands.get(&name).cloned() else {
                return Ok(());
            };
            let mut inner = CommandContext::new(&mut *ctx.app, ctx.window);
            command.call(&mut inner)
        })
        .with_prompt(|ctx| Ok(Box::new(ListPrompt::commands(ctx.app.commands.visible_names()))))
        .hidden();

    register_go_to(registry);

    registry
        .define(
            "switch-buffer",
            "Prompt to select a buffer to display in the current view.",
            |ctx| {
                let Some(buffer) = chosen_buffer(ctx)? else {
                    return Ok(());
                };
                let view = ctx.view()?;
                ctx.app.set_view_buffer(view, buffer);
                Ok(())
            },
        )
        .with_prompt(|ctx| {
            Ok(Box::new(BufferListPrompt::new(
                "switch to buffer:",
                ctx.app.buffer_rows(),
            )))
        });

    registry
        .define("close-other-buffers", "Close all but one buffer.", |ctx| {
            let Some(keep) = chosen_buffer(ctx)? else {
                return Ok(());
            };
            let others: Vec<BufferId> = ctx
                .app
                .buffer_ids()
                .into_iter()
                .filter(|b| *b != keep)
                .collect();
            for buffer in others {
                ctx.app.close_buffer(buffer);
            }
            Ok(())
        })
        .with_prompt(|ctx| {
            Ok(Box::new(
                BufferListPrompt::new("kill all buffers except:", ctx.app.buffer_rows())
                    .select_first(),
            ))
        });

    registry.define("close-buffer", "Close the current buffer.", |ctx| {
        let buffer = ctx.buffer()?;
        if !ctx.app.close_buffer(buffer) {
            ctx.show_info("Can not close the last buffer.");
        }
        Ok(())
    });

    registry.define("revive-buffer", "Reopen the last closed buffer.", |ctx| {
        if ctx.app.revive_buffer(ctx.window).is_none() {
            ctx.show_info("No closed buffer to revive.");
        }
        Ok(())
    });

    registry.define("other-view", "Focus on the next view.", |ctx| {
        ctx.app.other_view(ctx.window);
        Ok(())
    });
    registry.define(
        "split-view-right",
        "Create a new view on right of the current one.",
        |ctx| {
            ctx.app.split_view(ctx.window, SplitDirection::Right);
            Ok(())
        },
    );
    registry.define(
        "split-view-bottom",
        "Create a new view below the current one.",
        |ctx| {
            ctx.app.split_view(ctx.window, SplitDirection::Bottom);
            Ok(())
        },
    );
    registry.define("close-view", "Close the current view.", |ctx| {
        let view = ctx.view()?;
        ctx.app.close_view(ctx.window, view);
        Ok(())
    });
    registry.define(
        "maximise-view",
        "Close all the views in the current window except the current one.",
        |ctx| {
            ctx.app.maximise_view(ctx.window);
            Ok(())
        },
    );

    registry.define(
        "toggle-fullscreen",
        "Toggle fullscreen state of the current window.",
        |ctx| {
            let window = ctx.app.window_mut(ctx.window).context("no such window")?;
            window.fullscreen = !window.fullscreen;
            tracing::debug!("Window {:?} fullscreen: {}", window.id, window.fullscreen);
            Ok(())
        },
    );

    register_help(registry);

    registry
        .define(
            "set-buffer-mode",
            "Change the mode of the current buffer.",
            |ctx| {
                let name = ctx.outcome()?.text().to_string();
                let buffer = ctx.buffer()?;
                ctx.app.set_buffer_mode(buffer, &name)?;
                ctx.show_info(format!("Buffer mode set to {}.", name));
                Ok(())
            },
        )
        .with_prompt(|ctx| {
            let buffer = ctx.buffer()?;
            let current = ctx
                .app
                .buffer(buffer)
                .map(|b| b.mode().name.clone())
                .unwrap_or_default();
            let modes: Vec<String> = ctx.app.modes.names().map(str::to_string).collect();
            Ok(Box::new(
                ListPrompt::new("buffer mode: ", modes)
                    .require_match()
                    .with_initial(current),
            ))
        });

    registry
        .define("open-file", "Prompt for a local file to open.", |ctx| {
            let path = ctx.outcome()?.text().trim().to_string();
            if path.is_empty() {
                return Ok(());
            }
            let Ok(url) = url::Url::from_file_path(Path::new(&path)) else {
                bail!("not an absolute path: {}", path);
            };
            let new_buffer = ctx.universal_arg();
            let buffer = target_buffer(ctx, new_buffer)?;
            ctx.app.load_url(buffer, url.as_str());
            Ok(())
        })
        .with_prompt(|_| Ok(Box::new(FilePrompt::new("Open file:", None))));
}

/// `go-to` and its variants
fn register_go_to(registry: &mut CommandRegistry) {
    type Variant = (&'static str, &'static str, bool, Initial);

    #[derive(Clone, Copy)]
    enum Initial {
        Empty,
        CurrentUrl,
        DefaultWebjump,
    }

    const VARIANTS: &[Variant] = &[
        ("go-to", "Prompt to open an url or a webjump.", false, Initial::Empty),
        (
            "go-to-new-buffer",
            "Prompt to open an url or webjump in a new buffer.",
            true,
            Initial::Empty,
        ),
        (
            "go-to-selected-url",
            "Prompt (defaulting to current selection) to open an url or a webjump.",
            false,
            Initial::CurrentUrl,
        ),
        (
            "go-to-selected-url-new-buffer",
            "Prompt (defaulting to current selection) to open an url or a webjump in a new buffer.",
            true,
            Initial::CurrentUrl,
        ),
        (
            "search-default",
            "Prompt to open an url with the default webjump.",
            false,
            Initial::DefaultWebjump,
        ),
        (
            "search-default-new-buffer",
            "Prompt to open an url with the default webjump in a new buffer.",
            true,
            Initial::DefaultWebjump,
        ),
    ];

    for &(name, doc, force_new_buffer, initial) in VARIANTS {
        registry.define(name, doc, go_to).with_prompt(move |ctx| {
            let new_buffer = force_new_buffer || ctx.universal_arg();
            let prompt = WebJumpPrompt::new(&ctx.app.webjumps).in_new_buffer(new_buffer);
            let prompt = match initial {
                Initial::Empty => prompt,
                Initial::CurrentUrl => {
                    let url = ctx
                        .buffer()
                        .ok()
                        .and_then(|b| ctx.app.buffer(b))
                        .map(|b| b.url.clone())
                        .unwrap_or_default();
                    prompt.with_current_url(url)
                }
                Initial::DefaultWebjump => {
                    prompt.with_default_webjump(ctx.app.variables.get_str(WEBJUMP_DEFAULT))
                }
            };
            Ok(Box::new(prompt))
        });
    }
}

fn go_to(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    let outcome = ctx.outcome()?;
    let new_buffer = outcome
        .prompt_as::<WebJumpPrompt>()
        .is_some_and(|p| p.new_buffer);
    let url = ctx.app.webjumps.resolve(outcome.text());
    if url.is_empty() {
        return Ok(());
    }
    let buffer = target_buffer(ctx, new_buffer)?;
    ctx.app.load_url(buffer, &url);
    Ok(())
}

/// The current buffer, or a fresh one shown in the current view
fn target_buffer(ctx: &mut CommandContext<'_>, new_buffer: bool) -> anyhow::Result<BufferId> {
    if !new_buffer {
        return ctx.buffer();
    }
    let view = ctx.view()?;
    let buffer = ctx.app.create_buffer("");
    ctx.app.set_view_buffer(view, buffer);
    Ok(buffer)
}

/// Buffer picked in a buffer list prompt
fn chosen_buffer(ctx: &CommandContext<'_>) -> anyhow::Result<Option<BufferId>> {
    let outcome = ctx.outcome()?;
    let prompt = outcome
        .prompt_as::<BufferListPrompt>()
        .context("expected a buffer list prompt")?;
    Ok(outcome.index.and_then(|row| prompt.buffer_at(row)))
}

fn register_help(registry: &mut CommandRegistry) {
    registry
        .define("describe-variable", "Show the value and documentation of a variable.", |ctx| {
            let name = ctx.outcome()?.text().to_string();
            let variable = ctx.app.variables.get_variable(&name)?;
            let text = format!("{} = {}. {}", name, variable.value(), variable.doc());
            ctx.show_info(text);
            Ok(())
        })
        .with_prompt(|ctx| {
            let items = ctx
                .app
                .variables
                .iter()
                .map(|v| (v.name().to_string(), v.doc().to_string()))
                .collect();
            Ok(Box::new(
                ListPrompt::with_descriptions("describe variable: ", items)
                    .require_match()
                    .with_history("variables"),
            ))
        });

    registry
        .define("describe-command", "Show the documentation of a command.", |ctx| {
            let name = ctx.outcome()?.text().to_string();
            let doc = ctx.app.commands.require(&name)?.doc.clone();
            let keys = ctx.app.where_is(&name);
            let text = if keys.is_empty() {
                format!("{}: {}", name, doc)
            } else {
                format!("{} ({}): {}", name, keys.join(", "), doc)
            };
            ctx.show_info(text);
            Ok(())
        })
        .with_prompt(|ctx| {
            let items = ctx
                .app
                .commands
                .iter()
                .filter(|c| c.visible)
                .map(|c| (c.name.clone(), c.doc.clone()))
                .collect();
            Ok(Box::new(
                ListPrompt::with_descriptions("describe command: ", items)
                    .require_match()
                    .with_history("commands"),
            ))
        });

    registry.define(
        "describe-key",
        "Show the command the next key sequence runs.",
        |ctx| {
            ctx.app.keyboard.describe_next_sequence();
            ctx.show_info("Describe key:");
            Ok(())
        },
    );
}
