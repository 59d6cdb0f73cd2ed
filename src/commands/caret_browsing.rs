//! Caret browsing commands, run as scripts in the current page

use super::CommandRegistry;

/// (name, doc, script)
const CARET_COMMANDS: &[(&str, &str, &str)] = &[
    (
        "caret-browsing-init",
        "Init caret browsing in the current buffer.",
        "CaretBrowsing.setInitialCursor();",
    ),
    (
        "caret-browsing-shutdown",
        "Shutdown caret browsing in current buffer.",
        "CaretBrowsing.shutdown();",
    ),
    (
        "caret-browsing-down",
        "Move the caret down a line.",
        "CaretBrowsing.move('forward', 'line');",
    ),
    (
        "caret-browsing-up",
        "Move the caret up a line.",
        "CaretBrowsing.move('backward', 'line');",
    ),
    (
        "caret-browsing-backward-char",
        "Move the caret to one character backward.",
        "CaretBrowsing.move('backward', 'character');",
    ),
    (
        "caret-browsing-backward-word",
        "Move the caret to one word backward.",
        "CaretBrowsing.move('backward', 'word');",
    ),
    (
        "caret-browsing-forward-char",
        "Move the caret to one character forward.",
        "CaretBrowsing.move('forward', 'character');",
    ),
    (
        "caret-browsing-forward-word",
        "Move the caret to one word forward.",
        "CaretBrowsing.move('forward', 'word');",
    ),
    (
        "caret-browsing-toggle-mark",
        "Set or unset (toggle) the mark where the point is.",
        "CaretBrowsing.toggleMark();",
    ),
    (
        "caret-browsing-cut",
        "Cut the current caret selection.",
        "CaretBrowsing.cutSelection();",
    ),
    (
        "caret-browsing-end-of-line",
        "Move the caret to the end of the current line.",
        "CaretBrowsing.move('forward', 'lineboundary');",
    ),
    (
        "caret-browsing-beginning-of-line",
        "Move the caret to the beginning of the current line.",
        "CaretBrowsing.move('backward', 'lineboundary');",
    ),
    (
        "caret-browsing-end-of-document",
        "Move the caret to the end of the document.",
        "CaretBrowsing.move('forward', 'documentboundary');",
    ),
    (
        "caret-browsing-beginning-of-document",
        "Move the caret to the beginning of the document.",
        "CaretBrowsing.move('backward', 'documentboundary');",
    ),
    (
        "caret-browsing-forward-paragraph",
        "Move the caret to the end of the paragraph.",
        "CaretBrowsing.move('forward', 'paragraphboundary');",
    ),
    (
        "caret-browsing-backward-paragraph",
        "Move the caret to the beginning of the paragraph.",
        "CaretBrowsing.move('backward', 'paragraphboundary');",
    ),
];

pub fn register(registry: &mut CommandRegistry) {
    for &(name, doc, script) in CARET_COMMANDS {
        registry.define(name, doc, move |ctx| ctx.run_script(script));
    }
}
