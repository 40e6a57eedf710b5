//! Markdown rendering for fetched files.
//!
//! Guides (`.md`, `.txt`, placeholders) render as markdown. Anything else is
//! treated as code and rendered as one fenced block tagged with its
//! extension.

use std::path::Path;

use pulldown_cmark::{Options, Parser, html};

/// Extensions rendered as prose.
const PROSE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Render markdown to HTML.
pub fn render(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render a fetched file, choosing prose or code by extension.
pub fn render_file(path: &str, content: &str) -> String {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some(ext) if !PROSE_EXTENSIONS.contains(&ext) => render(&fence(ext, content)),
        _ => render(content),
    }
}

/// Wrap `code` in a fence longer than any backtick run inside it.
fn fence(lang: &str, code: &str) -> String {
    let longest = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let ticks = "`".repeat(longest.max(2) + 1);
    format!("{ticks}{lang}\n{code}\n{ticks}\n")
}
