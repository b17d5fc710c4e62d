//! Turns answer text into render-ready HTML.
//!
//! This is the only place KB and user text become markup. Escaping always
//! runs first; link wrapping then operates on the escaped text, so nothing
//! the input contains can become an element.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// Absolute URLs may carry escaped ampersands but stop at any other entity,
// which keeps escaped quotes and brackets outside the link. Root-relative
// paths only count at the start of the text or after whitespace, `(` or an
// escaped quote, and never start with `//` (that would leave the site).
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<url>https?://(?:[^\s&]|&amp;)+)|(?P<lead>^|[\s(]|&#39;|&quot;)(?P<path>/(?:[A-Za-z0-9_\-.~?=#%+]|&amp;)(?:[A-Za-z0-9_\-.~/?=#%+]|&amp;)*)",
    )
    .expect("Invalid regex: link pattern")
});

const TRAILING_PUNCT: &[char] = &['.', ',', '!', '?', ')', ':'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub linkify: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { linkify: true }
    }
}

/// Escape the five HTML-sensitive characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape and linkify with default options.
pub fn format_reply(answer: &str) -> String {
    format_reply_with(answer, FormatOptions::default())
}

pub fn format_reply_with(answer: &str, options: FormatOptions) -> String {
    let escaped = escape_html(answer);
    if options.linkify {
        linkify(&escaped)
    } else {
        escaped
    }
}

/// Wrap URL-like substrings of already-escaped text in anchors.
fn linkify(escaped: &str) -> String {
    LINK_PATTERN
        .replace_all(escaped, |caps: &Captures| {
            if let Some(url) = caps.name("url") {
                let (target, rest) = split_trailing(url.as_str());
                format!(
                    "<a href=\"{target}\" target=\"_blank\" rel=\"noopener noreferrer\">{target}</a>{rest}"
                )
            } else {
                let lead = caps.name("lead").map_or("", |m| m.as_str());
                let path = caps.name("path").map_or("", |m| m.as_str());
                let (target, rest) = split_trailing(path);
                if target.len() <= 1 {
                    // a bare "/" after trimming punctuation is not a link
                    return format!("{lead}{path}");
                }
                format!("{lead}<a href=\"{target}\">{target}</a>{rest}")
            }
        })
        .into_owned()
}

/// Split trailing sentence punctuation off a link candidate.
fn split_trailing(candidate: &str) -> (&str, &str) {
    let trimmed = candidate.trim_end_matches(TRAILING_PUNCT);
    candidate.split_at(trimmed.len())
}
