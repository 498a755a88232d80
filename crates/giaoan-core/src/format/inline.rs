use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

/// Escape text for inclusion in HTML element content or attributes.
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

/// Escape `text` and turn `**bold**` runs into `<strong>` elements.
pub fn bold_to_html(text: &str) -> String {
    BOLD.replace_all(&escape_html(text), "<strong>$1</strong>")
        .into_owned()
}

/// Remove `**` markers around bold runs.
pub fn strip_bold(text: &str) -> Cow<'_, str> {
    BOLD.replace_all(text, "$1")
}
