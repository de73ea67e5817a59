//! Utility functions and helpers.

pub mod http;
#[cfg(test)]
pub(crate) mod test_server;

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Shorten `text` to at most `max_units` UTF-16 code units without splitting
/// a grapheme cluster. Truncated text ends with an ellipsis.
///
/// Telegram measures message length in UTF-16 code units, so characters
/// outside the Basic Multilingual Plane (most emoji) count twice.
pub fn truncate_graphemes(text: &str, max_units: usize) -> String {
    if utf16_len(text) <= max_units {
        return text.to_string();
    }

    let budget = max_units.saturating_sub(utf16_len(ELLIPSIS));
    let mut used = 0;
    let mut out = String::new();
    for grapheme in text.graphemes(true) {
        let width = utf16_len(grapheme);
        if used + width > budget {
            break;
        }
        used += width;
        out.push_str(grapheme);
    }
    out.push_str(ELLIPSIS);
    out
}

const ELLIPSIS: &str = "…";

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
