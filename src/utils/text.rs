//! Text helpers for document validation and error previews.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

/// `true` if `s` is empty or made only of (Unicode) whitespace.
///
/// Such strings are never sent to the embedding service.
pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Collapse every whitespace run (spaces, tabs, newlines, NBSP) to a single
/// space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    if is_blank(s) {
        return String::new();
    }
    whitespace_run().replace_all(s, " ").trim().to_string()
}

/// Cut `s` down to at most `max_chars` characters, ending in `"..."` when
/// anything was dropped. Counts `char`s, so multi-byte text is never split.
///
/// For `max_chars <= 3` only dots fit.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }

    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}
