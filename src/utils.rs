//! Utility functions for file naming

use regex::Regex;
use std::sync::LazyLock;

/// Longest file name most filesystems accept, in bytes
pub const MAX_FILENAME_BYTES: usize = 255;

#[allow(clippy::expect_used)]
static WINDOWS_RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(con|prn|aux|nul|com[0-9]|lpt[0-9])(\..*)?$")
        .expect("reserved-name pattern is a valid regex")
});

/// Make an arbitrary title safe to use as a single path component
///
/// Removes path separators, characters Windows rejects and control
/// characters, then drops reserved device names, dot-only names and
/// trailing dots/spaces. The result is at most 255 bytes and may be empty;
/// callers decide what to fall back to.
///
/// # Examples
///
/// ```
/// use bili_remux::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b: c?"), "ab c");
/// assert_eq!(sanitize_filename("CON"), "");
/// assert_eq!(sanitize_filename("title. "), "title");
/// ```
#[must_use]
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '|' | '"'))
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().all(|c| c == '.') || WINDOWS_RESERVED.is_match(&cleaned) {
        return String::new();
    }

    let trimmed = cleaned.trim_end_matches(['.', ' ']);
    truncate_to_bytes(trimmed, MAX_FILENAME_BYTES).to_string()
}

/// Sanitize `input`, or use `fallback` if nothing usable is left
pub fn sanitize_or(input: &str, fallback: &str) -> String {
    let sanitized = sanitize_filename(input);
    if sanitized.is_empty() {
        fallback.to_string()
    } else {
        sanitized
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
pub fn truncate_to_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
