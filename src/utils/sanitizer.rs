//! Input sanitization applied before validation and before any request.
//!
//! Sanitization never fails: dangerous fragments are removed and whatever
//! remains is handed to the validators.

use regex::Regex;
use std::sync::LazyLock;

/// Markup delimiters.
static ANGLE_BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[<>]").unwrap());

/// Script-capable schemes and inline event handlers such as `onclick=`.
static DANGEROUS_FRAGMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)javascript:|vbscript:|data:|on\w+=").unwrap()
});

/// Any URI scheme followed by `//`.
static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap());

/// Strips angle brackets, `javascript:`, `data:`, `vbscript:` and `on*=`
/// fragments (case-insensitively) and trims surrounding whitespace.
///
/// Removal repeats until nothing matches, so fragments reassembled by a
/// previous removal (`javajavascript:script:`) are caught too and
/// `sanitize(sanitize(x)) == sanitize(x)` holds for every input.
///
/// # Examples
///
/// ```
/// use url_shortener_client::utils::sanitizer::sanitize;
///
/// assert_eq!(sanitize("  <b>hello</b> "), "bhello/b");
/// assert_eq!(sanitize("JavaScript:alert(1)"), "alert(1)");
/// ```
pub fn sanitize(input: &str) -> String {
    let mut current = input.to_string();

    loop {
        let without_brackets = ANGLE_BRACKETS.replace_all(&current, "");
        let next = DANGEROUS_FRAGMENTS
            .replace_all(&without_brackets, "")
            .into_owned();

        if next == current {
            break;
        }
        current = next;
    }

    current.trim().to_string()
}

/// Sanitizes `input` and prefixes `https://` when it carries no scheme and
/// is not a root-relative path.
///
/// An input that sanitizes to nothing stays empty.
pub fn secure_url(input: &str) -> String {
    let sanitized = sanitize(input);

    if sanitized.is_empty() || sanitized.starts_with('/') || SCHEME_PREFIX.is_match(&sanitized) {
        return sanitized;
    }

    format!("https://{sanitized}")
}
