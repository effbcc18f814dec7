//! PHI scrubbing for error messages surfaced to logs or the UI.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").ok());

static UUID_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b")
        .ok()
});

static SSN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b").ok());

static PHONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").ok());

/// Replaces embedded PHI-shaped substrings with fixed placeholder tokens.
///
/// Emails become `[EMAIL]`, UUID-shaped identifiers `[ID]`, social security
/// numbers `[SSN]`, and phone numbers `[PHONE]`. Patterns apply independently
/// and left to right, so a message carrying several kinds of PHI has all of
/// them replaced. Input that matches nothing passes through unchanged.
#[must_use]
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = message.to_owned();
    for (pattern, placeholder) in [
        (&EMAIL_PATTERN, "[EMAIL]"),
        (&UUID_PATTERN, "[ID]"),
        (&SSN_PATTERN, "[SSN]"),
        (&PHONE_PATTERN, "[PHONE]"),
    ] {
        if let Some(pattern) = pattern.as_ref() {
            sanitized = pattern.replace_all(&sanitized, placeholder).into_owned();
        }
    }

    sanitized
}
