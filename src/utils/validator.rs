//! # Text Input Validation Utilities
//!
//! Patterns shared by the account payloads. They are kept compatible with the
//! rules the mobile client already enforces on its side.

use std::sync::LazyLock;

use regex::Regex;

/// Letters, hyphen, apostrophe and whitespace. The empty string matches, so
/// callers pair it with a length check.
pub static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\-'\s]*$").expect("Failed to compile username regex")
});

/// Something, an `@`, something, a dot, something; no whitespace anywhere.
///
/// - `jane@x.com` ✓ Valid
/// - `jane@x` ✗ Invalid
/// - `jane doe@x.com` ✗ Invalid
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
});

/// Allowed password alphabet and minimum length. The per-class requirements
/// are checked in [`is_strong_password`] because `regex` has no look-ahead.
pub static PASSWORD_CHARSET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9@$!%*?&]{8,}$").expect("Failed to compile password regex")
});

const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// At least 8 characters from the allowed alphabet, with at least one
/// uppercase letter, one lowercase letter, one digit and one of `@$!%*?&`.
///
/// # Examples
///
/// - `Abcdef1!` ✓ Valid
/// - `abcdef1!` ✗ Invalid (no uppercase)
/// - `Abcdef1#` ✗ Invalid (`#` is outside the alphabet)
pub fn is_strong_password(password: &str) -> bool {
    PASSWORD_CHARSET_REGEX.is_match(password)
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(&c))
}
