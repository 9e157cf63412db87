// Helper functions for safe logging, timestamps and serialization

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first = parts[0].chars().next().unwrap_or('*');
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Lowercases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// RFC 3339 UTC timestamp with millisecond precision.
/// Fixed width, so lexical order matches chronological order in SQL.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

/// Escapes `LIKE` wildcards; pair with `ESCAPE '\'` in SQL.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring pattern for `LIKE`.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// Deserializes a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
