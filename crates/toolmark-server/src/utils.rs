//! crates/toolmark-server/src/utils.rs
//! Shared utility functions used across the codebase

use chrono::{SecondsFormat, Utc};
use std::fmt::Display;

/// Extension trait for Result to simplify error conversion to String.
///
/// Tool functions return `Result<String, String>`; use `.str_err()?`
/// instead of `.map_err(|e| e.to_string())?`.
pub trait ResultExt<T, E> {
    /// Convert the error type to String.
    fn str_err(self) -> Result<T, String>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    fn str_err(self) -> Result<T, String> {
        self.map_err(|e| e.to_string())
    }
}

/// Current UTC time as RFC 3339 with millisecond precision (`2024-05-01T12:00:00.000Z`)
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncate a string to max length with ellipsis, respecting char boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_err() {
        let res: Result<(), std::fmt::Error> = Err(std::fmt::Error);
        assert!(res.str_err().is_err());
    }

    #[test]
    fn test_now_iso_shape() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("héllo", 2), "h...");
    }
}
