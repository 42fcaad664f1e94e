//! Utility functions for string shaping, timestamps, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging and favorites chips
//! - Category label cleanup for the quick-filter buttons
//! - Publish-time formatting for cards
//! - File system validation for the store directory

use chrono::{DateTime, Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, instrument};

static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z ]").unwrap());

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the nearest char boundary at or below `max` bytes,
/// with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Keep the first `max` characters of `s`, always followed by `...`.
pub fn truncate_title(s: &str, max: usize) -> String {
    let head: String = s.chars().take(max).collect();
    format!("{head}...")
}

/// Strip a category button label down to ASCII letters and spaces.
///
/// Button labels carry an icon (`"💻 Technology"`); the query is just the word.
pub fn clean_category_label(label: &str) -> String {
    NON_LETTERS.replace_all(label, "").trim().to_string()
}

/// Format a publish timestamp in local time.
///
/// Accepts RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS` stamps. Anything else is
/// shown as received.
pub fn format_published(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)?;
    let probe_path = path.join("..__probe_write__");
    fs::File::create(&probe_path)?;
    let _ = fs::remove_file(&probe_path);
    info!("Store directory is writable");
    Ok(())
}
