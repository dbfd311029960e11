use anyhow::{anyhow, Result};
use chrono::DateTime;
use std::fs::File;
use std::path::Path;

pub fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

/// Formats an RFC 3339 timestamp (as returned by the talks and Mastodon APIs)
/// as `YYYY-MM-DD HH:MM` in its own offset. Anything else is returned as-is.
pub fn display_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_owned(),
    }
}
