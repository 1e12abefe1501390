//! Utility functions for date validation, string manipulation, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Date window validation for search ranges
//! - String truncation and slugification for display and file names
//! - File system validation for output directories

use chrono::{Duration, NaiveDate};
use std::fs as stdfs;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// How far back the search API lets us look, in days.
pub const MAX_LOOKBACK_DAYS: i64 = 29;

/// A requested date range the search API would not accept.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateWindowError {
    #[error("{field} date {date} is before the earliest allowed date {earliest}")]
    TooOld {
        field: &'static str,
        date: NaiveDate,
        earliest: NaiveDate,
    },

    #[error("{field} date {date} is in the future (today is {today})")]
    InFuture {
        field: &'static str,
        date: NaiveDate,
        today: NaiveDate,
    },

    #[error("from date {from} is after to date {to}")]
    Reversed { from: NaiveDate, to: NaiveDate },
}

/// Check that `from`/`to` fall within the last [`MAX_LOOKBACK_DAYS`] days
/// ending at `today`, and that they are in order. Either bound may be absent.
pub fn validate_date_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), DateWindowError> {
    let earliest = today - Duration::days(MAX_LOOKBACK_DAYS);

    for (field, date) in [("from", from), ("to", to)] {
        let Some(date) = date else { continue };
        if date < earliest {
            return Err(DateWindowError::TooOld {
                field,
                date,
                earliest,
            });
        }
        if date > today {
            return Err(DateWindowError::InFuture { field, date, today });
        }
    }

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(DateWindowError::Reversed { from, to });
        }
    }
    debug!(?from, ?to, %earliest, "Date window accepted");
    Ok(())
}

/// Truncate a string for display.
///
/// Long strings are cut to at most `max` characters and an ellipsis is
/// appended. Cuts always land on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_display("short", 100), "short");
/// assert_eq!(truncate_for_display("abcdef", 3), "abc…");
/// ```
pub fn truncate_for_display(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…", s[..cut].trim_end()),
    }
}

/// Convert a query to a file-name-friendly slug.
///
/// It lowercases the text, removes special characters, and replaces
/// spaces with hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Test-Article!"), "test-article");
/// ```
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    remove_probe(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

/// Delete the write-test file, warning if it is left behind.
fn remove_probe(probe_path: &str) -> bool {
    match stdfs::remove_file(probe_path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %probe_path, error = %e, "Failed to remove write probe file");
            false
        }
    }
}
