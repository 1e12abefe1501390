//! JSON output of analysis runs.
//!
//! This module serializes a [`Report`] so the full set of scored articles can
//! be consumed by other tools after the terminal summary is gone.
//!
//! # Output Structure
//!
//! Files are organized by date and named after the query:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── electric-cars.json
//! ```
//!
//! Running the same query twice on one day overwrites the earlier file.

use crate::models::Report;
use crate::utils::slugify;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Fallback file stem when the query slugifies to nothing.
const UNTITLED: &str = "query";

/// Write a [`Report`] to a JSON file with date-based directory structure.
///
/// # Output Path
///
/// The file is written to: `{json_output_dir}/{local_date}/{query-slug}.json`
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(report: &Report, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = PathBuf::from(json_output_dir).join(&report.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let slug = slugify(&report.query);
    let stem = if slug.trim_matches('-').is_empty() { UNTITLED } else { slug.as_str() };
    let output_json_filename = full_json_dir.join(format!("{stem}.json"));

    info!(path = %output_json_filename.display(), "Writing JSON");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), "Wrote JSON report");

    Ok(output_json_filename)
}
