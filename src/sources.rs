//! Persistence for the list of allowed news source identifiers.
//!
//! The list is a CSV file with a `Source` column:
//!
//! ```text
//! Source
//! abc-news
//! bbc-news
//! ```
//!
//! Other columns are allowed and ignored. Blank ids and surrounding
//! whitespace are skipped.

use csv::{ReaderBuilder, Trim, Writer};
use std::io::ErrorKind;
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

const HEADER: &str = "Source";

#[derive(Error, Debug)]
pub enum SourcesError {
    /// No source list has been saved yet.
    #[error("{0} not found; run the `sources` command to fetch and save the source list")]
    NotFound(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{0} has no `Source` column")]
    MissingColumn(String),
}

/// Read the saved source ids from `path`.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn load_sources(path: &str) -> Result<Vec<String>, SourcesError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SourcesError::NotFound(path.to_string()));
        }
        Err(source) => {
            return Err(SourcesError::Io {
                path: path.to_string(),
                source,
            });
        }
    };

    let ids = parse_sources(&text, path)?;
    info!(count = ids.len(), "Loaded source list");
    Ok(ids)
}

/// Write `ids` to `path`, replacing any previous list.
#[instrument(level = "info", skip_all, fields(%path, count = ids.len()))]
pub async fn save_sources(path: &str, ids: &[String]) -> Result<(), SourcesError> {
    let csv_err = |source| SourcesError::Csv {
        path: path.to_string(),
        source,
    };

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([HEADER]).map_err(csv_err)?;
    for id in ids {
        writer.write_record([id]).map_err(csv_err)?;
    }
    let out = writer.into_inner().map_err(|e| SourcesError::Io {
        path: path.to_string(),
        source: std::io::Error::new(e.error().kind(), e.to_string()),
    })?;

    fs::write(path, out).await.map_err(|source| SourcesError::Io {
        path: path.to_string(),
        source,
    })?;
    info!("Sources saved");
    Ok(())
}

fn parse_sources(text: &str, path: &str) -> Result<Vec<String>, SourcesError> {
    let csv_err = |source| SourcesError::Csv {
        path: path.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let column = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .position(|h| h == HEADER)
        .ok_or_else(|| SourcesError::MissingColumn(path.to_string()))?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        match record.get(column) {
            Some(id) if !id.is_empty() => ids.push(id.to_string()),
            _ => {}
        }
    }
    Ok(ids)
}

/// Split `requested` into ids present in `allowed` and ids that are not.
///
/// Order of `requested` is kept in both halves.
pub fn partition_requested(allowed: &[String], requested: &[String]) -> (Vec<String>, Vec<String>) {
    let (known, unknown): (Vec<String>, Vec<String>) = requested
        .iter()
        .cloned()
        .partition(|id| allowed.contains(id));
    for id in &unknown {
        warn!(source = %id, "Ignoring source that is not in the saved source list");
    }
    (known, unknown)
}
