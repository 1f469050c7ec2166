use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::model::Shot;

const EXPORT_TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no shots to export")]
    NoShots,
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize)]
struct ShotRow<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "GeneratedPrompt")]
    generated_prompt: &'a str,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

/// Writes one row per shot. Timestamps are rendered in UTC.
pub fn export_shots_csv<'a, W, I>(shots: I, writer: W) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a Shot>,
{
    let mut shots = shots.into_iter().peekable();
    if shots.peek().is_none() {
        return Err(ExportError::NoShots);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0;
    for shot in shots {
        csv_writer.serialize(ShotRow {
            id: &shot.id,
            name: shot.name.as_deref().unwrap_or_default(),
            generated_prompt: &shot.generated_prompt,
            timestamp: format_timestamp(shot.timestamp),
        })?;
        written += 1;
    }
    csv_writer.flush()?;
    Ok(written)
}

pub fn export_shots_csv_to_path<'a, I>(shots: I, path: &Path) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a Shot>,
{
    let mut shots = shots.into_iter().peekable();
    if shots.peek().is_none() {
        return Err(ExportError::NoShots);
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let written = export_shots_csv(shots, File::create(path)?)?;
    tracing::info!(rows = written, path = ?path, "Exported shots to CSV");
    Ok(written)
}

fn format_timestamp(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|moment| moment.format(&EXPORT_TIMESTAMP_FORMAT).ok())
        .unwrap_or_else(|| millis.to_string())
}
