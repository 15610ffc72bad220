//! Daily JSON export
//!
//! One `events_MM_DD.json` per calendar day that has events. Days are taken
//! from a leap year so February 29th gets a file too.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HistoryError, Result};
use crate::messages::MessageCatalog;
use crate::systems::{DayBuckets, DayKey, EventRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Remove existing `events_*.json` files before writing
    pub clean: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub files: usize,
    pub events: usize,
}

/// Year as a number when known, else the configured label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportYear {
    Known(i32),
    Unknown(String),
}

/// One object in a day file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub person_name: String,
    pub gramps_id: String,
    pub event_type: String,
    pub year: ExportYear,
    pub place: String,
    pub description: String,
    pub handle_type: String,
    pub handle: String,
}

fn entry(record: &EventRecord, catalog: &MessageCatalog) -> ExportEntry {
    let year = match record.year {
        Some(year) => ExportYear::Known(year),
        None => ExportYear::Unknown(catalog.year_text(None)),
    };
    ExportEntry {
        person_name: record.name.clone(),
        gramps_id: record.gramps_id.clone(),
        event_type: record.event_type.to_string(),
        year,
        place: record.place.clone(),
        description: catalog.format(record),
        handle_type: catalog.kind_label(record.kind).to_string(),
        handle: record.handle.to_string(),
    }
}

/// Entries for one day, in collection order
pub fn render_day(buckets: &DayBuckets, catalog: &MessageCatalog, key: DayKey) -> Vec<ExportEntry> {
    buckets
        .get(key)
        .iter()
        .map(|record| entry(record, catalog))
        .collect()
}

/// Delete `events_*.json` left over from an earlier run
fn clean_output(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for item in fs::read_dir(dir).map_err(|e| HistoryError::io(dir, e))? {
        let path = item.map_err(|e| HistoryError::io(dir, e))?.path();
        let is_day_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("events_") && n.ends_with(".json"))
            .unwrap_or(false);
        if is_day_file && path.is_file() {
            fs::remove_file(&path).map_err(|e| HistoryError::io(&path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write every non-empty day of `buckets` into `out_dir`
pub fn export_daily_events(
    buckets: &DayBuckets,
    catalog: &MessageCatalog,
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    fs::create_dir_all(out_dir).map_err(|e| HistoryError::io(out_dir, e))?;
    info!("Exporting daily events to {}/", out_dir.display());

    if options.clean {
        let removed = clean_output(out_dir)?;
        debug!("Removed {} old day files", removed);
    }

    let days: Vec<DayKey> = DayKey::all().collect();

    // Render in parallel, write in calendar order
    let rendered: Vec<(DayKey, usize, String)> = days
        .par_iter()
        .filter(|key| !buckets.get(**key).is_empty())
        .map(|&key| -> Result<(DayKey, usize, String)> {
            let entries = render_day(buckets, catalog, key);
            let json = serde_json::to_string_pretty(&entries)?;
            Ok((key, entries.len(), json))
        })
        .collect::<Result<_>>()?;

    let mut summary = ExportSummary::default();
    for (key, count, json) in rendered {
        let path: PathBuf = out_dir.join(key.file_name());
        fs::write(&path, json).map_err(|e| HistoryError::io(&path, e))?;
        info!("Created {} with {} events.", key.file_name(), count);
        summary.files += 1;
        summary.events += count;
    }

    Ok(summary)
}
