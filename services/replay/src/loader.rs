//! Measurement file loading.
//!
//! One file per sensor: the file stem encodes the sensor identity
//! (`<location>_<metric>`, split on the first underscore), and the content is
//! whitespace-separated two-column rows of `(timestamp placeholder, value)`.
//! Only the value column is kept; replay stamps fresh timestamps.
//!
//! Loading is best-effort per file: a malformed or unreadable file is logged
//! and skipped, and a file with no usable rows never reaches the store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use types::{MeasurementStore, SensorSeries};

use crate::error::ReplayError;

#[derive(Debug, thiserror::Error)]
enum SeriesFileError {
    #[error("unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected two columns")]
    TooManyColumns { line: usize },

    #[error("line {line}: bad value {value:?}")]
    BadValue { line: usize, value: String },
}

/// Load every `*.csv` file under `dir` into a measurement store, in file name
/// order. Directory-level failures abort; per-file failures are skipped.
pub fn load_dir(dir: &Path) -> Result<MeasurementStore, ReplayError> {
    let entries = fs::read_dir(dir).map_err(|source| ReplayError::MeasurementDir {
        path: dir.to_owned(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut store = MeasurementStore::new();
    for path in &paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("skipping {}: non-UTF8 file name", path.display());
            continue;
        };
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or(stem);
        let (location, metric) = split_identity(stem);

        match read_series(path) {
            Ok(values) => {
                let series = SensorSeries::new(location, metric, values);
                let rows = series.len();
                match store.push(series) {
                    Ok(()) => info!(
                        "Loaded {:<45} → {:<12} | {:<30} | {} rows",
                        file_name, location, metric, rows
                    ),
                    Err(_) => debug!("skipping {}: no usable rows", file_name),
                }
            }
            Err(err) => error!("Failed to load {}: {}", file_name, err),
        }
    }

    info!(
        "Loaded {} sensors → {} total measurements",
        store.len(),
        store.total_values()
    );
    Ok(store)
}

/// Split a file stem into `(location, metric)` on the first underscore.
/// A stem with no underscore names both halves.
fn split_identity(stem: &str) -> (&str, &str) {
    match stem.split_once('_') {
        Some((location, metric)) => (location, metric),
        None => (stem, stem),
    }
}

fn read_series(path: &Path) -> Result<Vec<f64>, SeriesFileError> {
    let content = fs::read_to_string(path)?;

    let mut values = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let Some(_timestamp) = tokens.next() else {
            continue;
        };
        // A row without a value column carries no reading.
        let Some(raw) = tokens.next() else {
            continue;
        };
        if tokens.next().is_some() {
            return Err(SeriesFileError::TooManyColumns { line: idx + 1 });
        }

        let value: f64 = raw.parse().map_err(|_| SeriesFileError::BadValue {
            line: idx + 1,
            value: raw.to_owned(),
        })?;
        // Missing readings surface as NaN; drop them like absent rows.
        if value.is_nan() {
            continue;
        }
        values.push(value);
    }
    Ok(values)
}
