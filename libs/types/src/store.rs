//! Ordered, read-only collection of sensor series.
//!
//! The store is populated once at startup. Its insertion order is the replay
//! order for the lifetime of the process: round-robin walks it in this order
//! every round, and sequential replay visits series in this order every cycle.

use crate::series::SensorSeries;

/// Returned when a series with no values is pushed into the store.
///
/// The store must never contain an empty series; a sensor that contributed no
/// usable rows simply does not exist as far as the scheduler is concerned.
#[derive(Debug, Clone, thiserror::Error)]
#[error("sensor {location}/{metric} has no values")]
pub struct EmptySeriesError {
    pub location: String,
    pub metric: String,
}

/// In-memory measurement store. Write-once, then read-only.
#[derive(Debug, Clone, Default)]
pub struct MeasurementStore {
    sensors: Vec<SensorSeries>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a series, preserving insertion order. Rejects empty series.
    pub fn push(&mut self, series: SensorSeries) -> Result<(), EmptySeriesError> {
        if series.is_empty() {
            return Err(EmptySeriesError {
                location: series.location().to_owned(),
                metric: series.metric().to_owned(),
            });
        }
        self.sensors.push(series);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&SensorSeries> {
        self.sensors.get(index)
    }

    /// Iterate series in the fixed replay order.
    pub fn iter(&self) -> impl Iterator<Item = &SensorSeries> {
        self.sensors.iter()
    }

    /// Number of sensors in the store.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Total measurement count across all series. One sequential replay cycle
    /// emits exactly this many records.
    pub fn total_values(&self) -> usize {
        self.sensors.iter().map(SensorSeries::len).sum()
    }
}
