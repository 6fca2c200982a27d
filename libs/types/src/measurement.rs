//! The record emitted once per scheduler tick.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One replayed sensor reading, stamped at emission time.
///
/// Serializes with exactly the four wire field names consumers expect:
/// `time`, `location`, `metric`, `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub time: String,
    pub location: String,
    pub metric: String,
    /// Source value rounded to 4 decimal places.
    pub value: f64,
}

impl Measurement {
    /// Build a record for a reading observed now.
    pub fn observe(location: &str, metric: &str, raw_value: f64) -> Self {
        Self {
            time: utc_now_millis(),
            location: location.to_owned(),
            metric: metric.to_owned(),
            value: round_to_4dp(raw_value),
        }
    }

    /// The human-readable trace line logged for every emission.
    pub fn trace_line(&self) -> String {
        format!(
            "{} | {:<12} | {:<30} | {:.4}",
            self.time, self.location, self.metric, self.value
        )
    }
}

/// Round to 4 decimal places, half away from zero.
pub fn round_to_4dp(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Format as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_utc_millis(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Current wall-clock time in the wire timestamp format.
pub fn utc_now_millis() -> String {
    format_utc_millis(Utc::now())
}
