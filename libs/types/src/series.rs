//! Per-sensor value series loaded from a measurement file.

/// One sensor's identity plus its ordered value sequence.
///
/// Immutable after load. The replay scheduler only ever reads from a series;
/// cursor state lives outside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSeries {
    location: String,
    metric: String,
    values: Vec<f64>,
}

impl SensorSeries {
    /// Create a series from its identity and ordered values.
    pub fn new(
        location: impl Into<String>,
        metric: impl Into<String>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            location: location.into(),
            metric: metric.into(),
            values,
        }
    }

    /// Location half of the sensor identity (e.g. `kitchen`).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Metric half of the sensor identity (e.g. `temperature`).
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Ordered raw values as loaded, without rounding.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
