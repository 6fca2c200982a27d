//! Test doubles for the sink trait.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use types::Measurement;

use crate::error::SinkError;
use crate::MessageSink;

/// A sink that collects sent records for assertions.
#[derive(Debug)]
pub struct CollectorSink {
    measurements: Mutex<Vec<Measurement>>,
    connected: AtomicBool,
    fail_next_send: AtomicBool,
    fail_next_flush: AtomicBool,
    flushes: AtomicU64,
    name: String,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::with_name("collector")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            measurements: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            fail_next_send: AtomicBool::new(false),
            fail_next_flush: AtomicBool::new(false),
            flushes: AtomicU64::new(0),
            name: name.into(),
        }
    }

    /// All records received so far, in send order.
    pub fn received(&self) -> Vec<Measurement> {
        self.measurements.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.measurements.lock().unwrap().len()
    }

    /// Arm the sink to fail the next send.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::Relaxed);
    }

    /// Arm the sink to fail the next flush.
    pub fn fail_next_flush(&self) {
        self.fail_next_flush.store(true, Ordering::Relaxed);
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for CollectorSink {
    async fn send(&self, measurement: &Measurement) -> Result<(), SinkError> {
        if !self.is_connected() {
            return Err(SinkError::Closed);
        }
        if self.fail_next_send.swap(false, Ordering::Relaxed) {
            return Err(SinkError::send_failed(&self.name, "simulated send failure"));
        }
        self.measurements.lock().unwrap().push(measurement.clone());
        Ok(())
    }

    async fn flush(&self, timeout: Duration) -> Result<(), SinkError> {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        if self.fail_next_flush.swap(false, Ordering::Relaxed) {
            return Err(SinkError::FlushTimeout {
                timeout,
                in_flight: 1,
            });
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SinkError> {
        self.connected.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f64) -> Measurement {
        Measurement::observe("kitchen", "temperature", value)
    }

    #[tokio::test]
    async fn test_collector_stores_in_send_order() {
        let sink = CollectorSink::new();
        sink.send(&reading(1.0)).await.unwrap();
        sink.send(&reading(2.0)).await.unwrap();

        let received = sink.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].value, 1.0);
        assert_eq!(received[1].value, 2.0);
    }

    #[tokio::test]
    async fn test_fail_next_send_fails_exactly_once() {
        let sink = CollectorSink::new();
        sink.fail_next_send();

        assert!(sink.send(&reading(1.0)).await.is_err());
        assert!(sink.send(&reading(2.0)).await.is_ok());
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn test_flush_counted_and_failable() {
        let sink = CollectorSink::new();
        sink.flush(Duration::from_secs(1)).await.unwrap();

        sink.fail_next_flush();
        let err = sink.flush(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, SinkError::FlushTimeout { .. }));
        assert_eq!(sink.flush_count(), 2);
    }
}
