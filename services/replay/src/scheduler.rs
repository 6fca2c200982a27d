//! Replay scheduler: drives the interleaving strategies over the store.
//!
//! The scheduler has no terminal state under normal operation. It runs until
//! the cancellation token trips, checked between ticks (and raced against the
//! inter-record sleep in sequential mode), so a record that has been
//! constructed is always fully handed to the publisher before shutdown
//! proceeds. A publish failure is not retried or skipped here; it ends the
//! run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use types::{Measurement, MeasurementStore};

use crate::config::ReplayMode;
use crate::error::ReplayError;
use crate::publisher::Publisher;

/// Run/cancel state machine for the scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Ticking normally.
    Running,
    /// Cancellation observed; no further ticks are issued.
    Draining,
    /// Drain finished, transport released.
    Stopped,
}

/// Per-sensor position for infinite cyclic iteration over a value sequence.
///
/// An explicit modular index rather than a cycling iterator, so cursor state
/// stays inspectable and resettable.
#[derive(Debug, Clone, Default)]
pub struct SensorCursor {
    position: usize,
}

impl SensorCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current position and step forward, wrapping at `len`.
    pub fn advance(&mut self, len: usize) -> usize {
        let current = self.position;
        self.position = (current + 1) % len;
        current
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}

/// Drives one of the two replay strategies over the store, forever.
#[derive(Debug)]
pub struct ReplayScheduler {
    store: Arc<MeasurementStore>,
    publisher: Publisher,
    mode: ReplayMode,
    interval: Duration,
    state: RunState,
    rounds_completed: u64,
    cycles_completed: u64,
}

impl ReplayScheduler {
    pub fn new(
        store: Arc<MeasurementStore>,
        publisher: Publisher,
        mode: ReplayMode,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            mode,
            interval,
            state: RunState::Running,
            rounds_completed: 0,
            cycles_completed: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Completed round-robin rounds (full passes over all sensors).
    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    /// Completed sequential replay cycles (full passes over all values).
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Run until the cancellation token trips. Returns `Ok` only after
    /// observing cancellation; a publish failure surfaces as `Err`.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ReplayError> {
        self.state = RunState::Running;

        if self.store.is_empty() {
            warn!("measurement store is empty; replaying nothing until shutdown");
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            self.state = RunState::Draining;
            return Ok(());
        }

        match self.mode {
            ReplayMode::RoundRobin => self.run_round_robin(&mut shutdown).await,
            ReplayMode::Sequential => self.run_sequential(&mut shutdown).await,
        }
    }

    /// One value from each sensor in turn, in fixed store order, as fast as
    /// the sink accepts them.
    async fn run_round_robin(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), ReplayError> {
        let mut cursors: Vec<SensorCursor> =
            (0..self.store.len()).map(|_| SensorCursor::new()).collect();

        loop {
            for (series, cursor) in self.store.iter().zip(cursors.iter_mut()) {
                if *shutdown.borrow() {
                    self.state = RunState::Draining;
                    return Ok(());
                }
                let value = series.values()[cursor.advance(series.len())];
                let measurement =
                    Measurement::observe(series.location(), series.metric(), value);
                self.publisher.publish(&measurement).await?;
            }
            self.rounds_completed += 1;
        }
    }

    /// Every value of every sensor in original order, with a fixed delay
    /// between records; restarts from the top after the last sensor.
    async fn run_sequential(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), ReplayError> {
        loop {
            info!("Starting full replay cycle #{}", self.cycles_completed + 1);
            for series in self.store.iter() {
                for position in 0..series.len() {
                    if *shutdown.borrow() {
                        self.state = RunState::Draining;
                        return Ok(());
                    }
                    let measurement = Measurement::observe(
                        series.location(),
                        series.metric(),
                        series.values()[position],
                    );
                    self.publisher.publish(&measurement).await?;

                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => {}
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                self.state = RunState::Draining;
                                return Ok(());
                            }
                        }
                    }
                }
            }
            self.cycles_completed += 1;
        }
    }

    /// Flush and release the transport within the bound, then stop.
    pub async fn drain(&mut self, timeout: Duration) -> Result<(), ReplayError> {
        self.publisher.drain(timeout).await?;
        self.state = RunState::Stopped;
        info!("scheduler stopped after {} rounds, {} cycles",
            self.rounds_completed, self.cycles_completed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use message_sink::test_utils::CollectorSink;
    use message_sink::{MessageSink, SinkError};
    use types::SensorSeries;

    /// Sink wrapper that trips the cancellation token after a fixed number of
    /// delivered records, making shutdown deterministic in tests.
    #[derive(Debug)]
    struct TriggerSink {
        inner: Arc<CollectorSink>,
        trip_after: usize,
        shutdown_tx: watch::Sender<bool>,
    }

    #[async_trait]
    impl MessageSink for TriggerSink {
        async fn send(&self, measurement: &Measurement) -> Result<(), SinkError> {
            self.inner.send(measurement).await?;
            if self.inner.count() >= self.trip_after {
                let _ = self.shutdown_tx.send(true);
            }
            Ok(())
        }

        async fn flush(&self, timeout: Duration) -> Result<(), SinkError> {
            self.inner.flush(timeout).await
        }

        async fn disconnect(&self) -> Result<(), SinkError> {
            self.inner.disconnect().await
        }

        fn name(&self) -> &str {
            self.inner.name()
        }
    }

    fn three_sensor_store() -> MeasurementStore {
        let mut store = MeasurementStore::new();
        store
            .push(SensorSeries::new(
                "kitchen",
                "temperature",
                vec![1.0, 2.0, 3.0],
            ))
            .unwrap();
        store
            .push(SensorSeries::new("bedroom", "humidity", vec![10.0]))
            .unwrap();
        store
            .push(SensorSeries::new("attic", "co2", vec![100.0, 200.0]))
            .unwrap();
        store
    }

    fn scheduler_tripping_after(
        store: MeasurementStore,
        mode: ReplayMode,
        trip_after: usize,
    ) -> (ReplayScheduler, Arc<CollectorSink>, watch::Receiver<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let collector = Arc::new(CollectorSink::new());
        let sink = Arc::new(TriggerSink {
            inner: collector.clone(),
            trip_after,
            shutdown_tx,
        });
        let scheduler = ReplayScheduler::new(
            Arc::new(store),
            Publisher::new(sink),
            mode,
            Duration::ZERO,
        );
        (scheduler, collector, shutdown_rx)
    }

    #[test]
    fn test_cursor_wraps_to_start() {
        let mut cursor = SensorCursor::new();
        let positions: Vec<usize> = (0..7).map(|_| cursor.advance(3)).collect();

        assert_eq!(positions, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(cursor.position(), 1);

        cursor.reset();
        assert_eq!(cursor.position(), 0);
    }

    #[tokio::test]
    async fn test_round_robin_fairness_over_rounds() {
        let (mut scheduler, collector, shutdown_rx) =
            scheduler_tripping_after(three_sensor_store(), ReplayMode::RoundRobin, 12);

        scheduler.run(shutdown_rx).await.unwrap();

        let received = collector.received();
        assert_eq!(received.len(), 12);
        assert_eq!(scheduler.rounds_completed(), 4);
        assert_eq!(scheduler.state(), RunState::Draining);

        // Emission order within every round is the fixed store order.
        for round in received.chunks(3) {
            let locations: Vec<&str> =
                round.iter().map(|m| m.location.as_str()).collect();
            assert_eq!(locations, vec!["kitchen", "bedroom", "attic"]);
        }

        // Each sensor advanced exactly once per round.
        for location in ["kitchen", "bedroom", "attic"] {
            let count = received.iter().filter(|m| m.location == location).count();
            assert_eq!(count, 4, "sensor {location} over- or under-represented");
        }
    }

    #[tokio::test]
    async fn test_round_robin_cursor_wraparound_readings() {
        let mut store = MeasurementStore::new();
        store
            .push(SensorSeries::new(
                "kitchen",
                "temperature",
                vec![1.0, 2.0, 3.0],
            ))
            .unwrap();
        let (mut scheduler, collector, shutdown_rx) =
            scheduler_tripping_after(store, ReplayMode::RoundRobin, 7);

        scheduler.run(shutdown_rx).await.unwrap();

        let values: Vec<f64> = collector.received().iter().map(|m| m.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_sequential_cycle_is_complete_and_ordered() {
        let store = three_sensor_store();
        let total = store.total_values();
        // One extra record so the first full cycle demonstrably closes.
        let (mut scheduler, collector, shutdown_rx) =
            scheduler_tripping_after(store, ReplayMode::Sequential, total + 1);

        scheduler.run(shutdown_rx).await.unwrap();

        let received = collector.received();
        assert_eq!(received.len(), total + 1);
        assert_eq!(scheduler.cycles_completed(), 1);

        let first_cycle: Vec<(&str, f64)> = received[..total]
            .iter()
            .map(|m| (m.location.as_str(), m.value))
            .collect();
        assert_eq!(
            first_cycle,
            vec![
                ("kitchen", 1.0),
                ("kitchen", 2.0),
                ("kitchen", 3.0),
                ("bedroom", 10.0),
                ("attic", 100.0),
                ("attic", 200.0),
            ]
        );
        // The second cycle restarts from the first sensor's first value.
        assert_eq!(received[total].location, "kitchen");
        assert_eq!(received[total].value, 1.0);
    }

    #[tokio::test]
    async fn test_emitted_records_are_rounded_and_timestamped() {
        let mut store = MeasurementStore::new();
        store
            .push(SensorSeries::new(
                "kitchen",
                "temperature",
                vec![21.23456],
            ))
            .unwrap();
        let (mut scheduler, collector, shutdown_rx) =
            scheduler_tripping_after(store, ReplayMode::RoundRobin, 1);

        scheduler.run(shutdown_rx).await.unwrap();

        let received = collector.received();
        assert_eq!(received[0].value, 21.2346);
        assert_eq!(received[0].time.len(), 24);
        NaiveDateTime::parse_from_str(&received[0].time, "%Y-%m-%dT%H:%M:%S%.3fZ")
            .expect("emitted timestamp must be millisecond-precision UTC");
    }

    #[tokio::test]
    async fn test_graceful_shutdown_emits_nothing_further() {
        let (mut scheduler, collector, shutdown_rx) =
            scheduler_tripping_after(three_sensor_store(), ReplayMode::Sequential, 2);

        scheduler.run(shutdown_rx).await.unwrap();
        assert_eq!(scheduler.state(), RunState::Draining);
        assert_eq!(collector.count(), 2);

        scheduler.drain(Duration::from_secs(10)).await.unwrap();
        assert_eq!(scheduler.state(), RunState::Stopped);
        assert_eq!(collector.flush_count(), 1);
        assert!(!collector.is_connected());
        assert_eq!(collector.count(), 2);
    }

    #[tokio::test]
    async fn test_empty_store_parks_until_shutdown() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let collector = Arc::new(CollectorSink::new());
        let mut scheduler = ReplayScheduler::new(
            Arc::new(MeasurementStore::new()),
            Publisher::new(collector.clone()),
            ReplayMode::RoundRobin,
            Duration::ZERO,
        );

        shutdown_tx.send(true).unwrap();
        scheduler.run(shutdown_rx).await.unwrap();

        assert_eq!(scheduler.state(), RunState::Draining);
        assert_eq!(collector.count(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_ends_the_run() {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let collector = Arc::new(CollectorSink::new());
        collector.fail_next_send();
        let mut scheduler = ReplayScheduler::new(
            Arc::new(three_sensor_store()),
            Publisher::new(collector.clone()),
            ReplayMode::RoundRobin,
            Duration::ZERO,
        );

        let err = scheduler.run(shutdown_rx).await.unwrap_err();

        assert!(matches!(err, ReplayError::Sink(SinkError::SendFailed { .. })));
        assert_eq!(collector.count(), 0);
    }
}
