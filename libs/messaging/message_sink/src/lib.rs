//! # Message Sink - Transport Abstraction for Measurement Records
//!
//! A destination for replayed measurements that abstracts away transport
//! details. The scheduler side of the pipeline only ever talks to the
//! [`MessageSink`] trait; whether a record lands on a Kafka topic, on stdout,
//! or in a test collector is decided once at construction time.
//!
//! Sinks perform no internal retry. Delivery guarantees belong to the
//! underlying client and are configured when the sink is built, not
//! re-examined per send.

pub mod error;
pub mod kafka;
pub mod stdout;
pub mod test_utils;

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use types::Measurement;

pub use error::SinkError;
pub use kafka::{KafkaSink, KafkaSinkConfig};
pub use stdout::StdoutSink;

/// A destination for measurement records that abstracts away transport
/// details.
#[async_trait]
pub trait MessageSink: Send + Sync + Debug {
    /// Hand one record to the transport. May block briefly on buffering but
    /// never waits for downstream delivery.
    async fn send(&self, measurement: &Measurement) -> Result<(), SinkError>;

    /// Drain buffered and in-flight records within the given bound.
    async fn flush(&self, timeout: Duration) -> Result<(), SinkError>;

    /// Release transport resources. Further sends may fail.
    async fn disconnect(&self) -> Result<(), SinkError>;

    /// Sink name for logging and error context.
    fn name(&self) -> &str;
}
