//! Kafka-backed sink.
//!
//! Wraps an owned `FutureProducer`; no process-global client. The producer's
//! delivery policy (`acks`, retry count, linger) is fixed at construction from
//! [`KafkaSinkConfig`] and never re-examined per send. A send enqueues the
//! record on the client's outbound buffer and returns; the only per-record
//! failures are enqueue failures (queue full, fatal client state). Everything
//! still buffered is pushed out by `flush` during shutdown drain.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use types::{Envelope, Measurement};

use crate::error::SinkError;
use crate::MessageSink;

/// Kafka transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaSinkConfig {
    /// When false, the service degrades to stdout-only output.
    pub enabled: bool,
    pub bootstrap_servers: String,
    pub topic: String,
    /// Acknowledgement level handed to the client (`all`, `1`, `0`).
    pub acks: String,
    /// Client-side delivery retry count.
    pub retries: u32,
    /// Batching delay in milliseconds.
    pub linger_ms: u64,
}

impl Default for KafkaSinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bootstrap_servers: "kafka:29092".to_string(),
            topic: "smart-home-measurements".to_string(),
            acks: "all".to_string(),
            retries: 5,
            linger_ms: 5,
        }
    }
}

/// Sink that publishes schema-enveloped measurement records to a Kafka topic.
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
    name: String,
}

impl fmt::Debug for KafkaSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaSink")
            .field("topic", &self.topic)
            .finish()
    }
}

impl KafkaSink {
    /// Build the producer with the configured delivery policy.
    ///
    /// The client connects lazily; this fails only on invalid configuration.
    pub fn connect(config: &KafkaSinkConfig) -> Result<Self, SinkError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("acks", &config.acks)
            .set("message.send.max.retries", config.retries.to_string())
            .set("linger.ms", config.linger_ms.to_string())
            .create()
            .map_err(|e| SinkError::ConnectionFailed(e.to_string()))?;

        info!(
            "kafka producer configured for {} (topic {}, acks={}, retries={}, linger={}ms)",
            config.bootstrap_servers, config.topic, config.acks, config.retries, config.linger_ms
        );

        Ok(Self {
            producer,
            name: format!("kafka-{}", config.topic),
            topic: config.topic.clone(),
        })
    }
}

fn encode_envelope(measurement: &Measurement) -> Result<Vec<u8>, SinkError> {
    serde_json::to_vec(&Envelope::wrap(measurement))
        .map_err(|e| SinkError::Serialization(e.to_string()))
}

#[async_trait]
impl MessageSink for KafkaSink {
    async fn send(&self, measurement: &Measurement) -> Result<(), SinkError> {
        let payload = encode_envelope(measurement)?;
        let record = FutureRecord::<(), Vec<u8>>::to(&self.topic).payload(&payload);

        // Enqueue only. Delivery runs on the client's configured policy; the
        // returned delivery future is intentionally dropped.
        match self.producer.send_result(record) {
            Ok(_delivery) => Ok(()),
            Err((err, _record)) => Err(SinkError::send_failed(&self.name, err)),
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<(), SinkError> {
        let producer = self.producer.clone();
        let result = tokio::task::spawn_blocking(move || {
            let flushed = producer.flush(timeout);
            (flushed, producer.in_flight_count())
        })
        .await
        .map_err(|e| SinkError::Other(e.to_string()))?;

        match result {
            (Ok(()), _) => Ok(()),
            (Err(_), in_flight) => Err(SinkError::FlushTimeout { timeout, in_flight }),
        }
    }

    async fn disconnect(&self) -> Result<(), SinkError> {
        debug!("closing kafka producer for topic {}", self.topic);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
