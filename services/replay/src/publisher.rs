//! Publisher adapter between the scheduler and the transport.
//!
//! Owns the sink handle (injected at construction, never a global) and adds
//! the one behavior common to every transport: a human-readable trace line
//! per emission. No retry lives here; a sink failure propagates unchanged.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use message_sink::{MessageSink, SinkError};
use types::Measurement;

#[derive(Debug, Clone)]
pub struct Publisher {
    sink: Arc<dyn MessageSink>,
}

impl Publisher {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }

    /// Emit one record: trace it locally, then hand it to the sink.
    pub async fn publish(&self, measurement: &Measurement) -> Result<(), SinkError> {
        info!("{}", measurement.trace_line());
        self.sink.send(measurement).await
    }

    /// Bounded best-effort flush, then release the transport.
    ///
    /// A flush that misses the bound is logged and shutdown proceeds; nothing
    /// tracks the undelivered remainder.
    pub async fn drain(&self, timeout: Duration) -> Result<(), SinkError> {
        if let Err(err) = self.sink.flush(timeout).await {
            warn!("drain of {} did not complete cleanly: {}", self.sink.name(), err);
        }
        self.sink.disconnect().await
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }
}
