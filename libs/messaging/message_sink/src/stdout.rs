//! Stdout sink - the transport-disabled degradation.
//!
//! Writes the same human-readable line per record that the publisher traces,
//! so a broker-less run still shows the stream on local output.

use std::time::Duration;

use async_trait::async_trait;

use types::Measurement;

use crate::error::SinkError;
use crate::MessageSink;

#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSink for StdoutSink {
    async fn send(&self, measurement: &Measurement) -> Result<(), SinkError> {
        println!("{}", measurement.trace_line());
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), SinkError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SinkError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
