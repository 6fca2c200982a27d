//! Sink error taxonomy.

use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SinkError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("send failed on {sink}: {reason}")]
    SendFailed { sink: String, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("flush incomplete after {timeout:?}, {in_flight} messages still in flight")]
    FlushTimeout { timeout: Duration, in_flight: i32 },

    #[error("sink closed")]
    Closed,

    #[error("sink error: {0}")]
    Other(String),
}

impl SinkError {
    pub fn send_failed(sink: &str, reason: impl std::fmt::Display) -> Self {
        SinkError::SendFailed {
            sink: sink.to_owned(),
            reason: reason.to_string(),
        }
    }
}
