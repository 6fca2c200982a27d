//! Replay service errors.

use std::path::PathBuf;

use message_sink::SinkError;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("cannot read measurement directory {}: {source}", path.display())]
    MeasurementDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A publish failure. The scheduler does not retry or skip; the fault
    /// propagates to the caller and ends the run.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
