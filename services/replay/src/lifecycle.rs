//! Shutdown wiring: the cancellation token and the interrupt listener.
//!
//! The token is a `watch` channel checked by the scheduler between ticks.
//! The listener task trips it on the first interrupt; the scheduler then
//! finishes its in-flight record, stops ticking, and the binary runs the
//! bounded drain.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub type ShutdownSender = watch::Sender<bool>;
pub type ShutdownReceiver = watch::Receiver<bool>;

/// Create the cancellation token pair, initially not tripped.
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Spawn a task that trips the token on ctrl-c.
///
/// If the signal handler cannot be installed the token is tripped as well:
/// a producer that can never be interrupted cleanly should stop instead.
pub fn spawn_signal_listener(shutdown_tx: ShutdownSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Replay producer stopped by user (ctrl-c), draining"),
            Err(err) => error!("failed to listen for shutdown signal: {}", err),
        }
        let _ = shutdown_tx.send(true);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_starts_untripped_and_latches() {
        let (tx, mut rx) = shutdown_channel();
        assert!(!*rx.borrow());

        tx.send(true).unwrap();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
