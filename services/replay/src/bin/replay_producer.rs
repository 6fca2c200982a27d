//! Replay producer service binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use hearth_replay::config::{ReplayConfig, ReplayMode};
use hearth_replay::lifecycle;
use hearth_replay::loader;
use hearth_replay::publisher::Publisher;
use hearth_replay::scheduler::ReplayScheduler;
use message_sink::{KafkaSink, MessageSink, StdoutSink};

#[derive(Debug, Parser)]
#[command(
    name = "replay_producer",
    about = "Replays smart-home sensor measurements into a message stream"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "replay.toml")]
    config: PathBuf,

    /// Override the replay mode.
    #[arg(long, value_enum)]
    mode: Option<ReplayMode>,

    /// Override the measurements directory.
    #[arg(long)]
    measurements_dir: Option<PathBuf>,

    /// Disable the Kafka transport and print records to stdout.
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hearth_replay=info".parse()?)
                .add_directive("message_sink=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ReplayConfig::load(&cli.config)?;
    config.apply_env_overrides();
    if let Some(mode) = cli.mode {
        config.replay.mode = mode;
    }
    if let Some(dir) = cli.measurements_dir {
        config.replay.measurements_dir = dir;
    }
    if cli.stdout {
        config.kafka.enabled = false;
    }

    info!(
        "Starting replay producer ({} mode, sink {})",
        config.replay.mode,
        if config.kafka.enabled { "kafka" } else { "stdout" }
    );

    let store = loader::load_dir(&config.replay.measurements_dir)
        .context("loading measurement files")?;

    let sink: Arc<dyn MessageSink> = if config.kafka.enabled {
        Arc::new(KafkaSink::connect(&config.kafka).context("building kafka producer")?)
    } else {
        Arc::new(StdoutSink::new())
    };
    let publisher = Publisher::new(sink);

    let mut scheduler = ReplayScheduler::new(
        Arc::new(store),
        publisher,
        config.replay.mode,
        Duration::from_millis(config.replay.interval_ms),
    );

    let (shutdown_tx, shutdown_rx) = lifecycle::shutdown_channel();
    lifecycle::spawn_signal_listener(shutdown_tx);

    if let Err(err) = scheduler.run(shutdown_rx).await {
        error!("replay failed: {}", err);
        return Err(err.into());
    }

    scheduler
        .drain(Duration::from_secs(config.shutdown.drain_timeout_secs))
        .await
        .context("draining publisher")?;

    info!("Replay producer stopped");
    Ok(())
}
