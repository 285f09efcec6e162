//! Voice broadcast player (vbcast-player) - Main entry point
//!
//! Replays a scripted voice broadcast through the simulated host (timed
//! units, chunk files from a directory) and prints every player notification
//! as one JSON line on stdout. Exits once playback returns to Idle.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use vbcast_common::config::load_config;
use vbcast_common::events::{EventBus, PlaybackStatus, PlayerNotification};
use vbcast_common::logging::init_tracing;
use vbcast_player::sim::{BroadcastScript, FileContentResolver, ScriptedBroadcast, TimedMediaBackend};
use vbcast_player::tracker::InMemoryPlaybackTracker;
use vbcast_player::{PlayerConfig, PlayerDependencies, VoiceBroadcastPlayer};

/// Command-line arguments for vbcast-player
#[derive(Parser, Debug)]
#[command(name = "vbcast-player")]
#[command(about = "Play a scripted voice broadcast")]
#[command(version)]
struct Args {
    /// Broadcast script (TOML)
    #[arg(short, long, env = "VBCAST_SCRIPT")]
    script: PathBuf,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Jump to this position once playback has started
    #[arg(long)]
    seek_ms: Option<u64>,

    /// Playback speed factor
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Log level, overrides the configuration file
    #[arg(short, long, env = "VBCAST_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    let script = BroadcastScript::load(&args.script)
        .await
        .with_context(|| format!("Failed to load script {}", args.script.display()))?;
    info!(
        "Playing voice broadcast {} ({} chunks, {} ms, live: {})",
        script.voice_broadcast_id,
        script.chunks.len(),
        script.duration_ms(),
        script.live
    );

    let broadcast = script.broadcast();
    let duration_ms = script.duration_ms();
    let chunk_dir = script.chunk_dir();
    let scripted = Arc::new(ScriptedBroadcast::new(script));

    let event_bus = EventBus::new(config.player.event_bus_capacity);
    let mut notifications = event_bus.subscribe();

    let player = VoiceBroadcastPlayer::spawn(
        PlayerDependencies {
            resolver: Arc::new(FileContentResolver::new(chunk_dir)),
            backend: Arc::new(TimedMediaBackend::with_speed(args.speed)),
            event_source: scripted.clone(),
            chunk_source: scripted,
            tracker: Arc::new(InMemoryPlaybackTracker::with_event_bus(event_bus.clone())),
            event_bus,
        },
        PlayerConfig::from(&config),
    );

    player
        .play_or_resume(&broadcast)
        .context("Failed to start playback")?;

    let mut pending_seek = args.seek_ms;
    let outcome = loop {
        tokio::select! {
            received = notifications.recv() => match received {
                Ok(notification) => {
                    println!("{}", serde_json::to_string(&notification)?);

                    if let PlayerNotification::PlayingStateChanged { new_status, error, .. } = &notification {
                        match new_status {
                            PlaybackStatus::Playing => {
                                if let Some(position_ms) = pending_seek.take() {
                                    info!("Seeking to {} ms", position_ms);
                                    player.seek_to(&broadcast, position_ms, duration_ms)?;
                                }
                            }
                            PlaybackStatus::Idle => break Ok(()),
                            PlaybackStatus::Error => {
                                break Err(anyhow!(
                                    "Playback failed: {}",
                                    error.as_deref().unwrap_or("unknown error")
                                ));
                            }
                            _ => {}
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} notifications", skipped),
                Err(RecvError::Closed) => break Ok(()),
            },
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break Ok(());
            }
        }
    };

    player.shutdown().await.context("Failed to stop player")?;
    info!("Playback finished");
    outcome
}
