//! Voice broadcast player
//!
//! **Module Structure:**
//! - `mod.rs`: public handle and control task
//! - `machine.rs`: state machine owned by the control task
//! - `messages.rs`: commands and background results
//!
//! The handle is cheap to clone. All state lives in the control task, which
//! processes one command, stream update, tick, preparation result or unit
//! event at a time.

mod machine;
mod messages;

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::media::{ContentResolver, MediaBackend, UnitEvent};
use crate::playback::dual_player::UnitFactory;
use crate::playback::listeners::Listener;
use crate::sources::{BroadcastEventSource, ChunkSource};
use crate::state::PlayerSnapshot;
use crate::tracker::PlaybackTracker;
use machine::{Collaborators, PlayerCore};
use messages::{Command, Internal};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use vbcast_common::events::EventBus;
use vbcast_common::VoiceBroadcast;

/// Host services the player depends on
#[derive(Clone)]
pub struct PlayerDependencies {
    pub resolver: Arc<dyn ContentResolver>,
    pub backend: Arc<dyn MediaBackend>,
    pub event_source: Arc<dyn BroadcastEventSource>,
    pub chunk_source: Arc<dyn ChunkSource>,
    pub tracker: Arc<dyn PlaybackTracker>,
    pub event_bus: EventBus,
}

/// Handle to a running voice broadcast player
///
/// Requests are queued to the control task and applied in order. They fail
/// only with [`Error::PlayerStopped`] once the player has shut down.
#[derive(Clone)]
pub struct VoiceBroadcastPlayer {
    commands: mpsc::UnboundedSender<Command>,
}

impl VoiceBroadcastPlayer {
    /// Start a player on the current tokio runtime
    pub fn spawn(dependencies: PlayerDependencies, config: PlayerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (unit_tx, unit_rx) = mpsc::unbounded_channel();

        let collaborators = Collaborators {
            factory: UnitFactory::new(dependencies.resolver, dependencies.backend, unit_tx),
            event_source: dependencies.event_source,
            chunk_source: dependencies.chunk_source,
            tracker: dependencies.tracker,
            event_bus: dependencies.event_bus,
        };
        let core = PlayerCore::new(config, collaborators, internal_tx);

        tokio::spawn(control_loop(core, command_rx, internal_rx, unit_rx));

        Self {
            commands: command_tx,
        }
    }

    /// Start `broadcast`, or resume it when it is the paused current one
    pub fn play_or_resume(&self, broadcast: &VoiceBroadcast) -> Result<()> {
        self.send(Command::PlayOrResume(broadcast.clone()))
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    /// Stop listening and forget the current broadcast
    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    /// Move to `position_ms` of `broadcast`
    ///
    /// For a broadcast other than the current one only the saved position is
    /// updated; `duration_ms` is used to compute its percentage.
    pub fn seek_to(&self, broadcast: &VoiceBroadcast, position_ms: u64, duration_ms: u64) -> Result<()> {
        self.send(Command::SeekTo {
            broadcast: broadcast.clone(),
            position_ms,
            duration_ms,
        })
    }

    /// Observe `broadcast`; the listener immediately receives its current state
    pub fn add_listener(&self, broadcast: &VoiceBroadcast, listener: Arc<dyn Listener>) -> Result<()> {
        self.send(Command::AddListener {
            broadcast: broadcast.clone(),
            listener,
        })
    }

    pub fn remove_listener(&self, broadcast: &VoiceBroadcast, listener: Arc<dyn Listener>) -> Result<()> {
        self.send(Command::RemoveListener {
            broadcast: broadcast.clone(),
            listener,
        })
    }

    /// Current state, after every request sent before this call was applied
    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| Error::PlayerStopped)
    }

    /// Stop playback and end the control task
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx))?;
        rx.await.map_err(|_| Error::PlayerStopped)
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::PlayerStopped)
    }
}

async fn control_loop(
    mut core: PlayerCore,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut internal: mpsc::UnboundedReceiver<Internal>,
    mut unit_events: mpsc::UnboundedReceiver<UnitEvent>,
) {
    info!("Voice broadcast player started");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => {
                    if !core.handle_command(command) {
                        break;
                    }
                }
                None => {
                    debug!("All player handles dropped");
                    core.stop();
                    break;
                }
            },
            Some(message) = internal.recv() => core.handle_internal(message),
            Some(event) = unit_events.recv() => core.handle_unit_event(event),
        }
    }

    info!("Voice broadcast player stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use crate::media::{AudioSource, MediaUnit, UnitEventSink};
    use crate::sources::{BroadcastEventStream, ChunkStream};
    use crate::state::PlayingState;
    use crate::tracker::InMemoryPlaybackTracker;
    use async_trait::async_trait;
    use futures::StreamExt;
    use vbcast_common::AudioContent;

    struct NoContent;

    #[async_trait]
    impl ContentResolver for NoContent {
        async fn resolve(&self, _content: &AudioContent) -> anyhow::Result<AudioSource> {
            anyhow::bail!("offline")
        }
    }

    #[async_trait]
    impl MediaBackend for NoContent {
        async fn prepare(
            &self,
            _content: &AudioContent,
            _source: AudioSource,
            _events: UnitEventSink,
        ) -> std::result::Result<Box<dyn MediaUnit>, MediaError> {
            Err(MediaError::InvalidState("no backend".into()))
        }
    }

    impl BroadcastEventSource for NoContent {
        fn observe(&self, _broadcast: &VoiceBroadcast) -> BroadcastEventStream {
            futures::stream::pending().boxed()
        }
    }

    impl ChunkSource for NoContent {
        fn observe(&self, _broadcast: &VoiceBroadcast) -> ChunkStream {
            futures::stream::pending().boxed()
        }
    }

    fn spawn_player() -> VoiceBroadcastPlayer {
        let nothing = Arc::new(NoContent);
        VoiceBroadcastPlayer::spawn(
            PlayerDependencies {
                resolver: nothing.clone(),
                backend: nothing.clone(),
                event_source: nothing.clone(),
                chunk_source: nothing,
                tracker: Arc::new(InMemoryPlaybackTracker::new()),
                event_bus: EventBus::new(16),
            },
            PlayerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_new_player_is_idle() {
        let player = spawn_player();
        let snapshot = player.snapshot().await.unwrap();
        assert_eq!(snapshot.playing_state, PlayingState::Idle);
        assert_eq!(snapshot.current_broadcast, None);
        assert!(!snapshot.is_live_listening);
        assert_eq!(snapshot.playlist_duration_ms, 0);
    }

    #[tokio::test]
    async fn test_play_waits_for_broadcast_state() {
        let player = spawn_player();
        let broadcast = VoiceBroadcast::new("$vb", "!room");

        player.play_or_resume(&broadcast).unwrap();
        let snapshot = player.snapshot().await.unwrap();
        assert_eq!(snapshot.playing_state, PlayingState::Buffering);
        assert_eq!(snapshot.current_broadcast, Some(broadcast));
    }

    #[tokio::test]
    async fn test_requests_fail_after_shutdown() {
        let player = spawn_player();
        player.shutdown().await.unwrap();

        // Give the control task time to drop its receiver
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(!player.is_running());
        assert!(matches!(player.stop(), Err(Error::PlayerStopped)));
        assert!(matches!(player.snapshot().await, Err(Error::PlayerStopped)));
    }
}
