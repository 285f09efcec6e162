//! Test helper modules for vbcast-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - FakeResolver / FakeBackend: host capabilities controlled by the test
//! - ChannelBroadcast: broadcast state and chunk streams fed by the test
//! - RecordingListener: records every listener callback
//! - Harness: a spawned player wired to all of the above

#![allow(dead_code)]

pub mod fakes;
pub mod sources;

pub use fakes::{FakeBackend, FakeResolver, UnitState};
pub use sources::ChannelBroadcast;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use vbcast_common::events::EventBus;
use vbcast_common::{VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent, VoiceBroadcastState};
use vbcast_player::tracker::InMemoryPlaybackTracker;
use vbcast_player::{
    Listener, PlayerConfig, PlayerDependencies, PlayerSnapshot, PlayingState, VoiceBroadcastPlayer,
};

const WAIT_TIMEOUT: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

pub const BROADCAST_ID: &str = "$broadcast";

// ================================================================================================
// Broadcast data
// ================================================================================================

pub fn chunk_url(sequence: u32) -> String {
    format!("chunk-{}.ogg", sequence)
}

/// Chunks 1..=count, each `duration_ms` long
pub fn chunks(count: u32, duration_ms: u64) -> Vec<VoiceBroadcastChunk> {
    (1..=count)
        .map(|sequence| VoiceBroadcastChunk::new(sequence, duration_ms, chunk_url(sequence)))
        .collect()
}

pub fn live_event() -> VoiceBroadcastEvent {
    VoiceBroadcastEvent {
        voice_broadcast_id: BROADCAST_ID.to_string(),
        state: VoiceBroadcastState::Started,
        last_chunk_sequence: None,
    }
}

pub fn stopped_event(last_chunk_sequence: u32) -> VoiceBroadcastEvent {
    VoiceBroadcastEvent {
        voice_broadcast_id: BROADCAST_ID.to_string(),
        state: VoiceBroadcastState::Stopped,
        last_chunk_sequence: Some(last_chunk_sequence),
    }
}

// ================================================================================================
// RecordingListener
// ================================================================================================

#[derive(Default)]
pub struct RecordingListener {
    states: Mutex<Vec<PlayingState>>,
    live_modes: Mutex<Vec<bool>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<PlayingState> {
        self.states.lock().unwrap().clone()
    }

    pub fn live_modes(&self) -> Vec<bool> {
        self.live_modes.lock().unwrap().clone()
    }
}

impl Listener for RecordingListener {
    fn on_playing_state_changed(&self, state: &PlayingState) {
        self.states.lock().unwrap().push(state.clone());
    }

    fn on_live_mode_changed(&self, is_live: bool) {
        self.live_modes.lock().unwrap().push(is_live);
    }
}

// ================================================================================================
// Harness
// ================================================================================================

/// Player spawned against fakes, plus handles on every fake
pub struct Harness {
    pub player: VoiceBroadcastPlayer,
    pub broadcast: VoiceBroadcast,
    pub resolver: FakeResolver,
    pub backend: FakeBackend,
    pub source: Arc<ChannelBroadcast>,
    pub tracker: Arc<InMemoryPlaybackTracker>,
    pub event_bus: EventBus,
}

impl Harness {
    pub fn new(event: Option<VoiceBroadcastEvent>) -> Self {
        let resolver = FakeResolver::new();
        let backend = FakeBackend::new();
        let source = Arc::new(ChannelBroadcast::new(event));
        let tracker = Arc::new(InMemoryPlaybackTracker::new());
        let event_bus = EventBus::new(256);

        let config = PlayerConfig {
            tick_interval: Duration::from_millis(20),
            ..PlayerConfig::default()
        };
        let player = VoiceBroadcastPlayer::spawn(
            PlayerDependencies {
                resolver: Arc::new(resolver.clone()),
                backend: Arc::new(backend.clone()),
                event_source: source.clone(),
                chunk_source: source.clone(),
                tracker: tracker.clone(),
                event_bus: event_bus.clone(),
            },
            config,
        );

        Self {
            player,
            broadcast: VoiceBroadcast::new(BROADCAST_ID, "!room:example.org"),
            resolver,
            backend,
            source,
            tracker,
            event_bus,
        }
    }

    /// Broadcast still recording
    pub fn live() -> Self {
        Self::new(Some(live_event()))
    }

    /// Broadcast stopped after `last_chunk_sequence`
    pub fn ended(last_chunk_sequence: u32) -> Self {
        Self::new(Some(stopped_event(last_chunk_sequence)))
    }

    pub fn play(&self) {
        self.player.play_or_resume(&self.broadcast).unwrap();
    }

    pub async fn snapshot(&self) -> PlayerSnapshot {
        self.player.snapshot().await.unwrap()
    }

    pub async fn wait_for_state(&self, expected: PlayingState) -> PlayerSnapshot {
        let description = format!("state {}", expected);
        self.wait_until(&description, |s| s.playing_state == expected)
            .await
    }

    /// Poll snapshots until `predicate` holds; panics after a timeout
    pub async fn wait_until<F>(&self, what: &str, predicate: F) -> PlayerSnapshot
    where
        F: Fn(&PlayerSnapshot) -> bool,
    {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let snapshot = self.snapshot().await;
            if predicate(&snapshot) {
                return snapshot;
            }
            if Instant::now() > deadline {
                panic!("Timed out waiting for {}, last snapshot: {:?}", what, snapshot);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Poll `condition` until it holds; panics after a timeout
pub async fn wait_for<F>(what: &str, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while !condition() {
        if Instant::now() > deadline {
            panic!("Timed out waiting for {}", what);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Give the control task time to process in-flight messages
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(60)).await;
}
