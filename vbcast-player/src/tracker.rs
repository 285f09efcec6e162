//! Playback position tracker
//!
//! Remembers, per broadcast, where playback is or was paused, so that the UI
//! can render progress and a later resume can restart at the saved position.

use crate::error::ListeningError;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use vbcast_common::events::{EventBus, PlayerNotification};
use vbcast_common::time;

/// Sink for playback positions
pub trait PlaybackTracker: Send + Sync {
    fn update_playing_at(&self, voice_broadcast_id: &str, position_ms: u64, percentage: f32);

    fn update_paused_at(&self, voice_broadcast_id: &str, position_ms: u64, percentage: f32);

    /// Forget the position (playback ended or reset)
    fn stop_playback(&self, voice_broadcast_id: &str);

    fn on_error(&self, voice_broadcast_id: &str, error: &ListeningError);

    /// Saved position, only while playing or paused
    fn playback_time(&self, voice_broadcast_id: &str) -> Option<u64>;

    /// Saved percentage, only while playing or paused
    fn percentage(&self, voice_broadcast_id: &str) -> Option<f32>;
}

/// Tracked state of one broadcast
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedState {
    Idle,
    Playing { position_ms: u64, percentage: f32 },
    Paused { position_ms: u64, percentage: f32 },
    Error(ListeningError),
}

/// Tracker keeping states in memory and mirroring them on an EventBus
pub struct InMemoryPlaybackTracker {
    states: Mutex<HashMap<String, TrackedState>>,
    event_bus: Option<EventBus>,
}

impl InMemoryPlaybackTracker {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            event_bus: None,
        }
    }

    /// Also publish every update on `event_bus`
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            event_bus: Some(event_bus),
        }
    }

    pub fn state(&self, voice_broadcast_id: &str) -> Option<TrackedState> {
        self.lock().get(voice_broadcast_id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, TrackedState>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, voice_broadcast_id: &str, state: TrackedState) {
        self.lock().insert(voice_broadcast_id.to_string(), state);
    }

    fn publish(&self, event: PlayerNotification) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }

    fn publish_progress(&self, voice_broadcast_id: &str, position_ms: u64, percentage: f32, playing: bool) {
        self.publish(PlayerNotification::PlaybackProgress {
            voice_broadcast_id: voice_broadcast_id.to_string(),
            position_ms,
            percentage,
            playing,
            timestamp: time::now(),
        });
    }
}

impl Default for InMemoryPlaybackTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackTracker for InMemoryPlaybackTracker {
    fn update_playing_at(&self, voice_broadcast_id: &str, position_ms: u64, percentage: f32) {
        self.set(
            voice_broadcast_id,
            TrackedState::Playing {
                position_ms,
                percentage,
            },
        );
        self.publish_progress(voice_broadcast_id, position_ms, percentage, true);
    }

    fn update_paused_at(&self, voice_broadcast_id: &str, position_ms: u64, percentage: f32) {
        self.set(
            voice_broadcast_id,
            TrackedState::Paused {
                position_ms,
                percentage,
            },
        );
        self.publish_progress(voice_broadcast_id, position_ms, percentage, false);
    }

    fn stop_playback(&self, voice_broadcast_id: &str) {
        debug!("Playback position of {} reset", voice_broadcast_id);
        self.set(voice_broadcast_id, TrackedState::Idle);
        self.publish(PlayerNotification::PlaybackStopped {
            voice_broadcast_id: voice_broadcast_id.to_string(),
            timestamp: time::now(),
        });
    }

    fn on_error(&self, voice_broadcast_id: &str, error: &ListeningError) {
        self.set(voice_broadcast_id, TrackedState::Error(error.clone()));
        self.publish(PlayerNotification::PlaybackError {
            voice_broadcast_id: voice_broadcast_id.to_string(),
            error: error.to_string(),
            timestamp: time::now(),
        });
    }

    fn playback_time(&self, voice_broadcast_id: &str) -> Option<u64> {
        match self.lock().get(voice_broadcast_id) {
            Some(TrackedState::Playing { position_ms, .. })
            | Some(TrackedState::Paused { position_ms, .. }) => Some(*position_ms),
            _ => None,
        }
    }

    fn percentage(&self, voice_broadcast_id: &str) -> Option<f32> {
        match self.lock().get(voice_broadcast_id) {
            Some(TrackedState::Playing { percentage, .. })
            | Some(TrackedState::Paused { percentage, .. }) => Some(*percentage),
            _ => None,
        }
    }
}
