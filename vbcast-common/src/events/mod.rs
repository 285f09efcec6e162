//! Event types for the vbcast event system
//!
//! Provides the notification enum published by the player and the EventBus
//! used to fan it out to any number of observers (UI, logging, tests).

mod playback_types;

pub use playback_types::PlaybackStatus;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notifications emitted by the voice broadcast player
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a UI process. Every variant names the broadcast it concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerNotification {
    /// Playing state of the current broadcast changed
    PlayingStateChanged {
        voice_broadcast_id: String,
        /// State before change
        old_status: PlaybackStatus,
        /// State after change
        new_status: PlaybackStatus,
        /// Failure description when `new_status` is Error
        error: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback started or stopped following the live edge
    LiveModeChanged {
        voice_broadcast_id: String,
        is_live: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Position update
    ///
    /// Emitted by the playback tracker on every ticker tick while playing,
    /// and once whenever playback is paused or buffering.
    PlaybackProgress {
        voice_broadcast_id: String,
        /// Absolute position in the broadcast (milliseconds)
        position_ms: u64,
        /// Position relative to the known broadcast duration (0.0-1.0)
        percentage: f32,
        /// Whether audio is currently audible (vs. paused/buffering)
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback reached its end or was reset; stored position forgotten
    PlaybackStopped {
        voice_broadcast_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback failed
    PlaybackError {
        voice_broadcast_id: String,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerNotification {
    /// Variant name, matching the serialized `type` tag
    pub fn event_type(&self) -> &str {
        match self {
            PlayerNotification::PlayingStateChanged { .. } => "PlayingStateChanged",
            PlayerNotification::LiveModeChanged { .. } => "LiveModeChanged",
            PlayerNotification::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerNotification::PlaybackStopped { .. } => "PlaybackStopped",
            PlayerNotification::PlaybackError { .. } => "PlaybackError",
        }
    }

    /// Broadcast the notification refers to
    pub fn voice_broadcast_id(&self) -> &str {
        match self {
            PlayerNotification::PlayingStateChanged { voice_broadcast_id, .. }
            | PlayerNotification::LiveModeChanged { voice_broadcast_id, .. }
            | PlayerNotification::PlaybackProgress { voice_broadcast_id, .. }
            | PlayerNotification::PlaybackStopped { voice_broadcast_id, .. }
            | PlayerNotification::PlaybackError { voice_broadcast_id, .. } => voice_broadcast_id,
        }
    }
}

/// Central event distribution bus
///
/// Thin wrapper over a tokio broadcast channel. Slow receivers lose the
/// oldest events (`RecvError::Lagged`) instead of blocking the player.
///
/// # Examples
///
/// ```
/// use vbcast_common::events::{EventBus, PlayerNotification};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(PlayerNotification::PlaybackStopped {
///     voice_broadcast_id: "$broadcast".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert_eq!(rx.try_recv().unwrap().event_type(), "PlaybackStopped");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerNotification>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerNotification> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerNotification) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
