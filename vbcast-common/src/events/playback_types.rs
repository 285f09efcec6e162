//! Playback-related type definitions
//!
//! Supporting types for the listening state machine.

use serde::{Deserialize, Serialize};

/// Playback status of a voice broadcast
///
/// Payload-free projection of the player's playing state, suitable for
/// serialisation. The failure detail travels next to it in notifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing playing for this broadcast
    Idle,
    /// Waiting for a chunk to be downloaded or to arrive
    Buffering,
    Playing,
    Paused,
    /// Playback failed; the user has to start it again
    Error,
}

impl PlaybackStatus {
    /// True for every status except Idle
    pub fn is_active(&self) -> bool {
        !matches!(self, PlaybackStatus::Idle)
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "idle"),
            PlaybackStatus::Buffering => write!(f, "buffering"),
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Error => write!(f, "error"),
        }
    }
}
