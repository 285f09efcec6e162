//! Player state types
//!
//! `PlayingState` is the state machine's state; `PlayerSnapshot` is the
//! read-only view handed out to callers.

use crate::error::ListeningError;
use vbcast_common::events::PlaybackStatus;
use vbcast_common::VoiceBroadcast;

/// Playing state of the current broadcast
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayingState {
    #[default]
    Idle,
    Buffering,
    Playing,
    Paused,
    Error(ListeningError),
}

impl PlayingState {
    /// Payload-free status
    pub fn status(&self) -> PlaybackStatus {
        match self {
            PlayingState::Idle => PlaybackStatus::Idle,
            PlayingState::Buffering => PlaybackStatus::Buffering,
            PlayingState::Playing => PlaybackStatus::Playing,
            PlayingState::Paused => PlaybackStatus::Paused,
            PlayingState::Error(_) => PlaybackStatus::Error,
        }
    }

    pub fn error(&self) -> Option<&ListeningError> {
        match self {
            PlayingState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlayingState::Error(_))
    }
}

impl std::fmt::Display for PlayingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayingState::Error(err) => write!(f, "error ({})", err),
            other => write!(f, "{}", other.status()),
        }
    }
}

/// Point-in-time view of the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub current_broadcast: Option<VoiceBroadcast>,
    pub playing_state: PlayingState,
    pub is_live_listening: bool,
    /// Sequence of the chunk being played
    pub current_sequence: Option<u32>,
    /// Known duration of the broadcast
    pub playlist_duration_ms: u64,
    /// Absolute position, computed or saved
    pub position_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(PlayingState::default(), PlayingState::Idle);
    }

    #[test]
    fn test_status_projection() {
        let state = PlayingState::Error(ListeningError::Download("404".into()));
        assert_eq!(state.status(), PlaybackStatus::Error);
        assert!(state.is_error());
        assert_eq!(state.error(), Some(&ListeningError::Download("404".into())));
        assert_eq!(PlayingState::Buffering.status(), PlaybackStatus::Buffering);
        assert!(PlayingState::Playing.error().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(PlayingState::Paused.to_string(), "paused");
        assert_eq!(
            PlayingState::Error(ListeningError::UnableToPlay { what: 1, extra: 2 }).to_string(),
            "error (Unable to play audio chunk (what=1, extra=2))"
        );
    }

    #[test]
    fn test_errors_compare_by_payload() {
        let a = PlayingState::Error(ListeningError::Download("a".into()));
        let b = PlayingState::Error(ListeningError::Download("b".into()));
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }
}
