//! Live listening decision
//!
//! Decides whether playback follows the live edge of the broadcast, from:
//! - the broadcast state (live or ended),
//! - the playing state (Idle, Buffering, Playing, Paused, Error),
//! - a potential seek (forward or backward).
//!
//! Rules are evaluated in order and the first matching one wins. Forward and
//! backward seeks are deliberately asymmetric: a forward seek can enter live
//! mode, a backward seek can only keep it when staying inside the chunk being
//! played.

use std::cmp::Ordering;
use vbcast_common::events::PlaybackStatus;

/// Seek being applied while deciding the live mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekRequest {
    /// Requested absolute position
    pub target_position_ms: u64,
    /// Sequence of the chunk covering the target, if known
    pub target_sequence: Option<u32>,
}

/// Everything the decision depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveModeInputs {
    pub is_broadcast_live: bool,
    pub status: PlaybackStatus,
    /// Current (or saved) playback position, None if never played
    pub current_position_ms: Option<u64>,
    pub current_sequence: Option<u32>,
    /// Highest chunk sequence known so far
    pub last_sequence: Option<u32>,
    pub seek: Option<SeekRequest>,
    /// Value before this decision
    pub previous: bool,
}

/// Compute the live listening flag
pub fn resolve_live_listening(inputs: &LiveModeInputs) -> bool {
    // Broadcast ended
    if !inputs.is_broadcast_live {
        return false;
    }

    // Player stopped or paused
    if matches!(inputs.status, PlaybackStatus::Idle | PlaybackStatus::Paused) {
        return false;
    }

    if let Some(seek) = inputs.seek {
        let direction = seek
            .target_position_ms
            .cmp(&inputs.current_position_ms.unwrap_or(0));
        return match direction {
            // Sought forward: stay live, or go live when landing on the latest chunk
            Ordering::Greater | Ordering::Equal => {
                inputs.previous || seek.target_sequence == inputs.last_sequence
            }
            // Sought backward: stay live only inside the same chunk
            Ordering::Less => inputs.previous && seek.target_sequence == inputs.current_sequence,
        };
    }

    // Nothing played yet, join live
    if inputs.current_position_ms.is_none() {
        return true;
    }

    // Latest chunk reached
    if inputs.current_sequence == inputs.last_sequence {
        return true;
    }

    inputs.previous
}
