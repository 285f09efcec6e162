//! Voice broadcast model types
//!
//! A voice broadcast is one continuous recording split into sequentially
//! numbered audio chunks. While the broadcaster is still recording the chunk
//! list keeps growing ("live"); once stopped, the state event carries the
//! sequence number of the last chunk.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Identity of a voice broadcast
///
/// Equality and hashing only consider `voice_broadcast_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceBroadcast {
    /// Id of the event that started the broadcast
    pub voice_broadcast_id: String,
    /// Room the broadcast belongs to
    #[serde(default)]
    pub room_id: String,
}

impl VoiceBroadcast {
    pub fn new(voice_broadcast_id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            voice_broadcast_id: voice_broadcast_id.into(),
            room_id: room_id.into(),
        }
    }
}

impl PartialEq for VoiceBroadcast {
    fn eq(&self, other: &Self) -> bool {
        self.voice_broadcast_id == other.voice_broadcast_id
    }
}

impl Eq for VoiceBroadcast {}

impl Hash for VoiceBroadcast {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.voice_broadcast_id.hash(state);
    }
}

/// Recording state announced by the broadcaster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoiceBroadcastState {
    Started,
    Paused,
    Resumed,
    Stopped,
}

impl std::fmt::Display for VoiceBroadcastState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceBroadcastState::Started => write!(f, "started"),
            VoiceBroadcastState::Paused => write!(f, "paused"),
            VoiceBroadcastState::Resumed => write!(f, "resumed"),
            VoiceBroadcastState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Latest known state event of a broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceBroadcastEvent {
    pub voice_broadcast_id: String,
    pub state: VoiceBroadcastState,
    /// Sequence number of the final chunk, only set once the broadcast stopped
    #[serde(default)]
    pub last_chunk_sequence: Option<u32>,
}

impl VoiceBroadcastEvent {
    /// A broadcast is live until the broadcaster stops it
    ///
    /// A paused recording is still live: more chunks may arrive.
    pub fn is_live(&self) -> bool {
        self.state != VoiceBroadcastState::Stopped
    }
}

/// Opaque reference to the audio payload of one chunk
///
/// Resolved to bytes by the host's content resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioContent {
    /// Content URL (mxc:// URI, file name, ...)
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Duration announced by the sender
    pub duration_ms: u64,
}

/// One chunk as delivered by the chunk stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceBroadcastChunk {
    pub sequence: u32,
    pub duration_ms: u64,
    pub content: AudioContent,
}

impl VoiceBroadcastChunk {
    pub fn new(sequence: u32, duration_ms: u64, url: impl Into<String>) -> Self {
        Self {
            sequence,
            duration_ms,
            content: AudioContent {
                url: url.into(),
                mime_type: None,
                duration_ms,
            },
        }
    }
}
