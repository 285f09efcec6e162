//! Messages consumed by the player control task

use crate::error::ListeningError;
use crate::media::{MediaUnit, UnitId};
use crate::playback::listeners::Listener;
use crate::state::PlayerSnapshot;
use std::sync::Arc;
use tokio::sync::oneshot;
use vbcast_common::{VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent};

/// Requests sent through a [`super::VoiceBroadcastPlayer`] handle
pub(crate) enum Command {
    PlayOrResume(VoiceBroadcast),
    Pause,
    Stop,
    SeekTo {
        broadcast: VoiceBroadcast,
        position_ms: u64,
        duration_ms: u64,
    },
    AddListener {
        broadcast: VoiceBroadcast,
        listener: Arc<dyn Listener>,
    },
    RemoveListener {
        broadcast: VoiceBroadcast,
        listener: Arc<dyn Listener>,
    },
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Why a unit is being prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreparePurpose {
    /// Unit to start right away, at `offset_ms` within the chunk
    Current { sequence: u32, offset_ms: u64 },
    /// Prefetch of the chunk following the current one
    Next { sequence: u32 },
}

/// Results of background work, fed back into the control task
///
/// Every message carries the session (and, for preparations, the engine
/// epoch) it was produced under so that late results can be dropped.
pub(crate) enum Internal {
    BroadcastEvent {
        session: u64,
        event: Option<VoiceBroadcastEvent>,
        first: bool,
    },
    Chunks {
        session: u64,
        chunks: Vec<VoiceBroadcastChunk>,
    },
    Tick {
        generation: u64,
    },
    Prepared {
        session: u64,
        epoch: u64,
        unit_id: UnitId,
        purpose: PreparePurpose,
        result: Result<Box<dyn MediaUnit>, ListeningError>,
    },
}
