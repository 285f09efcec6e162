//! Scripted broadcast
//!
//! Replays a broadcast described in a TOML file as the two live streams the
//! player consumes. Example script:
//!
//! ```toml
//! voice_broadcast_id = "$demo"
//! room_id = "!room:example.org"
//! live = true
//! ends_after_ms = 1500
//! chunk_dir = "chunks"
//!
//! [[chunk]]
//! sequence = 1
//! duration_ms = 3000
//! file = "1.ogg"
//!
//! [[chunk]]
//! sequence = 2
//! duration_ms = 3000
//! file = "2.ogg"
//! available_at_ms = 2500
//! ```
//!
//! A live broadcast publishes each chunk at its `available_at_ms` and stops
//! `ends_after_ms` after the last one. A broadcast that is not live is
//! stopped from the start and all its chunks are known immediately.

use crate::error::{Error, Result};
use crate::sources::{BroadcastEventSource, BroadcastEventStream, ChunkSource, ChunkStream};
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::debug;
use vbcast_common::{
    AudioContent, VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent, VoiceBroadcastState,
};

/// Broadcast description
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BroadcastScript {
    pub voice_broadcast_id: String,

    #[serde(default)]
    pub room_id: String,

    /// Still recording when the script starts
    #[serde(default)]
    pub live: bool,

    /// Delay between the last chunk and the end of the recording
    #[serde(default)]
    pub ends_after_ms: u64,

    /// Directory holding the chunk files, relative to the script
    #[serde(default)]
    pub chunk_dir: Option<PathBuf>,

    #[serde(rename = "chunk", default)]
    pub chunks: Vec<ScriptedChunk>,
}

/// One chunk of a scripted broadcast
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptedChunk {
    pub sequence: u32,
    pub duration_ms: u64,
    pub file: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Publication time relative to the script start (live broadcasts only)
    #[serde(default)]
    pub available_at_ms: u64,
}

impl ScriptedChunk {
    fn to_chunk(&self) -> VoiceBroadcastChunk {
        VoiceBroadcastChunk {
            sequence: self.sequence,
            duration_ms: self.duration_ms,
            content: AudioContent {
                url: self.file.clone(),
                mime_type: self.mime_type.clone(),
                duration_ms: self.duration_ms,
            },
        }
    }
}

impl BroadcastScript {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let script: BroadcastScript =
            toml::from_str(content).map_err(|e| Error::Script(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    /// Load a script; a relative `chunk_dir` is resolved against the script's directory
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut script = Self::from_toml_str(&content).map_err(|e| match e {
            Error::Script(msg) => Error::Script(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        script.chunk_dir = Some(match script.chunk_dir.take() {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        });
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.chunks.is_empty() {
            return Err(Error::Script("script has no chunk".to_string()));
        }
        let mut sequences = HashSet::new();
        for chunk in &self.chunks {
            if !sequences.insert(chunk.sequence) {
                return Err(Error::Script(format!(
                    "chunk sequence {} appears twice",
                    chunk.sequence
                )));
            }
        }
        Ok(())
    }

    pub fn broadcast(&self) -> VoiceBroadcast {
        VoiceBroadcast::new(self.voice_broadcast_id.clone(), self.room_id.clone())
    }

    /// Directory chunk files are read from
    pub fn chunk_dir(&self) -> PathBuf {
        self.chunk_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn last_sequence(&self) -> Option<u32> {
        self.chunks.iter().map(|c| c.sequence).max()
    }

    pub fn duration_ms(&self) -> u64 {
        self.chunks.iter().map(|c| c.duration_ms).sum()
    }

    /// Chunk publication time; everything is published at once when not live
    fn available_at(&self, chunk: &ScriptedChunk) -> u64 {
        if self.live {
            chunk.available_at_ms
        } else {
            0
        }
    }

    /// Time at which the recording stops
    fn ends_at_ms(&self) -> u64 {
        let last_publication = self
            .chunks
            .iter()
            .map(|c| self.available_at(c))
            .max()
            .unwrap_or(0);
        last_publication + self.ends_after_ms
    }

    fn event(&self, state: VoiceBroadcastState) -> VoiceBroadcastEvent {
        let last_chunk_sequence = match state {
            VoiceBroadcastState::Stopped => self.last_sequence(),
            _ => None,
        };
        VoiceBroadcastEvent {
            voice_broadcast_id: self.voice_broadcast_id.clone(),
            state,
            last_chunk_sequence,
        }
    }
}

/// Live streams replaying a [`BroadcastScript`]
///
/// The script clock starts when the `ScriptedBroadcast` is created.
#[derive(Debug, Clone)]
pub struct ScriptedBroadcast {
    script: Arc<BroadcastScript>,
    origin: Instant,
}

impl ScriptedBroadcast {
    pub fn new(script: BroadcastScript) -> Self {
        Self {
            script: Arc::new(script),
            origin: Instant::now(),
        }
    }

    pub fn script(&self) -> &BroadcastScript {
        &self.script
    }

    fn is_scripted(&self, broadcast: &VoiceBroadcast) -> bool {
        broadcast.voice_broadcast_id == self.script.voice_broadcast_id
    }
}

impl BroadcastEventSource for ScriptedBroadcast {
    fn observe(&self, broadcast: &VoiceBroadcast) -> BroadcastEventStream {
        let script = self.script.clone();
        let origin = self.origin;
        let known = self.is_scripted(broadcast);

        async_stream::stream! {
            if !known {
                yield None;
                return;
            }

            if script.live {
                yield Some(script.event(VoiceBroadcastState::Started));
                sleep_until(origin + Duration::from_millis(script.ends_at_ms())).await;
                debug!("Scripted broadcast {} stopped", script.voice_broadcast_id);
            }
            yield Some(script.event(VoiceBroadcastState::Stopped));

            // The state stays observable after the end
            futures::future::pending::<()>().await;
        }
        .boxed()
    }
}

impl ChunkSource for ScriptedBroadcast {
    fn observe(&self, broadcast: &VoiceBroadcast) -> ChunkStream {
        let script = self.script.clone();
        let origin = self.origin;
        let known = self.is_scripted(broadcast);

        async_stream::stream! {
            if !known {
                yield Vec::new();
                return;
            }

            let mut pending: Vec<&ScriptedChunk> = script.chunks.iter().collect();
            pending.sort_by_key(|c| (script.available_at(c), c.sequence));

            let mut published = Vec::with_capacity(pending.len());
            let mut index = 0;
            while index < pending.len() {
                let at = script.available_at(pending[index]);
                sleep_until(origin + Duration::from_millis(at)).await;
                while index < pending.len() && script.available_at(pending[index]) == at {
                    published.push(pending[index].to_chunk());
                    index += 1;
                }
                yield published.clone();
            }

            futures::future::pending::<()>().await;
        }
        .boxed()
    }
}
