//! Host-provided media capabilities
//!
//! The player never touches audio hardware or the network directly. The host
//! supplies:
//! - a [`ContentResolver`] turning chunk references into audio bytes,
//! - a [`MediaBackend`] turning audio bytes into a playable [`MediaUnit`].
//!
//! Units report completion and asynchronous failures through the
//! [`UnitEventSink`] they receive at preparation time.

use crate::error::MediaError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;
use uuid::Uuid;
use vbcast_common::AudioContent;

/// Identifier of one prepared media unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audio payload ready to be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Downloaded to a local file
    File(PathBuf),
    /// Held in memory
    Bytes(Vec<u8>),
}

impl AudioSource {
    /// Payload size when known without I/O
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            AudioSource::File(_) => None,
            AudioSource::Bytes(bytes) => Some(bytes.len()),
        }
    }
}

/// Asynchronous notification from a media unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitEvent {
    /// Unit played its content to the end
    Completed { unit: UnitId },
    /// Unit failed while playing
    Failed { unit: UnitId, error: MediaError },
}

/// Channel through which a unit reports its events
#[derive(Debug, Clone)]
pub struct UnitEventSink {
    unit: UnitId,
    tx: mpsc::UnboundedSender<UnitEvent>,
}

impl UnitEventSink {
    pub fn new(unit: UnitId, tx: mpsc::UnboundedSender<UnitEvent>) -> Self {
        Self { unit, tx }
    }

    /// Unit this sink reports for
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Report end of content; ignored if the player is gone
    pub fn completed(&self) {
        let _ = self.tx.send(UnitEvent::Completed { unit: self.unit });
    }

    /// Report a playback failure; ignored if the player is gone
    pub fn failed(&self, error: MediaError) {
        let _ = self.tx.send(UnitEvent::Failed {
            unit: self.unit,
            error,
        });
    }
}

/// Resolves chunk references to audio payloads (download, cache lookup, ...)
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn resolve(&self, content: &AudioContent) -> anyhow::Result<AudioSource>;
}

/// Creates decoding/output units
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Prepare a unit for `source`; it must not start playing on its own
    ///
    /// `content` carries the chunk metadata (mime type, announced duration).
    async fn prepare(
        &self,
        content: &AudioContent,
        source: AudioSource,
        events: UnitEventSink,
    ) -> Result<Box<dyn MediaUnit>, MediaError>;
}

/// One decoding/output unit playing a single chunk
pub trait MediaUnit: Send {
    /// Start or resume output
    fn start(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self) -> Result<(), MediaError>;

    /// Stop output; the unit cannot be restarted afterwards
    fn stop(&mut self) -> Result<(), MediaError>;

    /// Move to an offset within the chunk
    fn seek_to(&mut self, position_ms: u64) -> Result<(), MediaError>;

    /// Offset within the chunk, None once released
    fn position_ms(&self) -> Option<u64>;

    fn is_playing(&self) -> bool;

    /// Free the unit's resources; must be safe to call in any state
    fn release(&mut self);
}
