//! Dual media unit engine
//!
//! Holds at most one playing unit ("current") and one prepared unit for the
//! following chunk ("next"), so that the next chunk starts without a gap
//! when the current one completes.
//!
//! Preparation (download + decoder setup) runs outside the engine through
//! [`UnitFactory`]. Each preparation is tagged with the engine epoch at launch
//! time; `stop_player` bumps the epoch, which turns every in-flight result
//! into a stale one that the caller must release.

use crate::error::{ListeningError, MediaError};
use crate::media::{ContentResolver, MediaBackend, MediaUnit, UnitEvent, UnitEventSink, UnitId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use vbcast_common::AudioContent;

/// A unit together with the chunk it plays
pub struct PreparedUnit {
    pub id: UnitId,
    pub sequence: u32,
    pub unit: Box<dyn MediaUnit>,
}

impl std::fmt::Debug for PreparedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedUnit")
            .field("id", &self.id)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

/// Builds ready-to-play units from chunk references
#[derive(Clone)]
pub struct UnitFactory {
    resolver: Arc<dyn ContentResolver>,
    backend: Arc<dyn MediaBackend>,
    unit_events: mpsc::UnboundedSender<UnitEvent>,
}

impl UnitFactory {
    pub fn new(
        resolver: Arc<dyn ContentResolver>,
        backend: Arc<dyn MediaBackend>,
        unit_events: mpsc::UnboundedSender<UnitEvent>,
    ) -> Self {
        Self {
            resolver,
            backend,
            unit_events,
        }
    }

    /// Download `content` and prepare a unit for it
    ///
    /// Retrieval failures become `ListeningError::Download`, engine failures
    /// `ListeningError::UnableToPlay`.
    pub async fn prepare(
        &self,
        unit_id: UnitId,
        content: AudioContent,
    ) -> Result<Box<dyn MediaUnit>, ListeningError> {
        let source = self.resolver.resolve(&content).await.map_err(|e| {
            error!("Download of {} has failed: {:#}", content.url, e);
            ListeningError::Download(format!("{:#}", e))
        })?;

        let events = UnitEventSink::new(unit_id, self.unit_events.clone());
        self.backend.prepare(&content, source, events).await.map_err(|e| {
            warn!("Unable to prepare {}: {}", content.url, e);
            ListeningError::from(e)
        })
    }
}

/// Current + next unit pair
#[derive(Debug, Default)]
pub struct DualPlayer {
    current: Option<PreparedUnit>,
    next: Option<PreparedUnit>,
    preparing_next: bool,
    epoch: u64,
}

impl DualPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epoch to attach to a preparation launched now
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True if a result launched at `epoch` must be discarded
    pub fn is_stale(&self, epoch: u64) -> bool {
        epoch != self.epoch
    }

    pub fn current_mut(&mut self) -> Option<&mut PreparedUnit> {
        self.current.as_mut()
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn is_preparing_next(&self) -> bool {
        self.preparing_next
    }

    pub fn is_current(&self, id: UnitId) -> bool {
        self.current.as_ref().is_some_and(|u| u.id == id)
    }

    pub fn is_next(&self, id: UnitId) -> bool {
        self.next.as_ref().is_some_and(|u| u.id == id)
    }

    /// Offset inside the current chunk
    pub fn current_position_ms(&self) -> Option<u64> {
        self.current.as_ref().and_then(|u| u.unit.position_ms())
    }

    pub fn current_is_playing(&self) -> bool {
        self.current.as_ref().is_some_and(|u| u.unit.is_playing())
    }

    /// Claim the single "prepare next" slot
    ///
    /// Returns the epoch to tag the preparation with, or None when a
    /// preparation is already in flight or a next unit is already held.
    pub fn try_begin_prepare_next(&mut self) -> Option<u64> {
        if self.preparing_next || self.next.is_some() {
            return None;
        }
        self.preparing_next = true;
        Some(self.epoch)
    }

    /// Release the "prepare next" slot after a failed preparation
    pub fn abort_prepare_next(&mut self) {
        self.preparing_next = false;
    }

    /// Store a freshly prepared next unit
    pub fn set_next(&mut self, unit: PreparedUnit) {
        self.preparing_next = false;
        if let Some(mut previous) = self.next.replace(unit) {
            previous.unit.release();
        }
    }

    /// Release the held next unit after it failed
    ///
    /// The slot is free again so that the chunk can be prepared anew.
    pub fn drop_next(&mut self) {
        if let Some(mut failed) = self.next.take() {
            debug!("Dropping failed next unit {} (sequence {})", failed.id, failed.sequence);
            failed.unit.release();
        }
        self.preparing_next = false;
    }

    /// Install the unit that becomes audible, releasing any previous one
    pub fn set_current(&mut self, unit: PreparedUnit) {
        if let Some(mut previous) = self.current.replace(unit) {
            best_effort_stop(&mut previous);
            previous.unit.release();
        }
    }

    /// Gapless hand-off: start the prepared next unit and make it current
    ///
    /// Returns the sequence now playing, None when no next unit is held.
    /// A unit that fails to start is released.
    pub fn promote_next(&mut self) -> Result<Option<u32>, MediaError> {
        let Some(mut next) = self.next.take() else {
            return Ok(None);
        };

        if let Err(e) = next.unit.start() {
            next.unit.release();
            return Err(e);
        }

        let sequence = next.sequence;
        debug!("Unit {} (sequence {}) promoted to current", next.id, sequence);
        self.set_current(next);
        Ok(Some(sequence))
    }

    /// Release the current unit after it reported completion
    ///
    /// Returns false if `id` is not the current unit.
    pub fn release_completed(&mut self, id: UnitId) -> bool {
        if !self.is_current(id) {
            return false;
        }
        if let Some(mut done) = self.current.take() {
            done.unit.release();
        }
        true
    }

    /// Stop and release everything; safe to call in any state
    ///
    /// Stop failures are logged and never prevent the release.
    pub fn stop_player(&mut self) {
        if let Some(mut current) = self.current.take() {
            best_effort_stop(&mut current);
            current.unit.release();
        }
        if let Some(mut next) = self.next.take() {
            next.unit.release();
        }
        self.preparing_next = false;
        self.epoch += 1;
    }
}

impl Drop for DualPlayer {
    fn drop(&mut self) {
        self.stop_player();
    }
}

fn best_effort_stop(unit: &mut PreparedUnit) {
    if let Err(e) = unit.unit.stop() {
        debug!("Ignoring stop failure of unit {}: {}", unit.id, e);
    }
}
