//! Player state machine
//!
//! **Responsibilities:**
//! - Playing state transitions (Idle, Buffering, Playing, Paused, Error)
//! - Live listening flag maintenance
//! - Driving the dual-player engine from chunk, unit and user events
//! - Position sampling for the playback tracker
//!
//! Everything here runs on the control task, one message at a time.
//! Background work (downloads, stream consumption, ticks) reports back
//! through `Internal` messages.

use super::messages::{Command, Internal, PreparePurpose};
use crate::config::PlayerConfig;
use crate::error::{ListeningError, MediaError};
use crate::media::{MediaUnit, UnitEvent, UnitId};
use crate::playback::dual_player::{DualPlayer, PreparedUnit, UnitFactory};
use crate::playback::listeners::{Listener, ListenerRegistry};
use crate::playback::live_mode::{resolve_live_listening, LiveModeInputs, SeekRequest};
use crate::playback::playlist::Playlist;
use crate::playback::ticker::PlaybackTicker;
use crate::sources::{BroadcastEventSource, ChunkSource, Subscription};
use crate::state::{PlayerSnapshot, PlayingState};
use crate::tracker::PlaybackTracker;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vbcast_common::events::{EventBus, PlayerNotification};
use vbcast_common::time::{self, fraction_of};
use vbcast_common::{AudioContent, VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent};

/// Collaborators used by the state machine
pub(crate) struct Collaborators {
    pub factory: UnitFactory,
    pub event_source: Arc<dyn BroadcastEventSource>,
    pub chunk_source: Arc<dyn ChunkSource>,
    pub tracker: Arc<dyn PlaybackTracker>,
    pub event_bus: EventBus,
}

pub(crate) struct PlayerCore {
    config: PlayerConfig,
    collaborators: Collaborators,
    internal_tx: mpsc::UnboundedSender<Internal>,

    listeners: ListenerRegistry,
    playlist: Playlist,
    engine: DualPlayer,
    ticker: PlaybackTicker,

    current_broadcast: Option<VoiceBroadcast>,
    most_recent_event: Option<VoiceBroadcastEvent>,
    playing_state: PlayingState,
    is_live_listening: bool,

    /// Bumped whenever the followed broadcast changes or playback stops
    session: u64,
    event_subscription: Option<Subscription>,
    chunk_subscription: Option<Subscription>,

    /// Engine epoch of the in-flight "start playback" preparation
    pending_start: Option<u64>,
    /// Requested position whose chunk is not known yet
    pending_seek_ms: Option<u64>,
}

impl PlayerCore {
    pub fn new(
        config: PlayerConfig,
        collaborators: Collaborators,
        internal_tx: mpsc::UnboundedSender<Internal>,
    ) -> Self {
        let ticker = PlaybackTicker::new(config.tick_interval);
        Self {
            config,
            collaborators,
            internal_tx,
            listeners: ListenerRegistry::new(),
            playlist: Playlist::new(),
            engine: DualPlayer::new(),
            ticker,
            current_broadcast: None,
            most_recent_event: None,
            playing_state: PlayingState::Idle,
            is_live_listening: false,
            session: 0,
            event_subscription: None,
            chunk_subscription: None,
            pending_start: None,
            pending_seek_ms: None,
        }
    }

    /// Apply a handle request; returns false when the control task must end
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::PlayOrResume(broadcast) => self.play_or_resume(broadcast),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::SeekTo {
                broadcast,
                position_ms,
                duration_ms,
            } => self.seek_to(&broadcast, position_ms, duration_ms),
            Command::AddListener {
                broadcast,
                listener,
            } => self.add_listener(&broadcast, listener),
            Command::RemoveListener {
                broadcast,
                listener,
            } => {
                self.listeners
                    .remove(&broadcast.voice_broadcast_id, &listener);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown(done) => {
                self.stop();
                let _ = done.send(());
                return false;
            }
        }
        true
    }

    pub fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::BroadcastEvent {
                session,
                event,
                first,
            } => {
                if session == self.session {
                    self.on_broadcast_event_updated(event, first);
                }
            }
            Internal::Chunks { session, chunks } => {
                if session == self.session {
                    self.on_playlist_updated(chunks);
                }
            }
            Internal::Tick { generation } => {
                if self.ticker.is_current(generation) {
                    self.on_playback_tick();
                }
            }
            Internal::Prepared {
                session,
                epoch,
                unit_id,
                purpose,
                result,
            } => {
                if session != self.session || self.engine.is_stale(epoch) {
                    debug!("Discarding stale preparation of unit {} ({:?})", unit_id, purpose);
                    if let Ok(mut unit) = result {
                        unit.release();
                    }
                    return;
                }
                match purpose {
                    PreparePurpose::Current {
                        sequence,
                        offset_ms,
                    } => self.on_current_prepared(unit_id, sequence, offset_ms, result),
                    PreparePurpose::Next { sequence } => {
                        self.on_next_prepared(unit_id, sequence, result)
                    }
                }
            }
        }
    }

    pub fn handle_unit_event(&mut self, event: UnitEvent) {
        match event {
            UnitEvent::Completed { unit } => self.on_unit_completed(unit),
            UnitEvent::Failed { unit, error } => self.on_unit_failed(unit, error),
        }
    }

    // ---------------------------------------------------------------------
    // Public operations
    // ---------------------------------------------------------------------

    fn play_or_resume(&mut self, broadcast: VoiceBroadcast) {
        let has_changed = self.current_broadcast.as_ref() != Some(&broadcast);
        if has_changed {
            self.start_broadcast(broadcast);
        } else if self.playing_state == PlayingState::Paused {
            self.resume();
        } else if self.playing_state.is_error() {
            self.retry();
        } else {
            debug!(
                "Already following {} ({}), nothing to do",
                broadcast.voice_broadcast_id, self.playing_state
            );
        }
    }

    fn pause(&mut self) {
        if self.current_broadcast.is_none() {
            debug!("No voice broadcast to pause");
            return;
        }

        // Final tick of the Paused transition records the position
        self.set_playing_state(PlayingState::Paused);

        if self.engine.has_current() {
            if let Some(current) = self.engine.current_mut() {
                if let Err(e) = current.unit.pause() {
                    warn!("Unable to pause unit {}: {}", current.id, e);
                }
            }
        } else {
            self.engine.stop_player();
        }
    }

    /// Stop listening; safe to call in any state
    pub fn stop(&mut self) {
        self.set_playing_state(PlayingState::Idle);

        self.engine.stop_player();
        self.pending_start = None;
        self.pending_seek_ms = None;

        if let Some(subscription) = self.chunk_subscription.take() {
            subscription.cancel();
        }
        if let Some(subscription) = self.event_subscription.take() {
            subscription.cancel();
        }

        self.playlist.reset();
        self.most_recent_event = None;
        if let Some(broadcast) = self.current_broadcast.take() {
            info!("Stopped listening to voice broadcast {}", broadcast.voice_broadcast_id);
        }
        self.session += 1;
    }

    fn seek_to(&mut self, broadcast: &VoiceBroadcast, position_ms: u64, duration_ms: u64) {
        if self.current_broadcast.as_ref() != Some(broadcast) {
            let percentage = fraction_of(position_ms, duration_ms).unwrap_or(0.0);
            self.collaborators.tracker.update_paused_at(
                &broadcast.voice_broadcast_id,
                position_ms,
                percentage,
            );
            return;
        }

        match self.playing_state {
            PlayingState::Playing | PlayingState::Buffering => {
                self.update_live_listening_mode(Some(position_ms));
                self.start_playback_at(position_ms);
            }
            PlayingState::Idle | PlayingState::Paused => {
                self.engine.stop_player();
                let percentage = fraction_of(position_ms, duration_ms).unwrap_or(0.0);
                self.collaborators.tracker.update_paused_at(
                    &broadcast.voice_broadcast_id,
                    position_ms,
                    percentage,
                );
            }
            PlayingState::Error(_) => {
                debug!("Ignoring seek to {} ms while in error", position_ms);
            }
        }
    }

    fn add_listener(&mut self, broadcast: &VoiceBroadcast, listener: Arc<dyn Listener>) {
        self.listeners
            .add(&broadcast.voice_broadcast_id, listener.clone());

        let is_current = self.current_broadcast.as_ref() == Some(broadcast);
        if is_current {
            listener.on_playing_state_changed(&self.playing_state);
        } else {
            listener.on_playing_state_changed(&PlayingState::Idle);
        }
        listener.on_live_mode_changed(is_current && self.is_live_listening);
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_broadcast: self.current_broadcast.clone(),
            playing_state: self.playing_state.clone(),
            is_live_listening: self.is_live_listening,
            current_sequence: self.playlist.current_sequence(),
            playlist_duration_ms: self.playlist.duration_ms(),
            position_ms: self.current_position_ms(),
        }
    }

    // ---------------------------------------------------------------------
    // Playback start
    // ---------------------------------------------------------------------

    fn start_broadcast(&mut self, broadcast: VoiceBroadcast) {
        // Leave the previous broadcast, if any
        if self.playing_state != PlayingState::Idle {
            self.stop();
        }

        info!("Listening to voice broadcast {}", broadcast.voice_broadcast_id);
        self.session += 1;
        self.current_broadcast = Some(broadcast.clone());
        self.set_playing_state(PlayingState::Buffering);
        self.observe_broadcast_events(&broadcast);
    }

    fn resume(&mut self) {
        if self.engine.has_current() {
            self.set_playing_state(PlayingState::Playing);
            let started = self
                .engine
                .current_mut()
                .map_or(Ok(()), |current| current.unit.start());
            if let Err(e) = started {
                warn!("Unable to resume playback: {}", e);
                self.set_playing_state(PlayingState::Error(e.into()));
            }
        } else {
            let saved_position = self
                .current_id()
                .and_then(|id| self.collaborators.tracker.playback_time(&id))
                .unwrap_or(0);
            self.start_playback_at(saved_position);
        }
    }

    /// Leave the Error state by buffering again from the playlist
    fn retry(&mut self) {
        info!("Retrying playback after failure");
        self.engine.stop_player();
        self.pending_start = None;
        self.set_playing_state(PlayingState::Buffering);
        if self.playing_state == PlayingState::Buffering {
            self.start_buffered_playback();
        }
    }

    fn start_playback_at(&mut self, position_ms: u64) {
        self.engine.stop_player();
        self.pending_start = None;

        let Some(item) = self.playlist.find_by_position(position_ms) else {
            self.wait_for_position(position_ms);
            return;
        };
        self.pending_seek_ms = None;
        let purpose = PreparePurpose::Current {
            sequence: item.sequence,
            offset_ms: position_ms - item.start_time_ms,
        };
        let content = item.content.clone();

        self.pending_start = Some(self.engine.epoch());
        self.launch_prepare(purpose, content);
    }

    /// Nothing covers `position_ms` yet: buffer until its chunk arrives
    fn wait_for_position(&mut self, position_ms: u64) {
        let last_known = self.playlist.last().map(|item| item.sequence);
        if self.is_last_chunk(last_known) {
            warn!("Position {} ms is past the end of the broadcast, stopping", position_ms);
            self.stop();
            return;
        }

        debug!("No content at position {} ms yet, buffering", position_ms);
        self.pending_seek_ms = Some(position_ms);
        self.set_playing_state(PlayingState::Buffering);
    }

    fn on_current_prepared(
        &mut self,
        unit_id: UnitId,
        sequence: u32,
        offset_ms: u64,
        result: Result<Box<dyn MediaUnit>, ListeningError>,
    ) {
        self.pending_start = None;

        let mut unit = match result {
            Ok(unit) => unit,
            Err(err) => {
                self.set_playing_state(PlayingState::Error(err));
                return;
            }
        };

        if let Err(e) = unit.start() {
            warn!("Unable to start chunk {}: {}", sequence, e);
            unit.release();
            self.set_playing_state(PlayingState::Error(e.into()));
            return;
        }
        if offset_ms > 0 {
            if let Err(e) = unit.seek_to(offset_ms) {
                warn!("Unable to seek chunk {} to {} ms: {}", sequence, offset_ms, e);
            }
        }

        self.engine.set_current(PreparedUnit {
            id: unit_id,
            sequence,
            unit,
        });
        self.playlist.set_current_sequence(Some(sequence));
        self.set_playing_state(PlayingState::Playing);
        self.prepare_next();
    }

    // ---------------------------------------------------------------------
    // Next chunk
    // ---------------------------------------------------------------------

    fn prepare_next(&mut self) {
        let Some(item) = self.playlist.next_item() else {
            return;
        };
        let purpose = PreparePurpose::Next {
            sequence: item.sequence,
        };
        let content = item.content.clone();

        if self.engine.try_begin_prepare_next().is_none() {
            debug!("Next chunk already prepared or being prepared");
            return;
        }
        self.launch_prepare(purpose, content);
    }

    fn on_next_prepared(
        &mut self,
        unit_id: UnitId,
        sequence: u32,
        result: Result<Box<dyn MediaUnit>, ListeningError>,
    ) {
        let unit = match result {
            Ok(unit) => unit,
            Err(err) => {
                self.engine.abort_prepare_next();
                // A still valid current unit keeps playing; the failure will
                // show up again when this chunk is actually needed
                if self.playing_state == PlayingState::Buffering || !self.engine.current_is_playing() {
                    self.set_playing_state(PlayingState::Error(err));
                } else {
                    debug!("Prefetch of chunk {} failed: {}", sequence, err);
                }
                return;
            }
        };

        self.engine.set_next(PreparedUnit {
            id: unit_id,
            sequence,
            unit,
        });

        match self.playing_state {
            PlayingState::Playing | PlayingState::Paused => {
                debug!("Chunk {} ready to play next", sequence);
            }
            PlayingState::Buffering => self.start_next(),
            PlayingState::Idle | PlayingState::Error(_) => self.engine.stop_player(),
        }
    }

    fn start_next(&mut self) {
        match self.engine.promote_next() {
            Ok(Some(sequence)) => self.on_next_started(sequence),
            Ok(None) => {}
            Err(e) => {
                warn!("Unable to start next chunk: {}", e);
                self.set_playing_state(PlayingState::Error(e.into()));
            }
        }
    }

    fn on_next_started(&mut self, sequence: u32) {
        self.playlist.set_current_sequence(Some(sequence));
        self.set_playing_state(PlayingState::Playing);
        self.prepare_next();
    }

    fn launch_prepare(&self, purpose: PreparePurpose, content: AudioContent) {
        let factory = self.collaborators.factory.clone();
        let tx = self.internal_tx.clone();
        let session = self.session;
        let epoch = self.engine.epoch();
        let unit_id = UnitId::new();

        debug!("Preparing unit {} for {:?}", unit_id, purpose);
        tokio::spawn(async move {
            let result = factory.prepare(unit_id, content).await;
            let message = Internal::Prepared {
                session,
                epoch,
                unit_id,
                purpose,
                result,
            };
            // Player gone: nobody else will release the unit
            if let Err(mpsc::error::SendError(Internal::Prepared {
                result: Ok(mut unit),
                ..
            })) = tx.send(message)
            {
                unit.release();
            }
        });
    }

    // ---------------------------------------------------------------------
    // Unit events
    // ---------------------------------------------------------------------

    fn on_unit_completed(&mut self, unit: UnitId) {
        if !self.engine.release_completed(unit) {
            warn!("Completed unit {} is not the current unit, ignoring", unit);
            return;
        }

        // Gapless hand-off
        if self.engine.has_next() {
            self.start_next();
            return;
        }

        if self.is_last_chunk(self.playlist.current_sequence()) {
            // No more chunks will come
            self.stop();
        } else {
            self.set_playing_state(PlayingState::Buffering);
            self.prepare_next();
        }
    }

    fn on_unit_failed(&mut self, unit: UnitId, error: MediaError) {
        if !self.engine.is_current(unit) && !self.engine.is_next(unit) {
            debug!("Ignoring failure of released unit {}: {}", unit, error);
            return;
        }
        debug!("Unit {} failed: {}", unit, error);

        // Prepared again once the current unit completes
        if self.engine.is_next(unit) {
            self.engine.drop_next();
            return;
        }

        if self.playing_state == PlayingState::Buffering || !self.engine.current_is_playing() {
            self.set_playing_state(PlayingState::Error(error.into()));
        }
    }

    // ---------------------------------------------------------------------
    // Broadcast streams
    // ---------------------------------------------------------------------

    fn observe_broadcast_events(&mut self, broadcast: &VoiceBroadcast) {
        let tx = self.internal_tx.clone();
        let session = self.session;
        let mut first = true;

        let stream = self.collaborators.event_source.observe(broadcast);
        self.event_subscription = Some(Subscription::spawn(stream, move |event| {
            let is_first = std::mem::replace(&mut first, false);
            tx.send(Internal::BroadcastEvent {
                session,
                event,
                first: is_first,
            })
            .is_ok()
        }));
    }

    fn observe_chunks(&mut self) {
        let Some(broadcast) = self.current_broadcast.clone() else {
            return;
        };
        let tx = self.internal_tx.clone();
        let session = self.session;

        let stream = self.collaborators.chunk_source.observe(&broadcast);
        self.chunk_subscription = Some(Subscription::spawn(stream, move |chunks| {
            tx.send(Internal::Chunks { session, chunks }).is_ok()
        }));
    }

    fn on_broadcast_event_updated(&mut self, event: Option<VoiceBroadcastEvent>, first: bool) {
        if first {
            self.observe_chunks();
        }

        match event {
            None => {
                info!("Voice broadcast state is gone, stopping");
                self.stop();
            }
            Some(event) => {
                debug!(
                    "Voice broadcast {} is {} (last chunk {:?})",
                    event.voice_broadcast_id, event.state, event.last_chunk_sequence
                );
                self.most_recent_event = Some(event);
                self.update_live_listening_mode(None);
            }
        }
    }

    fn on_playlist_updated(&mut self, chunks: Vec<VoiceBroadcastChunk>) {
        self.playlist.set_items(chunks);
        debug!(
            "Playlist updated: {} chunks, {} ms",
            self.playlist.len(),
            self.playlist.duration_ms()
        );

        match self.playing_state {
            PlayingState::Playing | PlayingState::Paused => {
                if !self.engine.has_next() && !self.engine.is_preparing_next() {
                    self.prepare_next();
                }
            }
            PlayingState::Buffering => {
                // A pending start or prefetch will leave Buffering by itself
                if !self.has_pending_start() && !self.engine.is_preparing_next() {
                    self.start_buffered_playback();
                }
            }
            PlayingState::Error(_) | PlayingState::Idle => {}
        }
    }

    /// Start the chunk to play after buffering, if it is known
    fn start_buffered_playback(&mut self) {
        if let Some(position_ms) = self.pending_seek_ms {
            if self.playlist.find_by_position(position_ms).is_some() {
                self.start_playback_at(position_ms);
            }
            return;
        }

        let next_item = if self.is_live_listening && self.playlist.current_sequence().is_none() {
            // Live and nothing played yet: join at the latest chunk
            self.playlist.last()
        } else {
            self.playlist.next_item()
        };
        if let Some(start_time_ms) = next_item.map(|item| item.start_time_ms) {
            self.start_playback_at(start_time_ms);
        }
    }

    fn has_pending_start(&self) -> bool {
        self.pending_start == Some(self.engine.epoch())
    }

    /// True when the broadcast stopped recording and `sequence` is its last chunk or beyond
    fn is_last_chunk(&self, sequence: Option<u32>) -> bool {
        let Some(event) = self.most_recent_event.as_ref().filter(|e| !e.is_live()) else {
            return false;
        };
        matches!(
            (sequence, event.last_chunk_sequence),
            (Some(sequence), Some(last)) if sequence >= last
        )
    }

    // ---------------------------------------------------------------------
    // State and live mode
    // ---------------------------------------------------------------------

    fn set_playing_state(&mut self, state: PlayingState) {
        if self.playing_state == state {
            return;
        }
        debug!("Playing state: {} -> {}", self.playing_state, state);
        let old_state = std::mem::replace(&mut self.playing_state, state.clone());

        self.update_live_listening_mode(None);

        // Updating the live mode may have stopped the player
        let Some(id) = self.current_id() else {
            return;
        };

        match state {
            PlayingState::Playing => self.start_ticker(),
            _ => self.stop_ticker(),
        }

        if let PlayingState::Error(err) = &state {
            self.collaborators.tracker.on_error(&id, err);
        }

        self.listeners.notify_playing_state(&id, &state);
        self.collaborators
            .event_bus
            .emit_lossy(PlayerNotification::PlayingStateChanged {
                voice_broadcast_id: id,
                old_status: old_state.status(),
                new_status: state.status(),
                error: state.error().map(|e| e.to_string()),
                timestamp: time::now(),
            });
    }

    fn update_live_listening_mode(&mut self, seek_position_ms: Option<u64>) {
        let seek = seek_position_ms.map(|target| SeekRequest {
            target_position_ms: target,
            target_sequence: self.playlist.find_by_position(target).map(|i| i.sequence),
        });
        let inputs = LiveModeInputs {
            is_broadcast_live: self.most_recent_event.as_ref().is_some_and(|e| e.is_live()),
            status: self.playing_state.status(),
            current_position_ms: self.current_position_ms(),
            current_sequence: self.playlist.current_sequence(),
            last_sequence: self.playlist.last().map(|i| i.sequence),
            seek,
            previous: self.is_live_listening,
        };
        self.set_live_listening(resolve_live_listening(&inputs));
    }

    fn set_live_listening(&mut self, is_live: bool) {
        if self.is_live_listening == is_live {
            return;
        }
        debug!("Live listening: {} -> {}", self.is_live_listening, is_live);
        self.is_live_listening = is_live;

        if let Some(id) = self.current_id() {
            self.listeners.notify_live_mode(&id, is_live);
            self.collaborators
                .event_bus
                .emit_lossy(PlayerNotification::LiveModeChanged {
                    voice_broadcast_id: id,
                    is_live,
                    timestamp: time::now(),
                });
        }

        // Live ended while waiting after the last chunk
        let last_chunk_sequence = self
            .most_recent_event
            .as_ref()
            .and_then(|e| e.last_chunk_sequence);
        let has_reached_last_chunk = self.playlist.current_sequence() == last_chunk_sequence;
        if !is_live && self.playing_state == PlayingState::Buffering && has_reached_last_chunk {
            self.stop();
        }
    }

    // ---------------------------------------------------------------------
    // Position sampling
    // ---------------------------------------------------------------------

    fn start_ticker(&mut self) {
        let tx = self.internal_tx.clone();
        self.ticker
            .start(move |generation| tx.send(Internal::Tick { generation }).is_ok());
        self.on_playback_tick();
    }

    fn stop_ticker(&mut self) {
        self.ticker.stop();
        self.on_playback_tick();
    }

    fn on_playback_tick(&self) {
        let Some(id) = self.current_id() else {
            return;
        };
        let tracker = &self.collaborators.tracker;
        let position = self.current_position_ms();
        let percentage = self.current_percentage();

        match &self.playing_state {
            PlayingState::Playing => {
                if let (Some(position), Some(percentage)) = (position, percentage) {
                    tracker.update_playing_at(&id, position, percentage);
                }
            }
            PlayingState::Paused | PlayingState::Buffering => {
                if let (Some(position), Some(percentage)) = (position, percentage) {
                    tracker.update_paused_at(&id, position, percentage);
                }
            }
            PlayingState::Idle => match (position, percentage) {
                (Some(position), Some(percentage))
                    if self.playlist.duration_ms().saturating_sub(position)
                        >= self.config.end_of_track_threshold_ms =>
                {
                    tracker.update_paused_at(&id, position, percentage);
                }
                _ => tracker.stop_playback(&id),
            },
            PlayingState::Error(_) => {}
        }
    }

    /// Absolute position: computed from the current unit, else the saved one
    fn current_position_ms(&self) -> Option<u64> {
        let id = self.current_id()?;
        let computed = self.engine.current_position_ms().and_then(|offset| {
            self.playlist
                .current_item()
                .map(|item| item.start_time_ms + offset)
        });
        computed.or_else(|| self.collaborators.tracker.playback_time(&id))
    }

    fn current_percentage(&self) -> Option<f32> {
        let item_start = self.playlist.current_item().map(|item| item.start_time_ms);
        let computed_position = self
            .engine
            .current_position_ms()
            .and_then(|offset| item_start.map(|start| start + offset))
            .or(item_start);
        let computed = computed_position
            .and_then(|position| fraction_of(position, self.playlist.duration_ms()));

        computed.or_else(|| {
            self.current_id()
                .and_then(|id| self.collaborators.tracker.percentage(&id))
        })
    }

    fn current_id(&self) -> Option<String> {
        self.current_broadcast
            .as_ref()
            .map(|b| b.voice_broadcast_id.clone())
    }
}
