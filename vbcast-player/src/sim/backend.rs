//! Timer-driven media backend
//!
//! Units do not decode anything: a unit "plays" for the announced duration
//! of its chunk on a tokio timer and then reports completion. Playback can
//! be accelerated with a speed factor.

use crate::error::MediaError;
use crate::media::{AudioSource, MediaBackend, MediaUnit, UnitEventSink};
use async_trait::async_trait;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;
use vbcast_common::AudioContent;

/// Engine code reported for unreadable payloads
pub const MEDIA_ERROR_MALFORMED: i32 = -1007;

/// Backend producing [`TimedUnit`]s
#[derive(Debug, Clone)]
pub struct TimedMediaBackend {
    speed: f64,
}

impl TimedMediaBackend {
    /// Real-time playback
    pub fn new() -> Self {
        Self { speed: 1.0 }
    }

    /// Playback `speed` times faster than real time
    pub fn with_speed(speed: f64) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        Self { speed }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Default for TimedMediaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for TimedMediaBackend {
    async fn prepare(
        &self,
        content: &AudioContent,
        source: AudioSource,
        events: UnitEventSink,
    ) -> Result<Box<dyn MediaUnit>, MediaError> {
        if source.len_hint() == Some(0) {
            return Err(MediaError::Engine {
                what: crate::error::MEDIA_ERROR_UNKNOWN,
                extra: MEDIA_ERROR_MALFORMED,
            });
        }
        trace!("Prepared timed unit {} for {}", events.unit(), content.url);
        Ok(Box::new(TimedUnit::new(content.duration_ms, self.speed, events)))
    }
}

/// Unit playing `duration_ms` of silence
pub struct TimedUnit {
    duration_ms: u64,
    speed: f64,
    events: UnitEventSink,
    /// Position reached before the current run
    played_ms: u64,
    running_since: Option<Instant>,
    completion: Option<JoinHandle<()>>,
    stopped: bool,
    released: bool,
}

impl TimedUnit {
    pub fn new(duration_ms: u64, speed: f64, events: UnitEventSink) -> Self {
        Self {
            duration_ms,
            speed,
            events,
            played_ms: 0,
            running_since: None,
            completion: None,
            stopped: false,
            released: false,
        }
    }

    fn position(&self) -> u64 {
        let running_ms = self.running_since.map_or(0, |since| {
            (since.elapsed().as_millis() as f64 * self.speed) as u64
        });
        (self.played_ms + running_ms).min(self.duration_ms)
    }

    fn ensure_usable(&self) -> Result<(), MediaError> {
        if self.released {
            return Err(MediaError::InvalidState("unit released".into()));
        }
        if self.stopped {
            return Err(MediaError::InvalidState("unit stopped".into()));
        }
        Ok(())
    }

    fn halt(&mut self) {
        self.played_ms = self.position();
        self.running_since = None;
        if let Some(task) = self.completion.take() {
            task.abort();
        }
    }

    fn run(&mut self) {
        let remaining_ms = self.duration_ms.saturating_sub(self.played_ms);
        let wait = Duration::from_secs_f64(remaining_ms as f64 / 1000.0 / self.speed);
        let events = self.events.clone();

        self.running_since = Some(Instant::now());
        self.completion = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            events.completed();
        }));
    }
}

impl MediaUnit for TimedUnit {
    fn start(&mut self) -> Result<(), MediaError> {
        self.ensure_usable()?;
        if self.running_since.is_none() {
            self.run();
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.ensure_usable()?;
        self.halt();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MediaError> {
        self.ensure_usable()?;
        self.halt();
        self.stopped = true;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), MediaError> {
        self.ensure_usable()?;
        let was_running = self.running_since.is_some();
        self.halt();
        self.played_ms = position_ms.min(self.duration_ms);
        if was_running {
            self.run();
        }
        Ok(())
    }

    fn position_ms(&self) -> Option<u64> {
        if self.released {
            None
        } else {
            Some(self.position())
        }
    }

    fn is_playing(&self) -> bool {
        !self.released && self.running_since.is_some() && self.position() < self.duration_ms
    }

    fn release(&mut self) {
        if let Some(task) = self.completion.take() {
            task.abort();
        }
        self.running_since = None;
        self.released = true;
    }
}

impl Drop for TimedUnit {
    fn drop(&mut self) {
        if let Some(task) = self.completion.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{UnitEvent, UnitId};
    use tokio::sync::mpsc;

    fn content(duration_ms: u64) -> AudioContent {
        AudioContent {
            url: "1.ogg".into(),
            mime_type: Some("audio/ogg".into()),
            duration_ms,
        }
    }

    #[tokio::test]
    async fn test_unit_completes_after_duration() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = UnitId::new();
        let backend = TimedMediaBackend::new();
        let mut unit = backend
            .prepare(&content(100), AudioSource::Bytes(vec![1]), UnitEventSink::new(id, tx))
            .await
            .unwrap();

        assert!(!unit.is_playing());
        unit.start().unwrap();
        assert!(unit.is_playing());

        tokio::time::sleep(Duration::from_millis(30)).await;
        let position = unit.position_ms().unwrap();
        assert!((30..100).contains(&position), "position {}", position);

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(event, Some(UnitEvent::Completed { unit: id }));
        assert_eq!(unit.position_ms(), Some(100));
        assert!(!unit.is_playing());
    }

    #[tokio::test]
    async fn test_pause_freezes_position() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut unit = TimedUnit::new(100, 1.0, UnitEventSink::new(UnitId::new(), tx));

        unit.start().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        unit.pause().unwrap();
        let paused_at = unit.position_ms().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(unit.position_ms(), Some(paused_at));
        assert!(!unit.is_playing());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_seek_and_speed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut unit = TimedUnit::new(10_000, 10.0, UnitEventSink::new(UnitId::new(), tx));

        unit.start().unwrap();
        unit.seek_to(5_000).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let position = unit.position_ms().unwrap();
        assert!(position >= 6_000 && position < 10_000, "position {}", position);

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert!(matches!(event, Some(UnitEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn test_released_unit_refuses_operations() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut unit = TimedUnit::new(1000, 1.0, UnitEventSink::new(UnitId::new(), tx));

        unit.release();
        assert!(unit.start().is_err());
        assert!(unit.stop().is_err());
        assert_eq!(unit.position_ms(), None);
        // Release twice is harmless
        unit.release();
    }

    #[tokio::test]
    async fn test_empty_payload_is_malformed() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = TimedMediaBackend::new()
            .prepare(
                &content(1000),
                AudioSource::Bytes(Vec::new()),
                UnitEventSink::new(UnitId::new(), tx),
            )
            .await;
        assert!(matches!(
            result,
            Err(MediaError::Engine {
                extra: MEDIA_ERROR_MALFORMED,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_speed_falls_back_to_real_time() {
        assert_eq!(TimedMediaBackend::with_speed(0.0).speed(), 1.0);
        assert_eq!(TimedMediaBackend::with_speed(f64::NAN).speed(), 1.0);
        assert_eq!(TimedMediaBackend::with_speed(4.0).speed(), 4.0);
    }
}
