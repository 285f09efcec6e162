//! Controllable host capabilities
//!
//! - FakeResolver: per-URL failures and gates holding a download back
//! - FakeBackend: units whose completion and failures are triggered by the test

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use vbcast_common::AudioContent;
use vbcast_player::media::{AudioSource, ContentResolver, MediaBackend, MediaUnit, UnitEventSink};
use vbcast_player::MediaError;

// ================================================================================================
// FakeResolver
// ================================================================================================

#[derive(Default)]
struct ResolverState {
    requests: Vec<String>,
    failing: HashSet<String>,
    gates: HashMap<String, Arc<Semaphore>>,
}

/// Resolver returning the URL bytes as payload
#[derive(Clone, Default)]
pub struct FakeResolver {
    state: Arc<Mutex<ResolverState>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every download of `url` fail
    pub fn fail(&self, url: &str) {
        self.state.lock().unwrap().failing.insert(url.to_string());
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// Keep downloads of `url` pending until [`FakeResolver::release`]
    pub fn hold(&self, url: &str) {
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(url.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held download of `url` complete
    pub fn release(&self, url: &str) {
        if let Some(gate) = self.state.lock().unwrap().gates.get(url) {
            gate.add_permits(1);
        }
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|u| *u == url)
            .count()
    }
}

#[async_trait]
impl ContentResolver for FakeResolver {
    async fn resolve(&self, content: &AudioContent) -> anyhow::Result<AudioSource> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(content.url.clone());
            state.gates.get(&content.url).cloned()
        };

        if let Some(gate) = gate {
            gate.acquire().await?.forget();
        }

        if self.state.lock().unwrap().failing.contains(&content.url) {
            anyhow::bail!("404 for {}", content.url);
        }
        Ok(AudioSource::Bytes(content.url.as_bytes().to_vec()))
    }
}

// ================================================================================================
// FakeBackend
// ================================================================================================

/// Observable state of one fake unit
#[derive(Debug, Default, Clone)]
pub struct UnitState {
    pub starts: u32,
    pub pauses: u32,
    pub stopped: bool,
    pub released: bool,
    pub playing: bool,
    pub seeks: Vec<u64>,
    pub position_ms: u64,
}

struct FakeUnit {
    state: Arc<Mutex<UnitState>>,
}

impl MediaUnit for FakeUnit {
    fn start(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.lock().unwrap();
        if state.released {
            return Err(MediaError::InvalidState("released".into()));
        }
        state.starts += 1;
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.lock().unwrap();
        state.pauses += 1;
        state.playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.lock().unwrap();
        state.stopped = true;
        state.playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), MediaError> {
        let mut state = self.state.lock().unwrap();
        state.seeks.push(position_ms);
        state.position_ms = position_ms;
        Ok(())
    }

    fn position_ms(&self) -> Option<u64> {
        let state = self.state.lock().unwrap();
        if state.released {
            None
        } else {
            Some(state.position_ms)
        }
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.released = true;
        state.playing = false;
    }
}

struct PreparedRecord {
    url: String,
    events: UnitEventSink,
    state: Arc<Mutex<UnitState>>,
}

/// Backend creating [`UnitState`]-backed units
#[derive(Clone, Default)]
pub struct FakeBackend {
    prepared: Arc<Mutex<Vec<PreparedRecord>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepared_count(&self, url: &str) -> usize {
        self.prepared
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn prepared_urls(&self) -> Vec<String> {
        self.prepared
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    /// State of the latest unit prepared for `url`
    pub fn unit_state(&self, url: &str) -> Option<UnitState> {
        self.latest(url, |record| record.state.lock().unwrap().clone())
    }

    pub fn set_position(&self, url: &str, position_ms: u64) {
        self.latest(url, |record| record.state.lock().unwrap().position_ms = position_ms);
    }

    /// Make the latest unit of `url` report the end of its content
    pub fn complete(&self, url: &str) {
        self.latest(url, |record| {
            record.state.lock().unwrap().playing = false;
            record.events.completed();
        });
    }

    /// Make the latest unit of `url` report a playback failure
    pub fn fail(&self, url: &str, error: MediaError) {
        self.latest(url, |record| {
            record.state.lock().unwrap().playing = false;
            record.events.failed(error);
        });
    }

    fn latest<T>(&self, url: &str, f: impl FnOnce(&PreparedRecord) -> T) -> Option<T> {
        let prepared = self.prepared.lock().unwrap();
        prepared.iter().rev().find(|r| r.url == url).map(f)
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    async fn prepare(
        &self,
        content: &AudioContent,
        _source: AudioSource,
        events: UnitEventSink,
    ) -> Result<Box<dyn MediaUnit>, MediaError> {
        let state = Arc::new(Mutex::new(UnitState::default()));
        self.prepared.lock().unwrap().push(PreparedRecord {
            url: content.url.clone(),
            events,
            state: state.clone(),
        });
        Ok(Box::new(FakeUnit { state }))
    }
}
