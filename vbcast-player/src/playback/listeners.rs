//! Listener registry
//!
//! Maps broadcast ids to the observers interested in them. Observers may
//! register for any broadcast, not only the one being played.

use crate::state::PlayingState;
use std::collections::HashMap;
use std::sync::Arc;

/// Observer of one broadcast's playback
///
/// Called from the player's control task; implementations must not block.
pub trait Listener: Send + Sync {
    fn on_playing_state_changed(&self, state: &PlayingState);

    fn on_live_mode_changed(&self, is_live: bool);
}

/// Broadcast id → ordered observers
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, Vec<Arc<dyn Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer; the same observer may be registered twice
    pub fn add(&mut self, voice_broadcast_id: &str, listener: Arc<dyn Listener>) {
        self.listeners
            .entry(voice_broadcast_id.to_string())
            .or_default()
            .push(listener);
    }

    /// Remove one registration of `listener` (identity comparison)
    ///
    /// Returns true if a registration was removed.
    pub fn remove(&mut self, voice_broadcast_id: &str, listener: &Arc<dyn Listener>) -> bool {
        let Some(list) = self.listeners.get_mut(voice_broadcast_id) else {
            return false;
        };
        let Some(index) = list.iter().position(|l| Arc::ptr_eq(l, listener)) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.listeners.remove(voice_broadcast_id);
        }
        true
    }

    pub fn count(&self, voice_broadcast_id: &str) -> usize {
        self.listeners.get(voice_broadcast_id).map_or(0, Vec::len)
    }

    pub fn notify_playing_state(&self, voice_broadcast_id: &str, state: &PlayingState) {
        for listener in self.listeners_for(voice_broadcast_id) {
            listener.on_playing_state_changed(state);
        }
    }

    pub fn notify_live_mode(&self, voice_broadcast_id: &str, is_live: bool) {
        for listener in self.listeners_for(voice_broadcast_id) {
            listener.on_live_mode_changed(is_live);
        }
    }

    fn listeners_for(&self, voice_broadcast_id: &str) -> impl Iterator<Item = &Arc<dyn Listener>> {
        self.listeners
            .get(voice_broadcast_id)
            .into_iter()
            .flat_map(|list| list.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        states: Mutex<Vec<PlayingState>>,
        live: Mutex<Vec<bool>>,
    }

    impl Listener for Recorder {
        fn on_playing_state_changed(&self, state: &PlayingState) {
            self.states.lock().unwrap().push(state.clone());
        }

        fn on_live_mode_changed(&self, is_live: bool) {
            self.live.lock().unwrap().push(is_live);
        }
    }

    #[test]
    fn test_notifications_reach_only_matching_broadcast() {
        let mut registry = ListenerRegistry::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        registry.add("$a", a.clone());
        registry.add("$b", b.clone());

        registry.notify_playing_state("$a", &PlayingState::Playing);
        registry.notify_live_mode("$a", true);

        assert_eq!(*a.states.lock().unwrap(), vec![PlayingState::Playing]);
        assert_eq!(*a.live.lock().unwrap(), vec![true]);
        assert!(b.states.lock().unwrap().is_empty());
        assert!(b.live.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_by_identity() {
        let mut registry = ListenerRegistry::new();
        let a: Arc<dyn Listener> = Arc::new(Recorder::default());
        let other: Arc<dyn Listener> = Arc::new(Recorder::default());
        registry.add("$a", a.clone());

        assert!(!registry.remove("$a", &other));
        assert!(!registry.remove("$missing", &a));
        assert_eq!(registry.count("$a"), 1);

        assert!(registry.remove("$a", &a));
        assert_eq!(registry.count("$a"), 0);
    }

    #[test]
    fn test_registration_order_preserved() {
        struct Tagged(&'static str, Arc<Mutex<Vec<&'static str>>>);
        impl Listener for Tagged {
            fn on_playing_state_changed(&self, _: &PlayingState) {
                self.1.lock().unwrap().push(self.0);
            }
            fn on_live_mode_changed(&self, _: bool) {}
        }

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add("$a", Arc::new(Tagged("first", calls.clone())));
        registry.add("$a", Arc::new(Tagged("second", calls.clone())));

        registry.notify_playing_state("$a", &PlayingState::Buffering);
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }
}
