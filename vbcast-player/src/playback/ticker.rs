//! Playback position ticker
//!
//! Periodic background task asking the player to sample its position while
//! audio is playing. Each start gets a new generation number; ticks carry it
//! so the player can drop ticks that were already queued when the ticker was
//! stopped or restarted.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::trace;

/// Default sampling period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Fixed-interval tick source
#[derive(Debug)]
pub struct PlaybackTicker {
    period: Duration,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl PlaybackTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            task: None,
            generation: 0,
        }
    }

    /// (Re)start ticking
    ///
    /// `on_tick` receives the generation of this run and returns false to end
    /// the task (e.g. when the receiving side is gone). The first tick fires
    /// one period after start.
    pub fn start<F>(&mut self, mut on_tick: F) -> u64
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        self.stop();
        let generation = self.generation;
        let period = self.period;

        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick of a tokio interval completes immediately
            ticks.tick().await;
            loop {
                ticks.tick().await;
                if !on_tick(generation) {
                    trace!("Playback ticker receiver gone, ending task");
                    break;
                }
            }
        }));

        generation
    }

    /// Stop ticking; ticks of the stopped run are no longer current
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// True if a tick with this generation comes from the running ticker
    pub fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }
}

impl Drop for PlaybackTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ticker_fires_periodically() {
        let count = Arc::new(AtomicU64::new(0));
        let mut ticker = PlaybackTicker::new(Duration::from_millis(10));

        let c = count.clone();
        ticker.start(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            true
        });
        assert!(ticker.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);
        ticker.stop();
    }

    #[tokio::test]
    async fn test_no_tick_after_stop() {
        let count = Arc::new(AtomicU64::new(0));
        let mut ticker = PlaybackTicker::new(Duration::from_millis(10));

        let c = count.clone();
        ticker.start(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            true
        });
        tokio::time::sleep(Duration::from_millis(35)).await;
        ticker.stop();
        assert!(!ticker.is_running());

        // Let an aborted task settle before sampling
        tokio::task::yield_now().await;
        let after_stop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_restart_invalidates_previous_generation() {
        let mut ticker = PlaybackTicker::new(Duration::from_millis(10));

        let first = ticker.start(|_| true);
        assert!(ticker.is_current(first));

        let second = ticker.start(|_| true);
        assert_ne!(first, second);
        assert!(!ticker.is_current(first));
        assert!(ticker.is_current(second));

        ticker.stop();
        assert!(!ticker.is_current(second));
    }

    #[tokio::test]
    async fn test_task_ends_when_callback_refuses() {
        let mut ticker = PlaybackTicker::new(Duration::from_millis(5));
        ticker.start(|_| false);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!ticker.is_running());
    }
}
