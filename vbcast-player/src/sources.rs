//! Live broadcast data streams
//!
//! The host exposes two streams per broadcast: its state events and its
//! known chunk list. Both are consumed through cancellable
//! [`Subscription`]s owned by the player.

use futures::stream::{BoxStream, StreamExt};
use tokio::task::JoinHandle;
use vbcast_common::{VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent};

/// Stream of state events; `None` means the broadcast state was removed
pub type BroadcastEventStream = BoxStream<'static, Option<VoiceBroadcastEvent>>;

/// Stream of snapshots of every chunk known so far
pub type ChunkStream = BoxStream<'static, Vec<VoiceBroadcastChunk>>;

/// Source of broadcast state events
pub trait BroadcastEventSource: Send + Sync {
    /// Live stream of the latest state event, starting with the current one
    fn observe(&self, broadcast: &VoiceBroadcast) -> BroadcastEventStream;
}

/// Source of chunk lists
pub trait ChunkSource: Send + Sync {
    /// Live stream of chunk snapshots, starting with the currently known chunks
    fn observe(&self, broadcast: &VoiceBroadcast) -> ChunkStream;
}

/// Running stream consumer; cancelled on [`Subscription::cancel`] or drop
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Forward every item of `stream` to `on_item` on a background task
    ///
    /// Forwarding ends when the stream ends, when `on_item` returns false,
    /// or when the subscription is cancelled.
    pub fn spawn<T, F>(mut stream: BoxStream<'static, T>, mut on_item: F) -> Self
    where
        T: Send + 'static,
        F: FnMut(T) -> bool + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                if !on_item(item) {
                    break;
                }
            }
        });
        Self { task }
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
