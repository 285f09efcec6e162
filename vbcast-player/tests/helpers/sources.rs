//! Broadcast streams driven by the test through watch channels

use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use vbcast_common::{VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent};
use vbcast_player::sources::{BroadcastEventSource, BroadcastEventStream, ChunkSource, ChunkStream};

/// State event and chunk list of one broadcast, both set by the test
///
/// Every observer first receives the current value, then each update.
pub struct ChannelBroadcast {
    events: watch::Sender<Option<VoiceBroadcastEvent>>,
    chunks: watch::Sender<Vec<VoiceBroadcastChunk>>,
}

impl ChannelBroadcast {
    pub fn new(event: Option<VoiceBroadcastEvent>) -> Self {
        let (events, _) = watch::channel(event);
        let (chunks, _) = watch::channel(Vec::new());
        Self { events, chunks }
    }

    pub fn set_event(&self, event: Option<VoiceBroadcastEvent>) {
        self.events.send_replace(event);
    }

    pub fn set_chunks(&self, chunks: Vec<VoiceBroadcastChunk>) {
        self.chunks.send_replace(chunks);
    }

    /// Number of live chunk subscriptions
    pub fn chunk_observers(&self) -> usize {
        self.chunks.receiver_count()
    }

    /// Number of live state event subscriptions
    pub fn event_observers(&self) -> usize {
        self.events.receiver_count()
    }
}

impl BroadcastEventSource for ChannelBroadcast {
    fn observe(&self, _broadcast: &VoiceBroadcast) -> BroadcastEventStream {
        WatchStream::new(self.events.subscribe()).boxed()
    }
}

impl ChunkSource for ChannelBroadcast {
    fn observe(&self, _broadcast: &VoiceBroadcast) -> ChunkStream {
        WatchStream::new(self.chunks.subscribe()).boxed()
    }
}
