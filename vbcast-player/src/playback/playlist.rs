//! Voice broadcast playlist
//!
//! Ordered index of the known chunks of one broadcast, with each chunk's
//! offset in the logical track and a pointer to the chunk currently audible.

use vbcast_common::{AudioContent, VoiceBroadcastChunk};

/// One chunk placed on the broadcast timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub sequence: u32,
    /// Offset of the chunk within the whole broadcast
    pub start_time_ms: u64,
    pub duration_ms: u64,
    pub content: AudioContent,
}

impl PlaylistItem {
    /// End of the chunk (exclusive)
    pub fn end_time_ms(&self) -> u64 {
        self.start_time_ms + self.duration_ms
    }

    /// True if `position_ms` falls within `[start, end)`
    pub fn contains(&self, position_ms: u64) -> bool {
        position_ms >= self.start_time_ms && position_ms < self.end_time_ms()
    }
}

/// Playlist of a single broadcast
#[derive(Debug, Default)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
    duration_ms: u64,
    current_sequence: Option<u32>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known chunk set
    ///
    /// Chunks are ordered by sequence; if a sequence appears twice the last
    /// occurrence wins. Start times are recomputed from the durations.
    pub fn set_items(&mut self, chunks: Vec<VoiceBroadcastChunk>) {
        let mut chunks = chunks;
        // Stable sort keeps arrival order among equal sequences
        chunks.sort_by_key(|c| c.sequence);

        let mut items: Vec<PlaylistItem> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if items.last().map(|i| i.sequence) == Some(chunk.sequence) {
                items.pop();
            }
            items.push(PlaylistItem {
                sequence: chunk.sequence,
                start_time_ms: 0,
                duration_ms: chunk.duration_ms,
                content: chunk.content,
            });
        }

        let mut start_time_ms = 0;
        for item in items.iter_mut() {
            item.start_time_ms = start_time_ms;
            start_time_ms += item.duration_ms;
        }

        self.items = items;
        self.duration_ms = start_time_ms;
    }

    /// Sum of all known chunk durations
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub fn current_sequence(&self) -> Option<u32> {
        self.current_sequence
    }

    pub fn set_current_sequence(&mut self, sequence: Option<u32>) {
        self.current_sequence = sequence;
    }

    /// Item covering `position_ms`, None past the last known chunk
    pub fn find_by_position(&self, position_ms: u64) -> Option<&PlaylistItem> {
        // Items are sorted and contiguous: the last one starting at or
        // before the position is the only candidate
        let idx = self
            .items
            .partition_point(|item| item.start_time_ms <= position_ms);
        idx.checked_sub(1)
            .map(|i| &self.items[i])
            .filter(|item| item.contains(position_ms))
    }

    pub fn find_by_sequence(&self, sequence: u32) -> Option<&PlaylistItem> {
        self.items
            .binary_search_by_key(&sequence, |item| item.sequence)
            .ok()
            .map(|i| &self.items[i])
    }

    /// Item at the current sequence
    pub fn current_item(&self) -> Option<&PlaylistItem> {
        self.current_sequence
            .and_then(|sequence| self.find_by_sequence(sequence))
    }

    /// Chunk to play after the current one
    ///
    /// The first chunk when nothing has been played yet. None when the
    /// following chunk has not arrived.
    pub fn next_item(&self) -> Option<&PlaylistItem> {
        match self.current_sequence {
            None => self.items.first(),
            Some(sequence) => self.find_by_sequence(sequence.checked_add(1)?),
        }
    }

    /// Highest-sequence chunk known so far
    pub fn last(&self) -> Option<&PlaylistItem> {
        self.items.last()
    }

    /// Forget all chunks and the current position
    pub fn reset(&mut self) {
        self.items.clear();
        self.duration_ms = 0;
        self.current_sequence = None;
    }
}
