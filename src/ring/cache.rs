//! GOP cache for late joiners
//!
//! A subscriber attaching mid-stream needs, in order:
//! 1. The `onMetaData` script packet
//! 2. The sequence headers (AVC decoder config, AudioSpecificConfig)
//! 3. Every packet since the most recent key position
//!
//! Key positions are whatever writers flagged as such; the cache does not
//! inspect packet bodies to decide where a GOP starts.

use std::collections::VecDeque;

use super::entry::RingEntry;

/// Cache of the current GOP plus the stream headers
#[derive(Debug)]
pub struct GopCache {
    /// Maximum size of cached packet bodies in bytes
    max_size: usize,
    /// Current size of cached packet bodies in bytes
    current_size: usize,
    metadata: Option<RingEntry>,
    video_header: Option<RingEntry>,
    audio_header: Option<RingEntry>,
    /// Packets since the last key position
    entries: VecDeque<RingEntry>,
    /// Whether `entries` starts at a key position
    has_key_position: bool,
}

impl GopCache {
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size,
            current_size: 0,
            metadata: None,
            video_header: None,
            audio_header: None,
            entries: VecDeque::new(),
            has_key_position: false,
        }
    }

    /// Record a packet written to the ring
    ///
    /// Headers and metadata replace their cached slot; other packets join the
    /// current GOP, a key position starting a fresh one.
    pub fn push(&mut self, entry: &RingEntry) {
        let packet = &entry.packet;
        if packet.is_script() {
            self.metadata = Some(entry.clone());
            return;
        }
        if packet.is_avc_sequence_header() {
            self.video_header = Some(entry.clone());
            return;
        }
        if packet.is_aac_sequence_header() {
            self.audio_header = Some(entry.clone());
            return;
        }

        if entry.key_pos {
            self.clear_entries();
            self.has_key_position = true;
        }

        let size = packet.size();
        while self.current_size + size > self.max_size {
            match self.entries.pop_front() {
                Some(old) => self.current_size -= old.packet.size(),
                None => {
                    self.has_key_position = false;
                    return;
                }
            }
            // The GOP head is gone, catch-up no longer starts at a key position
            self.has_key_position = false;
        }

        self.entries.push_back(entry.clone());
        self.current_size += size;
    }

    /// Clear cached packets but keep headers and metadata
    pub fn clear_entries(&mut self) {
        self.entries.clear();
        self.current_size = 0;
        self.has_key_position = false;
    }

    /// Packets a new subscriber should receive before live data
    pub fn catchup(&self) -> Vec<RingEntry> {
        let mut result = Vec::with_capacity(self.entries.len() + 3);
        result.extend(self.metadata.iter().cloned());
        result.extend(self.video_header.iter().cloned());
        result.extend(self.audio_header.iter().cloned());
        result.extend(self.entries.iter().cloned());
        result
    }

    pub fn has_key_position(&self) -> bool {
        self.has_key_position
    }

    /// Number of cached GOP packets (headers excluded)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of cached GOP packet bodies in bytes
    pub fn size(&self) -> usize {
        self.current_size
    }
}
