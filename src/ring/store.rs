//! Shared packet ring
//!
//! The single ordered stream every encoder of a muxer writes into, and every
//! player reads from.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::cache::GopCache;
use super::config::RingConfig;
use super::entry::{RingEntry, RingStats};
use crate::media::flv::RtmpPacket;

/// Ordered, append-only, multi-subscriber packet buffer
///
/// Writers are serialized under one lock, so every subscriber observes the
/// same packet order regardless of how many encoders write concurrently.
/// Share it as `Arc<PacketRing>`.
pub struct PacketRing {
    /// Broadcast sender for fan-out to subscribers
    tx: broadcast::Sender<RingEntry>,

    /// GOP cache, `None` when disabled. Also the write lock.
    cache: Mutex<Option<GopCache>>,

    packets_written: AtomicU64,
    key_positions: AtomicU64,
    bytes_written: AtomicU64,
}

impl PacketRing {
    /// Create a ring with default configuration
    pub fn new() -> Self {
        Self::with_config(&RingConfig::default())
    }

    /// Create a ring with custom configuration
    pub fn with_config(config: &RingConfig) -> Self {
        let (tx, _) = broadcast::channel(config.capacity.max(1));
        let cache = config
            .gop_cache_enabled
            .then(|| GopCache::with_max_size(config.gop_cache_max_size));

        Self {
            tx,
            cache: Mutex::new(cache),
            packets_written: AtomicU64::new(0),
            key_positions: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<GopCache>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a packet, tagged with whether it is a key position
    ///
    /// Returns the number of subscribers the packet was delivered to.
    pub fn write(&self, packet: RtmpPacket, key_pos: bool) -> usize {
        let entry = RingEntry::new(packet, key_pos);
        let mut cache = self.lock_cache();

        if let Some(cache) = cache.as_mut() {
            cache.push(&entry);
        }

        self.packets_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(entry.packet.size() as u64, Ordering::Relaxed);
        if key_pos {
            self.key_positions.fetch_add(1, Ordering::Relaxed);
        }

        // Err only means nobody is subscribed
        self.tx.send(entry).unwrap_or(0)
    }

    /// Subscribe to the ring
    ///
    /// Returns a broadcast receiver for live packets and the catch-up packets
    /// (metadata, sequence headers, current GOP) to deliver first. No packet
    /// appears in both.
    pub fn subscribe(&self) -> (broadcast::Receiver<RingEntry>, Vec<RingEntry>) {
        let cache = self.lock_cache();
        let rx = self.tx.subscribe();
        let catchup = cache.as_ref().map(GopCache::catchup).unwrap_or_default();

        tracing::info!(
            subscribers = self.tx.receiver_count(),
            catchup_packets = catchup.len(),
            "Subscriber added"
        );

        (rx, catchup)
    }

    /// Get the number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get ring statistics
    pub fn stats(&self) -> RingStats {
        let cache = self.lock_cache();
        RingStats {
            subscriber_count: self.tx.receiver_count(),
            packets_written: self.packets_written.load(Ordering::Relaxed),
            key_positions: self.key_positions.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            cached_packets: cache.as_ref().map_or(0, GopCache::len),
            cached_bytes: cache.as_ref().map_or(0, GopCache::size),
        }
    }
}

impl Default for PacketRing {
    fn default() -> Self {
        Self::new()
    }
}
