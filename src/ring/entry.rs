//! Ring entry and statistics types

use crate::media::flv::RtmpPacket;

/// A packet as stored in and broadcast from the ring
///
/// Cheap to clone: the packet body is a reference-counted `Bytes`.
#[derive(Debug, Clone, PartialEq)]
pub struct RingEntry {
    /// The encoded packet
    pub packet: RtmpPacket,
    /// Whether subscribers may start playback at this packet
    pub key_pos: bool,
}

impl RingEntry {
    pub fn new(packet: RtmpPacket, key_pos: bool) -> Self {
        Self { packet, key_pos }
    }
}

/// Snapshot of ring statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingStats {
    /// Number of live subscribers
    pub subscriber_count: usize,
    /// Packets written since creation
    pub packets_written: u64,
    /// Packets written with the key position flag set
    pub key_positions: u64,
    /// Packet body bytes written since creation
    pub bytes_written: u64,
    /// Packets currently held in the GOP cache
    pub cached_packets: usize,
    /// Size of the GOP cache in bytes
    pub cached_bytes: usize,
}
