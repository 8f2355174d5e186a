//! Statistics for a muxer instance

/// Snapshot of muxer statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuxerStats {
    /// Tracks currently registered
    pub registered_tracks: usize,
    /// Tracks whose binding is still deferred
    pub pending_bindings: usize,
    /// Encoders attached to tracks since creation
    pub encoders_bound: u64,
    /// Frames routed to a registered track
    pub frames_routed: u64,
    /// Pre-encoded packets relayed straight into the ring
    pub packets_relayed: u64,
    /// Whether every registered track has completed binding
    pub initialized: bool,
}

impl MuxerStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks registered but without an encoder (deferred, or skipped
    /// because no encoder or metadata model exists for them)
    pub fn unbound_tracks(&self) -> usize {
        self.registered_tracks
            .saturating_sub(self.encoders_bound as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_tracks() {
        let stats = MuxerStats {
            registered_tracks: 2,
            encoders_bound: 1,
            ..MuxerStats::new()
        };
        assert_eq!(stats.unbound_tracks(), 1);

        let stats = MuxerStats {
            registered_tracks: 1,
            encoders_bound: 3,
            ..MuxerStats::new()
        };
        assert_eq!(stats.unbound_tracks(), 0);
    }
}
