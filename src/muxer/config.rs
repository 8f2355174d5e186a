//! Muxer configuration

use crate::ring::RingConfig;

/// Muxer configuration options
#[derive(Debug, Clone)]
pub struct MuxerConfig {
    /// Configuration of the shared packet ring
    pub ring: RingConfig,

    /// Nominal video bitrate advertised as `videodatarate` (kbps)
    pub video_datarate_kbps: u32,

    /// Nominal audio bitrate advertised as `audiodatarate` (kbps)
    pub audio_datarate_kbps: u32,

    /// Write the `onMetaData` packet into the ring once all tracks are bound
    pub publish_metadata: bool,
}

impl Default for MuxerConfig {
    fn default() -> Self {
        Self {
            ring: RingConfig::default(),
            video_datarate_kbps: 5000,
            audio_datarate_kbps: 160,
            publish_metadata: true,
        }
    }
}

impl MuxerConfig {
    /// Set the ring configuration
    pub fn ring(mut self, ring: RingConfig) -> Self {
        self.ring = ring;
        self
    }

    /// Set advertised video bitrate
    pub fn video_datarate_kbps(mut self, kbps: u32) -> Self {
        self.video_datarate_kbps = kbps;
        self
    }

    /// Set advertised audio bitrate
    pub fn audio_datarate_kbps(mut self, kbps: u32) -> Self {
        self.audio_datarate_kbps = kbps;
        self
    }

    /// Keep the `onMetaData` packet out of the ring
    pub fn disable_metadata_packet(mut self) -> Self {
        self.publish_metadata = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MuxerConfig::default();
        assert_eq!(config.video_datarate_kbps, 5000);
        assert_eq!(config.audio_datarate_kbps, 160);
        assert!(config.publish_metadata);
        assert!(config.ring.gop_cache_enabled);
    }

    #[test]
    fn test_builder() {
        let config = MuxerConfig::default()
            .video_datarate_kbps(2500)
            .audio_datarate_kbps(128)
            .ring(RingConfig::default().capacity(64))
            .disable_metadata_packet();

        assert_eq!(config.video_datarate_kbps, 2500);
        assert_eq!(config.audio_datarate_kbps, 128);
        assert_eq!(config.ring.capacity, 64);
        assert!(!config.publish_metadata);
    }
}
