//! Distribution ring configuration

/// Configuration for a [`PacketRing`](super::PacketRing)
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Capacity of the broadcast channel (packets a slow subscriber may lag
    /// behind before it starts missing packets)
    pub capacity: usize,

    /// Keep the current GOP for late joiners
    pub gop_cache_enabled: bool,

    /// Maximum GOP cache size in bytes
    pub gop_cache_max_size: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            gop_cache_enabled: true,
            gop_cache_max_size: 4 * 1024 * 1024, // 4MB
        }
    }
}

impl RingConfig {
    /// Set broadcast capacity (clamped to at least 1)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Disable the GOP cache
    pub fn disable_gop_cache(mut self) -> Self {
        self.gop_cache_enabled = false;
        self
    }

    /// Set maximum GOP cache size
    pub fn gop_cache_max_size(mut self, size: usize) -> Self {
        self.gop_cache_max_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RingConfig::default()
            .capacity(0)
            .gop_cache_max_size(1024)
            .disable_gop_cache();

        assert_eq!(config.capacity, 1);
        assert_eq!(config.gop_cache_max_size, 1024);
        assert!(!config.gop_cache_enabled);
    }
}
