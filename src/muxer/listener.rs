//! Muxer lifecycle hook

use super::metadata::MetadataDescriptor;

/// Observer of the muxer's one-time initialization
pub trait MuxerListener: Send + Sync {
    /// Every registered track has completed binding. Called once per muxer
    /// with the combined descriptor.
    fn on_all_tracks_ready(&self, metadata: &MetadataDescriptor);
}
