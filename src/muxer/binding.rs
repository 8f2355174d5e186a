//! Track-to-encoder binding
//!
//! A binding is described by a plain record and computed by a pure
//! function; the muxer applies the result (fold metadata, attach ring,
//! attach delegate).

use std::sync::Arc;

use crate::encoder::{EncoderFactory, RtmpEncoder};
use crate::media::codec::CodecId;
use crate::track::TrackHandle;

use super::config::MuxerConfig;
use super::metadata::TrackMetadata;

/// A track waiting to be bound
#[derive(Clone)]
pub struct BindingRecord {
    pub codec_id: CodecId,
    pub track: TrackHandle,
}

impl BindingRecord {
    pub fn new(track: TrackHandle) -> Self {
        Self {
            codec_id: track.codec_id(),
            track,
        }
    }
}

impl std::fmt::Debug for BindingRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRecord")
            .field("codec_id", &self.codec_id)
            .field("ready", &self.track.ready())
            .finish()
    }
}

/// Result of a successful binding
pub struct Binding {
    pub encoder: Arc<dyn RtmpEncoder>,
    /// Never [`TrackMetadata::Other`]
    pub metadata: TrackMetadata,
}

/// Compute the encoder and metadata fragment for a track
///
/// Returns `None`, silently, when the factory has no encoder for the codec or
/// the track type has no metadata model. The track then stays registered and
/// keeps receiving frames but contributes nothing to the stream.
pub fn perform_binding(
    record: &BindingRecord,
    factory: &dyn EncoderFactory,
    config: &MuxerConfig,
) -> Option<Binding> {
    let Some(encoder) = factory.encoder_for(record.track.as_ref()) else {
        tracing::debug!(codec = %record.codec_id, "No encoder for codec, binding skipped");
        return None;
    };

    let metadata = match TrackMetadata::for_track(record.track.as_ref(), config) {
        TrackMetadata::Other => {
            tracing::debug!(codec = %record.codec_id, "Unsupported track type, binding skipped");
            return None;
        }
        metadata => metadata,
    };

    Some(Binding { encoder, metadata })
}
