//! RTMP muxer implementation

use std::collections::HashMap;
use std::sync::Arc;

use super::binding::{perform_binding, BindingRecord};
use super::config::MuxerConfig;
use super::listener::MuxerListener;
use super::metadata::MetadataDescriptor;
use super::state::InitState;
use crate::encoder::{DefaultEncoderFactory, EncoderFactory};
use crate::media::codec::CodecId;
use crate::media::flv::RtmpPacket;
use crate::media::frame::Frame;
use crate::ring::PacketRing;
use crate::stats::MuxerStats;
use crate::track::TrackHandle;

/// What [`RtmpMuxer::metadata`] returns while bindings are outstanding
static EMPTY_METADATA: MetadataDescriptor = MetadataDescriptor::empty();

/// Multiplexes codec tracks into one RTMP packet stream
///
/// Every encoder bound by one muxer writes into the same [`PacketRing`], as
/// does [`RtmpMuxer::input_packet`]. The muxer is driven by a single owner;
/// wrap it in a mutex if several tasks feed it.
pub struct RtmpMuxer {
    config: MuxerConfig,

    /// Registered tracks, one per codec
    tracks: HashMap<CodecId, TrackHandle>,

    /// Bindings deferred until their track is ready
    pending: HashMap<CodecId, BindingRecord>,

    /// Combined metadata of every bound track
    metadata: MetadataDescriptor,

    ring: Arc<PacketRing>,
    factory: Arc<dyn EncoderFactory>,
    init: InitState,
    listener: Option<Arc<dyn MuxerListener>>,

    encoders_bound: u64,
    frames_routed: u64,
    packets_relayed: u64,
}

impl RtmpMuxer {
    /// Create a muxer with default configuration and the H.264/AAC encoders
    pub fn new() -> Self {
        Self::with_config(MuxerConfig::default())
    }

    /// Create a muxer with custom configuration and the H.264/AAC encoders
    pub fn with_config(config: MuxerConfig) -> Self {
        Self::with_factory(config, Arc::new(DefaultEncoderFactory))
    }

    /// Create a muxer drawing its encoders from `factory`
    pub fn with_factory(config: MuxerConfig, factory: Arc<dyn EncoderFactory>) -> Self {
        let ring = Arc::new(PacketRing::with_config(&config.ring));
        Self {
            config,
            tracks: HashMap::new(),
            pending: HashMap::new(),
            metadata: MetadataDescriptor::empty(),
            ring,
            factory,
            init: InitState::default(),
            listener: None,
            encoders_bound: 0,
            frames_routed: 0,
            packets_relayed: 0,
        }
    }

    /// Observe the one-time initialization
    pub fn set_listener(&mut self, listener: Arc<dyn MuxerListener>) {
        self.listener = Some(listener);
    }

    /// Get the muxer configuration
    pub fn config(&self) -> &MuxerConfig {
        &self.config
    }

    /// Register a track under its codec
    ///
    /// Replaces any track registered under the same codec, along with its
    /// deferred binding. A ready track is bound before this returns; any
    /// other track is bound by the first [`RtmpMuxer::input_frame`] after it
    /// becomes ready.
    pub fn add_track(&mut self, track: TrackHandle) {
        let codec_id = track.codec_id();

        if self.tracks.insert(codec_id, Arc::clone(&track)).is_some() {
            tracing::warn!(codec = %codec_id, "Track re-registered, replacing previous track");
        }
        self.pending.remove(&codec_id);

        let record = BindingRecord::new(track);
        let ready = record.track.ready();
        tracing::info!(
            codec = %codec_id,
            track_type = ?record.track.track_type(),
            ready,
            "Track registered"
        );
        if ready {
            self.bind(&record);
        } else {
            tracing::debug!(
                codec = %codec_id,
                pending = self.pending.len() + 1,
                "Track not ready, binding deferred"
            );
            self.pending.insert(codec_id, record);
        }
    }

    /// Push a raw frame into the track registered for its codec
    ///
    /// Frames for unregistered codecs are dropped. Returns whether the frame
    /// reached a track.
    pub fn input_frame(&mut self, frame: &Frame) -> bool {
        let Some(track) = self.tracks.get(&frame.codec_id).cloned() else {
            tracing::debug!(codec = %frame.codec_id, "No track for frame, dropped");
            return false;
        };

        track.input_frame(frame);
        self.frames_routed += 1;

        if !self.pending.is_empty() && track.ready() {
            if let Some(record) = self.pending.remove(&frame.codec_id) {
                tracing::info!(
                    codec = %record.codec_id,
                    pending = self.pending.len(),
                    "Track ready"
                );
                self.bind(&record);
            }
        }

        self.check_initialized();
        true
    }

    /// Write an already encoded packet straight into the ring
    ///
    /// Returns `key_pos`.
    pub fn input_packet(&mut self, packet: RtmpPacket, key_pos: bool) -> bool {
        self.ring.write(packet, key_pos);
        self.packets_relayed += 1;
        key_pos
    }

    /// Combined metadata of every track
    ///
    /// Empty while any binding is pending; an empty descriptor means "not
    /// ready yet", never "no metadata".
    pub fn metadata(&self) -> &MetadataDescriptor {
        if self.pending.is_empty() {
            &self.metadata
        } else {
            &EMPTY_METADATA
        }
    }

    /// Handle to the shared ring, for subscribers
    pub fn ring(&self) -> Arc<PacketRing> {
        Arc::clone(&self.ring)
    }

    /// Track registered for a codec
    pub fn track(&self, codec_id: CodecId) -> Option<&TrackHandle> {
        self.tracks.get(&codec_id)
    }

    /// Whether the binding for a codec is still deferred
    pub fn is_pending(&self, codec_id: CodecId) -> bool {
        self.pending.contains_key(&codec_id)
    }

    /// Whether every registered track has completed binding
    pub fn is_initialized(&self) -> bool {
        self.init.is_initialized()
    }

    /// Get muxer statistics
    pub fn stats(&self) -> MuxerStats {
        MuxerStats {
            registered_tracks: self.tracks.len(),
            pending_bindings: self.pending.len(),
            encoders_bound: self.encoders_bound,
            frames_routed: self.frames_routed,
            packets_relayed: self.packets_relayed,
            initialized: self.init.is_initialized(),
        }
    }

    fn bind(&mut self, record: &BindingRecord) {
        let Some(binding) = perform_binding(record, self.factory.as_ref(), &self.config) else {
            return;
        };

        self.metadata.fold(&binding.metadata);
        // Ring first, so the first forwarded frame already has somewhere to go
        binding.encoder.set_ring(Arc::clone(&self.ring));
        record
            .track
            .add_delegate(Arc::clone(&binding.encoder).into_delegate());
        self.encoders_bound += 1;

        tracing::info!(
            codec = %record.codec_id,
            metadata_fields = self.metadata.len(),
            "Encoder bound"
        );
    }

    fn check_initialized(&mut self) {
        if !self.pending.is_empty() || !self.init.complete() {
            return;
        }

        tracing::info!(
            tracks = self.tracks.len(),
            encoders = self.encoders_bound,
            metadata_fields = self.metadata.len(),
            "All tracks ready, muxer initialized"
        );

        if self.config.publish_metadata && !self.metadata.is_empty() {
            self.ring.write(self.metadata.to_packet(), false);
        }

        if let Some(listener) = &self.listener {
            listener.on_all_tracks_ready(&self.metadata);
        }
    }
}

impl Default for RtmpMuxer {
    fn default() -> Self {
        Self::new()
    }
}
