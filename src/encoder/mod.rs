//! RTMP encoders
//!
//! An encoder is bound to a track as its frame delegate and turns the frames
//! it receives into RTMP packets written to the muxer's shared ring.

pub mod aac;
pub mod h264;

use std::sync::{Arc, Mutex, PoisonError};

use crate::media::codec::CodecId;
use crate::media::flv::RtmpPacket;
use crate::ring::PacketRing;
use crate::track::{FrameDelegate, Track};

pub use aac::AacEncoder;
pub use h264::H264Encoder;

/// Frame-to-packet encoder for one codec
pub trait RtmpEncoder: FrameDelegate {
    fn codec_id(&self) -> CodecId;

    /// Point the encoder's output at a ring. Packets produced before a ring
    /// is attached are dropped.
    fn set_ring(&self, ring: Arc<PacketRing>);

    /// View the encoder as the delegate a track forwards frames to
    fn into_delegate(self: Arc<Self>) -> Arc<dyn FrameDelegate>;
}

/// Source of encoders for tracks
pub trait EncoderFactory: Send + Sync {
    /// Encoder for the track's codec, or `None` if the codec cannot be
    /// carried. Called synchronously on the ingestion path.
    fn encoder_for(&self, track: &dyn Track) -> Option<Arc<dyn RtmpEncoder>>;
}

/// Factory for the codecs this crate can package: H.264 and AAC
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEncoderFactory;

impl EncoderFactory for DefaultEncoderFactory {
    fn encoder_for(&self, track: &dyn Track) -> Option<Arc<dyn RtmpEncoder>> {
        match track.codec_id() {
            CodecId::H264 => Some(Arc::new(H264Encoder::from_track(track))),
            CodecId::Aac => Some(Arc::new(AacEncoder::from_track(track))),
            _ => None,
        }
    }
}

/// Ring an encoder writes into, set once at bind time
#[derive(Default)]
pub(crate) struct RingSlot {
    ring: Mutex<Option<Arc<PacketRing>>>,
}

impl RingSlot {
    pub(crate) fn set(&self, ring: Arc<PacketRing>) {
        *self.ring.lock().unwrap_or_else(PoisonError::into_inner) = Some(ring);
    }

    /// Write to the ring; false if no ring is attached yet
    pub(crate) fn write(&self, packet: RtmpPacket, key_pos: bool) -> bool {
        let ring = self
            .ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match ring {
            Some(ring) => {
                ring.write(packet, key_pos);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{AacTrack, H264Track};

    #[test]
    fn test_default_factory_codecs() {
        let factory = DefaultEncoderFactory;
        let h264 = factory.encoder_for(&H264Track::new()).unwrap();
        assert_eq!(h264.codec_id(), CodecId::H264);

        let aac = factory.encoder_for(&AacTrack::new()).unwrap();
        assert_eq!(aac.codec_id(), CodecId::Aac);
    }

    #[test]
    fn test_ring_slot_without_ring() {
        let slot = RingSlot::default();
        assert!(!slot.write(RtmpPacket::audio(0, bytes::Bytes::new()), false));

        let ring = Arc::new(PacketRing::new());
        slot.set(Arc::clone(&ring));
        assert!(slot.write(RtmpPacket::audio(0, bytes::Bytes::new()), false));
        assert_eq!(ring.stats().packets_written, 1);
    }
}
