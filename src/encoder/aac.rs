//! AAC to RTMP encoder
//!
//! Emits the AAC sequence header once, then one raw-frame packet per input
//! frame with the ADTS header stripped. Audio never marks key positions.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use super::{RingSlot, RtmpEncoder};
use crate::media::aac::{AdtsHeader, AudioSpecificConfig};
use crate::media::codec::CodecId;
use crate::media::flv::{RtmpPacket, PACKET_DATA, PACKET_SEQUENCE_HEADER};
use crate::media::frame::Frame;
use crate::ring::PacketRing;
use crate::track::{FrameDelegate, Track};

#[derive(Default)]
struct EncoderState {
    config: Option<Bytes>,
    header_sent: bool,
}

/// AAC encoder
#[derive(Default)]
pub struct AacEncoder {
    state: Mutex<EncoderState>,
    ring: RingSlot,
}

impl AacEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder seeded with the track's AudioSpecificConfig
    pub fn from_track(track: &dyn Track) -> Self {
        let encoder = Self::new();
        encoder.lock().config = track.config_units().into_iter().next();
        encoder
    }

    fn lock(&self) -> MutexGuard<'_, EncoderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameDelegate for AacEncoder {
    fn input_frame(&self, frame: &Frame) -> bool {
        let mut state = self.lock();

        if state.config.is_none() {
            if let Ok(header) = AdtsHeader::parse(&frame.data) {
                state.config = Some(AudioSpecificConfig::from_adts(&header).raw);
            }
        }

        if !state.header_sent {
            let Some(config) = state.config.as_ref() else {
                return false;
            };
            let header = RtmpPacket::aac(frame.dts, PACKET_SEQUENCE_HEADER, config);
            if !self.ring.write(header, false) {
                return false;
            }
            state.header_sent = true;
        }

        let payload = frame.payload();
        if payload.is_empty() {
            return false;
        }
        self.ring
            .write(RtmpPacket::aac(frame.dts, PACKET_DATA, &payload), false)
    }
}

impl RtmpEncoder for AacEncoder {
    fn codec_id(&self) -> CodecId {
        CodecId::Aac
    }

    fn set_ring(&self, ring: Arc<PacketRing>) {
        self.ring.set(ring);
    }

    fn into_delegate(self: Arc<Self>) -> Arc<dyn FrameDelegate> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::aac::tests::make_adts;
    use crate::track::AacTrack;

    fn adts_frame(ts: u32, payload: &[u8]) -> Frame {
        let mut data = make_adts(4, 2, payload.len()).to_vec();
        data.extend_from_slice(payload);
        Frame::aac(ts, Bytes::from(data))
    }

    #[test]
    fn test_header_then_raw_frames() {
        let ring = Arc::new(PacketRing::new());
        let (mut rx, _) = ring.subscribe();
        let encoder = AacEncoder::new();
        encoder.set_ring(ring);

        assert!(encoder.input_frame(&adts_frame(0, &[0x21, 0x10])));
        assert!(encoder.input_frame(&adts_frame(23, &[0x21, 0x20])));

        let header = rx.try_recv().unwrap();
        assert_eq!(&header.packet.data[..], &[0xAF, 0x00, 0x12, 0x10]);
        assert!(!header.key_pos);

        let first = rx.try_recv().unwrap();
        assert_eq!(&first.packet.data[..], &[0xAF, 0x01, 0x21, 0x10]);
        assert!(!first.key_pos);

        let second = rx.try_recv().unwrap();
        assert_eq!(second.packet.timestamp, 23);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_seeded_from_track() {
        let track = AacTrack::with_config(Bytes::from_static(&[0x11, 0x90])).unwrap();
        let encoder = AacEncoder::from_track(&track);
        let ring = Arc::new(PacketRing::new());
        let (mut rx, _) = ring.subscribe();
        encoder.set_ring(ring);

        // Raw frame without ADTS still goes out once the config is known
        assert!(encoder.input_frame(&Frame::aac(0, Bytes::from_static(&[0x21, 0x00]))));
        let header = rx.try_recv().unwrap();
        assert_eq!(&header.packet.data[2..], &[0x11, 0x90]);
    }

    #[test]
    fn test_dropped_without_config() {
        let ring = Arc::new(PacketRing::new());
        let encoder = AacEncoder::new();
        encoder.set_ring(Arc::clone(&ring));

        assert!(!encoder.input_frame(&Frame::aac(0, Bytes::from_static(&[0x21, 0x00]))));
        assert_eq!(ring.stats().packets_written, 0);
    }
}
