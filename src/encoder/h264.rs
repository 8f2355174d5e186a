//! H.264 to RTMP encoder
//!
//! Emits the AVC sequence header ahead of the first picture and again
//! whenever the parameter sets change, then one AVCC NALU packet per picture
//! NAL unit. The first slice of an IDR picture is a key position.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::{BufMut, Bytes, BytesMut};

use super::{RingSlot, RtmpEncoder};
use crate::media::codec::CodecId;
use crate::media::flv::{RtmpPacket, PACKET_DATA, PACKET_SEQUENCE_HEADER};
use crate::media::frame::Frame;
use crate::media::h264::{is_first_slice, AvcConfig, NaluType};
use crate::ring::PacketRing;
use crate::track::{FrameDelegate, Track};

#[derive(Default)]
struct EncoderState {
    sps: Option<Bytes>,
    pps: Option<Bytes>,
    /// Whether the current parameter sets went out as a sequence header
    header_sent: bool,
}

/// H.264 encoder
#[derive(Default)]
pub struct H264Encoder {
    state: Mutex<EncoderState>,
    ring: RingSlot,
}

impl H264Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder seeded with the parameter sets the track already holds
    pub fn from_track(track: &dyn Track) -> Self {
        let encoder = Self::new();
        if let [sps, pps] = track.config_units().as_slice() {
            let mut state = encoder.lock();
            state.sps = Some(sps.clone());
            state.pps = Some(pps.clone());
        }
        encoder
    }

    fn lock(&self) -> MutexGuard<'_, EncoderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_parameter_set(slot: &mut Option<Bytes>, payload: Bytes, header_sent: &mut bool) {
        if slot.as_ref() != Some(&payload) {
            *slot = Some(payload);
            *header_sent = false;
        }
    }
}

impl FrameDelegate for H264Encoder {
    fn input_frame(&self, frame: &Frame) -> bool {
        let Some(nalu_type) = frame.nalu_type() else {
            return false;
        };
        let payload = frame.payload();
        let mut state = self.lock();
        let state = &mut *state;

        match nalu_type {
            NaluType::Sps => {
                Self::update_parameter_set(&mut state.sps, payload, &mut state.header_sent);
                return false;
            }
            NaluType::Pps => {
                Self::update_parameter_set(&mut state.pps, payload, &mut state.header_sent);
                return false;
            }
            t if !t.is_picture() => return false,
            _ => {}
        }

        if !state.header_sent {
            let (Some(sps), Some(pps)) = (&state.sps, &state.pps) else {
                // Undecodable without parameter sets
                return false;
            };
            let record = AvcConfig::new(sps.clone(), pps.clone()).to_record();
            let header = RtmpPacket::avc(frame.dts, true, PACKET_SEQUENCE_HEADER, 0, &record);
            if !self.ring.write(header, false) {
                return false;
            }
            state.header_sent = true;
        }

        let mut body = BytesMut::with_capacity(4 + payload.len());
        body.put_u32(payload.len() as u32);
        body.put_slice(&payload);

        let keyframe = nalu_type.is_keyframe();
        // Later slices of a multi-slice IDR belong to the GOP the first opened
        let key_pos = keyframe && is_first_slice(&payload);
        let packet = RtmpPacket::avc(
            frame.dts,
            keyframe,
            PACKET_DATA,
            frame.composition_time(),
            &body,
        );
        self.ring.write(packet, key_pos)
    }
}

impl RtmpEncoder for H264Encoder {
    fn codec_id(&self) -> CodecId {
        CodecId::H264
    }

    fn set_ring(&self, ring: Arc<PacketRing>) {
        self.ring.set(ring);
    }

    fn into_delegate(self: Arc<Self>) -> Arc<dyn FrameDelegate> {
        self
    }
}
