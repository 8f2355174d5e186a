//! Elementary stream frames
//!
//! A frame is one access unit piece as produced by a demuxer or capture
//! source: a single Annex-B NAL unit for H.264, one ADTS-framed AAC frame for
//! AAC. Cloning is cheap since the payload is a `Bytes`.

use bytes::Bytes;

use super::aac::AdtsHeader;
use super::codec::CodecId;
use super::h264::{self, NaluType};

/// One frame of an elementary stream
#[derive(Debug, Clone)]
pub struct Frame {
    /// Codec of the stream this frame belongs to
    pub codec_id: CodecId,
    /// Decode timestamp in milliseconds
    pub dts: u32,
    /// Presentation timestamp in milliseconds
    pub pts: u32,
    /// Frame data, prefix included
    pub data: Bytes,
    /// Length of the start code or ADTS header at the head of `data`
    pub prefix_size: usize,
}

impl Frame {
    /// Frame with no codec-specific prefix handling
    pub fn new(codec_id: CodecId, dts: u32, pts: u32, data: Bytes) -> Self {
        Self {
            codec_id,
            dts,
            pts,
            data,
            prefix_size: 0,
        }
    }

    /// H.264 NAL unit, with or without an Annex-B start code
    pub fn h264(dts: u32, pts: u32, data: Bytes) -> Self {
        let prefix_size = h264::start_code_len(&data);
        Self {
            codec_id: CodecId::H264,
            dts,
            pts,
            data,
            prefix_size,
        }
    }

    /// AAC frame, with or without an ADTS header
    pub fn aac(timestamp: u32, data: Bytes) -> Self {
        let prefix_size = AdtsHeader::parse(&data)
            .map(|h| h.header_len)
            .unwrap_or(0);
        Self {
            codec_id: CodecId::Aac,
            dts: timestamp,
            pts: timestamp,
            data,
            prefix_size,
        }
    }

    /// Frame data without the start code / ADTS header
    pub fn payload(&self) -> Bytes {
        self.data.slice(self.prefix_size.min(self.data.len())..)
    }

    /// NAL unit type of an H.264 frame
    pub fn nalu_type(&self) -> Option<NaluType> {
        if self.codec_id != CodecId::H264 {
            return None;
        }
        self.data
            .get(self.prefix_size)
            .and_then(|b| NaluType::from_byte(*b))
    }

    /// Whether a decoder can start from this frame
    pub fn is_keyframe(&self) -> bool {
        match self.codec_id {
            CodecId::H264 => self.nalu_type().is_some_and(|t| t.is_keyframe()),
            _ => false,
        }
    }

    /// Whether this frame carries codec configuration (SPS/PPS)
    pub fn is_config(&self) -> bool {
        self.nalu_type().is_some_and(|t| t.is_parameter_set())
    }

    /// Composition time offset (pts - dts) in milliseconds
    pub fn composition_time(&self) -> i32 {
        self.pts.wrapping_sub(self.dts) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::aac::tests::make_adts;

    #[test]
    fn test_h264_prefix_detection() {
        let frame = Frame::h264(0, 0, Bytes::from_static(&[0, 0, 0, 1, 0x65, 0x88]));
        assert_eq!(frame.prefix_size, 4);
        assert_eq!(&frame.payload()[..], &[0x65, 0x88]);
        assert_eq!(frame.nalu_type(), Some(NaluType::Idr));
        assert!(frame.is_keyframe());
        assert!(!frame.is_config());

        let sps = Frame::h264(0, 0, Bytes::from_static(&[0, 0, 1, 0x67, 0x42]));
        assert_eq!(sps.prefix_size, 3);
        assert!(sps.is_config());
        assert!(!sps.is_keyframe());
    }

    #[test]
    fn test_h264_without_start_code() {
        let frame = Frame::h264(40, 40, Bytes::from_static(&[0x41, 0x9A]));
        assert_eq!(frame.prefix_size, 0);
        assert_eq!(frame.nalu_type(), Some(NaluType::Slice));
    }

    #[test]
    fn test_aac_strips_adts() {
        let mut data = make_adts(4, 2, 3).to_vec();
        data.extend_from_slice(&[0x21, 0x10, 0x04]);
        let frame = Frame::aac(23, Bytes::from(data));

        assert_eq!(frame.prefix_size, 7);
        assert_eq!(&frame.payload()[..], &[0x21, 0x10, 0x04]);
        assert!(!frame.is_keyframe());
        assert_eq!(frame.nalu_type(), None);
    }

    #[test]
    fn test_composition_time() {
        let frame = Frame::h264(100, 180, Bytes::from_static(&[0x41]));
        assert_eq!(frame.composition_time(), 80);

        let frame = Frame::h264(180, 100, Bytes::from_static(&[0x41]));
        assert_eq!(frame.composition_time(), -80);
    }

    #[test]
    fn test_empty_payload() {
        let frame = Frame::h264(0, 0, Bytes::new());
        assert!(frame.payload().is_empty());
        assert_eq!(frame.nalu_type(), None);
    }
}
