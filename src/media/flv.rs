//! RTMP packets as FLV tag bodies
//!
//! Each RTMP audio/video message is an FLV tag body without the tag header.
//!
//! RTMP Video Data (AVC):
//! ```text
//! +----------+----------+---------------+-----------------+
//! | FrameType| CodecID  | AVCPacketType | CompositionTime | Data...
//! | (4 bits) | (4 bits) | (1 byte)      | (3 bytes, SI24) |
//! +----------+----------+---------------+-----------------+
//! ```
//!
//! RTMP Audio Data (AAC):
//! ```text
//! +-----------+----------+----------+----------+---------------+
//! |SoundFormat|SoundRate |SoundSize |SoundType | AACPacketType | Data...
//! | (4 bits)  | (2 bits) | (1 bit)  | (1 bit)  | (1 byte)      |
//! +-----------+----------+----------+----------+---------------+
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// FLV codec id for AVC in the video tag header
pub const VIDEO_CODEC_AVC: u8 = 7;
/// FLV sound format for AAC in the audio tag header
pub const AUDIO_FORMAT_AAC: u8 = 10;

/// AVC/AAC packet type: sequence header
pub const PACKET_SEQUENCE_HEADER: u8 = 0;
/// AVC packet type NALU / AAC packet type raw
pub const PACKET_DATA: u8 = 1;

/// RTMP message type of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Audio,
    Video,
    /// AMF0 data message (`onMetaData`)
    Script,
}

/// Video frame type (upper 4 bits of first byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFrameType {
    /// Keyframe (for AVC, a seekable frame)
    Keyframe = 1,
    /// Inter frame (for AVC, a non-seekable frame)
    InterFrame = 2,
}

impl VideoFrameType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match (b >> 4) & 0x0F {
            1 => Some(VideoFrameType::Keyframe),
            2 => Some(VideoFrameType::InterFrame),
            _ => None,
        }
    }
}

/// One encoded RTMP media message
#[derive(Debug, Clone, PartialEq)]
pub struct RtmpPacket {
    /// Message type
    pub packet_type: PacketType,
    /// Timestamp in milliseconds
    pub timestamp: u32,
    /// Tag body (codec headers included)
    pub data: Bytes,
}

impl RtmpPacket {
    /// Create a new video packet
    pub fn video(timestamp: u32, data: Bytes) -> Self {
        Self {
            packet_type: PacketType::Video,
            timestamp,
            data,
        }
    }

    /// Create a new audio packet
    pub fn audio(timestamp: u32, data: Bytes) -> Self {
        Self {
            packet_type: PacketType::Audio,
            timestamp,
            data,
        }
    }

    /// Create a new script data packet
    pub fn script(data: Bytes) -> Self {
        Self {
            packet_type: PacketType::Script,
            timestamp: 0,
            data,
        }
    }

    /// AVC video packet: tag header, packet type, composition time, body
    pub fn avc(
        timestamp: u32,
        keyframe: bool,
        avc_packet_type: u8,
        composition_time: i32,
        body: &[u8],
    ) -> Self {
        let frame_type = if keyframe {
            VideoFrameType::Keyframe
        } else {
            VideoFrameType::InterFrame
        };
        let mut buf = BytesMut::with_capacity(5 + body.len());
        buf.put_u8(((frame_type as u8) << 4) | VIDEO_CODEC_AVC);
        buf.put_u8(avc_packet_type);
        let ct = composition_time.to_be_bytes();
        buf.put_slice(&ct[1..]);
        buf.put_slice(body);
        Self::video(timestamp, buf.freeze())
    }

    /// AAC audio packet: sound header byte, packet type, body
    pub fn aac(timestamp: u32, aac_packet_type: u8, body: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(2 + body.len());
        // AAC is always signalled as 44kHz, 16-bit, stereo in the tag header
        buf.put_u8((AUDIO_FORMAT_AAC << 4) | 0x0F);
        buf.put_u8(aac_packet_type);
        buf.put_slice(body);
        Self::audio(timestamp, buf.freeze())
    }

    /// Check if this is a video packet
    pub fn is_video(&self) -> bool {
        self.packet_type == PacketType::Video
    }

    /// Check if this is an audio packet
    pub fn is_audio(&self) -> bool {
        self.packet_type == PacketType::Audio
    }

    /// Check if this is a script data packet
    pub fn is_script(&self) -> bool {
        self.packet_type == PacketType::Script
    }

    /// Check if this is a video keyframe
    pub fn is_keyframe(&self) -> bool {
        self.is_video()
            && self.data.first().and_then(|b| VideoFrameType::from_byte(*b))
                == Some(VideoFrameType::Keyframe)
    }

    /// Check if this is an AVC sequence header
    pub fn is_avc_sequence_header(&self) -> bool {
        self.is_video()
            && self.data.len() >= 2
            && self.data[0] & 0x0F == VIDEO_CODEC_AVC
            && self.data[1] == PACKET_SEQUENCE_HEADER
    }

    /// Check if this is an AAC sequence header
    pub fn is_aac_sequence_header(&self) -> bool {
        self.is_audio()
            && self.data.len() >= 2
            && (self.data[0] >> 4) == AUDIO_FORMAT_AAC
            && self.data[1] == PACKET_SEQUENCE_HEADER
    }

    /// Get the size of the packet body
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
