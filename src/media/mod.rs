//! Media handling for RTMP muxing
//!
//! This module provides:
//! - Codec identity and the frame model
//! - H.264/AVC NALU and SPS parsing
//! - AAC ADTS and AudioSpecificConfig parsing
//! - RTMP packet construction with FLV tag headers

pub mod aac;
pub mod bits;
pub mod codec;
pub mod flv;
pub mod frame;
pub mod h264;

pub use aac::{AdtsHeader, AudioSpecificConfig};
pub use codec::{CodecId, TrackType};
pub use flv::{PacketType, RtmpPacket};
pub use frame::Frame;
pub use h264::{AvcConfig, NaluType, SpsInfo};
