//! RTMP track multiplexer
//!
//! Binds audio/video tracks to RTMP encoders and merges their packets into
//! one shared, ordered ring that any number of players can subscribe to.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use rtmp_mux::{AacTrack, Frame, H264Track, RtmpMuxer};
//!
//! let mut muxer = RtmpMuxer::new();
//! muxer.add_track(Arc::new(H264Track::new()));
//! muxer.add_track(Arc::new(AacTrack::new()));
//!
//! let (_rx, _catchup) = muxer.ring().subscribe();
//! muxer.input_frame(&Frame::h264(0, 0, Bytes::from_static(&[0, 0, 0, 1, 0x67])));
//! ```

pub mod amf;
pub mod encoder;
pub mod error;
pub mod media;
pub mod muxer;
pub mod ring;
pub mod stats;
pub mod track;

pub use encoder::{DefaultEncoderFactory, EncoderFactory, RtmpEncoder};
pub use error::{Error, MediaError, Result};
pub use media::{CodecId, Frame, RtmpPacket, TrackType};
pub use muxer::{MetadataDescriptor, MuxerConfig, MuxerListener, RtmpMuxer};
pub use ring::{PacketRing, RingConfig, RingEntry};
pub use stats::MuxerStats;
pub use track::{AacTrack, FrameDelegate, H264Track, Track, TrackHandle};
