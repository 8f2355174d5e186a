//! Elementary stream tracks
//!
//! A track is one audio or video stream. It learns its own format from the
//! frames pushed into it and forwards every frame to its delegates (the
//! encoders bound to it).
//!
//! Tracks are shared: the source that created the track holds one handle,
//! the muxer registry another. All methods take `&self`.

pub mod aac;
pub mod h264;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::media::codec::{CodecId, TrackType};
use crate::media::frame::Frame;

pub use aac::AacTrack;
pub use h264::H264Track;

/// Shared handle to a track
pub type TrackHandle = Arc<dyn Track>;

/// Receiver of every frame pushed into a track
pub trait FrameDelegate: Send + Sync {
    /// Consume a frame. Returns whether the frame produced output.
    fn input_frame(&self, frame: &Frame) -> bool;
}

/// Video parameters a ready track can describe
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoParams {
    pub width: u32,
    pub height: u32,
    /// Frames per second, 0 when unknown
    pub fps: f64,
}

/// Audio parameters a ready track can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioParams {
    pub sample_rate: u32,
    pub channels: u8,
    pub sample_bits: u8,
}

/// One elementary stream
pub trait Track: Send + Sync {
    /// Codec of the stream; the key the track is registered under
    fn codec_id(&self) -> CodecId;

    fn track_type(&self) -> TrackType {
        self.codec_id().track_type()
    }

    /// Whether enough data has been seen to describe the format
    fn ready(&self) -> bool;

    /// Push a frame; the track updates its format state and forwards the
    /// frame to every delegate
    fn input_frame(&self, frame: &Frame) -> bool;

    /// Attach a delegate that receives every subsequent frame
    fn add_delegate(&self, delegate: Arc<dyn FrameDelegate>);

    /// Codec configuration units (SPS and PPS for H.264, the
    /// AudioSpecificConfig for AAC), empty until known
    fn config_units(&self) -> Vec<Bytes> {
        Vec::new()
    }

    fn video_params(&self) -> Option<VideoParams> {
        None
    }

    fn audio_params(&self) -> Option<AudioParams> {
        None
    }
}

/// Delegate list shared by the concrete tracks
#[derive(Default)]
pub struct Delegates {
    inner: Mutex<Vec<Arc<dyn FrameDelegate>>>,
}

impl Delegates {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn FrameDelegate>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, delegate: Arc<dyn FrameDelegate>) {
        self.lock().push(delegate);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forward a frame to every delegate; true if any produced output
    pub fn forward(&self, frame: &Frame) -> bool {
        // Snapshot so a delegate may register further delegates
        let delegates: Vec<_> = self.lock().clone();
        delegates
            .iter()
            .fold(false, |any, d| d.input_frame(frame) || any)
    }
}
