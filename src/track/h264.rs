//! H.264 track

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use super::{Delegates, FrameDelegate, Track, VideoParams};
use crate::media::codec::CodecId;
use crate::media::frame::Frame;
use crate::media::h264::{NaluType, SpsInfo};

#[derive(Default)]
struct ParameterSets {
    sps: Option<Bytes>,
    pps: Option<Bytes>,
    info: Option<SpsInfo>,
}

/// H.264 video track
///
/// Ready once both an SPS and a PPS have been seen, either up front via
/// [`H264Track::with_parameter_sets`] or in the frame stream.
#[derive(Default)]
pub struct H264Track {
    params: Mutex<ParameterSets>,
    delegates: Delegates,
}

impl H264Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track whose parameter sets are already known (e.g. from a container
    /// header). Start codes are accepted and stripped.
    pub fn with_parameter_sets(sps: Bytes, pps: Bytes) -> Self {
        let track = Self::new();
        track.input_frame(&Frame::h264(0, 0, sps));
        track.input_frame(&Frame::h264(0, 0, pps));
        track
    }

    fn lock(&self) -> MutexGuard<'_, ParameterSets> {
        self.params.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_parameter_sets(&self, frame: &Frame) {
        let payload = frame.payload();
        let mut params = self.lock();
        match frame.nalu_type() {
            Some(NaluType::Sps) => {
                if params.sps.as_ref() == Some(&payload) {
                    return;
                }
                match SpsInfo::parse(&payload) {
                    Ok(info) => {
                        tracing::debug!(
                            width = info.width,
                            height = info.height,
                            fps = ?info.fps,
                            profile = info.profile_idc,
                            level = info.level_idc,
                            "H264 SPS parsed"
                        );
                        params.info = Some(info);
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Could not parse H264 SPS");
                        params.info = None;
                    }
                }
                params.sps = Some(payload);
            }
            Some(NaluType::Pps) => params.pps = Some(payload),
            _ => {}
        }
    }
}

impl Track for H264Track {
    fn codec_id(&self) -> CodecId {
        CodecId::H264
    }

    fn ready(&self) -> bool {
        let params = self.lock();
        params.sps.is_some() && params.pps.is_some()
    }

    fn input_frame(&self, frame: &Frame) -> bool {
        if frame.is_config() {
            self.update_parameter_sets(frame);
        }
        self.delegates.forward(frame)
    }

    fn add_delegate(&self, delegate: Arc<dyn FrameDelegate>) {
        self.delegates.add(delegate);
    }

    fn config_units(&self) -> Vec<Bytes> {
        let params = self.lock();
        match (&params.sps, &params.pps) {
            (Some(sps), Some(pps)) => vec![sps.clone(), pps.clone()],
            _ => Vec::new(),
        }
    }

    fn video_params(&self) -> Option<VideoParams> {
        let params = self.lock();
        let info = params.info.as_ref()?;
        Some(VideoParams {
            width: info.width,
            height: info.height,
            fps: info.fps.unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::h264::tests::make_sps;

    const PPS: &[u8] = &[0, 0, 0, 1, 0x68, 0xCE, 0x3C, 0x80];

    fn annexb(nalu: &[u8]) -> Bytes {
        let mut data = vec![0, 0, 0, 1];
        data.extend_from_slice(nalu);
        Bytes::from(data)
    }

    #[test]
    fn test_ready_after_sps_and_pps() {
        let track = H264Track::new();
        assert!(!track.ready());
        assert!(track.config_units().is_empty());

        track.input_frame(&Frame::h264(0, 0, annexb(&make_sps(1280, 720, None))));
        assert!(!track.ready());

        track.input_frame(&Frame::h264(0, 0, Bytes::from_static(PPS)));
        assert!(track.ready());

        let units = track.config_units();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0][0], 0x67);
        assert_eq!(&units[1][..], &PPS[4..]);
    }

    #[test]
    fn test_video_params_from_sps() {
        let sps = annexb(&make_sps(640, 480, Some((1, 60))));
        let track = H264Track::with_parameter_sets(sps, Bytes::from_static(PPS));
        assert!(track.ready());

        let params = track.video_params().unwrap();
        assert_eq!(params.width, 640);
        assert_eq!(params.height, 480);
        assert_eq!(params.fps, 30.0);
    }

    #[test]
    fn test_unparseable_sps_still_counts() {
        let track = H264Track::new();
        track.input_frame(&Frame::h264(0, 0, Bytes::from_static(&[0x67, 0x42])));
        track.input_frame(&Frame::h264(0, 0, Bytes::from_static(PPS)));

        assert!(track.ready());
        assert!(track.video_params().is_none());
    }

    #[test]
    fn test_slices_do_not_make_ready() {
        let track = H264Track::new();
        track.input_frame(&Frame::h264(0, 0, Bytes::from_static(&[0, 0, 1, 0x65, 0x88])));
        track.input_frame(&Frame::h264(40, 40, Bytes::from_static(&[0, 0, 1, 0x41, 0x9A])));
        assert!(!track.ready());
        assert_eq!(track.track_type(), crate::media::codec::TrackType::Video);
    }
}
