//! AAC track

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use super::{AudioParams, Delegates, FrameDelegate, Track};
use crate::error::Result;
use crate::media::aac::{AdtsHeader, AudioSpecificConfig};
use crate::media::codec::CodecId;
use crate::media::frame::Frame;

/// AAC audio track
///
/// Ready once the AudioSpecificConfig is known: supplied up front, or derived
/// from the first ADTS header seen.
#[derive(Default)]
pub struct AacTrack {
    config: Mutex<Option<AudioSpecificConfig>>,
    delegates: Delegates,
}

impl AacTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track with a known AudioSpecificConfig
    pub fn with_config(config: Bytes) -> Result<Self> {
        let config = AudioSpecificConfig::parse(config)?;
        Ok(Self {
            config: Mutex::new(Some(config)),
            delegates: Delegates::default(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<AudioSpecificConfig>> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Track for AacTrack {
    fn codec_id(&self) -> CodecId {
        CodecId::Aac
    }

    fn ready(&self) -> bool {
        self.lock().is_some()
    }

    fn input_frame(&self, frame: &Frame) -> bool {
        {
            let mut config = self.lock();
            if config.is_none() {
                match AdtsHeader::parse(&frame.data) {
                    Ok(header) => {
                        let asc = AudioSpecificConfig::from_adts(&header);
                        tracing::debug!(
                            sample_rate = asc.sampling_frequency,
                            channels = asc.channels(),
                            "AAC config derived from ADTS"
                        );
                        *config = Some(asc);
                    }
                    Err(e) => tracing::debug!(error = %e, "AAC frame without ADTS header"),
                }
            }
        }
        self.delegates.forward(frame)
    }

    fn add_delegate(&self, delegate: Arc<dyn FrameDelegate>) {
        self.delegates.add(delegate);
    }

    fn config_units(&self) -> Vec<Bytes> {
        self.lock().iter().map(|c| c.raw.clone()).collect()
    }

    fn audio_params(&self) -> Option<AudioParams> {
        self.lock().as_ref().map(|c| AudioParams {
            sample_rate: c.sampling_frequency,
            channels: c.channels(),
            sample_bits: 16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::aac::tests::make_adts;

    #[test]
    fn test_ready_from_adts() {
        let track = AacTrack::new();
        assert!(!track.ready());
        assert!(track.audio_params().is_none());

        let mut data = make_adts(3, 1, 2).to_vec();
        data.extend_from_slice(&[0x21, 0x00]);
        track.input_frame(&Frame::aac(0, Bytes::from(data)));

        assert!(track.ready());
        let params = track.audio_params().unwrap();
        assert_eq!(params.sample_rate, 48000);
        assert_eq!(params.channels, 1);
        assert_eq!(params.sample_bits, 16);
        assert_eq!(track.config_units().len(), 1);
    }

    #[test]
    fn test_raw_frames_do_not_make_ready() {
        let track = AacTrack::new();
        track.input_frame(&Frame::aac(0, Bytes::from_static(&[0x21, 0x00, 0x03])));
        assert!(!track.ready());
    }

    #[test]
    fn test_with_config() {
        let track = AacTrack::with_config(Bytes::from_static(&[0x12, 0x10])).unwrap();
        assert!(track.ready());
        assert_eq!(track.audio_params().unwrap().sample_rate, 44100);
        assert_eq!(&track.config_units()[0][..], &[0x12, 0x10]);

        assert!(AacTrack::with_config(Bytes::from_static(&[0x12])).is_err());
    }
}
