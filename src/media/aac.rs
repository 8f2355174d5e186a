//! AAC helpers
//!
//! Input frames carry ADTS headers. RTMP wants the AudioSpecificConfig once as
//! a sequence header and raw AAC frames (ADTS stripped) afterwards.
//!
//! ADTS fixed header:
//! ```text
//! syncword (12) | ID (1) | layer (2) | protection_absent (1)
//! | profile (2) | sampling_frequency_index (4) | private (1)
//! | channel_configuration (3) | ... | aac_frame_length (13) | ...
//! ```

use bytes::Bytes;

use crate::error::{MediaError, Result};

/// Standard sampling frequencies by index
const SAMPLING_FREQUENCIES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// Parsed ADTS header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// Profile as written in ADTS (audio object type minus one)
    pub profile: u8,
    pub sampling_frequency_index: u8,
    pub channel_configuration: u8,
    /// Frame length including the header
    pub frame_length: u16,
    /// 7 without CRC, 9 with
    pub header_len: usize,
}

impl AdtsHeader {
    /// Whether `data` starts with an ADTS sync word
    pub fn is_adts(data: &[u8]) -> bool {
        data.len() >= 2 && data[0] == 0xFF && (data[1] & 0xF0) == 0xF0
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 7 || !Self::is_adts(data) {
            return Err(MediaError::InvalidAdtsHeader.into());
        }

        let protection_absent = data[1] & 0x01 == 1;
        let profile = (data[2] >> 6) & 0x03;
        let sampling_frequency_index = (data[2] >> 2) & 0x0F;
        let channel_configuration = ((data[2] & 0x01) << 2) | ((data[3] >> 6) & 0x03);
        let frame_length = (((data[3] & 0x03) as u16) << 11)
            | ((data[4] as u16) << 3)
            | ((data[5] as u16) >> 5);

        if sampling_frequency_index as usize >= SAMPLING_FREQUENCIES.len() {
            return Err(MediaError::InvalidAdtsHeader.into());
        }

        Ok(AdtsHeader {
            profile,
            sampling_frequency_index,
            channel_configuration,
            frame_length,
            header_len: if protection_absent { 7 } else { 9 },
        })
    }
}

/// AudioSpecificConfig (the AAC sequence header payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    /// Audio object type (2 = AAC LC)
    pub audio_object_type: u8,
    pub sampling_frequency_index: u8,
    /// Sampling frequency in Hz
    pub sampling_frequency: u32,
    /// Channel configuration (1=mono, 2=stereo, etc.)
    pub channel_configuration: u8,
    /// Raw config bytes
    pub raw: Bytes,
}

impl AudioSpecificConfig {
    /// Parse from AAC sequence header data
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < 2 {
            return Err(MediaError::InvalidAacConfig.into());
        }

        let b0 = data[0];
        let b1 = data[1];

        let audio_object_type = (b0 >> 3) & 0x1F;
        let sampling_frequency_index = ((b0 & 0x07) << 1) | ((b1 >> 7) & 0x01);

        let sampling_frequency = if sampling_frequency_index == 0x0F {
            // Explicit frequency in next 24 bits
            if data.len() < 5 {
                return Err(MediaError::InvalidAacConfig.into());
            }
            let f0 = (data[1] & 0x7F) as u32;
            let f1 = data[2] as u32;
            let f2 = data[3] as u32;
            let f3 = (data[4] >> 7) as u32;
            (f0 << 17) | (f1 << 9) | (f2 << 1) | f3
        } else {
            *SAMPLING_FREQUENCIES
                .get(sampling_frequency_index as usize)
                .ok_or(MediaError::InvalidAacConfig)?
        };

        let channel_configuration = if sampling_frequency_index == 0x0F {
            (data[4] >> 3) & 0x0F
        } else {
            (b1 >> 3) & 0x0F
        };

        Ok(AudioSpecificConfig {
            audio_object_type,
            sampling_frequency_index,
            sampling_frequency,
            channel_configuration,
            raw: data,
        })
    }

    /// Build the two-byte config an ADTS header implies
    pub fn from_adts(header: &AdtsHeader) -> Self {
        let audio_object_type = header.profile + 1;
        let sfi = header.sampling_frequency_index;
        let channels = header.channel_configuration;
        let raw = Bytes::copy_from_slice(&[
            (audio_object_type << 3) | (sfi >> 1),
            ((sfi & 0x01) << 7) | (channels << 3),
        ]);

        AudioSpecificConfig {
            audio_object_type,
            sampling_frequency_index: sfi,
            sampling_frequency: SAMPLING_FREQUENCIES.get(sfi as usize).copied().unwrap_or(0),
            channel_configuration: channels,
            raw,
        }
    }

    /// Get channel count
    pub fn channels(&self) -> u8 {
        match self.channel_configuration {
            1..=6 => self.channel_configuration,
            7 => 8,
            _ => 0,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio_test::assert_err;

    use super::*;

    /// ADTS header (no CRC) for AAC LC at the given frequency index and channels
    pub(crate) fn make_adts(sfi: u8, channels: u8, payload_len: usize) -> [u8; 7] {
        let len = (payload_len + 7) as u16;
        [
            0xFF,
            0xF1,
            (1 << 6) | (sfi << 2) | (channels >> 2),
            ((channels & 0x03) << 6) | ((len >> 11) as u8 & 0x03),
            (len >> 3) as u8,
            ((len & 0x07) as u8) << 5 | 0x1F,
            0xFC,
        ]
    }

    #[test]
    fn test_parse_adts() {
        let header = AdtsHeader::parse(&make_adts(4, 2, 100)).unwrap();
        assert_eq!(header.profile, 1);
        assert_eq!(header.sampling_frequency_index, 4);
        assert_eq!(header.channel_configuration, 2);
        assert_eq!(header.frame_length, 107);
        assert_eq!(header.header_len, 7);
    }

    #[test]
    fn test_parse_adts_rejects_garbage() {
        assert!(!AdtsHeader::is_adts(&[0x21, 0x00]));
        assert_err!(AdtsHeader::parse(&[0xFF, 0xF1, 0x50]));
        assert_err!(AdtsHeader::parse(&[0x00; 7]));
    }

    #[test]
    fn test_config_from_adts() {
        let header = AdtsHeader::parse(&make_adts(4, 2, 10)).unwrap();
        let config = AudioSpecificConfig::from_adts(&header);

        // AAC LC, 44100 Hz, stereo
        assert_eq!(&config.raw[..], &[0x12, 0x10]);
        assert_eq!(config.audio_object_type, 2);
        assert_eq!(config.sampling_frequency, 44100);
        assert_eq!(config.channels(), 2);
    }

    #[test]
    fn test_parse_config() {
        let config = AudioSpecificConfig::parse(Bytes::from_static(&[0x11, 0x90])).unwrap();
        assert_eq!(config.audio_object_type, 2);
        assert_eq!(config.sampling_frequency, 48000);
        assert_eq!(config.channels(), 2);

        assert_err!(AudioSpecificConfig::parse(Bytes::from_static(&[0x12])));
    }

    #[test]
    fn test_channels_7_1() {
        let config = AudioSpecificConfig::parse(Bytes::from_static(&[0x12, 0x38])).unwrap();
        assert_eq!(config.channel_configuration, 7);
        assert_eq!(config.channels(), 8);
    }
}
