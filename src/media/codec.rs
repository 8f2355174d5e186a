//! Codec identity and track type

/// Kind of elementary stream a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    Video,
    Audio,
    /// Anything the muxer has no metadata model for (data, subtitles, ...)
    Other,
}

/// Codec of an elementary stream
///
/// This is the key tracks are registered under: one track per codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecId {
    /// H.264/AVC
    H264,
    /// H.265/HEVC
    H265,
    /// AAC (raw frames with ADTS headers on input)
    Aac,
    /// G.711 A-law
    G711A,
    /// G.711 mu-law
    G711U,
    /// Opus
    Opus,
}

impl CodecId {
    /// Track type implied by the codec
    pub fn track_type(&self) -> TrackType {
        match self {
            CodecId::H264 | CodecId::H265 => TrackType::Video,
            CodecId::Aac | CodecId::G711A | CodecId::G711U | CodecId::Opus => TrackType::Audio,
        }
    }

    /// Codec number written into `videocodecid` / `audiocodecid`
    ///
    /// Returns `None` for codecs FLV has no identifier for.
    pub fn flv_codec_id(&self) -> Option<u8> {
        match self {
            CodecId::H264 => Some(7),
            CodecId::H265 => Some(12),
            CodecId::Aac => Some(10),
            CodecId::G711A => Some(7),
            CodecId::G711U => Some(8),
            CodecId::Opus => None,
        }
    }

    /// Short codec name
    pub fn name(&self) -> &'static str {
        match self {
            CodecId::H264 => "H264",
            CodecId::H265 => "H265",
            CodecId::Aac => "AAC",
            CodecId::G711A => "G711A",
            CodecId::G711U => "G711U",
            CodecId::Opus => "Opus",
        }
    }
}

impl std::fmt::Display for CodecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
