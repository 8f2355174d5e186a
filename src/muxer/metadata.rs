//! Stream metadata
//!
//! Each bound track contributes one [`TrackMetadata`] fragment; the muxer
//! folds the fragments into a single [`MetadataDescriptor`], which becomes
//! the stream's `onMetaData` object.

use std::collections::BTreeMap;

use crate::amf::{amf0, AmfValue};
use crate::media::codec::{CodecId, TrackType};
use crate::media::flv::RtmpPacket;
use crate::track::{AudioParams, Track, VideoParams};

use super::config::MuxerConfig;

/// Video description of one track
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub codec_id: CodecId,
    pub params: VideoParams,
    pub datarate_kbps: u32,
}

impl VideoMetadata {
    fn fields(&self) -> Vec<(&'static str, AmfValue)> {
        let mut fields: Vec<(&'static str, AmfValue)> = Vec::with_capacity(5);
        if self.params.width > 0 {
            fields.push(("width", self.params.width.into()));
        }
        if self.params.height > 0 {
            fields.push(("height", self.params.height.into()));
        }
        if self.params.fps > 0.0 {
            fields.push(("framerate", self.params.fps.into()));
        }
        fields.push(("videodatarate", self.datarate_kbps.into()));
        if let Some(id) = self.codec_id.flv_codec_id() {
            fields.push(("videocodecid", id.into()));
        }
        fields
    }
}

/// Audio description of one track
#[derive(Debug, Clone, PartialEq)]
pub struct AudioMetadata {
    pub codec_id: CodecId,
    pub params: AudioParams,
    pub datarate_kbps: u32,
}

impl AudioMetadata {
    fn fields(&self) -> Vec<(&'static str, AmfValue)> {
        let mut fields: Vec<(&'static str, AmfValue)> = Vec::with_capacity(5);
        fields.push(("audiodatarate", self.datarate_kbps.into()));
        if self.params.sample_rate > 0 {
            fields.push(("audiosamplerate", self.params.sample_rate.into()));
        }
        if self.params.sample_bits > 0 {
            fields.push(("audiosamplesize", self.params.sample_bits.into()));
        }
        if self.params.channels > 0 {
            fields.push(("stereo", (self.params.channels > 1).into()));
        }
        if let Some(id) = self.codec_id.flv_codec_id() {
            fields.push(("audiocodecid", id.into()));
        }
        fields
    }
}

/// Metadata fragment contributed by one track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackMetadata {
    Video(VideoMetadata),
    Audio(AudioMetadata),
    /// Track type with no metadata model; binding stops here
    Other,
}

impl TrackMetadata {
    /// Describe a track according to its type
    pub fn for_track(track: &dyn Track, config: &MuxerConfig) -> Self {
        match track.track_type() {
            TrackType::Video => TrackMetadata::Video(VideoMetadata {
                codec_id: track.codec_id(),
                params: track.video_params().unwrap_or_default(),
                datarate_kbps: config.video_datarate_kbps,
            }),
            TrackType::Audio => TrackMetadata::Audio(AudioMetadata {
                codec_id: track.codec_id(),
                params: track.audio_params().unwrap_or_default(),
                datarate_kbps: config.audio_datarate_kbps,
            }),
            TrackType::Other => TrackMetadata::Other,
        }
    }

    /// Key/value pairs of this fragment
    pub fn fields(&self) -> Vec<(&'static str, AmfValue)> {
        match self {
            TrackMetadata::Video(v) => v.fields(),
            TrackMetadata::Audio(a) => a.fields(),
            TrackMetadata::Other => Vec::new(),
        }
    }
}

/// Combined description of every bound track
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataDescriptor {
    fields: BTreeMap<String, AmfValue>,
}

impl MetadataDescriptor {
    /// The empty descriptor; also what readers see while bindings are pending
    pub const fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Merge a fragment; later values for a key replace earlier ones
    pub fn fold(&mut self, fragment: &TrackMetadata) {
        for (key, value) in fragment.fields() {
            self.fields.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&AmfValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AmfValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// As an AMF ECMA array
    pub fn to_amf(&self) -> AmfValue {
        AmfValue::EcmaArray(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Encode as an `onMetaData` script packet
    pub fn to_packet(&self) -> RtmpPacket {
        let body = amf0::encode_all(&[AmfValue::from("onMetaData"), self.to_amf()]);
        RtmpPacket::script(body)
    }
}
