//! AMF (Action Message Format) support
//!
//! The muxer only produces AMF0: the `onMetaData` script packet that
//! describes the combined stream.

pub mod amf0;
pub mod value;

pub use amf0::Amf0Encoder;
pub use value::AmfValue;
