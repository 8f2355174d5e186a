//! AMF0 encoder
//!
//! Only the encoding direction is needed: the muxer serializes its combined
//! descriptor into an `onMetaData` script packet for players.
//!
//! Type Markers used:
//! ```text
//! 0x00 - Number (IEEE 754 double)
//! 0x01 - Boolean
//! 0x02 - String (UTF-8, 16-bit length prefix)
//! 0x05 - Null
//! 0x08 - ECMA Array (associative array)
//! 0x09 - Object End (0x000009 sequence, closes the ECMA array)
//! 0x0C - Long String (UTF-8, 32-bit length prefix)
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::value::AmfValue;

const MARKER_NUMBER: u8 = 0x00;
const MARKER_BOOLEAN: u8 = 0x01;
const MARKER_STRING: u8 = 0x02;
const MARKER_NULL: u8 = 0x05;
const MARKER_ECMA_ARRAY: u8 = 0x08;
const MARKER_OBJECT_END: u8 = 0x09;
const MARKER_LONG_STRING: u8 = 0x0C;

/// AMF0 encoder
pub struct Amf0Encoder {
    buf: BytesMut,
}

impl Amf0Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    /// Get the encoded bytes and reset encoder
    pub fn finish(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Encode a single AMF0 value
    pub fn encode(&mut self, value: &AmfValue) {
        match value {
            AmfValue::Null => self.buf.put_u8(MARKER_NULL),
            AmfValue::Boolean(b) => {
                self.buf.put_u8(MARKER_BOOLEAN);
                self.buf.put_u8(u8::from(*b));
            }
            AmfValue::Number(n) => {
                self.buf.put_u8(MARKER_NUMBER);
                self.buf.put_f64(*n);
            }
            AmfValue::String(s) => {
                if s.len() > 0xFFFF {
                    self.buf.put_u8(MARKER_LONG_STRING);
                    self.buf.put_u32(s.len() as u32);
                } else {
                    self.buf.put_u8(MARKER_STRING);
                    self.buf.put_u16(s.len() as u16);
                }
                self.buf.put_slice(s.as_bytes());
            }
            AmfValue::EcmaArray(props) => {
                self.buf.put_u8(MARKER_ECMA_ARRAY);
                self.buf.put_u32(props.len() as u32);
                // Sorted keys keep the encoded packet stable between runs
                let mut keys: Vec<&String> = props.keys().collect();
                keys.sort();
                for key in keys {
                    self.write_utf8(key);
                    self.encode(&props[key]);
                }
                self.write_object_end();
            }
        }
    }

    /// Encode multiple values
    pub fn encode_all(&mut self, values: &[AmfValue]) {
        for value in values {
            self.encode(value);
        }
    }

    /// Write UTF-8 string with 16-bit length prefix (no type marker)
    fn write_utf8(&mut self, s: &str) {
        let len = s.len().min(0xFFFF);
        self.buf.put_u16(len as u16);
        self.buf.put_slice(&s.as_bytes()[..len]);
    }

    fn write_object_end(&mut self) {
        self.buf.put_u16(0);
        self.buf.put_u8(MARKER_OBJECT_END);
    }
}

impl Default for Amf0Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode multiple values
pub fn encode_all(values: &[AmfValue]) -> Bytes {
    let mut encoder = Amf0Encoder::new();
    encoder.encode_all(values);
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_encode_number() {
        let bytes = encode_all(&[AmfValue::Number(1.5)]);
        assert_eq!(bytes[0], MARKER_NUMBER);
        assert_eq!(&bytes[1..], &1.5f64.to_be_bytes());
    }

    #[test]
    fn test_encode_string() {
        let bytes = encode_all(&[AmfValue::from("onMetaData")]);
        assert_eq!(&bytes[..3], &[MARKER_STRING, 0x00, 0x0A]);
        assert_eq!(&bytes[3..], b"onMetaData");
    }

    #[test]
    fn test_encode_boolean_and_null() {
        let bytes = encode_all(&[AmfValue::Boolean(true), AmfValue::Null]);
        assert_eq!(&bytes[..], &[MARKER_BOOLEAN, 0x01, MARKER_NULL]);
    }

    #[test]
    fn test_encode_ecma_array_sorted() {
        let mut props = HashMap::new();
        props.insert("b".to_string(), AmfValue::Boolean(false));
        props.insert("a".to_string(), AmfValue::Boolean(true));
        let bytes = encode_all(&[AmfValue::EcmaArray(props)]);

        let expected: &[u8] = &[
            MARKER_ECMA_ARRAY,
            0x00,
            0x00,
            0x00,
            0x02,
            0x00,
            0x01,
            b'a',
            MARKER_BOOLEAN,
            0x01,
            0x00,
            0x01,
            b'b',
            MARKER_BOOLEAN,
            0x00,
            0x00,
            0x00,
            MARKER_OBJECT_END,
        ];
        assert_eq!(&bytes[..], expected);
    }

    #[test]
    fn test_finish_resets_encoder() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&AmfValue::Null);
        assert_eq!(encoder.finish().len(), 1);
        assert!(encoder.finish().is_empty());
    }
}
