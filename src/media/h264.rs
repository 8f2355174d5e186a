//! H.264/AVC bitstream helpers
//!
//! Input frames arrive as Annex-B NAL units (start code prefixed). RTMP wants
//! AVCC: a one-time AVCDecoderConfigurationRecord as the sequence header and
//! length-prefixed NAL units afterwards.
//!
//! AVCDecoderConfigurationRecord:
//! ```text
//! configurationVersion (1) | AVCProfileIndication (1) | profile_compatibility (1)
//! | AVCLevelIndication (1) | lengthSizeMinusOne (1, lower 2 bits)
//! | numOfSPS (1, lower 5 bits) | { spsLength (2) | spsNALUnit }*
//! | numOfPPS (1) | { ppsLength (2) | ppsNALUnit }*
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::bits::BitReader;
use crate::error::{MediaError, Result};

/// NAL unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaluType {
    /// Non-IDR slice
    Slice = 1,
    /// Slice data partition A
    SlicePartA = 2,
    /// Slice data partition B
    SlicePartB = 3,
    /// Slice data partition C
    SlicePartC = 4,
    /// IDR slice (keyframe)
    Idr = 5,
    /// Supplemental enhancement information
    Sei = 6,
    /// Sequence parameter set
    Sps = 7,
    /// Picture parameter set
    Pps = 8,
    /// Access unit delimiter
    Aud = 9,
    /// End of sequence
    EndSeq = 10,
    /// End of stream
    EndStream = 11,
    /// Filler data
    Filler = 12,
}

impl NaluType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b & 0x1F {
            1 => Some(NaluType::Slice),
            2 => Some(NaluType::SlicePartA),
            3 => Some(NaluType::SlicePartB),
            4 => Some(NaluType::SlicePartC),
            5 => Some(NaluType::Idr),
            6 => Some(NaluType::Sei),
            7 => Some(NaluType::Sps),
            8 => Some(NaluType::Pps),
            9 => Some(NaluType::Aud),
            10 => Some(NaluType::EndSeq),
            11 => Some(NaluType::EndStream),
            12 => Some(NaluType::Filler),
            _ => None,
        }
    }

    pub fn is_keyframe(&self) -> bool {
        matches!(self, NaluType::Idr)
    }

    pub fn is_parameter_set(&self) -> bool {
        matches!(self, NaluType::Sps | NaluType::Pps)
    }

    /// Whether the NAL unit carries picture data
    pub fn is_picture(&self) -> bool {
        matches!(
            self,
            NaluType::Slice
                | NaluType::SlicePartA
                | NaluType::SlicePartB
                | NaluType::SlicePartC
                | NaluType::Idr
        )
    }
}

/// Length of the Annex-B start code at the head of `data` (0, 3 or 4)
pub fn start_code_len(data: &[u8]) -> usize {
    if data.starts_with(&[0, 0, 0, 1]) {
        4
    } else if data.starts_with(&[0, 0, 1]) {
        3
    } else {
        0
    }
}

/// Whether a slice NAL unit (header byte included) opens its picture, i.e.
/// `first_mb_in_slice` is 0
///
/// `ue(v)` decodes to 0 exactly when its first bit is set, and that bit sits
/// right after the header byte.
pub fn is_first_slice(nalu: &[u8]) -> bool {
    nalu.get(1).is_some_and(|b| b & 0x80 != 0)
}

/// Convert a NAL unit payload to its raw byte sequence payload by dropping
/// emulation prevention bytes (`00 00 03` -> `00 00`)
pub fn to_rbsp(nalu: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(nalu.len());
    let mut zeros = 0;
    for &b in nalu {
        if zeros >= 2 && b == 0x03 {
            zeros = 0;
            continue;
        }
        zeros = if b == 0 { zeros + 1 } else { 0 };
        out.push(b);
    }
    out
}

/// Fields of a sequence parameter set needed to describe the stream
#[derive(Debug, Clone, PartialEq)]
pub struct SpsInfo {
    pub profile_idc: u8,
    pub constraint_flags: u8,
    pub level_idc: u8,
    pub width: u32,
    pub height: u32,
    /// Frame rate from VUI timing info, when present
    pub fps: Option<f64>,
}

impl SpsInfo {
    /// Parse a SPS NAL unit (header byte included, no start code)
    pub fn parse(nalu: &[u8]) -> Result<Self> {
        if nalu.len() < 4 || NaluType::from_byte(nalu[0]) != Some(NaluType::Sps) {
            return Err(MediaError::InvalidSps.into());
        }

        let rbsp = to_rbsp(&nalu[1..]);
        let mut r = BitReader::new(&rbsp);

        let profile_idc = r.read_bits(8)? as u8;
        let constraint_flags = r.read_bits(8)? as u8;
        let level_idc = r.read_bits(8)? as u8;
        let _sps_id = r.read_ue()?;

        let mut chroma_format_idc = 1;
        let mut separate_colour_plane = false;
        if matches!(
            profile_idc,
            100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128 | 138 | 139 | 134 | 135
        ) {
            chroma_format_idc = r.read_ue()?;
            if chroma_format_idc == 3 {
                separate_colour_plane = r.read_bit()?;
            }
            let _bit_depth_luma = r.read_ue()?;
            let _bit_depth_chroma = r.read_ue()?;
            let _qpprime_y_zero_transform_bypass = r.read_bit()?;
            if r.read_bit()? {
                let lists = if chroma_format_idc == 3 { 12 } else { 8 };
                for i in 0..lists {
                    if r.read_bit()? {
                        skip_scaling_list(&mut r, if i < 6 { 16 } else { 64 })?;
                    }
                }
            }
        }

        let _log2_max_frame_num = r.read_ue()?;
        match r.read_ue()? {
            0 => {
                let _log2_max_poc_lsb = r.read_ue()?;
            }
            1 => {
                let _delta_pic_order_always_zero = r.read_bit()?;
                let _offset_for_non_ref_pic = r.read_se()?;
                let _offset_for_top_to_bottom_field = r.read_se()?;
                let cycle = r.read_ue()?;
                for _ in 0..cycle {
                    r.read_se()?;
                }
            }
            _ => {}
        }

        let _max_num_ref_frames = r.read_ue()?;
        let _gaps_in_frame_num_allowed = r.read_bit()?;
        let width_in_mbs = r.read_ue()?.checked_add(1).ok_or(MediaError::InvalidSps)?;
        let height_in_map_units = r.read_ue()?.checked_add(1).ok_or(MediaError::InvalidSps)?;
        let frame_mbs_only = r.read_bit()?;
        if !frame_mbs_only {
            let _mb_adaptive_frame_field = r.read_bit()?;
        }
        let _direct_8x8_inference = r.read_bit()?;

        let (mut crop_left, mut crop_right, mut crop_top, mut crop_bottom) = (0, 0, 0, 0);
        if r.read_bit()? {
            crop_left = r.read_ue()?;
            crop_right = r.read_ue()?;
            crop_top = r.read_ue()?;
            crop_bottom = r.read_ue()?;
        }

        let field_factor = if frame_mbs_only { 1 } else { 2 };
        let (crop_unit_x, crop_unit_y) = if chroma_format_idc == 0 || separate_colour_plane {
            (1, field_factor)
        } else {
            let sub_width = if chroma_format_idc == 3 { 1 } else { 2 };
            let sub_height = if chroma_format_idc == 1 { 2 } else { 1 };
            (sub_width, sub_height * field_factor)
        };

        let width = cropped_size(width_in_mbs, 16, crop_left, crop_right, crop_unit_x)?;
        let height = cropped_size(
            height_in_map_units,
            16 * field_factor,
            crop_top,
            crop_bottom,
            crop_unit_y,
        )?;

        // A truncated VUI still leaves us with usable dimensions
        let fps = if r.read_bit().unwrap_or(false) {
            read_vui_fps(&mut r).ok().flatten()
        } else {
            None
        };

        Ok(SpsInfo {
            profile_idc,
            constraint_flags,
            level_idc,
            width,
            height,
            fps,
        })
    }
}

/// `units * unit_size - (crop_a + crop_b) * crop_unit`, rejecting overflow
fn cropped_size(units: u32, unit_size: u32, crop_a: u32, crop_b: u32, crop_unit: u32) -> Result<u32> {
    let full = units.checked_mul(unit_size);
    let crop = crop_a
        .checked_add(crop_b)
        .and_then(|c| c.checked_mul(crop_unit));
    full.zip(crop)
        .and_then(|(full, crop)| full.checked_sub(crop))
        .ok_or_else(|| MediaError::InvalidSps.into())
}

fn skip_scaling_list(r: &mut BitReader<'_>, size: usize) -> Result<()> {
    let mut last_scale: i32 = 8;
    let mut next_scale: i32 = 8;
    for _ in 0..size {
        if next_scale != 0 {
            let delta = r.read_se()?;
            next_scale = (last_scale + delta + 256) % 256;
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }
    Ok(())
}

fn read_vui_fps(r: &mut BitReader<'_>) -> Result<Option<f64>> {
    if r.read_bit()? {
        let aspect_ratio_idc = r.read_bits(8)?;
        if aspect_ratio_idc == 255 {
            r.skip_bits(32)?;
        }
    }
    if r.read_bit()? {
        let _overscan_appropriate = r.read_bit()?;
    }
    if r.read_bit()? {
        r.skip_bits(4)?;
        if r.read_bit()? {
            r.skip_bits(24)?;
        }
    }
    if r.read_bit()? {
        r.read_ue()?;
        r.read_ue()?;
    }
    if !r.read_bit()? {
        return Ok(None);
    }
    let num_units_in_tick = r.read_bits(32)?;
    let time_scale = r.read_bits(32)?;
    if num_units_in_tick == 0 || time_scale == 0 {
        return Ok(None);
    }
    Ok(Some(time_scale as f64 / (2.0 * num_units_in_tick as f64)))
}

/// AVC decoder configuration built from one SPS and one PPS
#[derive(Debug, Clone, PartialEq)]
pub struct AvcConfig {
    pub sps: Bytes,
    pub pps: Bytes,
}

impl AvcConfig {
    pub fn new(sps: Bytes, pps: Bytes) -> Self {
        Self { sps, pps }
    }

    /// Serialize as AVCDecoderConfigurationRecord with 4-byte NALU lengths
    pub fn to_record(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(11 + self.sps.len() + self.pps.len());
        let (profile, compatibility, level) = if self.sps.len() >= 4 {
            (self.sps[1], self.sps[2], self.sps[3])
        } else {
            (0, 0, 0)
        };

        buf.put_u8(1);
        buf.put_u8(profile);
        buf.put_u8(compatibility);
        buf.put_u8(level);
        buf.put_u8(0xFC | 0x03);
        buf.put_u8(0xE0 | 0x01);
        buf.put_u16(self.sps.len() as u16);
        buf.put_slice(&self.sps);
        buf.put_u8(1);
        buf.put_u16(self.pps.len() as u16);
        buf.put_slice(&self.pps);
        buf.freeze()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio_test::assert_err;

    use super::*;
    use crate::error::Error;

    /// MSB-first bit writer for building parameter sets in tests
    pub(crate) struct BitWriter {
        bytes: Vec<u8>,
        bit: usize,
    }

    impl BitWriter {
        pub(crate) fn new() -> Self {
            Self {
                bytes: Vec::new(),
                bit: 0,
            }
        }

        pub(crate) fn bit(&mut self, v: bool) {
            if self.bit % 8 == 0 {
                self.bytes.push(0);
            }
            if v {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 0x80 >> (self.bit % 8);
            }
            self.bit += 1;
        }

        pub(crate) fn bits(&mut self, v: u32, n: u32) {
            for i in (0..n).rev() {
                self.bit((v >> i) & 1 == 1);
            }
        }

        pub(crate) fn ue(&mut self, v: u32) {
            let code = v + 1;
            let len = 32 - code.leading_zeros();
            self.bits(0, len - 1);
            self.bits(code, len);
        }

        pub(crate) fn finish(mut self) -> Vec<u8> {
            // rbsp_stop_one_bit
            self.bit(true);
            self.bytes
        }
    }

    /// Baseline-profile SPS with the given geometry and optional VUI timing
    pub(crate) fn make_sps(width: u32, height: u32, timing: Option<(u32, u32)>) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.bits(66, 8); // profile_idc
        w.bits(0xC0, 8); // constraint flags
        w.bits(31, 8); // level_idc
        w.ue(0); // sps id
        w.ue(0); // log2_max_frame_num_minus4
        w.ue(2); // pic_order_cnt_type
        w.ue(1); // max_num_ref_frames
        w.bit(false); // gaps
        let mbs_w = width.div_ceil(16);
        let mbs_h = height.div_ceil(16);
        w.ue(mbs_w - 1);
        w.ue(mbs_h - 1);
        w.bit(true); // frame_mbs_only
        w.bit(true); // direct_8x8
        let crop_bottom = (mbs_h * 16 - height) / 2;
        let crop_right = (mbs_w * 16 - width) / 2;
        if crop_bottom > 0 || crop_right > 0 {
            w.bit(true);
            w.ue(0);
            w.ue(crop_right);
            w.ue(0);
            w.ue(crop_bottom);
        } else {
            w.bit(false);
        }
        match timing {
            Some((units, scale)) => {
                w.bit(true); // vui present
                w.bit(false); // aspect ratio
                w.bit(false); // overscan
                w.bit(false); // video signal
                w.bit(false); // chroma loc
                w.bit(true); // timing info
                w.bits(units, 32);
                w.bits(scale, 32);
                w.bit(true); // fixed frame rate
                w.bits(0, 5); // remaining VUI flags unset
            }
            None => w.bit(false),
        }
        let mut nalu = vec![0x67];
        nalu.extend(w.finish());
        nalu
    }

    #[test]
    fn test_nalu_type() {
        assert_eq!(NaluType::from_byte(0x65), Some(NaluType::Idr));
        assert_eq!(NaluType::from_byte(0x67), Some(NaluType::Sps));
        assert_eq!(NaluType::from_byte(0x68), Some(NaluType::Pps));
        assert_eq!(NaluType::from_byte(0x41), Some(NaluType::Slice));
        assert!(NaluType::Idr.is_keyframe());
        assert!(NaluType::Sps.is_parameter_set());
        assert!(NaluType::Slice.is_picture());
        assert!(!NaluType::Sei.is_picture());
        assert_eq!(NaluType::from_byte(0x00), None);
    }

    #[test]
    fn test_start_code_len() {
        assert_eq!(start_code_len(&[0, 0, 0, 1, 0x65]), 4);
        assert_eq!(start_code_len(&[0, 0, 1, 0x65]), 3);
        assert_eq!(start_code_len(&[0x65, 0x00]), 0);
    }

    #[test]
    fn test_to_rbsp() {
        assert_eq!(to_rbsp(&[0x00, 0x00, 0x03, 0x01]), vec![0x00, 0x00, 0x01]);
        assert_eq!(to_rbsp(&[0x00, 0x03, 0x01]), vec![0x00, 0x03, 0x01]);
        assert_eq!(
            to_rbsp(&[0x00, 0x00, 0x03, 0x00, 0x00, 0x03]),
            vec![0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_sps_dimensions() {
        let sps = make_sps(1280, 720, None);
        let info = SpsInfo::parse(&sps).unwrap();
        assert_eq!(info.profile_idc, 66);
        assert_eq!(info.level_idc, 31);
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert_eq!(info.fps, None);
    }

    #[test]
    fn test_sps_cropping() {
        let sps = make_sps(1920, 1080, None);
        let info = SpsInfo::parse(&sps).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
    }

    #[test]
    fn test_sps_vui_frame_rate() {
        let sps = make_sps(640, 480, Some((1, 50)));
        let info = SpsInfo::parse(&sps).unwrap();
        assert_eq!(info.fps, Some(25.0));
    }

    #[test]
    fn test_sps_rejects_other_nalu() {
        assert_err!(SpsInfo::parse(&[0x68, 0xCE, 0x3C, 0x80]));
        assert_err!(SpsInfo::parse(&[0x67]));
    }

    #[test]
    fn test_sps_oversized_width_rejected() {
        // pic_width_in_mbs_minus1 = 2^32 - 2, with an emulation prevention byte
        let sps = [
            0x67, 0x42, 0xC0, 0x1F, 0xDC, 0x00, 0x00, 0x03, 0x00, 0x03, 0xFF, 0xFF, 0xFF, 0xFF,
            0x90,
        ];
        assert_eq!(
            SpsInfo::parse(&sps),
            Err(Error::Media(MediaError::InvalidSps))
        );
    }

    #[test]
    fn test_sps_oversized_crop_rejected() {
        let mut w = BitWriter::new();
        w.bits(66, 8);
        w.bits(0xC0, 8);
        w.bits(31, 8);
        w.ue(0);
        w.ue(0);
        w.ue(2);
        w.ue(1);
        w.bit(false);
        w.ue(79); // 1280 wide
        w.ue(44); // 720 high
        w.bit(true);
        w.bit(true);
        w.bit(true); // cropping
        w.ue(0xFFFF_FFFE);
        w.ue(0xFFFF_FFFE);
        w.ue(0);
        w.ue(0);
        w.bit(false);
        let mut sps = vec![0x67];
        sps.extend(w.finish());

        assert_err!(SpsInfo::parse(&sps));
    }

    #[test]
    fn test_is_first_slice() {
        assert!(is_first_slice(&[0x65, 0x88, 0x84]));
        assert!(!is_first_slice(&[0x65, 0x40, 0x84]));
        assert!(!is_first_slice(&[0x65]));
    }

    #[test]
    fn test_avc_config_record() {
        let sps = Bytes::from_static(&[0x67, 0x42, 0xC0, 0x1F, 0xAA]);
        let pps = Bytes::from_static(&[0x68, 0xCE, 0x3C, 0x80]);
        let record = AvcConfig::new(sps.clone(), pps.clone()).to_record();

        assert_eq!(&record[..6], &[0x01, 0x42, 0xC0, 0x1F, 0xFF, 0xE1]);
        assert_eq!(&record[6..8], &[0x00, 0x05]);
        assert_eq!(&record[8..13], &sps[..]);
        assert_eq!(record[13], 0x01);
        assert_eq!(&record[14..16], &[0x00, 0x04]);
        assert_eq!(&record[16..], &pps[..]);
    }
}
