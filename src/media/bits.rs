//! MSB-first bit reader for codec headers (SPS, ADTS)

use crate::error::{MediaError, Result};

/// Reads bits most-significant first from a byte slice
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Position in bits
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bits left to read
    pub fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.pos)
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.remaining() == 0 {
            return Err(MediaError::Truncated.into());
        }
        let byte = self.data[self.pos / 8];
        let bit = (byte >> (7 - (self.pos % 8))) & 0x01;
        self.pos += 1;
        Ok(bit == 1)
    }

    /// Read up to 32 bits as an unsigned value
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);
        if self.remaining() < count as usize {
            return Err(MediaError::Truncated.into());
        }
        let mut value: u32 = 0;
        for _ in 0..count {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    pub fn skip_bits(&mut self, count: usize) -> Result<()> {
        if self.remaining() < count {
            return Err(MediaError::Truncated.into());
        }
        self.pos += count;
        Ok(())
    }

    /// Unsigned exp-Golomb code, ue(v)
    pub fn read_ue(&mut self) -> Result<u32> {
        let mut leading_zeros = 0u32;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(MediaError::InvalidSps.into());
            }
        }
        if leading_zeros == 0 {
            return Ok(0);
        }
        let suffix = self.read_bits(leading_zeros)?;
        Ok(((1u64 << leading_zeros) - 1 + suffix as u64) as u32)
    }

    /// Signed exp-Golomb code, se(v)
    pub fn read_se(&mut self) -> Result<i32> {
        let code = self.read_ue()? as i64;
        let value = if code % 2 == 1 {
            (code + 1) / 2
        } else {
            -(code / 2)
        };
        Ok(value as i32)
    }
}
