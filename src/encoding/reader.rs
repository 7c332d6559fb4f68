//! Forward-only reader over an immutable byte slice
//!
//! The reader is just a slice plus a position. It is `Copy`, so a caller
//! can keep the starting reader around and later ask for the exact span
//! consumed since then.

use crate::error::{DecodeError, Result};

#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The bytes consumed between `start` and the current position
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.data[start.min(self.pos)..self.pos]
    }

    /// Read exactly `n` bytes
    pub fn read_fixed(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedInput {
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read exactly `N` bytes into an owned array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_fixed(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a compact-size integer
    ///
    /// `0x00..=0xFC` is the value itself, `0xFD`, `0xFE` and `0xFF` are
    /// followed by a 2, 4 and 8 byte little-endian value respectively.
    pub fn read_varint(&mut self) -> Result<usize> {
        let value = match self.read_u8()? {
            0xFD => self.read_u16()? as u64,
            0xFE => self.read_u32()? as u64,
            0xFF => self.read_u64()?,
            b => b as u64,
        };

        // every varint we read is a length or count, so it has to fit a
        // non-negative native size
        match usize::try_from(value) {
            Ok(n) if n <= isize::MAX as usize => Ok(n),
            _ => Err(DecodeError::VarintOverflow(value)),
        }
    }

    /// Read a varint length followed by that many bytes
    pub fn read_var_slice(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        self.read_fixed(len)
    }
}
