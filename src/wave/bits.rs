// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bit-level reading and writing of packed wave files.
//!
//! Bits are stored most significant bit first within each byte. Multi-bit
//! fields are written least significant bit first, so a field does not need
//! to be byte aligned:
//!
//! ```
//! use wave_merge::wave::bits::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bit(true).unwrap();
//! writer.write_uint(5, 3).unwrap();
//! let bytes = writer.finish().unwrap();
//! assert_eq!(bytes, vec![0b1101_0000]);
//!
//! let mut reader = BitReader::new(&bytes[..]);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_uint(3).unwrap(), 5);
//! ```

use crate::error::{MergeError, Result};
use crate::geometry::{Brick, Color};
use std::io::{ErrorKind, Read, Write};

/// Reads single bits and little-endian bit fields from a byte source.
#[derive(Debug)]
pub struct BitReader<R> {
    inner: R,
    bits: u8,
    /// Next bit of `bits` to hand out; 8 when a new byte is needed.
    bit_idx: u8,
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bits: 0,
            bit_idx: 8,
            bits_read: 0,
        }
    }

    /// Number of bits handed out so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_idx == 8 {
            let mut buf = [0u8; 1];
            match self.inner.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(MergeError::StreamExhausted {
                        bits_read: self.bits_read,
                    });
                }
                Err(e) => return Err(e.into()),
            }
            self.bits = buf[0];
            self.bit_idx = 0;
        }
        let bit = (self.bits >> (7 - self.bit_idx)) & 1 == 1;
        self.bit_idx += 1;
        self.bits_read += 1;
        Ok(bit)
    }

    /// Read a `width`-bit unsigned field, least significant bit first.
    ///
    /// # Panics
    ///
    /// Panics if `width > 64`.
    pub fn read_uint(&mut self, width: u32) -> Result<u64> {
        assert!(width <= 64, "Field too wide: {}", width);
        let mut value = 0u64;
        for i in 0..width {
            if self.read_bit()? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    pub fn read_color(&mut self) -> Result<Color> {
        Ok(Color::new(self.read_uint(3)? as u8))
    }

    /// Read a brick: orientation bit, then x and y as 16-bit two's complement.
    pub fn read_brick(&mut self) -> Result<Brick> {
        let is_vertical = self.read_bit()?;
        let x = self.read_uint(16)? as u16 as i16;
        let y = self.read_uint(16)? as u16 as i16;
        Brick::new(is_vertical, x, y)
    }
}

/// Writes bits in the layout read by [`BitReader`].
#[derive(Debug)]
pub struct BitWriter<W> {
    inner: W,
    bits: u8,
    count: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bits: 0,
            count: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.bits = (self.bits << 1) | bit as u8;
        self.count += 1;
        if self.count == 8 {
            self.inner.write_all(&[self.bits])?;
            self.bits = 0;
            self.count = 0;
        }
        Ok(())
    }

    /// Write the low `width` bits of `value`, least significant bit first.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in `width` bits.
    pub fn write_uint(&mut self, value: u64, width: u32) -> Result<()> {
        assert!(
            width == 64 || value >> width == 0,
            "Value {} does not fit in {} bits",
            value,
            width
        );
        for i in 0..width {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    pub fn write_color(&mut self, color: Color) -> Result<()> {
        self.write_uint(color.value() as u64, 3)
    }

    pub fn write_brick(&mut self, brick: &Brick) -> Result<()> {
        self.write_bit(brick.is_vertical)?;
        self.write_uint(brick.x as u16 as u64, 16)?;
        self.write_uint(brick.y as u16 as u64, 16)
    }

    /// Pad the last byte with zero bits, flush, and return the sink.
    pub fn finish(mut self) -> Result<W> {
        while self.count > 0 {
            self.write_bit(false)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}
