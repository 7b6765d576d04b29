//! Bit-level I/O for ppmx
//!
//! MSB-first bit streams over arbitrary byte sources and sinks.

use crate::Result;
use std::io::{ErrorKind, Read, Write};

/// Writes individual bits to an underlying byte sink, MSB first.
///
/// Bits are buffered into whole bytes; [`BitWriter::finish`] pads the
/// last partial byte with zero bits before flushing it.
pub struct BitWriter<W: Write> {
    inner: W,
    /// Bits accumulated toward the next output byte
    current_byte: u8,
    /// Number of bits in `current_byte` (0-7)
    bits_in_byte: u8,
    /// Total bits written so far (including the final padding)
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new bit writer over a byte sink
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            current_byte: 0,
            bits_in_byte: 0,
            bits_written: 0,
        }
    }

    /// Write a single bit (only the lowest bit of `bit` is used)
    #[inline(always)]
    pub fn write_bit(&mut self, bit: u32) -> Result<()> {
        self.current_byte = (self.current_byte << 1) | (bit & 1) as u8;
        self.bits_in_byte += 1;
        self.bits_written += 1;

        if self.bits_in_byte == 8 {
            self.inner.write_all(&[self.current_byte])?;
            self.current_byte = 0;
            self.bits_in_byte = 0;
        }
        Ok(())
    }

    /// Number of bits written so far
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pad the last partial byte with zeros, flush, and return the sink
    pub fn finish(mut self) -> Result<W> {
        if self.bits_in_byte > 0 {
            self.current_byte <<= 8 - self.bits_in_byte;
            self.inner.write_all(&[self.current_byte])?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads individual bits from an underlying byte source, MSB first.
///
/// Once the source is exhausted the reader returns zero bits forever
/// instead of failing. The decoder relies on this: the compressed stream
/// carries no length prefix, and the trailing bits of the final interval
/// are reconstructed from the implicit zero padding.
pub struct BitReader<R: Read> {
    inner: R,
    current_byte: u8,
    /// Unread bits remaining in `current_byte` (0-8)
    bits_left: u8,
    exhausted: bool,
}

impl<R: Read> BitReader<R> {
    /// Create a new bit reader over a byte source
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current_byte: 0,
            bits_left: 0,
            exhausted: false,
        }
    }

    /// Read the next bit; returns 0 indefinitely past end of input
    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u32> {
        if self.bits_left == 0 {
            if self.exhausted || !self.fill()? {
                return Ok(0);
            }
        }
        self.bits_left -= 1;
        Ok(((self.current_byte >> self.bits_left) & 1) as u32)
    }

    /// Pull the next byte from the source; false once the source is done
    fn fill(&mut self) -> Result<bool> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Ok(_) => {
                    self.current_byte = buf[0];
                    self.bits_left = 8;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
