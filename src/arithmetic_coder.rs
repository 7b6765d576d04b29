//! Arithmetic coding module for ppmx
//!
//! Binary arithmetic coder over MSB-first bit streams. Encoder and
//! decoder keep a fixed-precision `[low, high]` range and narrow it
//! proportionally to each symbol's cumulative-frequency interval; the
//! two sides must perform bit-for-bit identical arithmetic or the
//! decoder's model diverges.

use crate::bit_io::{BitReader, BitWriter};
use crate::frequency_table::Frequencies;
use crate::{PpmxError, Result};
use std::io::{Read, Write};

/// Precision of the range registers, in bits
pub const CODE_BITS: u32 = 32;

const FULL_RANGE: u64 = 1 << CODE_BITS;
const STATE_MASK: u64 = FULL_RANGE - 1;
const HALF_RANGE: u64 = FULL_RANGE >> 1;
const QUARTER_RANGE: u64 = HALF_RANGE >> 1;
/// Smallest range that can still resolve every interval of a table at
/// the maximum permitted total; narrower means the coder state is broken
const MIN_RANGE: u64 = QUARTER_RANGE + 2;
/// Largest frequency total a table may present to the coder
const MAX_CODER_TOTAL: u64 = MIN_RANGE;

/// Arithmetic encoder writing to a bit sink
pub struct ArithmeticEncoder<W: Write> {
    output: BitWriter<W>,
    low: u64,
    high: u64,
    /// Pending opposite bits from the E3/underflow condition
    num_underflow: u64,
}

impl<W: Write> ArithmeticEncoder<W> {
    /// Create an encoder over a bit writer
    pub fn new(output: BitWriter<W>) -> Self {
        Self {
            output,
            low: 0,
            high: STATE_MASK,
            num_underflow: 0,
        }
    }

    /// Encode one symbol against a frequency table.
    ///
    /// The symbol must have a nonzero count; a zero-width interval can
    /// never be recovered by the decoder and is reported as corruption.
    pub fn write(&mut self, freqs: &impl Frequencies, symbol: u32) -> Result<()> {
        let total = freqs.total() as u64;
        if total == 0 || total > MAX_CODER_TOTAL {
            return Err(PpmxError::CorruptStream(format!(
                "frequency total {} outside coder bounds",
                total
            )));
        }
        let sym_low = freqs.low(symbol) as u64;
        let sym_high = freqs.high(symbol) as u64;
        if sym_low == sym_high {
            return Err(PpmxError::CorruptStream(format!(
                "symbol {} has zero frequency",
                symbol
            )));
        }

        let range = self.high - self.low + 1;
        if range < MIN_RANGE {
            return Err(PpmxError::CorruptStream(
                "coder range degenerated".to_string(),
            ));
        }

        // Narrow to the symbol's sub-interval
        let new_low = self.low + sym_low * range / total;
        let new_high = self.low + sym_high * range / total - 1;
        self.low = new_low;
        self.high = new_high;

        // Emit bits while the top bit of low and high agree
        while (self.low ^ self.high) & HALF_RANGE == 0 {
            let bit = (self.low >> (CODE_BITS - 1)) as u32;
            self.output.write_bit(bit)?;
            while self.num_underflow > 0 {
                self.output.write_bit(bit ^ 1)?;
                self.num_underflow -= 1;
            }
            self.low = (self.low << 1) & STATE_MASK;
            self.high = ((self.high << 1) & STATE_MASK) | 1;
        }

        // E3: range straddles the midpoint within the middle half
        while self.low & !self.high & QUARTER_RANGE != 0 {
            self.num_underflow += 1;
            self.low = (self.low << 1) ^ HALF_RANGE;
            self.high = ((self.high ^ HALF_RANGE) << 1) | HALF_RANGE | 1;
        }
        Ok(())
    }

    /// Terminate the stream and return the byte sink.
    ///
    /// A single 1 bit pins the final value inside `[low, high]`; the
    /// decoder reconstructs the rest from the bit reader's zero padding.
    pub fn finish(mut self) -> Result<W> {
        self.output.write_bit(1)?;
        self.output.finish()
    }
}

/// Arithmetic decoder reading from a bit source
pub struct ArithmeticDecoder<R: Read> {
    input: BitReader<R>,
    low: u64,
    high: u64,
    /// The next CODE_BITS of the stream, tracked against `[low, high]`
    code: u64,
}

impl<R: Read> ArithmeticDecoder<R> {
    /// Create a decoder, priming the code window from the bit source
    pub fn new(input: BitReader<R>) -> Result<Self> {
        let mut decoder = Self {
            input,
            low: 0,
            high: STATE_MASK,
            code: 0,
        };
        for _ in 0..CODE_BITS {
            decoder.code = (decoder.code << 1) | decoder.input.read_bit()? as u64;
        }
        Ok(decoder)
    }

    /// Decode one symbol against a frequency table, mirroring the
    /// encoder's narrowing exactly
    pub fn read(&mut self, freqs: &impl Frequencies) -> Result<u32> {
        let total = freqs.total() as u64;
        if total == 0 || total > MAX_CODER_TOTAL {
            return Err(PpmxError::CorruptStream(format!(
                "frequency total {} outside coder bounds",
                total
            )));
        }

        let range = self.high - self.low + 1;
        if range < MIN_RANGE {
            return Err(PpmxError::CorruptStream(
                "coder range degenerated".to_string(),
            ));
        }
        let offset = self.code - self.low;
        let value = ((offset + 1) * total - 1) / range;
        if value * range / total > offset || value >= total {
            return Err(PpmxError::CorruptStream(
                "code value outside the current range".to_string(),
            ));
        }

        // Binary search for the symbol whose scaled interval holds offset
        let mut start = 0usize;
        let mut end = freqs.symbol_count();
        while end - start > 1 {
            let middle = (start + end) >> 1;
            if freqs.low(middle as u32) as u64 * range / total > offset {
                end = middle;
            } else {
                start = middle;
            }
        }
        let symbol = start as u32;

        let sym_low = freqs.low(symbol) as u64;
        let sym_high = freqs.high(symbol) as u64;
        if !(sym_low * range / total <= offset && offset < sym_high * range / total) {
            return Err(PpmxError::CorruptStream(format!(
                "decoded value {} matches no symbol interval",
                value
            )));
        }

        // Identical narrowing to the encoder
        let new_low = self.low + sym_low * range / total;
        let new_high = self.low + sym_high * range / total - 1;
        self.low = new_low;
        self.high = new_high;

        while (self.low ^ self.high) & HALF_RANGE == 0 {
            self.code = ((self.code << 1) & STATE_MASK) | self.input.read_bit()? as u64;
            self.low = (self.low << 1) & STATE_MASK;
            self.high = ((self.high << 1) & STATE_MASK) | 1;
        }
        while self.low & !self.high & QUARTER_RANGE != 0 {
            self.code = (self.code & HALF_RANGE)
                | ((self.code << 1) & (STATE_MASK >> 1))
                | self.input.read_bit()? as u64;
            self.low = (self.low << 1) ^ HALF_RANGE;
            self.high = ((self.high ^ HALF_RANGE) << 1) | HALF_RANGE | 1;
        }

        if !(self.low <= self.code && self.code <= self.high) {
            return Err(PpmxError::CorruptStream(
                "code value left the coder range".to_string(),
            ));
        }
        Ok(symbol)
    }
}
