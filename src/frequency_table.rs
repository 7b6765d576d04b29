//! Frequency tables for ppmx
//!
//! Symbol frequencies drive the arithmetic coder: each symbol owns the
//! half-open interval `[low, high)` within `[0, total)`, cumulative in
//! symbol order so interval assignment is deterministic on both sides.

use crate::Result;
use std::cell::RefCell;

/// Rescale threshold: once a table's total would exceed this, every
/// count is halved. Keeps totals well inside the arithmetic coder's
/// 32-bit precision bound.
pub const MAX_TOTAL: u32 = 1 << 16;

/// Cumulative frequency view consumed by the arithmetic coder
pub trait Frequencies {
    /// Number of symbols in the alphabet
    fn symbol_count(&self) -> usize;

    /// Sum of all counts
    fn total(&self) -> u32;

    /// Cumulative count of all symbols strictly below `symbol`
    fn low(&self, symbol: u32) -> u32;

    /// Cumulative count of all symbols strictly below `symbol + 1`
    fn high(&self, symbol: u32) -> u32;
}

/// Mutable frequency table that adapts as symbols are observed.
///
/// Counts start at zero; `increment` bumps a symbol by one and rescales
/// when the total crosses [`MAX_TOTAL`]. The cumulative array is rebuilt
/// lazily on the first interval query after a mutation, so queries stay
/// O(1) between mutations. The cache lives in a `RefCell`: the engine is
/// strictly single-threaded, and the coder only sees `&self`.
#[derive(Debug, Clone)]
pub struct AdaptiveFrequencyTable {
    counts: Vec<u32>,
    total: u32,
    cumulative: RefCell<Option<Vec<u32>>>,
}

impl AdaptiveFrequencyTable {
    /// Create a table of `symbol_count` symbols, all counts zero
    pub fn new(symbol_count: usize) -> Self {
        Self {
            counts: vec![0; symbol_count],
            total: 0,
            cumulative: RefCell::new(None),
        }
    }

    /// Current count of a symbol
    pub fn get(&self, symbol: u32) -> u32 {
        self.counts[symbol as usize]
    }

    /// Add one observation of `symbol`, rescaling if the total would
    /// exceed [`MAX_TOTAL`]. The rescale halves every count with integer
    /// division, flooring at 1 for counts that were nonzero, so every
    /// previously seen symbol stays representable. Encoder and decoder
    /// cross this boundary at the identical symbol index.
    pub fn increment(&mut self, symbol: u32) {
        self.counts[symbol as usize] += 1;
        self.total += 1;
        *self.cumulative.get_mut() = None;

        if self.total > MAX_TOTAL {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        let mut total = 0u32;
        for count in &mut self.counts {
            if *count > 0 {
                *count = (*count / 2).max(1);
            }
            total += *count;
        }
        self.total = total;
    }

    /// Cumulative sum at `index`, rebuilding the cache if stale
    fn cumulative_at(&self, index: usize) -> u32 {
        let mut cache = self.cumulative.borrow_mut();
        let cumulative = cache.get_or_insert_with(|| {
            let mut sums = Vec::with_capacity(self.counts.len() + 1);
            let mut sum = 0u32;
            sums.push(0);
            for &count in &self.counts {
                sum += count;
                sums.push(sum);
            }
            sums
        });
        cumulative[index]
    }
}

impl Frequencies for AdaptiveFrequencyTable {
    fn symbol_count(&self) -> usize {
        self.counts.len()
    }

    fn total(&self) -> u32 {
        self.total
    }

    fn low(&self, symbol: u32) -> u32 {
        self.cumulative_at(symbol as usize)
    }

    fn high(&self, symbol: u32) -> u32 {
        self.cumulative_at(symbol as usize + 1)
    }
}

/// Static table giving every symbol count 1.
///
/// This is the order -1 context: it can represent every literal byte and
/// the EOF symbol, never adapts, and never escapes.
#[derive(Debug, Clone)]
pub struct UniformFrequencyTable {
    symbol_count: usize,
}

impl UniformFrequencyTable {
    /// Create a uniform table over `symbol_count` symbols
    pub fn new(symbol_count: usize) -> Self {
        Self { symbol_count }
    }
}

impl Frequencies for UniformFrequencyTable {
    fn symbol_count(&self) -> usize {
        self.symbol_count
    }

    fn total(&self) -> u32 {
        self.symbol_count as u32
    }

    fn low(&self, symbol: u32) -> u32 {
        symbol
    }

    fn high(&self, symbol: u32) -> u32 {
        symbol + 1
    }
}

/// Validate that a table partitions `[0, total)` with no gaps or
/// overlaps. Test helper, but exported so integration tests can use it.
#[doc(hidden)]
pub fn check_partition(freqs: &impl Frequencies) -> Result<()> {
    use crate::PpmxError;

    let mut expected_low = 0u32;
    for symbol in 0..freqs.symbol_count() as u32 {
        let low = freqs.low(symbol);
        let high = freqs.high(symbol);
        if low != expected_low || high < low {
            return Err(PpmxError::CorruptStream(format!(
                "interval for symbol {} is [{}, {}), expected low {}",
                symbol, low, high, expected_low
            )));
        }
        expected_low = high;
    }
    if expected_low != freqs.total() {
        return Err(PpmxError::CorruptStream(format!(
            "cumulative sum {} does not match total {}",
            expected_low,
            freqs.total()
        )));
    }
    Ok(())
}
