//! # ppmx
//!
//! Adaptive PPM compression with arithmetic coding.
//!
//! Predict the next byte, pay only for surprises.
//!
//! ppmx combines a Prediction-by-Partial-Matching context model with a
//! binary arithmetic coder. The model predicts each byte from the
//! longest matching suffix of recent history, escaping to shorter
//! suffixes when a context has never seen the byte; the coder turns the
//! resulting probabilities into a raw bitstream. Encoder and decoder
//! adapt identical models from already-transmitted symbols, so the
//! stream carries no header, no probability tables, and no length
//! prefix — termination is an in-band EOF symbol.
//!
//! ## Principle
//!
//! ```text
//! Input Byte
//!     ↓
//! Context Model P(next | last k bytes), k = order .. 0, then order -1
//!     ↓
//! Predicted well → narrow interval → fraction of a bit
//! Never seen     → escape chain    → pay for the surprise
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ppmx::{PpmCodec, PpmConfig};
//!
//! let mut codec = PpmCodec::new(PpmConfig::default()).unwrap();
//!
//! let data = b"abracadabra, abracadabra!";
//! let compressed = codec.compress(data).unwrap();
//! let decompressed = codec.decompress(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```

// --- Global Allocator: mimalloc (Microsoft's high-performance allocator) ---
#[cfg(not(target_env = "msvc"))]
use mimalloc::MiMalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod arithmetic_coder;
pub mod bit_io;
pub mod codec;
pub mod entropy_estimator;
pub mod frequency_table;
pub mod ppm_model;

pub use arithmetic_coder::{ArithmeticDecoder, ArithmeticEncoder, CODE_BITS};
pub use bit_io::{BitReader, BitWriter};
pub use codec::{compress_stream, decompress_stream};
pub use entropy_estimator::{EntropyEstimate, EntropyEstimator};
pub use frequency_table::{
    AdaptiveFrequencyTable, Frequencies, UniformFrequencyTable, MAX_TOTAL,
};
pub use ppm_model::{Context, PpmModel, ALPHABET_SIZE, EOF_SYMBOL, ESCAPE_SYMBOL};

use std::io::{Read, Write};
use thiserror::Error;

/// Error types for ppmx operations
#[derive(Error, Debug)]
pub enum PpmxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PpmxError>;

/// Session configuration.
///
/// `model_order` is the maximum context length in bytes. Order -1
/// disables context modeling entirely (every byte is coded against the
/// uniform table); order 0 adapts a single global distribution; higher
/// orders condition on up to that many preceding bytes. Memory grows on
/// the order of `257^order` in the worst case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpmConfig {
    /// Maximum context order, `-1..=MAX_MODEL_ORDER`
    pub model_order: i32,
}

impl PpmConfig {
    /// Upper bound on the model order; beyond this the context tree's
    /// worst-case memory is no longer a sane trade-off
    pub const MAX_MODEL_ORDER: i32 = 16;

    /// Create a configuration with the given model order
    pub fn new(model_order: i32) -> Self {
        Self { model_order }
    }

    /// Reject configurations before any I/O happens
    pub fn validate(&self) -> Result<()> {
        if self.model_order < -1 {
            return Err(PpmxError::InvalidConfig(format!(
                "model order {} is below -1",
                self.model_order
            )));
        }
        if self.model_order > Self::MAX_MODEL_ORDER {
            return Err(PpmxError::InvalidConfig(format!(
                "model order {} exceeds the maximum of {}",
                self.model_order,
                Self::MAX_MODEL_ORDER
            )));
        }
        Ok(())
    }
}

impl Default for PpmConfig {
    fn default() -> Self {
        Self { model_order: 3 }
    }
}

/// Compression statistics
#[derive(Debug, Clone)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
}

impl CompressionStats {
    /// Compression ratio (lower is better)
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size as f64 / self.original_size as f64
    }

    /// Space savings percentage
    pub fn space_savings(&self) -> f64 {
        1.0 - self.compression_ratio()
    }
}

/// Main ppmx compressor/decompressor
#[derive(Debug)]
pub struct PpmCodec {
    config: PpmConfig,
    last_stats: Option<CompressionStats>,
}

impl PpmCodec {
    /// Create a codec, validating the configuration up front
    pub fn new(config: PpmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            last_stats: None,
        })
    }

    /// Create a codec with the given model order
    pub fn with_order(model_order: i32) -> Result<Self> {
        Self::new(PpmConfig::new(model_order))
    }

    /// Active configuration
    pub fn config(&self) -> &PpmConfig {
        &self.config
    }

    /// Compress bytes to a raw bitstream
    pub fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut compressed = Vec::new();
        let stats = codec::compress_stream(data, &mut compressed, &self.config)?;
        self.last_stats = Some(stats);
        Ok(compressed)
    }

    /// Decompress a bitstream produced with the same model order
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        codec::decompress_stream(data, &mut decompressed, &self.config)?;
        Ok(decompressed)
    }

    /// Compress from a reader into a writer
    pub fn compress_to<R: Read, W: Write>(
        &mut self,
        reader: R,
        writer: W,
    ) -> Result<CompressionStats> {
        let stats = codec::compress_stream(reader, writer, &self.config)?;
        self.last_stats = Some(stats.clone());
        Ok(stats)
    }

    /// Decompress from a reader into a writer, returning bytes written
    pub fn decompress_from<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<u64> {
        codec::decompress_stream(reader, writer, &self.config)
    }

    /// Get last compression statistics
    pub fn last_stats(&self) -> Option<&CompressionStats> {
        self.last_stats.as_ref()
    }

    /// Estimate compression for data without running the full model
    pub fn estimate_compression(&self, data: &[u8]) -> EntropyEstimate {
        EntropyEstimator::new().estimate(data)
    }
}

impl Default for PpmCodec {
    fn default() -> Self {
        Self {
            config: PpmConfig::default(),
            last_stats: None,
        }
    }
}

/// Convenience function to compress bytes
pub fn compress(data: &[u8], model_order: i32) -> Result<Vec<u8>> {
    PpmCodec::with_order(model_order)?.compress(data)
}

/// Convenience function to decompress bytes
pub fn decompress(data: &[u8], model_order: i32) -> Result<Vec<u8>> {
    PpmCodec::with_order(model_order)?.decompress(data)
}
