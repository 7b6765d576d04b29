//! Symmetric compression and decompression drivers for ppmx
//!
//! Feeds bytes through the PPM model and arithmetic coder one symbol at
//! a time. Both directions execute the identical order-descent, model
//! update, and history maintenance sequence per symbol; all adaptation
//! is derived from already-transmitted data, so any divergence between
//! the two sides shows up as a corrupt-stream error.

use crate::arithmetic_coder::{ArithmeticDecoder, ArithmeticEncoder};
use crate::bit_io::{BitReader, BitWriter};
use crate::ppm_model::{PpmModel, EOF_SYMBOL, ESCAPE_SYMBOL};
use crate::{CompressionStats, PpmConfig, Result};
use log::debug;
use smallvec::SmallVec;
use std::io::{ErrorKind, Read, Write};

/// Recent symbols, most recent first, bounded at the model order
type History = SmallVec<[u32; 8]>;

/// Counts bytes passing through to the underlying sink
struct CountingWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Compress `input` into `output`, returning size statistics.
///
/// The output is a raw bitstream with no header; the decoder must be
/// configured with the same model order.
pub fn compress_stream<R: Read, W: Write>(
    input: R,
    output: W,
    config: &PpmConfig,
) -> Result<CompressionStats> {
    config.validate()?;
    debug!("compress session: model order {}", config.model_order);

    let mut model = PpmModel::new(config.model_order);
    let mut history = History::new();
    let mut encoder = ArithmeticEncoder::new(BitWriter::new(CountingWriter::new(output)));

    let mut input = input;
    let mut original_size = 0u64;
    let mut buf = [0u8; 8192];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        original_size += n as u64;
        for &byte in &buf[..n] {
            let symbol = byte as u32;
            encode_symbol(&mut encoder, &model, &history, symbol)?;
            model.increment_contexts(&history, symbol);
            push_history(&mut history, config.model_order, symbol);
        }
    }

    encode_symbol(&mut encoder, &model, &history, EOF_SYMBOL)?;
    let counting = encoder.finish()?;

    let stats = CompressionStats {
        original_size,
        compressed_size: counting.bytes_written,
    };
    debug!(
        "compress session done: {} bytes in, {} bytes out",
        stats.original_size, stats.compressed_size
    );
    Ok(stats)
}

/// Decompress `input` into `output`, returning the number of bytes
/// written. Stops at the EOF symbol resolved at order -1.
pub fn decompress_stream<R: Read, W: Write>(
    input: R,
    mut output: W,
    config: &PpmConfig,
) -> Result<u64> {
    config.validate()?;
    debug!("decompress session: model order {}", config.model_order);

    let mut model = PpmModel::new(config.model_order);
    let mut history = History::new();
    let mut decoder = ArithmeticDecoder::new(BitReader::new(input))?;

    let mut bytes_written = 0u64;
    loop {
        let symbol = decode_symbol(&mut decoder, &model, &history)?;
        if symbol == EOF_SYMBOL {
            break;
        }
        output.write_all(&[symbol as u8])?;
        bytes_written += 1;
        model.increment_contexts(&history, symbol);
        push_history(&mut history, config.model_order, symbol);
    }
    output.flush()?;

    debug!("decompress session done: {} bytes out", bytes_written);
    Ok(bytes_written)
}

/// Encode one symbol via the order-descent protocol: use the highest
/// existing context on the history suffix, emitting an escape at each
/// context that has no count for the symbol, down to the order -1 table
/// (where `symbol` may also be EOF).
fn encode_symbol<W: Write>(
    encoder: &mut ArithmeticEncoder<W>,
    model: &PpmModel,
    history: &[u32],
    symbol: u32,
) -> Result<()> {
    for order in (0..=history.len()).rev() {
        let Some(ctx) = model.context_for(history, order) else {
            continue;
        };
        if symbol != EOF_SYMBOL && ctx.frequencies.get(symbol) > 0 {
            return encoder.write(&ctx.frequencies, symbol);
        }
        // No usable prediction at this order
        encoder.write(&ctx.frequencies, ESCAPE_SYMBOL)?;
    }
    encoder.write(&model.order_minus1, symbol)
}

/// Decode one symbol by the mirror of [`encode_symbol`]: an escape
/// consumed at order >= 0 drops to the next lower order; whatever the
/// order -1 table resolves is final (a literal or EOF).
fn decode_symbol<R: Read>(
    decoder: &mut ArithmeticDecoder<R>,
    model: &PpmModel,
    history: &[u32],
) -> Result<u32> {
    for order in (0..=history.len()).rev() {
        let Some(ctx) = model.context_for(history, order) else {
            continue;
        };
        let symbol = decoder.read(&ctx.frequencies)?;
        if symbol < ESCAPE_SYMBOL {
            return Ok(symbol);
        }
    }
    decoder.read(&model.order_minus1)
}

/// Prepend the freshly resolved literal to the history, evicting the
/// oldest entry past the model order. EOF never reaches this point.
fn push_history(history: &mut History, model_order: i32, symbol: u32) {
    if model_order < 1 {
        return;
    }
    if history.len() >= model_order as usize {
        history.pop();
    }
    history.insert(0, symbol);
}
