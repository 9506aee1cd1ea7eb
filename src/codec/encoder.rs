//! LZMA stream driver.
//!
//! [`LzmaEncoder`] runs the optimal parser over a whole input stream and
//! writes the raw LZMA payload (no properties header) to a writer:
//!
//! 1. All models, the state automaton, the rep distances and the parser
//!    arena are reset.
//! 2. The first `train_size` bytes, if any, are fed to the match finder
//!    without being encoded.
//! 3. The input is coded in chunks of at least [`CHUNK_SIZE`] positions.
//!    After each chunk the range encoder's resolved bytes are written out
//!    and the progress reporter is consulted.
//! 4. The optional end marker is written and the range encoder flushed.
//!
//! # Example
//!
//! ```rust
//! use lzopt::{EncoderOptions, LzmaEncoder};
//! use lzopt::progress::NoProgress;
//!
//! let mut encoder = LzmaEncoder::new(EncoderOptions::new().end_marker(true))?;
//! let mut payload = Vec::new();
//! let summary = encoder.encode(&b"hello hello hello"[..], &mut payload, &mut NoProgress)?;
//! assert_eq!(summary.in_bytes, 17);
//! assert_eq!(summary.out_bytes, payload.len() as u64);
//! # Ok::<(), lzopt::Error>(())
//! ```

use std::io::{self, Read, Write};

use super::NUM_REPS;
use super::lzma_context::LzmaContext;
use super::match_finder::{BinTreeMatchFinder, MatchFinder};
use super::optimum::OptimalParser;
use super::range_enc::RangeEncoder;
use crate::options::EncoderOptions;
use crate::progress::ProgressReporter;
use crate::{Error, Result};

/// Minimum number of positions coded between two progress callbacks.
pub const CHUNK_SIZE: u64 = 1 << 12;

/// Statistics of a finished encoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Input bytes encoded, excluding training bytes.
    pub in_bytes: u64,
    /// Payload bytes written.
    pub out_bytes: u64,
    /// Number of chunks the input was coded in.
    pub chunks: u64,
}

impl EncodeSummary {
    /// Returns the compressed size as a fraction of the input size.
    pub fn ratio(&self) -> f64 {
        if self.in_bytes == 0 {
            0.0
        } else {
            self.out_bytes as f64 / self.in_bytes as f64
        }
    }
}

/// Single-stream LZMA encoder.
///
/// One instance owns one set of models and one parser arena. Runs are
/// sequential: every call to [`encode`](Self::encode) or
/// [`encode_with`](Self::encode_with) starts from a clean state, including
/// after a run that failed.
#[derive(Debug)]
pub struct LzmaEncoder {
    options: EncoderOptions,
    ctx: LzmaContext,
    parser: OptimalParser,
    rc: RangeEncoder,
    now_pos: u64,
}

impl LzmaEncoder {
    /// Creates an encoder after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if any option is out of range.
    pub fn new(options: EncoderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            ctx: LzmaContext::new(&options),
            parser: OptimalParser::new(options.fast_bytes),
            rc: RangeEncoder::new(),
            now_pos: 0,
            options,
        })
    }

    /// Returns the options this encoder was built with.
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Returns the 5-byte properties header matching the payload.
    pub fn properties(&self) -> [u8; 5] {
        self.options.properties()
    }

    /// Encodes everything `reader` yields into `writer`.
    ///
    /// A binary-tree match finder of the configured kind is built for the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading or writing fails and
    /// [`Error::Cancelled`] if `progress` requests cancellation. In both
    /// cases the output written so far is truncated.
    pub fn encode<R: Read, W: Write>(
        &mut self,
        reader: R,
        writer: W,
        progress: &mut dyn ProgressReporter,
    ) -> Result<EncodeSummary> {
        let mut mf = BinTreeMatchFinder::new(
            self.options.match_finder,
            self.options.dict_size,
            self.options.fast_bytes,
        );
        mf.init(reader)?;
        let summary = self.encode_with(&mut mf, writer, progress);
        mf.release_stream();
        summary
    }

    /// Encodes the stream bound to an already initialized match finder.
    ///
    /// The match finder must have been created for this encoder's
    /// `fast_bytes` and must not have been advanced yet.
    ///
    /// # Errors
    ///
    /// Same as [`encode`](Self::encode).
    pub fn encode_with<M: MatchFinder, W: Write>(
        &mut self,
        mf: &mut M,
        mut writer: W,
        progress: &mut dyn ProgressReporter,
    ) -> Result<EncodeSummary> {
        self.reset();
        log::debug!(
            "LZMA encode: dict_size={} fast_bytes={} mf={} lc={} lp={} pb={} end_marker={} train={}",
            self.options.dict_size,
            self.options.fast_bytes,
            self.options.match_finder,
            self.options.lit_context_bits,
            self.options.lit_pos_bits,
            self.options.pos_bits,
            self.options.end_marker,
            self.options.train_size,
        );

        let trained = self.train(mf)?;
        let mut summary = EncodeSummary::default();

        loop {
            let finished = self.code_one_block(mf)?;
            summary.chunks += 1;
            summary.out_bytes += self.rc.drain_to(&mut writer)?;
            summary.in_bytes = self.now_pos - trained;
            if finished {
                break;
            }
            if !progress.on_progress(summary.in_bytes, summary.out_bytes) || progress.should_cancel()
            {
                log::debug!(
                    "LZMA encode cancelled after {} input bytes ({} chunks)",
                    summary.in_bytes,
                    summary.chunks
                );
                return Err(Error::Cancelled);
            }
        }

        if self.options.end_marker {
            let pos_state = self.ctx.pos_state(self.now_pos as u32);
            self.ctx.encode_end_marker(&mut self.rc, pos_state);
        }
        self.rc.flush();
        summary.out_bytes += self.rc.drain_to(&mut writer)?;
        writer.flush()?;

        // The stream is complete, a cancel request here has nothing to stop
        progress.on_progress(summary.in_bytes, summary.out_bytes);

        log::debug!(
            "LZMA encode finished: {} -> {} bytes in {} chunks",
            summary.in_bytes,
            summary.out_bytes,
            summary.chunks
        );
        Ok(summary)
    }

    fn reset(&mut self) {
        self.ctx.init();
        self.parser.reset();
        self.rc.reset();
        self.now_pos = 0;
    }

    /// Feeds the first `train_size` bytes to the match finder only.
    ///
    /// Returns the number of bytes consumed.
    fn train<M: MatchFinder>(&mut self, mf: &mut M) -> io::Result<u64> {
        let train = self.options.train_size.min(mf.num_available_bytes());
        if train == 0 {
            return Ok(0);
        }
        mf.skip(train)?;
        self.ctx.set_previous_byte(mf.get_index_byte(-1));
        self.now_pos = train as u64;
        log::trace!("primed match finder with {train} bytes");
        Ok(train as u64)
    }

    /// Codes at least [`CHUNK_SIZE`] positions, or up to the end of input.
    ///
    /// Returns `true` once the input is exhausted.
    fn code_one_block<M: MatchFinder>(&mut self, mf: &mut M) -> io::Result<bool> {
        let block_start = self.now_pos;

        if self.now_pos == 0 {
            if mf.num_available_bytes() == 0 {
                return Ok(true);
            }
            // Nothing to match against yet
            self.parser.read_match_distances(mf)?;
            let byte = mf.get_index_byte(-(self.parser.additional_offset() as i32));
            self.ctx.encode_literal(&mut self.rc, 0, byte, 0);
            self.parser.consume(1);
            self.now_pos = 1;
        }
        if mf.num_available_bytes() == 0 {
            return Ok(true);
        }

        loop {
            let position = self.now_pos as u32;
            let op = self.parser.get_optimum(mf, &self.ctx, position)?;
            let offset = self.parser.additional_offset() as i32;

            if op.is_literal() {
                let byte = mf.get_index_byte(-offset);
                let match_byte = if self.ctx.state().is_char() {
                    0
                } else {
                    mf.get_index_byte(-(self.ctx.reps().get(0) as i32) - 1 - offset)
                };
                self.ctx
                    .encode_literal(&mut self.rc, position, byte, match_byte);
            } else {
                let pos_state = self.ctx.pos_state(position);
                if op.back < NUM_REPS as u32 {
                    self.ctx
                        .encode_rep(&mut self.rc, pos_state, op.back as usize, op.len);
                } else {
                    self.ctx.encode_match(
                        &mut self.rc,
                        pos_state,
                        op.back - NUM_REPS as u32,
                        op.len,
                    );
                }
                self.ctx
                    .set_previous_byte(mf.get_index_byte(op.len as i32 - 1 - offset));
            }

            self.parser.consume(op.len);
            self.now_pos += op.len as u64;

            if self.parser.additional_offset() == 0 {
                if self.ctx.refresh_prices() {
                    log::trace!("rebuilt distance price tables at {}", self.now_pos);
                }
                if mf.num_available_bytes() == 0 {
                    return Ok(true);
                }
                if self.now_pos - block_start >= CHUNK_SIZE {
                    return Ok(false);
                }
            }
        }
    }
}
