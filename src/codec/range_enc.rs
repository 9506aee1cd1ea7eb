//! LZMA range encoder.
//!
//! Adaptive binary arithmetic coder with byte-level carry propagation.
//! Encoded bytes collect in an internal buffer; the stream driver drains
//! that buffer to its writer at chunk boundaries, which keeps the per-bit
//! encode path infallible.
//!
//! `low` is carried in a `u64` so that a carry out of bit 31 can be
//! detected. The carry is then released into the cached byte and every
//! pending `0xFF` byte behind it.

use std::io::{self, Write};

use super::bit_model::{BIT_MODEL_TOTAL, NUM_BIT_MODEL_TOTAL_BITS, NUM_MOVE_BITS};

/// Normalization threshold: `range` never stays below this after a bit.
pub const TOP_VALUE: u32 = 1 << 24;

/// LZMA range encoder.
#[derive(Debug)]
pub struct RangeEncoder {
    low: u64,
    range: u32,
    cache: u8,
    // Pending 0xFF bytes behind `cache`, awaiting carry resolution
    cache_size: u64,
    pending: Vec<u8>,
    drained: u64,
}

impl RangeEncoder {
    /// Creates a new range encoder.
    pub fn new() -> Self {
        Self {
            low: 0,
            range: u32::MAX,
            cache: 0,
            cache_size: 0,
            pending: Vec::with_capacity(1 << 16),
            drained: 0,
        }
    }

    /// Resets the coder for a new stream, discarding undrained output.
    pub fn reset(&mut self) {
        self.low = 0;
        self.range = u32::MAX;
        self.cache = 0;
        self.cache_size = 0;
        self.pending.clear();
        self.drained = 0;
    }

    /// Encodes one bit against an adaptive probability and updates it.
    ///
    /// `prob` is the 11-bit probability of a zero bit.
    #[inline]
    pub fn encode_bit(&mut self, prob: &mut u16, bit: bool) {
        let p = *prob as u32;
        let bound = (self.range >> NUM_BIT_MODEL_TOTAL_BITS) * p;

        if bit {
            self.low += bound as u64;
            self.range -= bound;
            *prob -= *prob >> NUM_MOVE_BITS;
        } else {
            self.range = bound;
            *prob += ((BIT_MODEL_TOTAL - p) >> NUM_MOVE_BITS) as u16;
        }

        while self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low();
        }
    }

    /// Encodes the low `num_bits` of `value`, most significant first, with
    /// a fixed 50% split.
    pub fn encode_direct_bits(&mut self, value: u32, num_bits: u32) {
        for i in (0..num_bits).rev() {
            self.range >>= 1;
            if (value >> i) & 1 != 0 {
                self.low += self.range as u64;
            }
            if self.range < TOP_VALUE {
                self.range <<= 8;
                self.shift_low();
            }
        }
    }

    fn shift_low(&mut self) {
        let carry = (self.low >> 32) as u8;
        let low32 = self.low as u32;

        if low32 < 0xFF00_0000 || carry != 0 {
            self.pending.push(self.cache.wrapping_add(carry));
            let filler = 0xFF_u8.wrapping_add(carry);
            for _ in 0..self.cache_size {
                self.pending.push(filler);
            }
            self.cache_size = 0;
            self.cache = (low32 >> 24) as u8;
        } else {
            self.cache_size += 1;
        }

        self.low = (low32 << 8) as u64;
    }

    /// Flushes the coder state, emitting the final five bytes.
    ///
    /// The output must still be drained afterwards.
    pub fn flush(&mut self) {
        for _ in 0..5 {
            self.shift_low();
        }
    }

    /// Writes all resolved bytes to `writer`.
    ///
    /// Returns the number of bytes written.
    pub fn drain_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<u64> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        writer.write_all(&self.pending)?;
        let written = self.pending.len() as u64;
        self.drained += written;
        self.pending.clear();
        Ok(written)
    }

    /// Returns the number of bytes produced so far, counting bytes that
    /// are still held back for carry resolution.
    pub fn processed_size(&self) -> u64 {
        self.drained + self.pending.len() as u64 + self.cache_size + 1
    }
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}
