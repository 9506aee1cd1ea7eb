//! Literal encoder.
//!
//! Each literal context owns `0x300` probabilities: `0x100` for the plain
//! tree and two further `0x100` blocks used while the encoded bits still
//! agree with the byte at rep distance 0 (matched mode). The context is
//! chosen from the low `lp` bits of the position and the high `lc` bits of
//! the previous byte.

use super::bit_model::{INITIAL_PROB, init_probs, price};
use super::range_enc::RangeEncoder;

const CODER_SIZE: usize = 0x300;

/// Literal encoder over all `(position, previous byte)` contexts.
#[derive(Debug, Clone)]
pub struct LiteralEncoder {
    probs: Vec<u16>,
    num_pos_bits: u32,
    num_prev_bits: u32,
    pos_mask: u32,
}

impl LiteralEncoder {
    /// Creates an encoder with `lp` position bits and `lc` context bits.
    pub fn new(num_pos_bits: u32, num_prev_bits: u32) -> Self {
        let num_states = 1usize << (num_pos_bits + num_prev_bits);
        Self {
            probs: vec![INITIAL_PROB; num_states * CODER_SIZE],
            num_pos_bits,
            num_prev_bits,
            pos_mask: (1 << num_pos_bits) - 1,
        }
    }

    /// Resets all probabilities.
    pub fn init(&mut self) {
        init_probs(&mut self.probs);
    }

    /// Returns the number of position bits.
    pub fn num_pos_bits(&self) -> u32 {
        self.num_pos_bits
    }

    /// Offset of the sub-coder for this position and previous byte.
    #[inline]
    fn coder_offset(&self, pos: u32, prev_byte: u8) -> usize {
        let index = ((pos & self.pos_mask) << self.num_prev_bits)
            + ((prev_byte as u32) >> (8 - self.num_prev_bits));
        index as usize * CODER_SIZE
    }

    /// Encodes `symbol` with the plain tree.
    pub fn encode(&mut self, rc: &mut RangeEncoder, pos: u32, prev_byte: u8, symbol: u8) {
        let base = self.coder_offset(pos, prev_byte);
        let coder = &mut self.probs[base..base + CODER_SIZE];
        let mut context = 1usize;
        for i in (0..8).rev() {
            let bit = (symbol >> i) & 1;
            rc.encode_bit(&mut coder[context], bit != 0);
            context = (context << 1) | bit as usize;
        }
    }

    /// Encodes `symbol` predicted against `match_byte`.
    ///
    /// Falls back to the plain tree after the first differing bit.
    pub fn encode_matched(
        &mut self,
        rc: &mut RangeEncoder,
        pos: u32,
        prev_byte: u8,
        match_byte: u8,
        symbol: u8,
    ) {
        let base = self.coder_offset(pos, prev_byte);
        let coder = &mut self.probs[base..base + CODER_SIZE];
        let mut context = 1usize;
        let mut same = true;
        for i in (0..8).rev() {
            let bit = (symbol >> i) & 1;
            let mut index = context;
            if same {
                let match_bit = (match_byte >> i) & 1;
                index += (1 + match_bit as usize) << 8;
                same = match_bit == bit;
            }
            rc.encode_bit(&mut coder[index], bit != 0);
            context = (context << 1) | bit as usize;
        }
    }

    /// Price of encoding `symbol`, in matched mode when `match_mode` is set.
    pub fn price(
        &self,
        pos: u32,
        prev_byte: u8,
        match_mode: bool,
        match_byte: u8,
        symbol: u8,
    ) -> u32 {
        let base = self.coder_offset(pos, prev_byte);
        let coder = &self.probs[base..base + CODER_SIZE];
        let mut total = 0;
        let mut context = 1usize;
        let mut i = 8;
        if match_mode {
            while i > 0 {
                i -= 1;
                let match_bit = (match_byte >> i) & 1;
                let bit = (symbol >> i) & 1;
                total += price(coder[((1 + match_bit as usize) << 8) + context], bit != 0);
                context = (context << 1) | bit as usize;
                if match_bit != bit {
                    break;
                }
            }
        }
        while i > 0 {
            i -= 1;
            let bit = (symbol >> i) & 1;
            total += price(coder[context], bit != 0);
            context = (context << 1) | bit as usize;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untrained_price_is_eight_bits() {
        let lit = LiteralEncoder::new(0, 3);
        assert_eq!(lit.price(0, 0, false, 0, b'a'), 8 * 64);
        assert_eq!(lit.price(0, 0, true, b'b', b'a'), 8 * 64);
    }

    #[test]
    fn test_context_selection() {
        let mut rc = RangeEncoder::new();
        let mut lit = LiteralEncoder::new(0, 3);
        for _ in 0..30 {
            lit.encode(&mut rc, 0, 0x20, b'x');
        }
        // Same high bits of the previous byte share a context
        assert!(lit.price(0, 0x3F, false, 0, b'x') < 8 * 64);
        // Different high bits do not
        assert_eq!(lit.price(0, 0xE0, false, 0, b'x'), 8 * 64);
    }

    #[test]
    fn test_position_bits_select_context() {
        let mut rc = RangeEncoder::new();
        let mut lit = LiteralEncoder::new(1, 0);
        assert_eq!(lit.num_pos_bits(), 1);
        for _ in 0..30 {
            lit.encode(&mut rc, 0, 0, b'q');
        }
        assert!(lit.price(2, 0, false, 0, b'q') < 8 * 64);
        assert_eq!(lit.price(1, 0, false, 0, b'q'), 8 * 64);
    }

    #[test]
    fn test_matched_mode_learns_agreement() {
        let mut rc = RangeEncoder::new();
        let mut lit = LiteralEncoder::new(0, 0);
        for _ in 0..30 {
            lit.encode_matched(&mut rc, 0, 0, b'k', b'k');
        }
        let matched = lit.price(0, 0, true, b'k', b'k');
        assert!(matched < 8 * 64);
        // The plain tree was never touched
        assert_eq!(lit.price(0, 0, false, 0, b'k'), 8 * 64);
    }

    #[test]
    fn test_matched_price_diverges_after_mismatch() {
        let lit = LiteralEncoder::new(0, 0);
        // Differ in the top bit; the remaining bits use the plain tree
        assert_eq!(lit.price(0, 0, true, 0x00, 0x80), 8 * 64);
    }
}
