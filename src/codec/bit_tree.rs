//! Bit-tree encoders for fixed-width symbols.
//!
//! A tree of `2^num_bits` probabilities, addressed by the symbol prefix
//! encoded so far. The forward variant walks the symbol most significant
//! bit first; the reverse variant walks it least significant bit first.

use super::bit_model::{INITIAL_PROB, init_probs, price};
use super::range_enc::RangeEncoder;

/// Bit-tree encoder over `num_bits`-bit symbols.
#[derive(Debug, Clone)]
pub struct BitTreeEncoder {
    models: Vec<u16>,
    num_bits: u32,
}

impl BitTreeEncoder {
    /// Creates a tree for `num_bits`-bit symbols.
    pub fn new(num_bits: u32) -> Self {
        Self {
            models: vec![INITIAL_PROB; 1 << num_bits],
            num_bits,
        }
    }

    /// Resets all probabilities.
    pub fn init(&mut self) {
        init_probs(&mut self.models);
    }

    /// Encodes `symbol` most significant bit first.
    pub fn encode(&mut self, rc: &mut RangeEncoder, symbol: u32) {
        let mut m = 1usize;
        for i in (0..self.num_bits).rev() {
            let bit = (symbol >> i) & 1;
            rc.encode_bit(&mut self.models[m], bit != 0);
            m = (m << 1) | bit as usize;
        }
    }

    /// Encodes `symbol` least significant bit first.
    pub fn reverse_encode(&mut self, rc: &mut RangeEncoder, symbol: u32) {
        reverse_encode(&mut self.models, 1, rc, self.num_bits, symbol);
    }

    /// Returns the price of `symbol` in forward order.
    pub fn price(&self, symbol: u32) -> u32 {
        let mut total = 0;
        let mut m = 1usize;
        for i in (0..self.num_bits).rev() {
            let bit = (symbol >> i) & 1;
            total += price(self.models[m], bit != 0);
            m = (m << 1) | bit as usize;
        }
        total
    }

    /// Returns the price of `symbol` in reverse order.
    pub fn reverse_price(&self, symbol: u32) -> u32 {
        reverse_price(&self.models, 1, self.num_bits, symbol)
    }
}

/// Reverse-encodes `symbol` into a tree embedded in `models` at `start`.
///
/// The tree root sits at `models[start]`; node `m` (1-based) at
/// `models[start + m - 1]`.
pub fn reverse_encode(
    models: &mut [u16],
    start: usize,
    rc: &mut RangeEncoder,
    num_bits: u32,
    mut symbol: u32,
) {
    let mut m = 1usize;
    for _ in 0..num_bits {
        let bit = symbol & 1;
        rc.encode_bit(&mut models[start + m - 1], bit != 0);
        m = (m << 1) | bit as usize;
        symbol >>= 1;
    }
}

/// Price of reverse-encoding `symbol` into a tree embedded at `start`.
pub fn reverse_price(models: &[u16], start: usize, num_bits: u32, mut symbol: u32) -> u32 {
    let mut total = 0;
    let mut m = 1usize;
    for _ in 0..num_bits {
        let bit = symbol & 1;
        total += price(models[start + m - 1], bit != 0);
        m = (m << 1) | bit as usize;
        symbol >>= 1;
    }
    total
}
