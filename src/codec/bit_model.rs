//! Adaptive probability model and bit prices.
//!
//! A probability is an 11-bit fixed-point estimate of a zero bit. Prices
//! approximate `-log2(P)` in 1/64-bit units and are read from a table built
//! once per process.

use std::sync::LazyLock;

/// Number of bits in a probability value.
pub const NUM_BIT_MODEL_TOTAL_BITS: u32 = 11;

/// Full probability scale (2048).
pub const BIT_MODEL_TOTAL: u32 = 1 << NUM_BIT_MODEL_TOTAL_BITS;

/// Adaptation shift of the probability update.
pub const NUM_MOVE_BITS: u32 = 5;

/// Initial probability (50%).
pub const INITIAL_PROB: u16 = (BIT_MODEL_TOTAL / 2) as u16;

/// Low probability bits dropped when indexing the price table.
pub const NUM_MOVE_REDUCING_BITS: u32 = 2;

/// Fractional bits of a price.
pub const NUM_BIT_PRICE_SHIFT_BITS: u32 = 6;

/// Price assigned to unreachable parser cells.
pub const INFINITY_PRICE: u32 = 0x0FFF_FFFF;

const PRICE_TABLE_BITS: u32 = NUM_BIT_MODEL_TOTAL_BITS - NUM_MOVE_REDUCING_BITS;
const PRICE_TABLE_SIZE: usize = 1 << PRICE_TABLE_BITS;

static PROB_PRICES: LazyLock<[u32; PRICE_TABLE_SIZE]> = LazyLock::new(|| {
    let mut prices = [0u32; PRICE_TABLE_SIZE];
    for i in (0..PRICE_TABLE_BITS).rev() {
        let start = 1usize << (PRICE_TABLE_BITS - i - 1);
        let end = 1usize << (PRICE_TABLE_BITS - i);
        for (j, price) in prices.iter_mut().enumerate().take(end).skip(start) {
            *price = (i << NUM_BIT_PRICE_SHIFT_BITS)
                + ((((end - j) as u32) << NUM_BIT_PRICE_SHIFT_BITS)
                    >> (PRICE_TABLE_BITS - i - 1));
        }
    }
    prices
});

/// Price of encoding `bit` with probability `prob`.
#[inline]
pub fn price(prob: u16, bit: bool) -> u32 {
    if bit { price1(prob) } else { price0(prob) }
}

/// Price of encoding a zero bit.
#[inline]
pub fn price0(prob: u16) -> u32 {
    PROB_PRICES[(prob as u32 >> NUM_MOVE_REDUCING_BITS) as usize]
}

/// Price of encoding a one bit.
#[inline]
pub fn price1(prob: u16) -> u32 {
    PROB_PRICES[((BIT_MODEL_TOTAL - prob as u32) >> NUM_MOVE_REDUCING_BITS) as usize]
}

/// Price of `num_bits` bits sent without a model.
#[inline]
pub fn direct_bits_price(num_bits: u32) -> u32 {
    num_bits << NUM_BIT_PRICE_SHIFT_BITS
}

/// Resets every probability to 50%.
pub fn init_probs(probs: &mut [u16]) {
    probs.fill(INITIAL_PROB);
}
