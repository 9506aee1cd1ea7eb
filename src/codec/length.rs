//! Match length encoder with cached prices.
//!
//! Lengths are coded as `len - 2` in three tiers:
//! - low: 0-7, a 3-bit tree per position state
//! - mid: 8-15, a 3-bit tree per position state
//! - high: 16-271, one shared 8-bit tree
//!
//! Two choice bits select the tier. The price table is rebuilt for a
//! position state after it has been used `table_size` times.

use super::NUM_POS_STATES_MAX;
use super::bit_model::{INITIAL_PROB, init_probs, price0, price1};
use super::bit_tree::BitTreeEncoder;
use super::range_enc::RangeEncoder;

const LEN_NUM_LOW_BITS: u32 = 3;
const LEN_NUM_MID_BITS: u32 = 3;
const LEN_NUM_HIGH_BITS: u32 = 8;
const LEN_NUM_LOW_SYMBOLS: u32 = 1 << LEN_NUM_LOW_BITS;
const LEN_NUM_MID_SYMBOLS: u32 = 1 << LEN_NUM_MID_BITS;

/// Number of encodable length symbols (lengths 2-273).
pub const LEN_NUM_SYMBOLS: u32 =
    LEN_NUM_LOW_SYMBOLS + LEN_NUM_MID_SYMBOLS + (1 << LEN_NUM_HIGH_BITS);

/// Three-tier length encoder.
#[derive(Debug, Clone)]
pub struct LengthEncoder {
    choice: [u16; 2],
    low: Vec<BitTreeEncoder>,
    mid: Vec<BitTreeEncoder>,
    high: BitTreeEncoder,
}

impl LengthEncoder {
    /// Creates an encoder with trees for every position state.
    pub fn new() -> Self {
        Self {
            choice: [INITIAL_PROB; 2],
            low: vec![BitTreeEncoder::new(LEN_NUM_LOW_BITS); NUM_POS_STATES_MAX],
            mid: vec![BitTreeEncoder::new(LEN_NUM_MID_BITS); NUM_POS_STATES_MAX],
            high: BitTreeEncoder::new(LEN_NUM_HIGH_BITS),
        }
    }

    /// Resets the probabilities used by the first `num_pos_states` states.
    pub fn init(&mut self, num_pos_states: usize) {
        init_probs(&mut self.choice);
        for pos_state in 0..num_pos_states {
            self.low[pos_state].init();
            self.mid[pos_state].init();
        }
        self.high.init();
    }

    /// Encodes `symbol` (`len - 2`).
    pub fn encode(&mut self, rc: &mut RangeEncoder, symbol: u32, pos_state: usize) {
        if symbol < LEN_NUM_LOW_SYMBOLS {
            rc.encode_bit(&mut self.choice[0], false);
            self.low[pos_state].encode(rc, symbol);
        } else {
            rc.encode_bit(&mut self.choice[0], true);
            let symbol = symbol - LEN_NUM_LOW_SYMBOLS;
            if symbol < LEN_NUM_MID_SYMBOLS {
                rc.encode_bit(&mut self.choice[1], false);
                self.mid[pos_state].encode(rc, symbol);
            } else {
                rc.encode_bit(&mut self.choice[1], true);
                self.high.encode(rc, symbol - LEN_NUM_MID_SYMBOLS);
            }
        }
    }

    /// Writes the prices of symbols `0..prices.len()` for `pos_state`.
    pub fn fill_prices(&self, pos_state: usize, prices: &mut [u32]) {
        let a0 = price0(self.choice[0]);
        let a1 = price1(self.choice[0]);
        let b0 = a1 + price0(self.choice[1]);
        let b1 = a1 + price1(self.choice[1]);

        for (symbol, slot) in prices.iter_mut().enumerate() {
            let symbol = symbol as u32;
            *slot = if symbol < LEN_NUM_LOW_SYMBOLS {
                a0 + self.low[pos_state].price(symbol)
            } else if symbol < LEN_NUM_LOW_SYMBOLS + LEN_NUM_MID_SYMBOLS {
                b0 + self.mid[pos_state].price(symbol - LEN_NUM_LOW_SYMBOLS)
            } else {
                b1 + self.high
                    .price(symbol - LEN_NUM_LOW_SYMBOLS - LEN_NUM_MID_SYMBOLS)
            };
        }
    }
}

impl Default for LengthEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Length encoder paired with a per-position-state price table.
#[derive(Debug, Clone)]
pub struct LengthPriceEncoder {
    encoder: LengthEncoder,
    prices: Vec<u32>,
    counters: [u32; NUM_POS_STATES_MAX],
    table_size: u32,
}

impl LengthPriceEncoder {
    /// Creates an encoder caching prices for `table_size` symbols.
    pub fn new(table_size: u32) -> Self {
        Self {
            encoder: LengthEncoder::new(),
            prices: vec![0; LEN_NUM_SYMBOLS as usize * NUM_POS_STATES_MAX],
            counters: [0; NUM_POS_STATES_MAX],
            table_size,
        }
    }

    /// Resets the probabilities and rebuilds every price table.
    pub fn init(&mut self, num_pos_states: usize) {
        self.encoder.init(num_pos_states);
        for pos_state in 0..num_pos_states {
            self.update_table(pos_state);
        }
    }

    fn update_table(&mut self, pos_state: usize) {
        let start = pos_state * LEN_NUM_SYMBOLS as usize;
        let end = start + self.table_size as usize;
        self.encoder
            .fill_prices(pos_state, &mut self.prices[start..end]);
        self.counters[pos_state] = self.table_size;
    }

    /// Cached price of `symbol` (`len - 2`).
    #[inline]
    pub fn price(&self, symbol: u32, pos_state: usize) -> u32 {
        self.prices[pos_state * LEN_NUM_SYMBOLS as usize + symbol as usize]
    }

    /// Encodes `symbol` and refreshes the table once it has gone stale.
    pub fn encode(&mut self, rc: &mut RangeEncoder, symbol: u32, pos_state: usize) {
        self.encoder.encode(rc, symbol, pos_state);
        self.counters[pos_state] -= 1;
        if self.counters[pos_state] == 0 {
            self.update_table(pos_state);
        }
    }
}
