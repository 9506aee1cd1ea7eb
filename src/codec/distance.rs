//! Distance encoding.
//!
//! A zero-based distance is split into a 6-bit slot (roughly `2 * log2`)
//! and footer bits:
//! - slots 0-3 have no footer
//! - slots 4-13 code the footer with reverse bit trees
//! - slots 14-63 send the upper footer bits directly and the low four bits
//!   through the shared alignment tree
//!
//! Slot trees are selected by the match length (`len - 2`, capped at 3).
//! Price tables for distances below 128 and for the alignment bits are
//! cached and refreshed after a bounded number of uses.

use std::sync::LazyLock;

use super::MATCH_LEN_MIN;
use super::bit_model::{INITIAL_PROB, NUM_BIT_PRICE_SHIFT_BITS, init_probs};
use super::bit_tree::{self, BitTreeEncoder};
use super::range_enc::RangeEncoder;

/// Number of slot trees, keyed by match length.
pub const NUM_LEN_TO_POS_STATES: usize = 4;

/// Bits in a distance slot.
pub const NUM_POS_SLOT_BITS: u32 = 6;

/// Low footer bits coded with the alignment tree.
pub const NUM_ALIGN_BITS: u32 = 4;

/// Number of alignment symbols.
pub const ALIGN_TABLE_SIZE: usize = 1 << NUM_ALIGN_BITS;

const ALIGN_MASK: u32 = ALIGN_TABLE_SIZE as u32 - 1;

/// First slot with footer bits.
pub const START_POS_MODEL_INDEX: u32 = 4;

/// First slot whose footer is sent directly.
pub const END_POS_MODEL_INDEX: u32 = 14;

/// Distances below this use fully cached prices.
pub const NUM_FULL_DISTANCES: usize = 1 << (END_POS_MODEL_INDEX >> 1);

/// Uses of the distance price table before it is rebuilt.
pub const DISTANCE_PRICE_REFRESH: u32 = 1 << 7;

const NUM_POS_SLOTS: usize = 1 << NUM_POS_SLOT_BITS;
const NUM_FAST_SLOTS: u32 = 22;

static FAST_POS: LazyLock<[u8; 1 << 11]> = LazyLock::new(|| {
    let mut table = [0u8; 1 << 11];
    table[0] = 0;
    table[1] = 1;
    let mut c = 2;
    for slot in 2..NUM_FAST_SLOTS {
        let k = 1usize << ((slot >> 1) - 1);
        table[c..c + k].fill(slot as u8);
        c += k;
    }
    table
});

/// Returns the slot of a zero-based distance.
pub fn get_pos_slot(dist: u32) -> u32 {
    let fast = &*FAST_POS;
    if dist < 1 << 11 {
        fast[dist as usize] as u32
    } else if dist < 1 << 21 {
        fast[(dist >> 10) as usize] as u32 + 20
    } else if dist < 1 << 31 {
        fast[(dist >> 20) as usize] as u32 + 40
    } else {
        fast[(dist >> 30) as usize] as u32 + 60
    }
}

/// Returns the slot of a zero-based distance of at least
/// [`NUM_FULL_DISTANCES`].
pub fn get_pos_slot2(dist: u32) -> u32 {
    let fast = &*FAST_POS;
    if dist < 1 << 17 {
        fast[(dist >> 6) as usize] as u32 + 12
    } else if dist < 1 << 27 {
        fast[(dist >> 16) as usize] as u32 + 32
    } else {
        fast[(dist >> 26) as usize] as u32 + 52
    }
}

/// Slot tree index for a match length.
#[inline]
pub fn len_to_pos_state(len: u32) -> usize {
    ((len - MATCH_LEN_MIN) as usize).min(NUM_LEN_TO_POS_STATES - 1)
}

/// Footer bit count and base distance of a slot with a footer.
#[inline]
fn slot_base(slot: u32) -> (u32, u32) {
    let footer_bits = (slot >> 1) - 1;
    (footer_bits, (2 | (slot & 1)) << footer_bits)
}

/// Distance encoder with slot, footer and alignment models.
#[derive(Debug, Clone)]
pub struct DistanceEncoder {
    slot_encoders: Vec<BitTreeEncoder>,
    // Reverse trees for slots 4-13, laid out back to back
    pos_encoders: [u16; NUM_FULL_DISTANCES - END_POS_MODEL_INDEX as usize],
    align_encoder: BitTreeEncoder,
    slot_prices: Vec<u32>,
    distances_prices: Vec<u32>,
    align_prices: [u32; ALIGN_TABLE_SIZE],
    dist_table_size: u32,
    match_price_count: u32,
    align_price_count: u32,
}

impl DistanceEncoder {
    /// Creates an encoder pricing slots below `dist_table_size`.
    pub fn new(dist_table_size: u32) -> Self {
        Self {
            slot_encoders: vec![BitTreeEncoder::new(NUM_POS_SLOT_BITS); NUM_LEN_TO_POS_STATES],
            pos_encoders: [INITIAL_PROB; NUM_FULL_DISTANCES - END_POS_MODEL_INDEX as usize],
            align_encoder: BitTreeEncoder::new(NUM_ALIGN_BITS),
            slot_prices: vec![0; NUM_POS_SLOTS * NUM_LEN_TO_POS_STATES],
            distances_prices: vec![0; NUM_FULL_DISTANCES * NUM_LEN_TO_POS_STATES],
            align_prices: [0; ALIGN_TABLE_SIZE],
            dist_table_size,
            match_price_count: 0,
            align_price_count: 0,
        }
    }

    /// Resets all probabilities and rebuilds the price tables.
    pub fn init(&mut self) {
        for encoder in &mut self.slot_encoders {
            encoder.init();
        }
        init_probs(&mut self.pos_encoders);
        self.align_encoder.init();
        self.fill_distances_prices();
        self.fill_align_prices();
    }

    /// Encodes zero-based distance `dist` of a match of length `len`.
    pub fn encode(&mut self, rc: &mut RangeEncoder, dist: u32, len: u32) {
        let slot = get_pos_slot(dist);
        self.slot_encoders[len_to_pos_state(len)].encode(rc, slot);

        if slot >= START_POS_MODEL_INDEX {
            let (footer_bits, base) = slot_base(slot);
            let reduced = dist - base;
            if slot < END_POS_MODEL_INDEX {
                bit_tree::reverse_encode(
                    &mut self.pos_encoders,
                    (base - slot) as usize,
                    rc,
                    footer_bits,
                    reduced,
                );
            } else {
                rc.encode_direct_bits(reduced >> NUM_ALIGN_BITS, footer_bits - NUM_ALIGN_BITS);
                self.align_encoder.reverse_encode(rc, reduced & ALIGN_MASK);
                self.align_price_count += 1;
            }
        }
        self.match_price_count += 1;
    }

    /// Encodes the end-of-stream marker distance (slot 63, all footer bits set).
    pub fn encode_end_marker(&mut self, rc: &mut RangeEncoder) {
        let slot = (1 << NUM_POS_SLOT_BITS) - 1;
        self.slot_encoders[len_to_pos_state(MATCH_LEN_MIN)].encode(rc, slot);
        let footer_bits = 30;
        let reduced = (1u32 << footer_bits) - 1;
        rc.encode_direct_bits(reduced >> NUM_ALIGN_BITS, footer_bits - NUM_ALIGN_BITS);
        self.align_encoder.reverse_encode(rc, reduced & ALIGN_MASK);
    }

    /// Cached price of distance `dist` for a match of length `len`.
    #[inline]
    pub fn price(&self, dist: u32, len: u32) -> u32 {
        let len_state = len_to_pos_state(len);
        if (dist as usize) < NUM_FULL_DISTANCES {
            self.distances_prices[len_state * NUM_FULL_DISTANCES + dist as usize]
        } else {
            self.slot_prices[(len_state << NUM_POS_SLOT_BITS) + get_pos_slot2(dist) as usize]
                + self.align_prices[(dist & ALIGN_MASK) as usize]
        }
    }

    /// Rebuilds stale price tables. Returns `true` if anything was rebuilt.
    pub fn refresh_prices(&mut self) -> bool {
        let mut refreshed = false;
        if self.match_price_count >= DISTANCE_PRICE_REFRESH {
            self.fill_distances_prices();
            refreshed = true;
        }
        if self.align_price_count >= ALIGN_TABLE_SIZE as u32 {
            self.fill_align_prices();
            refreshed = true;
        }
        refreshed
    }

    fn fill_distances_prices(&mut self) {
        let mut footer_prices = [0u32; NUM_FULL_DISTANCES];
        for (dist, price) in footer_prices
            .iter_mut()
            .enumerate()
            .skip(START_POS_MODEL_INDEX as usize)
        {
            let slot = get_pos_slot(dist as u32);
            let (footer_bits, base) = slot_base(slot);
            *price = bit_tree::reverse_price(
                &self.pos_encoders,
                (base - slot) as usize,
                footer_bits,
                dist as u32 - base,
            );
        }

        for len_state in 0..NUM_LEN_TO_POS_STATES {
            let encoder = &self.slot_encoders[len_state];
            let st = len_state << NUM_POS_SLOT_BITS;
            for slot in 0..self.dist_table_size {
                let mut price = encoder.price(slot);
                if slot >= END_POS_MODEL_INDEX {
                    price += ((slot >> 1) - 1 - NUM_ALIGN_BITS) << NUM_BIT_PRICE_SHIFT_BITS;
                }
                self.slot_prices[st + slot as usize] = price;
            }

            let st2 = len_state * NUM_FULL_DISTANCES;
            for (dist, &footer) in footer_prices.iter().enumerate() {
                let slot_price = if dist < START_POS_MODEL_INDEX as usize {
                    self.slot_prices[st + dist]
                } else {
                    self.slot_prices[st + get_pos_slot(dist as u32) as usize] + footer
                };
                self.distances_prices[st2 + dist] = slot_price;
            }
        }
        self.match_price_count = 0;
    }

    fn fill_align_prices(&mut self) {
        for (symbol, price) in self.align_prices.iter_mut().enumerate() {
            *price = self.align_encoder.reverse_price(symbol as u32);
        }
        self.align_price_count = 0;
    }
}
