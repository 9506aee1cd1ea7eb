//! LZMA coding context.
//!
//! Owns every adaptive model of a stream together with the coder state that
//! selects among them:
//! - the state automaton and the repeat-distance history
//! - the previous byte, used as literal context
//! - the is-match / is-rep decision probabilities
//! - literal, length and distance encoders with their price caches
//!
//! The encode methods write symbols through a [`RangeEncoder`] and advance
//! the state. The price methods take the state explicitly, so the optimal
//! parser can price hypothetical paths without touching the context.

use super::bit_model::{init_probs, price, price0, price1};
use super::distance::DistanceEncoder;
use super::length::LengthPriceEncoder;
use super::literal::LiteralEncoder;
use super::range_enc::RangeEncoder;
use super::state::{NUM_STATES, RepDistances, State};
use super::{MATCH_LEN_MIN, NUM_POS_STATES_BITS_MAX};
use crate::options::EncoderOptions;

const COMPLEX_STATES: usize = NUM_STATES << NUM_POS_STATES_BITS_MAX;

#[inline]
fn complex(state: State, pos_state: usize) -> usize {
    (state.index() << NUM_POS_STATES_BITS_MAX) + pos_state
}

/// Adaptive models and coder state of one LZMA stream.
#[derive(Debug, Clone)]
pub struct LzmaContext {
    state: State,
    reps: RepDistances,
    previous_byte: u8,

    pos_state_mask: u32,
    num_pos_states: usize,

    is_match: [u16; COMPLEX_STATES],
    is_rep: [u16; NUM_STATES],
    is_rep_g0: [u16; NUM_STATES],
    is_rep_g1: [u16; NUM_STATES],
    is_rep_g2: [u16; NUM_STATES],
    is_rep0_long: [u16; COMPLEX_STATES],

    literal: LiteralEncoder,
    len_encoder: LengthPriceEncoder,
    rep_len_encoder: LengthPriceEncoder,
    distance: DistanceEncoder,
}

impl LzmaContext {
    /// Creates a context for the given (validated) options.
    pub fn new(options: &EncoderOptions) -> Self {
        let table_size = options.fast_bytes + 1 - MATCH_LEN_MIN;
        let mut ctx = Self {
            state: State::new(),
            reps: RepDistances::new(),
            previous_byte: 0,
            pos_state_mask: (1 << options.pos_bits) - 1,
            num_pos_states: 1 << options.pos_bits,
            is_match: [0; COMPLEX_STATES],
            is_rep: [0; NUM_STATES],
            is_rep_g0: [0; NUM_STATES],
            is_rep_g1: [0; NUM_STATES],
            is_rep_g2: [0; NUM_STATES],
            is_rep0_long: [0; COMPLEX_STATES],
            literal: LiteralEncoder::new(options.lit_pos_bits, options.lit_context_bits),
            len_encoder: LengthPriceEncoder::new(table_size),
            rep_len_encoder: LengthPriceEncoder::new(table_size),
            distance: DistanceEncoder::new(options.dist_table_size()),
        };
        ctx.init();
        ctx
    }

    /// Resets all models and the coder state for a new stream.
    pub fn init(&mut self) {
        self.state = State::new();
        self.reps = RepDistances::new();
        self.previous_byte = 0;

        init_probs(&mut self.is_match);
        init_probs(&mut self.is_rep);
        init_probs(&mut self.is_rep_g0);
        init_probs(&mut self.is_rep_g1);
        init_probs(&mut self.is_rep_g2);
        init_probs(&mut self.is_rep0_long);

        self.literal.init();
        self.distance.init();
        self.len_encoder.init(self.num_pos_states);
        self.rep_len_encoder.init(self.num_pos_states);
    }

    /// Current automaton state.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Current repeat distances.
    #[inline]
    pub fn reps(&self) -> &RepDistances {
        &self.reps
    }

    /// Last byte emitted.
    #[inline]
    pub fn previous_byte(&self) -> u8 {
        self.previous_byte
    }

    /// Sets the last byte emitted, e.g. after priming with training data.
    #[inline]
    pub fn set_previous_byte(&mut self, byte: u8) {
        self.previous_byte = byte;
    }

    /// Position state of a stream position.
    #[inline]
    pub fn pos_state(&self, pos: u32) -> usize {
        (pos & self.pos_state_mask) as usize
    }

    // Encoding

    /// Encodes a literal at `pos`.
    ///
    /// After a match `match_byte` must hold the byte at rep distance 0.
    pub fn encode_literal(&mut self, rc: &mut RangeEncoder, pos: u32, byte: u8, match_byte: u8) {
        let pos_state = self.pos_state(pos);
        rc.encode_bit(&mut self.is_match[complex(self.state, pos_state)], false);
        if self.state.is_char() {
            self.literal.encode(rc, pos, self.previous_byte, byte);
        } else {
            self.literal
                .encode_matched(rc, pos, self.previous_byte, match_byte, byte);
        }
        self.previous_byte = byte;
        self.state = self.state.update_char();
    }

    /// Encodes a match of `len` bytes at zero-based distance `dist`.
    pub fn encode_match(&mut self, rc: &mut RangeEncoder, pos_state: usize, dist: u32, len: u32) {
        let state = self.state;
        rc.encode_bit(&mut self.is_match[complex(state, pos_state)], true);
        rc.encode_bit(&mut self.is_rep[state.index()], false);
        self.state = state.update_match();
        self.len_encoder.encode(rc, len - MATCH_LEN_MIN, pos_state);
        self.distance.encode(rc, dist, len);
        self.reps.push(dist);
    }

    /// Encodes a repeat match using history slot `rep_index`.
    ///
    /// `len == 1` with `rep_index == 0` is the single-byte short rep.
    pub fn encode_rep(&mut self, rc: &mut RangeEncoder, pos_state: usize, rep_index: usize, len: u32) {
        let state = self.state;
        let si = state.index();
        rc.encode_bit(&mut self.is_match[complex(state, pos_state)], true);
        rc.encode_bit(&mut self.is_rep[si], true);
        if rep_index == 0 {
            rc.encode_bit(&mut self.is_rep_g0[si], false);
            rc.encode_bit(&mut self.is_rep0_long[complex(state, pos_state)], len != 1);
        } else {
            rc.encode_bit(&mut self.is_rep_g0[si], true);
            if rep_index == 1 {
                rc.encode_bit(&mut self.is_rep_g1[si], false);
            } else {
                rc.encode_bit(&mut self.is_rep_g1[si], true);
                rc.encode_bit(&mut self.is_rep_g2[si], rep_index == 3);
            }
        }

        if len == 1 {
            self.state = state.update_short_rep();
        } else {
            self.rep_len_encoder.encode(rc, len - MATCH_LEN_MIN, pos_state);
            self.state = state.update_rep();
        }
        self.reps.promote(rep_index);
    }

    /// Encodes the end-of-stream marker.
    pub fn encode_end_marker(&mut self, rc: &mut RangeEncoder, pos_state: usize) {
        let state = self.state;
        rc.encode_bit(&mut self.is_match[complex(state, pos_state)], true);
        rc.encode_bit(&mut self.is_rep[state.index()], false);
        self.state = state.update_match();
        self.len_encoder.encode(rc, 0, pos_state);
        self.distance.encode_end_marker(rc);
    }

    /// Rebuilds stale distance and alignment price tables.
    pub fn refresh_prices(&mut self) -> bool {
        self.distance.refresh_prices()
    }

    // Prices

    /// Price of the is-match decision.
    #[inline]
    pub fn is_match_price(&self, state: State, pos_state: usize, is_match: bool) -> u32 {
        price(self.is_match[complex(state, pos_state)], is_match)
    }

    /// Price of the is-rep decision.
    #[inline]
    pub fn is_rep_price(&self, state: State, is_rep: bool) -> u32 {
        price(self.is_rep[state.index()], is_rep)
    }

    /// Price of the literal bits of `symbol`.
    #[inline]
    pub fn literal_price(
        &self,
        pos: u32,
        prev_byte: u8,
        match_mode: bool,
        match_byte: u8,
        symbol: u8,
    ) -> u32 {
        self.literal
            .price(pos, prev_byte, match_mode, match_byte, symbol)
    }

    /// Price of the rep-specific bits of a short rep.
    #[inline]
    pub fn short_rep_price(&self, state: State, pos_state: usize) -> u32 {
        price0(self.is_rep_g0[state.index()])
            + price0(self.is_rep0_long[complex(state, pos_state)])
    }

    /// Price of selecting history slot `rep_index` for a rep of length two
    /// or more, excluding the length.
    pub fn pure_rep_price(&self, rep_index: usize, state: State, pos_state: usize) -> u32 {
        let si = state.index();
        match rep_index {
            0 => {
                price0(self.is_rep_g0[si]) + price1(self.is_rep0_long[complex(state, pos_state)])
            }
            1 => price1(self.is_rep_g0[si]) + price0(self.is_rep_g1[si]),
            _ => {
                price1(self.is_rep_g0[si])
                    + price1(self.is_rep_g1[si])
                    + price(self.is_rep_g2[si], rep_index == 3)
            }
        }
    }

    /// Price of the length of a rep match.
    #[inline]
    pub fn rep_len_price(&self, len: u32, pos_state: usize) -> u32 {
        self.rep_len_encoder.price(len - MATCH_LEN_MIN, pos_state)
    }

    /// Price of a rep match after the is-match/is-rep bits.
    #[inline]
    pub fn rep_price(&self, rep_index: usize, len: u32, state: State, pos_state: usize) -> u32 {
        self.rep_len_price(len, pos_state) + self.pure_rep_price(rep_index, state, pos_state)
    }

    /// Price of the distance and length of a new match.
    #[inline]
    pub fn match_price(&self, dist: u32, len: u32, pos_state: usize) -> u32 {
        self.distance.price(dist, len) + self.len_encoder.price(len - MATCH_LEN_MIN, pos_state)
    }
}
