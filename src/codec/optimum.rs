//! Price-driven optimal parser.
//!
//! For a window of up to [`NUM_OPTS`] positions ahead of the encoder, the
//! parser finds the cheapest sequence of literals, repeat matches and new
//! matches by forward relaxation over an arena of [`OptimalNode`]s, then
//! walks the back-pointers to reconstruct that sequence and hands it out
//! one operation per call.
//!
//! Besides single operations, three two-step extensions are priced:
//! literal + rep0, rep + literal + rep0 and match + literal + rep0.
//!
//! The match finder always runs ahead of the encoder by
//! `additional_offset` bytes; the driver reads bytes relative to that.

use std::io;

use super::bit_model::INFINITY_PRICE;
use super::lzma_context::LzmaContext;
use super::match_finder::{MAX_MATCH_DISTANCES, MatchFinder, NUM_OPTS};
use super::state::State;
use super::{MATCH_LEN_MAX, NUM_REPS};

/// Back-pointer marker for a literal.
pub(crate) const BACK_LITERAL: u32 = u32::MAX;

/// One parsed operation: `len` bytes and a back value.
///
/// `back` is [`BACK_LITERAL`], a rep index below [`NUM_REPS`], or a
/// zero-based distance plus [`NUM_REPS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operation {
    pub len: u32,
    pub back: u32,
}

impl Operation {
    fn literal() -> Self {
        Self {
            len: 1,
            back: BACK_LITERAL,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.back == BACK_LITERAL
    }
}

/// DP cell of the parser arena.
#[derive(Debug, Clone, Copy)]
struct OptimalNode {
    price: u32,
    pos_prev: usize,
    back_prev: u32,
    prev1_is_char: bool,
    prev2: bool,
    pos_prev2: usize,
    back_prev2: u32,
    state: State,
    backs: [u32; NUM_REPS],
}

impl Default for OptimalNode {
    fn default() -> Self {
        Self {
            price: INFINITY_PRICE,
            pos_prev: 0,
            back_prev: 0,
            prev1_is_char: false,
            prev2: false,
            pos_prev2: 0,
            back_prev2: 0,
            state: State::new(),
            backs: [0; NUM_REPS],
        }
    }
}

impl OptimalNode {
    fn make_as_char(&mut self) {
        self.back_prev = BACK_LITERAL;
        self.prev1_is_char = false;
    }

    fn make_as_short_rep(&mut self) {
        self.back_prev = 0;
        self.prev1_is_char = false;
    }

    fn is_short_rep(&self) -> bool {
        self.back_prev == 0
    }

    /// Relaxes this cell with a direct operation from `pos_prev`.
    #[inline]
    fn relax(&mut self, price: u32, pos_prev: usize, back: u32) {
        if price < self.price {
            self.price = price;
            self.pos_prev = pos_prev;
            self.back_prev = back;
            self.prev1_is_char = false;
        }
    }
}

/// Optimal parser state. Reused across windows and runs.
#[derive(Debug)]
pub(crate) struct OptimalParser {
    nodes: Vec<OptimalNode>,
    match_distances: [u32; MAX_MATCH_DISTANCES],
    num_distances: usize,
    additional_offset: u32,
    longest_match_len: u32,
    longest_match_found: bool,
    end_index: usize,
    current_index: usize,
    fast_bytes: u32,
    reps: [u32; NUM_REPS],
    rep_lens: [u32; NUM_REPS],
    peak_end: usize,
}

impl OptimalParser {
    pub fn new(fast_bytes: u32) -> Self {
        Self {
            nodes: vec![OptimalNode::default(); NUM_OPTS],
            match_distances: [0; MAX_MATCH_DISTANCES],
            num_distances: 0,
            additional_offset: 0,
            longest_match_len: 0,
            longest_match_found: false,
            end_index: 0,
            current_index: 0,
            fast_bytes,
            reps: [0; NUM_REPS],
            rep_lens: [0; NUM_REPS],
            peak_end: 0,
        }
    }

    /// Clears the arena and all lookahead state for a new stream.
    pub fn reset(&mut self) {
        self.nodes.fill(OptimalNode::default());
        self.num_distances = 0;
        self.additional_offset = 0;
        self.longest_match_len = 0;
        self.longest_match_found = false;
        self.end_index = 0;
        self.current_index = 0;
        self.peak_end = 0;
    }

    /// Bytes the match finder has advanced past the encoder.
    #[inline]
    pub fn additional_offset(&self) -> u32 {
        self.additional_offset
    }

    /// Accounts for `len` bytes the encoder has just emitted.
    #[inline]
    pub fn consume(&mut self, len: u32) {
        self.additional_offset -= len;
    }

    /// Highest arena index any window has used.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn peak_end(&self) -> usize {
        self.peak_end
    }

    /// Fetches the matches at the next match finder position.
    ///
    /// Returns the longest match length, extended past `fast_bytes` when
    /// the match finder stopped there.
    pub fn read_match_distances<M: MatchFinder>(&mut self, mf: &mut M) -> io::Result<u32> {
        let mut len = 0;
        self.num_distances = mf.get_matches(&mut self.match_distances)?;
        if self.num_distances > 0 {
            len = self.match_distances[self.num_distances - 2];
            if len == self.fast_bytes {
                len += mf.get_match_len(
                    len as i32 - 1,
                    self.match_distances[self.num_distances - 1],
                    MATCH_LEN_MAX - len,
                );
            }
        }
        self.additional_offset += 1;
        Ok(len)
    }

    fn move_pos<M: MatchFinder>(&mut self, mf: &mut M, num: u32) -> io::Result<()> {
        if num > 0 {
            mf.skip(num)?;
            self.additional_offset += num;
        }
        Ok(())
    }

    /// Extends the live part of the arena to `index`.
    #[inline]
    fn grow_to(&mut self, len_end: &mut usize, index: usize) {
        while *len_end < index {
            *len_end += 1;
            self.nodes[*len_end].price = INFINITY_PRICE;
        }
        debug_assert!(*len_end < NUM_OPTS);
        self.peak_end = self.peak_end.max(*len_end);
    }

    /// Returns the next operation for the encoder at `position`.
    pub fn get_optimum<M: MatchFinder>(
        &mut self,
        mf: &mut M,
        ctx: &LzmaContext,
        mut position: u32,
    ) -> io::Result<Operation> {
        if self.end_index != self.current_index {
            let node = &self.nodes[self.current_index];
            let op = Operation {
                len: (node.pos_prev - self.current_index) as u32,
                back: node.back_prev,
            };
            self.current_index = node.pos_prev;
            return Ok(op);
        }
        self.current_index = 0;
        self.end_index = 0;

        let fast_bytes = self.fast_bytes;
        let len_main = if self.longest_match_found {
            self.longest_match_found = false;
            self.longest_match_len
        } else {
            self.read_match_distances(mf)?
        };
        let mut num_distances = self.num_distances;

        let num_available = mf.num_available_bytes() + 1;
        if num_available < 2 {
            return Ok(Operation::literal());
        }

        let mut rep_max_index = 0;
        for i in 0..NUM_REPS {
            self.reps[i] = ctx.reps().get(i);
            self.rep_lens[i] = mf.get_match_len(-1, self.reps[i], MATCH_LEN_MAX);
            if self.rep_lens[i] > self.rep_lens[rep_max_index] {
                rep_max_index = i;
            }
        }
        if self.rep_lens[rep_max_index] >= fast_bytes {
            let len = self.rep_lens[rep_max_index];
            self.move_pos(mf, len - 1)?;
            return Ok(Operation {
                len,
                back: rep_max_index as u32,
            });
        }

        if len_main >= fast_bytes {
            let back = self.match_distances[num_distances - 1] + NUM_REPS as u32;
            self.move_pos(mf, len_main - 1)?;
            return Ok(Operation {
                len: len_main,
                back,
            });
        }

        let current_byte = mf.get_index_byte(-1);
        let match_byte = mf.get_index_byte(-(self.reps[0] as i32) - 2);

        if len_main < 2 && current_byte != match_byte && self.rep_lens[rep_max_index] < 2 {
            return Ok(Operation::literal());
        }

        let state = ctx.state();
        self.nodes[0].state = state;
        let pos_state = ctx.pos_state(position);

        self.nodes[1].price = ctx.is_match_price(state, pos_state, false)
            + ctx.literal_price(
                position,
                ctx.previous_byte(),
                !state.is_char(),
                match_byte,
                current_byte,
            );
        self.nodes[1].make_as_char();

        let match_price = ctx.is_match_price(state, pos_state, true);
        let rep_match_price = match_price + ctx.is_rep_price(state, true);

        if match_byte == current_byte {
            let short_rep_price = rep_match_price + ctx.short_rep_price(state, pos_state);
            if short_rep_price < self.nodes[1].price {
                self.nodes[1].price = short_rep_price;
                self.nodes[1].make_as_short_rep();
            }
        }

        let mut len_end = len_main.max(self.rep_lens[rep_max_index]) as usize;
        if len_end < 2 {
            return Ok(Operation {
                len: 1,
                back: self.nodes[1].back_prev,
            });
        }

        self.nodes[1].pos_prev = 0;
        self.nodes[0].backs = self.reps;

        for node in &mut self.nodes[2..=len_end] {
            node.price = INFINITY_PRICE;
        }
        self.peak_end = self.peak_end.max(len_end);

        for i in 0..NUM_REPS {
            let rep_len = self.rep_lens[i];
            if rep_len < 2 {
                continue;
            }
            let price = rep_match_price + ctx.pure_rep_price(i, state, pos_state);
            for len in (2..=rep_len).rev() {
                let cur_and_len_price = price + ctx.rep_len_price(len, pos_state);
                self.nodes[len as usize].relax(cur_and_len_price, 0, i as u32);
            }
        }

        let mut normal_match_price = match_price + ctx.is_rep_price(state, false);

        let mut len = if self.rep_lens[0] >= 2 {
            self.rep_lens[0] + 1
        } else {
            2
        };
        if len <= len_main {
            let mut offs = 0;
            while len > self.match_distances[offs] {
                offs += 2;
            }
            loop {
                let distance = self.match_distances[offs + 1];
                let cur_and_len_price =
                    normal_match_price + ctx.match_price(distance, len, pos_state);
                self.nodes[len as usize].relax(
                    cur_and_len_price,
                    0,
                    distance + NUM_REPS as u32,
                );
                if len == self.match_distances[offs] {
                    offs += 2;
                    if offs == num_distances {
                        break;
                    }
                }
                len += 1;
            }
        }

        let mut cur = 0usize;
        loop {
            cur += 1;
            if cur == len_end {
                return Ok(self.backward(cur));
            }
            let mut new_len = self.read_match_distances(mf)?;
            num_distances = self.num_distances;
            if new_len >= fast_bytes {
                self.longest_match_len = new_len;
                self.longest_match_found = true;
                return Ok(self.backward(cur));
            }
            position += 1;

            let (state, reps) = self.derive_state(cur);
            self.nodes[cur].state = state;
            self.nodes[cur].backs = reps;
            let cur_price = self.nodes[cur].price;

            let current_byte = mf.get_index_byte(-1);
            let match_byte = mf.get_index_byte(-(reps[0] as i32) - 2);
            let pos_state = ctx.pos_state(position);

            let cur_and1_price = cur_price
                + ctx.is_match_price(state, pos_state, false)
                + ctx.literal_price(
                    position,
                    mf.get_index_byte(-2),
                    !state.is_char(),
                    match_byte,
                    current_byte,
                );

            let mut next_is_char = false;
            {
                let next = &mut self.nodes[cur + 1];
                if cur_and1_price < next.price {
                    next.price = cur_and1_price;
                    next.pos_prev = cur;
                    next.make_as_char();
                    next_is_char = true;
                }
            }

            let match_price = cur_price + ctx.is_match_price(state, pos_state, true);
            let rep_match_price = match_price + ctx.is_rep_price(state, true);

            {
                let next = &mut self.nodes[cur + 1];
                if match_byte == current_byte && !(next.pos_prev < cur && next.back_prev == 0) {
                    let short_rep_price = rep_match_price + ctx.short_rep_price(state, pos_state);
                    if short_rep_price <= next.price {
                        next.price = short_rep_price;
                        next.pos_prev = cur;
                        next.make_as_short_rep();
                        next_is_char = true;
                    }
                }
            }

            let num_available_full =
                (mf.num_available_bytes() + 1).min((NUM_OPTS - 1 - cur) as u32);
            if num_available_full < 2 {
                continue;
            }
            let num_available = num_available_full.min(fast_bytes);

            if !next_is_char && match_byte != current_byte {
                // Literal + rep0
                let t = (num_available_full - 1).min(fast_bytes);
                let len_test2 = mf.get_match_len(0, reps[0], t);
                if len_test2 >= 2 {
                    let state2 = state.update_char();
                    let pos_state_next = ctx.pos_state(position + 1);
                    let next_rep_match_price = cur_and1_price
                        + ctx.is_match_price(state2, pos_state_next, true)
                        + ctx.is_rep_price(state2, true);
                    let offset = cur + 1 + len_test2 as usize;
                    self.grow_to(&mut len_end, offset);
                    let cur_and_len_price = next_rep_match_price
                        + ctx.rep_price(0, len_test2, state2, pos_state_next);
                    let node = &mut self.nodes[offset];
                    if cur_and_len_price < node.price {
                        node.price = cur_and_len_price;
                        node.pos_prev = cur + 1;
                        node.back_prev = 0;
                        node.prev1_is_char = true;
                        node.prev2 = false;
                    }
                }
            }

            let mut start_len = 2;

            for rep_index in 0..NUM_REPS {
                let len_test = mf.get_match_len(-1, reps[rep_index], num_available);
                if len_test < 2 {
                    continue;
                }
                self.grow_to(&mut len_end, cur + len_test as usize);
                for len in (2..=len_test).rev() {
                    let cur_and_len_price =
                        rep_match_price + ctx.rep_price(rep_index, len, state, pos_state);
                    self.nodes[cur + len as usize].relax(
                        cur_and_len_price,
                        cur,
                        rep_index as u32,
                    );
                }

                if rep_index == 0 {
                    start_len = len_test + 1;
                }

                // Rep + literal + rep0
                if len_test < num_available_full {
                    let t = (num_available_full - 1 - len_test).min(fast_bytes);
                    let len_test2 = mf.get_match_len(len_test as i32, reps[rep_index], t);
                    if len_test2 >= 2 {
                        let state2 = state.update_rep();
                        let pos_state_next = ctx.pos_state(position + len_test);
                        let cur_and_len_char_price = rep_match_price
                            + ctx.rep_price(rep_index, len_test, state, pos_state)
                            + ctx.is_match_price(state2, pos_state_next, false)
                            + ctx.literal_price(
                                position + len_test,
                                mf.get_index_byte(len_test as i32 - 2),
                                true,
                                mf.get_index_byte(len_test as i32 - 1 - (reps[rep_index] as i32 + 1)),
                                mf.get_index_byte(len_test as i32 - 1),
                            );
                        let state2 = state2.update_char();
                        let pos_state_next = ctx.pos_state(position + len_test + 1);
                        let next_rep_match_price = cur_and_len_char_price
                            + ctx.is_match_price(state2, pos_state_next, true)
                            + ctx.is_rep_price(state2, true);

                        let offset = len_test as usize + 1 + len_test2 as usize;
                        self.grow_to(&mut len_end, cur + offset);
                        let cur_and_len_price = next_rep_match_price
                            + ctx.rep_price(0, len_test2, state2, pos_state_next);
                        let node = &mut self.nodes[cur + offset];
                        if cur_and_len_price < node.price {
                            node.price = cur_and_len_price;
                            node.pos_prev = cur + len_test as usize + 1;
                            node.back_prev = 0;
                            node.prev1_is_char = true;
                            node.prev2 = true;
                            node.pos_prev2 = cur;
                            node.back_prev2 = rep_index as u32;
                        }
                    }
                }
            }

            if new_len > num_available {
                new_len = num_available;
                num_distances = 0;
                while new_len > self.match_distances[num_distances] {
                    num_distances += 2;
                }
                self.match_distances[num_distances] = new_len;
                num_distances += 2;
            }

            if new_len >= start_len {
                normal_match_price = match_price + ctx.is_rep_price(state, false);
                self.grow_to(&mut len_end, cur + new_len as usize);

                let mut offs = 0;
                while start_len > self.match_distances[offs] {
                    offs += 2;
                }

                let mut len_test = start_len;
                loop {
                    let cur_back = self.match_distances[offs + 1];
                    let cur_and_len_price =
                        normal_match_price + ctx.match_price(cur_back, len_test, pos_state);
                    self.nodes[cur + len_test as usize].relax(
                        cur_and_len_price,
                        cur,
                        cur_back + NUM_REPS as u32,
                    );

                    if len_test == self.match_distances[offs] {
                        // Match + literal + rep0
                        if len_test < num_available_full {
                            let t = (num_available_full - 1 - len_test).min(fast_bytes);
                            let len_test2 = mf.get_match_len(len_test as i32, cur_back, t);
                            if len_test2 >= 2 {
                                let state2 = state.update_match();
                                let pos_state_next = ctx.pos_state(position + len_test);
                                let cur_and_len_char_price = cur_and_len_price
                                    + ctx.is_match_price(state2, pos_state_next, false)
                                    + ctx.literal_price(
                                        position + len_test,
                                        mf.get_index_byte(len_test as i32 - 2),
                                        true,
                                        mf.get_index_byte(len_test as i32 - (cur_back as i32 + 1) - 1),
                                        mf.get_index_byte(len_test as i32 - 1),
                                    );
                                let state2 = state2.update_char();
                                let pos_state_next = ctx.pos_state(position + len_test + 1);
                                let next_rep_match_price = cur_and_len_char_price
                                    + ctx.is_match_price(state2, pos_state_next, true)
                                    + ctx.is_rep_price(state2, true);

                                let offset = len_test as usize + 1 + len_test2 as usize;
                                self.grow_to(&mut len_end, cur + offset);
                                let price = next_rep_match_price
                                    + ctx.rep_price(0, len_test2, state2, pos_state_next);
                                let node = &mut self.nodes[cur + offset];
                                if price < node.price {
                                    node.price = price;
                                    node.pos_prev = cur + len_test as usize + 1;
                                    node.back_prev = 0;
                                    node.prev1_is_char = true;
                                    node.prev2 = true;
                                    node.pos_prev2 = cur;
                                    node.back_prev2 = cur_back + NUM_REPS as u32;
                                }
                            }
                        }
                        offs += 2;
                        if offs == num_distances {
                            break;
                        }
                    }
                    len_test += 1;
                }
            }
        }
    }

    /// Reconstructs the coder state and repeat distances at `cur` from the
    /// path recorded in its predecessors.
    fn derive_state(&self, cur: usize) -> (State, [u32; NUM_REPS]) {
        let node = &self.nodes[cur];
        let mut pos_prev = node.pos_prev;
        let mut state = if node.prev1_is_char {
            pos_prev -= 1;
            let before = if node.prev2 {
                let s = self.nodes[node.pos_prev2].state;
                if node.back_prev2 < NUM_REPS as u32 {
                    s.update_rep()
                } else {
                    s.update_match()
                }
            } else {
                self.nodes[pos_prev].state
            };
            before.update_char()
        } else {
            self.nodes[pos_prev].state
        };

        let reps;
        if pos_prev == cur - 1 {
            state = if node.is_short_rep() {
                state.update_short_rep()
            } else {
                state.update_char()
            };
            reps = self.nodes[pos_prev].backs;
        } else {
            let back = if node.prev1_is_char && node.prev2 {
                pos_prev = node.pos_prev2;
                state = state.update_rep();
                node.back_prev2
            } else {
                let back = node.back_prev;
                state = if back < NUM_REPS as u32 {
                    state.update_rep()
                } else {
                    state.update_match()
                };
                back
            };
            let b = self.nodes[pos_prev].backs;
            reps = match back {
                0 => [b[0], b[1], b[2], b[3]],
                1 => [b[1], b[0], b[2], b[3]],
                2 => [b[2], b[0], b[1], b[3]],
                3 => [b[3], b[0], b[1], b[2]],
                dist => [dist - NUM_REPS as u32, b[0], b[1], b[2]],
            };
        }
        (state, reps)
    }

    /// Reverses the back-pointer chain ending at `cur` into forward links
    /// and returns the first operation.
    fn backward(&mut self, mut cur: usize) -> Operation {
        self.end_index = cur;
        let mut pos_mem = self.nodes[cur].pos_prev;
        let mut back_mem = self.nodes[cur].back_prev;
        loop {
            if self.nodes[cur].prev1_is_char {
                let (pos_prev2, back_prev2, prev2) = {
                    let node = &self.nodes[cur];
                    (node.pos_prev2, node.back_prev2, node.prev2)
                };
                self.nodes[pos_mem].make_as_char();
                self.nodes[pos_mem].pos_prev = pos_mem - 1;
                if prev2 {
                    let before = &mut self.nodes[pos_mem - 1];
                    before.prev1_is_char = false;
                    before.pos_prev = pos_prev2;
                    before.back_prev = back_prev2;
                }
            }
            let pos_prev = pos_mem;
            let back_cur = back_mem;

            back_mem = self.nodes[pos_prev].back_prev;
            pos_mem = self.nodes[pos_prev].pos_prev;

            self.nodes[pos_prev].back_prev = back_cur;
            self.nodes[pos_prev].pos_prev = cur;
            cur = pos_prev;
            if cur == 0 {
                break;
            }
        }

        let first = &self.nodes[0];
        let op = Operation {
            len: first.pos_prev as u32,
            back: first.back_prev,
        };
        self.current_index = first.pos_prev;
        op
    }
}
