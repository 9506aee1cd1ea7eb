//! Coder state automaton and repeat-distance history.

use super::NUM_REPS;

/// Number of automaton states.
pub const NUM_STATES: usize = 12;

const LIT_NEXT_STATES: [u8; NUM_STATES] = [0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 4, 5];
const MATCH_NEXT_STATES: [u8; NUM_STATES] = [7, 7, 7, 7, 7, 7, 7, 10, 10, 10, 10, 10];
const REP_NEXT_STATES: [u8; NUM_STATES] = [8, 8, 8, 8, 8, 8, 8, 11, 11, 11, 11, 11];
const SHORT_REP_NEXT_STATES: [u8; NUM_STATES] = [9, 9, 9, 9, 9, 9, 9, 11, 11, 11, 11, 11];

/// Summary of the most recent operations, selecting probability contexts.
///
/// States 0-6 follow a literal, states 7-11 follow a match of some kind.
/// A value can only be produced by [`State::new`] and the four transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State(u8);

impl State {
    /// The initial state.
    pub const fn new() -> Self {
        State(0)
    }

    /// Returns the state index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if the last operation was a literal.
    #[inline]
    pub const fn is_char(self) -> bool {
        self.0 < 7
    }

    /// State after a literal.
    #[inline]
    pub const fn update_char(self) -> Self {
        State(LIT_NEXT_STATES[self.0 as usize])
    }

    /// State after a new-distance match.
    #[inline]
    pub const fn update_match(self) -> Self {
        State(MATCH_NEXT_STATES[self.0 as usize])
    }

    /// State after a repeat match.
    #[inline]
    pub const fn update_rep(self) -> Self {
        State(REP_NEXT_STATES[self.0 as usize])
    }

    /// State after a single-byte rep0 match.
    #[inline]
    pub const fn update_short_rep(self) -> Self {
        State(SHORT_REP_NEXT_STATES[self.0 as usize])
    }
}

/// The four most recently used match distances, most recent first.
///
/// Distances are stored zero-based (distance 1 is stored as 0). Reusing a
/// slot moves it to the front; duplicates are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepDistances([u32; NUM_REPS]);

impl RepDistances {
    /// Creates a history of four zero distances.
    pub const fn new() -> Self {
        RepDistances([0; NUM_REPS])
    }

    /// Returns the distance in slot `index`.
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.0[index]
    }

    /// Returns all four slots.
    #[inline]
    pub fn as_array(&self) -> &[u32; NUM_REPS] {
        &self.0
    }

    /// Moves slot `index` to the front, shifting the slots before it down.
    pub fn promote(&mut self, index: usize) {
        let dist = self.0[index];
        self.0.copy_within(0..index, 1);
        self.0[0] = dist;
    }

    /// Pushes a new distance, dropping the oldest one.
    pub fn push(&mut self, dist: u32) {
        self.0.copy_within(0..NUM_REPS - 1, 1);
        self.0[0] = dist;
    }
}

impl From<[u32; NUM_REPS]> for RepDistances {
    fn from(reps: [u32; NUM_REPS]) -> Self {
        RepDistances(reps)
    }
}
