//! LZMA coding machinery.
//!
//! Leaf-first:
//! - [`range_enc`], [`bit_model`], [`bit_tree`]: entropy coding primitives
//! - [`state`]: the 12-state automaton and repeat-distance history
//! - [`literal`], [`length`], [`distance`]: symbol encoders with price caches
//! - [`match_finder`]: the sliding-window match finder interface and its
//!   binary-tree implementation
//! - [`encoder`]: the stream driver
//!
//! The coding context and the optimal parser are internal to the driver.

pub mod bit_model;
pub mod bit_tree;
pub mod distance;
pub mod encoder;
pub mod length;
pub mod literal;
pub(crate) mod lzma_context;
pub mod match_finder;
pub(crate) mod optimum;
pub mod range_enc;
pub mod state;

/// Number of repeat distances kept in the history.
pub const NUM_REPS: usize = 4;

/// Shortest encodable match.
pub const MATCH_LEN_MIN: u32 = 2;

/// Longest encodable match.
pub const MATCH_LEN_MAX: u32 = 273;

/// Largest number of position bits.
pub const NUM_POS_STATES_BITS_MAX: u32 = 4;

/// Largest number of position states.
pub const NUM_POS_STATES_MAX: usize = 1 << NUM_POS_STATES_BITS_MAX;
