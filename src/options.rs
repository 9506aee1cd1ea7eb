//! Encoder options and validation.
//!
//! All options are checked by [`EncoderOptions::validate`], which
//! [`LzmaEncoder::new`](crate::LzmaEncoder::new) calls before any input is
//! read. An out-of-range value fails with
//! [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration).
//!
//! # Example
//!
//! ```rust
//! use lzopt::{EncoderOptions, MatchFinderKind};
//!
//! let options = EncoderOptions::new()
//!     .dict_size(1 << 20)
//!     .fast_bytes(64)
//!     .match_finder(MatchFinderKind::Bt4)
//!     .end_marker(true);
//! options.validate().unwrap();
//! assert_eq!(options.properties()[0], 0x5D);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::codec::{MATCH_LEN_MAX, NUM_POS_STATES_BITS_MAX};
use crate::{Error, Result};

/// Minimum dictionary size (4 KiB).
pub const DICT_SIZE_MIN: u32 = 1 << 12;

/// Maximum dictionary size (512 MiB).
pub const DICT_SIZE_MAX: u32 = 1 << 29;

/// Default dictionary size (4 MiB).
pub const DICT_SIZE_DEFAULT: u32 = 1 << 22;

/// Minimum number of fast bytes.
pub const FAST_BYTES_MIN: u32 = 5;

/// Maximum number of fast bytes (the longest encodable match).
pub const FAST_BYTES_MAX: u32 = MATCH_LEN_MAX;

/// Default number of fast bytes.
pub const FAST_BYTES_DEFAULT: u32 = 32;

/// Largest accepted literal context bits value.
pub const LIT_CONTEXT_BITS_MAX: u32 = 4;

/// Largest accepted literal position bits value.
pub const LIT_POS_BITS_MAX: u32 = 4;

/// Match finder variant.
///
/// Both variants are binary-tree match finders; they differ in the width of
/// the hash used to locate the tree root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchFinderKind {
    /// Two direct hash bytes. Cheaper per position, weaker on large inputs.
    Bt2,
    /// Hashes over two, three and four bytes.
    #[default]
    Bt4,
}

impl MatchFinderKind {
    /// Returns the number of bytes hashed to locate candidates.
    pub fn hash_bytes(self) -> u32 {
        match self {
            Self::Bt2 => 2,
            Self::Bt4 => 4,
        }
    }
}

impl fmt::Display for MatchFinderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bt2 => f.write_str("bt2"),
            Self::Bt4 => f.write_str("bt4"),
        }
    }
}

impl FromStr for MatchFinderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("bt2") {
            Ok(Self::Bt2)
        } else if s.eq_ignore_ascii_case("bt4") {
            Ok(Self::Bt4)
        } else {
            Err(Error::invalid_config(
                "match_finder",
                format!("unknown match finder '{s}' (expected bt2 or bt4)"),
            ))
        }
    }
}

/// Options for [`LzmaEncoder`](crate::LzmaEncoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Dictionary size in bytes.
    ///
    /// Written verbatim into the properties header. Internally the distance
    /// tables are sized for the next power of two.
    pub dict_size: u32,
    /// Match length at which the optimal parser stops searching and takes
    /// the match greedily (5-273).
    pub fast_bytes: u32,
    /// Match finder variant.
    pub match_finder: MatchFinderKind,
    /// Number of position bits used for the match/length contexts (0-4).
    pub pos_bits: u32,
    /// Number of position bits used for literal contexts (0-4).
    pub lit_pos_bits: u32,
    /// Number of high bits of the previous byte used for literal contexts (0-4).
    pub lit_context_bits: u32,
    /// Whether to terminate the stream with an end marker.
    pub end_marker: bool,
    /// Number of leading input bytes used only to prime the match finder.
    ///
    /// These bytes are not encoded; a decoder must be given the same bytes
    /// as a preset dictionary. Must not exceed `dict_size`.
    pub train_size: u32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            dict_size: DICT_SIZE_DEFAULT,
            fast_bytes: FAST_BYTES_DEFAULT,
            match_finder: MatchFinderKind::Bt4,
            pos_bits: 2,
            lit_pos_bits: 0,
            lit_context_bits: 3,
            end_marker: false,
            train_size: 0,
        }
    }
}

impl EncoderOptions {
    /// Creates options with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dictionary size.
    pub fn dict_size(mut self, dict_size: u32) -> Self {
        self.dict_size = dict_size;
        self
    }

    /// Sets the number of fast bytes.
    pub fn fast_bytes(mut self, fast_bytes: u32) -> Self {
        self.fast_bytes = fast_bytes;
        self
    }

    /// Sets the match finder variant.
    pub fn match_finder(mut self, kind: MatchFinderKind) -> Self {
        self.match_finder = kind;
        self
    }

    /// Sets the number of position bits.
    pub fn pos_bits(mut self, bits: u32) -> Self {
        self.pos_bits = bits;
        self
    }

    /// Sets the number of literal position bits.
    pub fn lit_pos_bits(mut self, bits: u32) -> Self {
        self.lit_pos_bits = bits;
        self
    }

    /// Sets the number of literal context bits.
    pub fn lit_context_bits(mut self, bits: u32) -> Self {
        self.lit_context_bits = bits;
        self
    }

    /// Enables or disables the end marker.
    pub fn end_marker(mut self, enabled: bool) -> Self {
        self.end_marker = enabled;
        self
    }

    /// Sets the number of training bytes.
    pub fn train_size(mut self, train_size: u32) -> Self {
        self.train_size = train_size;
        self
    }

    /// Checks every option against its supported range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first rejected option.
    pub fn validate(&self) -> Result<()> {
        if !(DICT_SIZE_MIN..=DICT_SIZE_MAX).contains(&self.dict_size) {
            return Err(Error::invalid_config(
                "dict_size",
                format!(
                    "{} is outside {}..={}",
                    self.dict_size, DICT_SIZE_MIN, DICT_SIZE_MAX
                ),
            ));
        }
        if !(FAST_BYTES_MIN..=FAST_BYTES_MAX).contains(&self.fast_bytes) {
            return Err(Error::invalid_config(
                "fast_bytes",
                format!(
                    "{} is outside {}..={}",
                    self.fast_bytes, FAST_BYTES_MIN, FAST_BYTES_MAX
                ),
            ));
        }
        if self.pos_bits > NUM_POS_STATES_BITS_MAX {
            return Err(Error::invalid_config(
                "pos_bits",
                format!("{} exceeds {}", self.pos_bits, NUM_POS_STATES_BITS_MAX),
            ));
        }
        if self.lit_pos_bits > LIT_POS_BITS_MAX {
            return Err(Error::invalid_config(
                "lit_pos_bits",
                format!("{} exceeds {}", self.lit_pos_bits, LIT_POS_BITS_MAX),
            ));
        }
        if self.lit_context_bits > LIT_CONTEXT_BITS_MAX {
            return Err(Error::invalid_config(
                "lit_context_bits",
                format!(
                    "{} exceeds {}",
                    self.lit_context_bits, LIT_CONTEXT_BITS_MAX
                ),
            ));
        }
        if self.train_size > self.dict_size {
            return Err(Error::invalid_config(
                "train_size",
                format!(
                    "{} exceeds the dictionary size {}",
                    self.train_size, self.dict_size
                ),
            ));
        }
        Ok(())
    }

    /// Returns the 5-byte coder properties header.
    ///
    /// Byte 0 packs `(pos_bits * 5 + lit_pos_bits) * 9 + lit_context_bits`,
    /// bytes 1-4 hold the dictionary size in little-endian order.
    pub fn properties(&self) -> [u8; 5] {
        let mut props = [0u8; 5];
        props[0] = ((self.pos_bits * 5 + self.lit_pos_bits) * 9 + self.lit_context_bits) as u8;
        props[1..].copy_from_slice(&self.dict_size.to_le_bytes());
        props
    }

    /// Returns the number of distance slots needed to cover the dictionary.
    pub(crate) fn dist_table_size(&self) -> u32 {
        let mut log = 0u32;
        while log < 30 && self.dict_size > (1u32 << log) {
            log += 1;
        }
        log * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = EncoderOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.fast_bytes, 32);
        assert_eq!(options.pos_bits, 2);
        assert_eq!(options.lit_pos_bits, 0);
        assert_eq!(options.lit_context_bits, 3);
        assert_eq!(options.match_finder, MatchFinderKind::Bt4);
        assert!(!options.end_marker);
    }

    #[test]
    fn test_properties_header() {
        let options = EncoderOptions::new()
            .pos_bits(2)
            .lit_pos_bits(0)
            .lit_context_bits(3)
            .dict_size(1 << 22);
        assert_eq!(options.properties(), [0x5D, 0x00, 0x00, 0x40, 0x00]);
    }

    #[test]
    fn test_properties_header_odd_values() {
        let options = EncoderOptions::new()
            .pos_bits(4)
            .lit_pos_bits(4)
            .lit_context_bits(4)
            .dict_size(0x0012_3456);
        // (4 * 5 + 4) * 9 + 4 = 220
        assert_eq!(options.properties(), [220, 0x56, 0x34, 0x12, 0x00]);
    }

    #[test]
    fn test_fast_bytes_range() {
        assert!(EncoderOptions::new().fast_bytes(5).validate().is_ok());
        assert!(EncoderOptions::new().fast_bytes(273).validate().is_ok());

        let err = EncoderOptions::new().fast_bytes(4).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration {
                parameter: "fast_bytes",
                ..
            }
        ));
        assert!(EncoderOptions::new().fast_bytes(274).validate().is_err());
    }

    #[test]
    fn test_dict_size_range() {
        assert!(EncoderOptions::new().dict_size(1 << 12).validate().is_ok());
        assert!(EncoderOptions::new().dict_size(1 << 29).validate().is_ok());

        let err = EncoderOptions::new().dict_size(4095).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration {
                parameter: "dict_size",
                ..
            }
        ));
        assert!(
            EncoderOptions::new()
                .dict_size((1 << 29) + 1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_context_bits_range() {
        assert!(EncoderOptions::new().pos_bits(5).validate().is_err());
        assert!(EncoderOptions::new().lit_pos_bits(5).validate().is_err());
        assert!(EncoderOptions::new().lit_context_bits(5).validate().is_err());
        assert!(
            EncoderOptions::new()
                .pos_bits(0)
                .lit_pos_bits(0)
                .lit_context_bits(0)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_train_size_fits_dictionary() {
        let options = EncoderOptions::new().dict_size(1 << 16);
        assert!(options.clone().train_size(1 << 16).validate().is_ok());

        let err = options.train_size((1 << 16) + 1).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration {
                parameter: "train_size",
                ..
            }
        ));
    }

    #[test]
    fn test_match_finder_from_str() {
        assert_eq!(
            "bt2".parse::<MatchFinderKind>().unwrap(),
            MatchFinderKind::Bt2
        );
        assert_eq!(
            "BT4".parse::<MatchFinderKind>().unwrap(),
            MatchFinderKind::Bt4
        );

        let err = "hc4".parse::<MatchFinderKind>().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("hc4"));
    }

    #[test]
    fn test_match_finder_display_roundtrip() {
        for kind in [MatchFinderKind::Bt2, MatchFinderKind::Bt4] {
            assert_eq!(kind.to_string().parse::<MatchFinderKind>().unwrap(), kind);
        }
        assert_eq!(MatchFinderKind::Bt2.hash_bytes(), 2);
        assert_eq!(MatchFinderKind::Bt4.hash_bytes(), 4);
    }

    #[test]
    fn test_dist_table_size() {
        assert_eq!(EncoderOptions::new().dict_size(1 << 12).dist_table_size(), 24);
        assert_eq!(EncoderOptions::new().dict_size(1 << 22).dist_table_size(), 44);
        // Rounded up to the next power of two
        assert_eq!(
            EncoderOptions::new()
                .dict_size((1 << 22) + 1)
                .dist_table_size(),
            46
        );
        assert_eq!(EncoderOptions::new().dict_size(1 << 29).dist_table_size(), 58);
    }
}
