//! # lzopt
//!
//! A pure-Rust LZMA encoder built around a price-driven optimal parser.
//!
//! For every position of a bounded lookahead window the encoder weighs
//! literals, repeat matches and new matches by their estimated cost in
//! bits under the current adaptive models, and emits the cheapest path
//! through an adaptive binary range coder. The output is a standard LZMA
//! stream that any conformant decoder can read.
//!
//! ## Quick Start
//!
//! ### Compressing a Buffer
//!
//! ```rust
//! use lzopt::{EncoderOptions, Result, compress};
//!
//! fn main() -> Result<()> {
//!     let data = b"to be or not to be, that is the question".repeat(100);
//!     let packed = compress(&data, &EncoderOptions::default())?;
//!
//!     // 5-byte properties header, then the payload
//!     assert_eq!(&packed[..5], &EncoderOptions::default().properties());
//!     assert!(packed.len() < data.len() / 10);
//!     Ok(())
//! }
//! ```
//!
//! ### Compressing a Stream with Progress
//!
//! ```rust,no_run
//! use lzopt::progress::AtomicProgress;
//! use lzopt::{EncoderOptions, MatchFinderKind, Result, compress_stream};
//! use std::fs::File;
//! use std::io::{BufReader, BufWriter};
//!
//! fn main() -> Result<()> {
//!     let options = EncoderOptions::new()
//!         .dict_size(1 << 24)
//!         .fast_bytes(64)
//!         .match_finder(MatchFinderKind::Bt4)
//!         .end_marker(true);
//!
//!     let input = BufReader::new(File::open("input.bin")?);
//!     let output = BufWriter::new(File::create("input.bin.lzma")?);
//!
//!     // Cancel from another thread with `progress.cancel()`
//!     let mut progress = AtomicProgress::shared();
//!     let summary = compress_stream(input, output, &options, &mut progress)?;
//!     println!(
//!         "{} -> {} bytes ({:.1}%)",
//!         summary.in_bytes,
//!         summary.out_bytes,
//!         summary.ratio() * 100.0
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! | Option | Range | Default |
//! |--------|-------|---------|
//! | `dict_size` | 4 KiB - 512 MiB | 4 MiB |
//! | `fast_bytes` | 5 - 273 | 32 |
//! | `match_finder` | `bt2`, `bt4` | `bt4` |
//! | `pos_bits` | 0 - 4 | 2 |
//! | `lit_pos_bits` | 0 - 4 | 0 |
//! | `lit_context_bits` | 0 - 4 | 3 |
//! | `end_marker` | bool | `false` |
//! | `train_size` | 0 - `dict_size` | 0 |
//!
//! Options are validated when the encoder is created, before any input is
//! read.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust
//! use lzopt::{EncoderOptions, Error, compress};
//!
//! match compress(b"data", &EncoderOptions::new().fast_bytes(300)) {
//!     Err(Error::InvalidConfiguration { parameter, reason }) => {
//!         eprintln!("bad {parameter}: {reason}");
//!     }
//!     Err(e) => eprintln!("compression failed: {e}"),
//!     Ok(packed) => println!("{} bytes", packed.len()),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: run
//! start and end at `debug`, price table rebuilds at `trace`. No logger is
//! installed by the library.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

use std::io::{Read, Write};

pub mod codec;
pub mod error;
pub mod options;
pub mod progress;

pub use codec::encoder::{EncodeSummary, LzmaEncoder};
pub use error::{Error, Result};
pub use options::{EncoderOptions, MatchFinderKind};
pub use progress::{NoProgress, ProgressReporter};

/// Compresses `data` into a self-describing LZMA stream.
///
/// The result is the 5-byte properties header followed by the payload.
/// Unless `end_marker` is set, the decoder must learn the uncompressed
/// size out of band.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if `options` are out of range.
pub fn compress(data: &[u8], options: &EncoderOptions) -> Result<Vec<u8>> {
    let mut encoder = LzmaEncoder::new(options.clone())?;
    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    out.extend_from_slice(&encoder.properties());
    encoder.encode(data, &mut out, &mut NoProgress)?;
    Ok(out)
}

/// Compresses everything `reader` yields into `writer`.
///
/// Writes the 5-byte properties header and then the payload. The returned
/// summary counts payload bytes only.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] for bad options,
/// [`Error::Io`] if either stream fails and [`Error::Cancelled`] if
/// `progress` asks to stop. After `Io` or `Cancelled` the output is
/// truncated and must be discarded.
pub fn compress_stream<R: Read, W: Write>(
    reader: R,
    mut writer: W,
    options: &EncoderOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<EncodeSummary> {
    let mut encoder = LzmaEncoder::new(options.clone())?;
    writer.write_all(&encoder.properties())?;
    encoder.encode(reader, writer, progress)
}
