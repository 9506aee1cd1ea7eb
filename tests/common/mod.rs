//! Shared test utilities for integration tests.
//!
//! Decoding goes through `lzma-rust2`, an independent LZMA implementation,
//! so every round-trip checks the encoder against a reference decoder.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{self, Read, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Unpacked size value meaning "unknown, stop at the end marker".
pub const UNKNOWN_SIZE: u64 = u64::MAX;

/// Decodes a header-prefixed LZMA stream.
///
/// `unpacked_size` is [`UNKNOWN_SIZE`] for streams terminated by an end
/// marker. `preset` is the dictionary the stream was trained with.
pub fn try_decode(packed: &[u8], unpacked_size: u64, preset: Option<&[u8]>) -> io::Result<Vec<u8>> {
    if packed.len() < 5 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "LZMA properties too short (need 5 bytes)",
        ));
    }
    let props = packed[0];
    let dict_size = u32::from_le_bytes([packed[1], packed[2], packed[3], packed[4]]);
    let mut reader = lzma_rust2::LzmaReader::new_with_props(
        &packed[5..],
        unpacked_size,
        props,
        dict_size,
        preset,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

/// Decodes a stream whose size is known, panicking on failure.
pub fn decode(packed: &[u8], unpacked_size: usize) -> Vec<u8> {
    try_decode(packed, unpacked_size as u64, None).expect("reference decoder rejected stream")
}

/// Decodes an end-marker terminated stream, panicking on failure.
pub fn decode_until_marker(packed: &[u8]) -> Vec<u8> {
    try_decode(packed, UNKNOWN_SIZE, None).expect("reference decoder rejected stream")
}

/// Decodes an end-marker terminated stream trained on `preset`.
///
/// With a known size the reference decoder shrinks its dictionary to that
/// size and drops the older part of the preset, so trained streams are
/// decoded until the end marker instead.
pub fn decode_with_preset(packed: &[u8], preset: &[u8]) -> Vec<u8> {
    try_decode(packed, UNKNOWN_SIZE, Some(preset)).expect("reference decoder rejected stream")
}

/// Seeded random bytes.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

/// Seeded text-like data with plenty of medium-length repeats.
pub fn text_bytes(len: usize, seed: u64) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "the", "of", "and", "compression", "window", "literal", "match", "distance", "range",
        "coder", "price", "state", "encoder", "length", "tree", "optimal",
    ];
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(len + 16);
    while data.len() < len {
        data.extend_from_slice(WORDS[rng.gen_range(0..WORDS.len())].as_bytes());
        data.push(if rng.gen_ratio(1, 12) { b'\n' } else { b' ' });
    }
    data.truncate(len);
    data
}

/// Reader that yields `remaining` filler bytes and then fails.
pub struct FailingReader {
    pub remaining: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "input went away"));
        }
        let n = buf.len().min(self.remaining);
        buf[..n].fill(0x5A);
        self.remaining -= n;
        Ok(n)
    }
}

/// Writer that accepts `capacity` bytes and then fails.
pub struct FailingWriter {
    pub written: Vec<u8>,
    pub capacity: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.capacity - self.written.len();
        if room == 0 {
            return Err(io::Error::other("disk full"));
        }
        let n = buf.len().min(room);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader that interrupts every other call.
pub struct InterruptingReader<'a> {
    pub data: &'a [u8],
    pub interrupt: bool,
}

impl Read for InterruptingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::ErrorKind::Interrupted.into());
        }
        let n = buf.len().min(self.data.len()).min(1000);
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}
