//! Fuzz target for the encoder with arbitrary input and options.
//!
//! The first four bytes select the options, the rest is compressed and
//! decoded again with an independent LZMA decoder.
//!
//! Run with: cargo +nightly fuzz run compress_roundtrip
//!
//! Properties being tested:
//! - No panics for any valid option set
//! - Every stream decodes back to the input
//! - Training bytes are honored as a preset dictionary

#![no_main]

use std::io::Read;

use libfuzzer_sys::fuzz_target;
use lzopt::{EncoderOptions, MatchFinderKind};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (head, input) = data.split_at(4);

    let fast_bytes = 5 + u32::from(head[0]) % 269;
    let options = EncoderOptions::new()
        .dict_size(1 << 16)
        .fast_bytes(fast_bytes)
        .pos_bits(u32::from(head[1] & 7) % 5)
        .lit_pos_bits(u32::from(head[1] >> 3 & 7) % 5)
        .lit_context_bits(u32::from(head[2] & 7) % 5)
        .match_finder(if head[2] & 0x80 != 0 {
            MatchFinderKind::Bt2
        } else {
            MatchFinderKind::Bt4
        })
        .end_marker(head[2] & 0x40 != 0);

    // The last selector byte picks a training prefix
    let train = (usize::from(head[3]) * 16).min(input.len());
    // Trained streams are decoded until the end marker; a known size would
    // shrink the reference decoder's dictionary below the preset
    let end_marker = options.end_marker || train > 0;
    let options = options.train_size(train as u32).end_marker(end_marker);

    let packed = lzopt::compress(input, &options).expect("valid options must compress");

    let size = if options.end_marker {
        u64::MAX
    } else {
        (input.len() - train) as u64
    };
    let dict_size = u32::from_le_bytes([packed[1], packed[2], packed[3], packed[4]]);
    let mut reader = lzma_rust2::LzmaReader::new_with_props(
        &packed[5..],
        size,
        packed[0],
        dict_size,
        Some(&input[..train]),
    )
    .expect("reference decoder rejected properties");

    let mut unpacked = Vec::new();
    reader
        .read_to_end(&mut unpacked)
        .expect("reference decoder rejected stream");
    assert_eq!(unpacked, &input[train..], "round-trip mismatch");
});
