//! Round-trip integration tests for lzopt.
//!
//! Every stream produced here is decoded with an independent reference
//! decoder and compared against the input.
//!
//! This file covers:
//! - Random and highly repetitive inputs of assorted sizes
//! - Both match finders, with and without the end marker
//! - Literal/position context extremes and fast-bytes extremes
//! - Training with a preset dictionary
//! - Exact header and empty-stream bytes
//! - Cancellation and I/O failures

mod common;

use std::io::{self, Read};

use common::{
    FailingReader, FailingWriter, InterruptingReader, decode, decode_until_marker,
    decode_with_preset, random_bytes, text_bytes,
};
use lzopt::progress::{AtomicProgress, NoProgress, StatisticsProgress};
use lzopt::{EncoderOptions, Error, MatchFinderKind, compress, compress_stream};

fn assert_roundtrip(data: &[u8], options: &EncoderOptions) -> Vec<u8> {
    let packed = compress(data, options).expect("compression failed");
    assert_eq!(&packed[..5], &options.properties());
    let unpacked = if options.end_marker {
        decode_until_marker(&packed)
    } else {
        decode(&packed, data.len())
    };
    assert!(unpacked == data, "round-trip mismatch for {} bytes", data.len());
    packed
}

#[test]
fn test_random_sizes() {
    for (i, &size) in [0usize, 1, 2, 17, 4096, 1_000_000].iter().enumerate() {
        let data = random_bytes(size, i as u64);
        let packed = assert_roundtrip(&data, &EncoderOptions::default());
        // Incompressible input must not blow up
        assert!(packed.len() <= size + size / 50 + 32, "{size}: {}", packed.len());
    }
}

#[test]
fn test_repeated_three_byte_pattern() {
    let data = b"xyz".repeat(100_000);
    let packed = assert_roundtrip(&data, &EncoderOptions::default());
    assert!(packed.len() < 1_000, "{} bytes", packed.len());
}

#[test]
fn test_match_finders_with_and_without_end_marker() {
    let data = text_bytes(200_000, 1);
    for kind in [MatchFinderKind::Bt2, MatchFinderKind::Bt4] {
        for end_marker in [false, true] {
            let options = EncoderOptions::new()
                .match_finder(kind)
                .end_marker(end_marker);
            let packed = assert_roundtrip(&data, &options);
            assert!(packed.len() < data.len() / 3, "{kind}: {}", packed.len());
        }
    }
}

#[test]
fn test_context_bit_extremes() {
    let data = text_bytes(60_000, 2);
    for (pb, lp, lc) in [(0, 0, 0), (4, 4, 4), (0, 4, 0), (4, 0, 4), (2, 1, 2)] {
        let options = EncoderOptions::new()
            .pos_bits(pb)
            .lit_pos_bits(lp)
            .lit_context_bits(lc);
        assert_roundtrip(&data, &options);
    }
}

#[test]
fn test_fast_bytes_extremes() {
    let mut data = text_bytes(80_000, 3);
    // Long runs exercise the greedy path at every fast-bytes setting
    data.extend(std::iter::repeat_n(b'-', 5_000));
    data.extend(random_bytes(5_000, 3));
    let head = data[..20_000].to_vec();
    data.extend_from_slice(&head);
    for fast_bytes in [5, 6, 32, 128, 272, 273] {
        assert_roundtrip(&data, &EncoderOptions::new().fast_bytes(fast_bytes));
    }
}

#[test]
fn test_window_smaller_than_input() {
    // Repeats farther back than the dictionary must not be referenced
    let block = random_bytes(6_000, 4);
    let mut data = Vec::new();
    for _ in 0..20 {
        data.extend_from_slice(&block);
        data.extend_from_slice(&text_bytes(3_000, data.len() as u64));
    }
    for kind in [MatchFinderKind::Bt2, MatchFinderKind::Bt4] {
        let options = EncoderOptions::new().dict_size(1 << 12).match_finder(kind);
        assert_roundtrip(&data, &options);
    }
}

#[test]
fn test_unaligned_dictionary_size() {
    let data = text_bytes(100_000, 5);
    let options = EncoderOptions::new().dict_size(100_000 - 1);
    let packed = assert_roundtrip(&data, &options);
    assert_eq!(&packed[1..5], &(100_000u32 - 1).to_le_bytes());
}

#[test]
fn test_training_with_preset_dictionary() {
    let preset = text_bytes(30_000, 6);
    let body = [&preset[10_000..25_000], &text_bytes(20_000, 7)[..]].concat();
    let data = [&preset[..], &body[..]].concat();

    let options = EncoderOptions::new()
        .dict_size(1 << 16)
        .end_marker(true)
        .train_size(preset.len() as u32);
    let packed = compress(&data, &options).unwrap();
    assert!(decode_with_preset(&packed, &preset) == body);

    // The preset pays off against coding the body alone
    let cold = compress(&body, &options.clone().train_size(0)).unwrap();
    assert!(packed.len() < cold.len());
}

#[test]
fn test_training_body_reaches_far_into_preset() {
    // Body much shorter than the dictionary, matching text early in the preset
    let preset = text_bytes(5_000, 14);
    let body = [&preset[400..1_400], &text_bytes(1_000, 15)[..]].concat();
    let data = [&preset[..], &body[..]].concat();
    let options = EncoderOptions::new()
        .dict_size(1 << 20)
        .end_marker(true)
        .train_size(preset.len() as u32);
    let packed = compress(&data, &options).unwrap();
    assert!(decode_with_preset(&packed, &preset) == body);
}

#[test]
fn test_training_with_end_marker() {
    let preset = random_bytes(5_000, 8);
    let body = [&preset[..], &b"tail"[..]].concat();
    let data = [&preset[..], &body[..]].concat();
    let options = EncoderOptions::new()
        .train_size(preset.len() as u32)
        .end_marker(true)
        .pos_bits(0);
    let packed = compress(&data, &options).unwrap();
    assert_eq!(decode_with_preset(&packed, &preset), body);
}

#[test]
fn test_header_exactness() {
    let options = EncoderOptions::new()
        .pos_bits(2)
        .lit_pos_bits(0)
        .lit_context_bits(3)
        .dict_size(1 << 22);
    // (2 * 5 + 0) * 9 + 3 = 93
    assert_eq!(options.properties(), [0x5D, 0x00, 0x00, 0x40, 0x00]);
    assert_eq!(&compress(b"abc", &options).unwrap()[..5], &[0x5D, 0x00, 0x00, 0x40, 0x00]);
}

#[test]
fn test_empty_input_exact_bytes() {
    let header: [u8; 5] = [0x5D, 0x00, 0x00, 0x40, 0x00];

    let packed = compress(&[], &EncoderOptions::new()).unwrap();
    assert_eq!(packed, [&header[..], &[0u8; 5][..]].concat());
    assert!(decode(&packed, 0).is_empty());

    let packed = compress(&[], &EncoderOptions::new().end_marker(true)).unwrap();
    let payload: [u8; 10] = [0x00, 0x83, 0xFF, 0xFB, 0xFF, 0xFF, 0xC0, 0x00, 0x00, 0x00];
    assert_eq!(packed, [&header[..], &payload[..]].concat());
    assert!(decode_until_marker(&packed).is_empty());
}

#[test]
fn test_deterministic_output() {
    let data = text_bytes(150_000, 9);
    let options = EncoderOptions::new().fast_bytes(64);
    let first = compress(&data, &options).unwrap();
    let second = compress(&data, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compress_stream_matches_compress() {
    let data = text_bytes(70_000, 10);
    let options = EncoderOptions::new().end_marker(true);

    let mut out = Vec::new();
    let mut progress = StatisticsProgress::new();
    let summary = compress_stream(&data[..], &mut out, &options, &mut progress).unwrap();

    assert_eq!(out, compress(&data, &options).unwrap());
    assert_eq!(summary.in_bytes, data.len() as u64);
    assert_eq!(summary.out_bytes + 5, out.len() as u64);
    assert_eq!(progress.state().callbacks as u64, summary.chunks);
    assert!(summary.ratio() < 0.5);
}

#[test]
fn test_interrupted_reads_are_retried() {
    let data = text_bytes(50_000, 11);
    let reader = InterruptingReader {
        data: &data,
        interrupt: false,
    };
    let mut out = Vec::new();
    compress_stream(reader, &mut out, &EncoderOptions::new(), &mut NoProgress).unwrap();
    assert_eq!(decode(&out, data.len()), data);
}

#[test]
fn test_cancellation_stops_at_chunk_boundary() {
    let data = random_bytes(200_000, 12);
    let full = compress(&data, &EncoderOptions::new()).unwrap();

    let progress = AtomicProgress::shared();
    progress.cancel();
    let mut handle = progress.clone();
    let mut out = Vec::new();
    let err = compress_stream(&data[..], &mut out, &EncoderOptions::new(), &mut handle).unwrap_err();

    assert!(err.is_cancelled());
    assert!(out.len() > 5);
    assert!(out.len() < full.len());
    // Nothing past the first chunk was written
    assert!(progress.in_bytes() < 2 * 4096 + 273);
    assert_eq!(progress.out_bytes() + 5, out.len() as u64);
}

#[test]
fn test_reader_error_is_passed_through() {
    let reader = FailingReader { remaining: 50_000 };
    let options = EncoderOptions::new().dict_size(1 << 12);
    let err = compress_stream(reader, io::sink(), &options, &mut NoProgress).unwrap_err();
    match err {
        Error::Io(e) => {
            assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
            assert_eq!(e.to_string(), "input went away");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_writer_error_is_passed_through() {
    let data = random_bytes(100_000, 13);
    let mut writer = FailingWriter {
        written: Vec::new(),
        capacity: 1_000,
    };
    let err = compress_stream(&data[..], &mut writer, &EncoderOptions::new(), &mut NoProgress)
        .unwrap_err();
    match err {
        Error::Io(e) => assert_eq!(e.to_string(), "disk full"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(writer.written.len(), 1_000);
}

#[test]
fn test_invalid_options_fail_before_reading() {
    struct Untouchable;
    impl Read for Untouchable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            panic!("input read before validation");
        }
    }

    let bad = [
        EncoderOptions::new().fast_bytes(4),
        EncoderOptions::new().fast_bytes(274),
        EncoderOptions::new().dict_size(1 << 11),
        EncoderOptions::new().pos_bits(5),
        EncoderOptions::new().lit_pos_bits(5),
        EncoderOptions::new().lit_context_bits(5),
        EncoderOptions::new().dict_size(1 << 12).train_size(1 << 13),
    ];
    for options in bad {
        let mut out = Vec::new();
        let err = compress_stream(Untouchable, &mut out, &options, &mut NoProgress).unwrap_err();
        assert!(err.is_configuration_error(), "{options:?}");
        assert!(out.is_empty());
    }
}
