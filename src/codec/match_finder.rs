//! Match finders over a sliding input window.
//!
//! The [`MatchFinder`] trait is the narrow interface the stream driver and
//! the optimal parser consume. [`BinTreeMatchFinder`] implements it with a
//! binary search tree per hash bucket over a cyclic position buffer.
//!
//! # Window
//!
//! Input is read in large blocks into one buffer. The buffer keeps
//! `dict_size + 4096` bytes behind the current position (the dictionary plus
//! the parser's lookahead) and at least `fast_bytes + 274` bytes ahead of
//! it. When the current position passes the last safe offset, the live part
//! of the buffer is moved to the front and refilled.
//!
//! # Positions
//!
//! Tree and hash entries store logical positions starting at 1, so 0 means
//! empty. Once the logical position reaches `2^30 - 1` every stored entry
//! is rebased, dropping those that left the dictionary.

use std::fmt;
use std::io::{self, Read};
use std::sync::LazyLock;

use super::MATCH_LEN_MAX;
use crate::options::MatchFinderKind;

/// Capacity a `get_matches` output buffer needs: one `(length, distance)`
/// pair per possible length, plus slack.
pub const MAX_MATCH_DISTANCES: usize = MATCH_LEN_MAX as usize * 2 + 2;

/// Bytes the optimal parser may keep behind the match finder position.
pub(crate) const NUM_OPTS: usize = 1 << 12;

const HASH2_SIZE: usize = 1 << 10;
const HASH3_SIZE: usize = 1 << 16;
const BT2_HASH_SIZE: usize = 1 << 16;
const HASH3_OFFSET: usize = HASH2_SIZE;
const EMPTY_HASH_VALUE: u32 = 0;
const MAX_VAL_FOR_NORMALIZE: u32 = (1 << 30) - 1;

static CRC_TABLE: LazyLock<[u32; 256]> = LazyLock::new(|| {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut r = i as u32;
        for _ in 0..8 {
            r = if r & 1 != 0 { (r >> 1) ^ 0xEDB8_8320 } else { r >> 1 };
        }
        *entry = r;
    }
    table
});

/// Source of match candidates for the encoder.
///
/// Positions are relative to the match finder's current position, which
/// runs ahead of the encoder: index `-1` is the byte the last
/// [`get_matches`](MatchFinder::get_matches) call was made for.
pub trait MatchFinder {
    /// Byte source bound by [`init`](MatchFinder::init).
    type Stream: Read;

    /// Binds `stream`, resets all search state and reads the first block.
    fn init(&mut self, stream: Self::Stream) -> io::Result<()>;

    /// Unbinds and returns the stream.
    fn release_stream(&mut self) -> Option<Self::Stream>;

    /// Writes `(length, distance - 1)` pairs for the current position into
    /// `distances`, in strictly increasing length order, and advances by one
    /// byte.
    ///
    /// Returns the number of `u32` values written (twice the pair count).
    /// `distances` must hold at least [`MAX_MATCH_DISTANCES`] values.
    fn get_matches(&mut self, distances: &mut [u32]) -> io::Result<usize>;

    /// Length of the match between `index` and `index - distance - 1`,
    /// capped at `limit` and at the end of input.
    fn get_match_len(&self, index: i32, distance: u32, limit: u32) -> u32;

    /// Byte at `index` relative to the current position.
    fn get_index_byte(&self, index: i32) -> u8;

    /// Bytes from the current position to the end of the input read so far.
    fn num_available_bytes(&self) -> u32;

    /// Advances `num` bytes, updating the search structures without
    /// reporting matches.
    fn skip(&mut self, num: u32) -> io::Result<()>;
}

/// Binary-tree match finder.
pub struct BinTreeMatchFinder<R> {
    stream: Option<R>,
    kind: MatchFinderKind,

    buffer: Vec<u8>,
    keep_before: usize,
    keep_after: usize,
    last_safe: usize,
    buf_pos: usize,
    stream_end: usize,
    pos_limit: usize,
    stream_end_reached: bool,

    pos: u32,
    cyclic_pos: u32,
    cyclic_size: u32,
    match_max_len: u32,
    cut_value: u32,

    son: Vec<u32>,
    hash: Vec<u32>,
    hash_mask: u32,
    fix_hash_size: usize,
}

impl<R> fmt::Debug for BinTreeMatchFinder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinTreeMatchFinder")
            .field("kind", &self.kind)
            .field("cyclic_size", &self.cyclic_size)
            .field("match_max_len", &self.match_max_len)
            .field("cut_value", &self.cut_value)
            .field("block_size", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl<R: Read> BinTreeMatchFinder<R> {
    /// Creates a match finder for a `dict_size` history reporting matches of
    /// up to `fast_bytes` bytes.
    ///
    /// Allocates the window and the search structures; call
    /// [`init`](MatchFinder::init) to bind a stream.
    pub fn new(kind: MatchFinderKind, dict_size: u32, fast_bytes: u32) -> Self {
        let keep_before = dict_size as usize + NUM_OPTS;
        let keep_after = fast_bytes as usize + MATCH_LEN_MAX as usize + 1;
        let reserve = (dict_size as usize + NUM_OPTS + fast_bytes as usize
            + MATCH_LEN_MAX as usize
            + 1)
            / 2
            + 256;
        let block_size = keep_before + keep_after + reserve;

        let cyclic_size = dict_size + 1;

        let (hash_mask, fix_hash_size, hash_size) = match kind {
            MatchFinderKind::Bt2 => (0, 0, BT2_HASH_SIZE),
            MatchFinderKind::Bt4 => {
                let mut hs = dict_size - 1;
                hs |= hs >> 1;
                hs |= hs >> 2;
                hs |= hs >> 4;
                hs |= hs >> 8;
                hs >>= 1;
                hs |= 0xFFFF;
                if hs > (1 << 24) {
                    hs >>= 1;
                }
                let fix = HASH2_SIZE + HASH3_SIZE;
                (hs, fix, hs as usize + 1 + fix)
            }
        };

        Self {
            stream: None,
            kind,
            buffer: vec![0; block_size],
            keep_before,
            keep_after,
            last_safe: block_size - keep_after,
            buf_pos: 0,
            stream_end: 0,
            pos_limit: 0,
            stream_end_reached: false,
            pos: 1,
            cyclic_pos: 0,
            cyclic_size,
            match_max_len: fast_bytes,
            cut_value: 16 + (fast_bytes >> 1),
            son: vec![EMPTY_HASH_VALUE; cyclic_size as usize * 2],
            hash: vec![EMPTY_HASH_VALUE; hash_size],
            hash_mask,
            fix_hash_size,
        }
    }

    /// Returns the match finder variant.
    pub fn kind(&self) -> MatchFinderKind {
        self.kind
    }

    fn min_match_check(&self) -> u32 {
        match self.kind {
            MatchFinderKind::Bt2 => 3,
            MatchFinderKind::Bt4 => 4,
        }
    }

    fn num_hash_direct_bytes(&self) -> u32 {
        match self.kind {
            MatchFinderKind::Bt2 => 2,
            MatchFinderKind::Bt4 => 0,
        }
    }

    fn read_block(&mut self) -> io::Result<()> {
        if self.stream_end_reached {
            return Ok(());
        }
        let block_size = self.buffer.len();
        loop {
            if self.stream_end == block_size {
                return Ok(());
            }
            let read = match self.stream.as_mut() {
                Some(stream) => match stream.read(&mut self.buffer[self.stream_end..]) {
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                },
                None => 0,
            };
            if read == 0 {
                self.pos_limit = self.stream_end.min(self.last_safe);
                self.stream_end_reached = true;
                return Ok(());
            }
            self.stream_end += read;
            if self.stream_end >= self.buf_pos + self.keep_after {
                self.pos_limit = self.stream_end - self.keep_after;
            }
        }
    }

    fn move_block(&mut self) {
        let mut offset = self.buf_pos.saturating_sub(self.keep_before);
        if offset > 0 {
            offset -= 1;
        }
        self.buffer.copy_within(offset..self.stream_end, 0);
        self.buf_pos -= offset;
        self.stream_end -= offset;
        self.pos_limit = self.pos_limit.saturating_sub(offset);
    }

    fn move_pos(&mut self) -> io::Result<()> {
        self.cyclic_pos += 1;
        if self.cyclic_pos >= self.cyclic_size {
            self.cyclic_pos = 0;
        }
        self.buf_pos += 1;
        self.pos += 1;
        if self.buf_pos > self.pos_limit {
            if self.buf_pos > self.last_safe {
                self.move_block();
            }
            self.read_block()?;
        }
        if self.pos == MAX_VAL_FOR_NORMALIZE {
            self.normalize();
        }
        Ok(())
    }

    fn normalize(&mut self) {
        let sub = self.pos - self.cyclic_size;
        for links in [&mut self.son, &mut self.hash] {
            for value in links.iter_mut() {
                *value = if *value <= sub {
                    EMPTY_HASH_VALUE
                } else {
                    *value - sub
                };
            }
        }
        self.pos -= sub;
    }

    fn len_limit(&self) -> u32 {
        if self.buf_pos + self.match_max_len as usize <= self.stream_end {
            self.match_max_len
        } else {
            (self.stream_end - self.buf_pos) as u32
        }
    }

    /// Computes the bucket hashes at the current position.
    ///
    /// Returns `(hash2, hash3, main)`; the first two are only meaningful for
    /// [`MatchFinderKind::Bt4`].
    fn hashes(&self) -> (usize, usize, usize) {
        let cur = self.buf_pos;
        let b = &self.buffer;
        match self.kind {
            MatchFinderKind::Bt2 => (0, 0, b[cur] as usize ^ ((b[cur + 1] as usize) << 8)),
            MatchFinderKind::Bt4 => {
                let crc = &*CRC_TABLE;
                let mut temp = crc[b[cur] as usize] ^ b[cur + 1] as u32;
                let hash2 = (temp as usize) & (HASH2_SIZE - 1);
                temp ^= (b[cur + 2] as u32) << 8;
                let hash3 = (temp as usize) & (HASH3_SIZE - 1);
                let main = (temp ^ (crc[b[cur + 3] as usize] << 5)) & self.hash_mask;
                (hash2, hash3, main as usize)
            }
        }
    }

    fn cyclic_index(&self, delta: u32) -> usize {
        let pos = if delta <= self.cyclic_pos {
            self.cyclic_pos - delta
        } else {
            self.cyclic_pos + self.cyclic_size - delta
        };
        (pos as usize) << 1
    }

    /// Walks the tree rooted at `cur_match`, re-rooting it at the current
    /// position. With `distances`, matches longer than `max_len` are appended
    /// from `offset` onwards.
    fn tree_walk(
        &mut self,
        mut cur_match: u32,
        len_limit: u32,
        mut distances: Option<(&mut [u32], &mut usize, &mut u32)>,
    ) {
        let cur = self.buf_pos;
        let match_min_pos = self.pos.saturating_sub(self.cyclic_size);
        let mut ptr0 = ((self.cyclic_pos as usize) << 1) + 1;
        let mut ptr1 = (self.cyclic_pos as usize) << 1;
        let direct = self.num_hash_direct_bytes();
        let mut len0 = direct;
        let mut len1 = direct;
        let mut count = self.cut_value;

        loop {
            if cur_match <= match_min_pos || count == 0 {
                self.son[ptr0] = EMPTY_HASH_VALUE;
                self.son[ptr1] = EMPTY_HASH_VALUE;
                return;
            }
            count -= 1;

            let delta = self.pos - cur_match;
            let cyclic = self.cyclic_index(delta);
            let pby1 = cur - delta as usize;
            let mut len = len0.min(len1);

            if self.buffer[pby1 + len as usize] == self.buffer[cur + len as usize] {
                len += 1;
                while len != len_limit
                    && self.buffer[pby1 + len as usize] == self.buffer[cur + len as usize]
                {
                    len += 1;
                }
                let record = match distances.as_mut() {
                    Some((out, offset, max_len)) => {
                        if **max_len < len {
                            **max_len = len;
                            out[**offset] = len;
                            out[**offset + 1] = delta - 1;
                            **offset += 2;
                            true
                        } else {
                            false
                        }
                    }
                    None => true,
                };
                if record && len == len_limit {
                    self.son[ptr1] = self.son[cyclic];
                    self.son[ptr0] = self.son[cyclic + 1];
                    return;
                }
            }

            if self.buffer[pby1 + len as usize] < self.buffer[cur + len as usize] {
                self.son[ptr1] = cur_match;
                ptr1 = cyclic + 1;
                cur_match = self.son[ptr1];
                len1 = len;
            } else {
                self.son[ptr0] = cur_match;
                ptr0 = cyclic;
                cur_match = self.son[ptr0];
                len0 = len;
            }
        }
    }
}

impl<R: Read> MatchFinder for BinTreeMatchFinder<R> {
    type Stream = R;

    fn init(&mut self, stream: R) -> io::Result<()> {
        self.stream = Some(stream);
        self.buf_pos = 0;
        self.stream_end = 0;
        self.pos_limit = 0;
        self.stream_end_reached = false;
        self.pos = 1;
        self.cyclic_pos = 0;
        self.hash.fill(EMPTY_HASH_VALUE);
        self.read_block()
    }

    fn release_stream(&mut self) -> Option<R> {
        self.stream.take()
    }

    fn get_matches(&mut self, distances: &mut [u32]) -> io::Result<usize> {
        let len_limit = self.len_limit();
        if len_limit < self.min_match_check() {
            self.move_pos()?;
            return Ok(0);
        }

        let mut offset = 0usize;
        let match_min_pos = self.pos.saturating_sub(self.cyclic_size);
        let cur = self.buf_pos;
        let mut max_len = 1u32;
        let (hash2, hash3, main) = self.hashes();
        let main_slot = self.fix_hash_size + main;
        let cur_match = self.hash[main_slot];

        if self.kind == MatchFinderKind::Bt4 {
            let mut cur_match2 = self.hash[hash2];
            let cur_match3 = self.hash[HASH3_OFFSET + hash3];
            self.hash[hash2] = self.pos;
            self.hash[HASH3_OFFSET + hash3] = self.pos;

            if cur_match2 > match_min_pos
                && self.buffer[cur - (self.pos - cur_match2) as usize] == self.buffer[cur]
            {
                max_len = 2;
                distances[offset] = 2;
                distances[offset + 1] = self.pos - cur_match2 - 1;
                offset += 2;
            }
            if cur_match3 > match_min_pos
                && self.buffer[cur - (self.pos - cur_match3) as usize] == self.buffer[cur]
            {
                if cur_match3 == cur_match2 {
                    offset -= 2;
                }
                max_len = 3;
                distances[offset] = 3;
                distances[offset + 1] = self.pos - cur_match3 - 1;
                offset += 2;
                cur_match2 = cur_match3;
            }
            if offset != 0 && cur_match2 == cur_match {
                offset -= 2;
                max_len = 1;
            }
        }

        self.hash[main_slot] = self.pos;

        let direct = self.num_hash_direct_bytes();
        if direct != 0 && cur_match > match_min_pos {
            let pby1 = cur - (self.pos - cur_match) as usize;
            if self.buffer[pby1 + direct as usize] != self.buffer[cur + direct as usize] {
                max_len = direct;
                distances[offset] = direct;
                distances[offset + 1] = self.pos - cur_match - 1;
                offset += 2;
            }
        }

        self.tree_walk(
            cur_match,
            len_limit,
            Some((distances, &mut offset, &mut max_len)),
        );
        self.move_pos()?;
        Ok(offset)
    }

    fn get_match_len(&self, index: i32, distance: u32, limit: u32) -> u32 {
        let cur = (self.buf_pos as isize + index as isize) as usize;
        let Some(back) = cur.checked_sub(distance as usize + 1) else {
            return 0;
        };
        let limit = (limit as usize).min(self.stream_end.saturating_sub(cur));
        self.buffer[cur..cur + limit]
            .iter()
            .zip(&self.buffer[back..])
            .take_while(|(a, b)| a == b)
            .count() as u32
    }

    #[inline]
    fn get_index_byte(&self, index: i32) -> u8 {
        self.buffer[(self.buf_pos as isize + index as isize) as usize]
    }

    #[inline]
    fn num_available_bytes(&self) -> u32 {
        (self.stream_end - self.buf_pos) as u32
    }

    fn skip(&mut self, num: u32) -> io::Result<()> {
        for _ in 0..num {
            let len_limit = self.len_limit();
            if len_limit < self.min_match_check() {
                self.move_pos()?;
                continue;
            }

            let (hash2, hash3, main) = self.hashes();
            if self.kind == MatchFinderKind::Bt4 {
                self.hash[hash2] = self.pos;
                self.hash[HASH3_OFFSET + hash3] = self.pos;
            }
            let main_slot = self.fix_hash_size + main;
            let cur_match = self.hash[main_slot];
            self.hash[main_slot] = self.pos;

            self.tree_walk(cur_match, len_limit, None);
            self.move_pos()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn finder(kind: MatchFinderKind, data: &[u8]) -> BinTreeMatchFinder<Cursor<Vec<u8>>> {
        let mut mf = BinTreeMatchFinder::new(kind, 1 << 12, 32);
        mf.init(Cursor::new(data.to_vec())).unwrap();
        mf
    }

    /// Runs `get_matches` over the whole input, checking every reported
    /// pair against the data.
    fn check_all_matches<M: MatchFinder>(mf: &mut M, data: &[u8], dict_size: u32) -> usize {
        let mut distances = [0u32; MAX_MATCH_DISTANCES];
        let mut reported = 0;
        for pos in 0..data.len() {
            let available = mf.num_available_bytes() as usize;
            assert!(available > 0 && available <= data.len() - pos);
            let n = mf.get_matches(&mut distances).unwrap();
            assert_eq!(n % 2, 0);
            let mut last_len = 0;
            for pair in distances[..n].chunks(2) {
                let (len, dist) = (pair[0] as usize, pair[1] as usize);
                assert!(len > last_len, "lengths increase at {pos}");
                assert!(dist < dict_size as usize);
                assert!(dist < pos, "distance reaches before input at {pos}");
                assert_eq!(
                    &data[pos..pos + len],
                    &data[pos - dist - 1..pos - dist - 1 + len],
                    "bad match at {pos}"
                );
                last_len = len;
                reported += 1;
            }
        }
        assert_eq!(mf.num_available_bytes(), 0);
        reported
    }

    fn sample_data(len: usize) -> Vec<u8> {
        let words: [&[u8]; 5] = [b"alpha ", b"beta ", b"gamma ", b"delta ", b"epsilon "];
        let mut data = Vec::with_capacity(len);
        let mut x = 12345u32;
        while data.len() < len {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
            if x % 7 == 0 {
                data.push((x >> 16) as u8);
            } else {
                data.extend_from_slice(words[(x >> 16) as usize % words.len()]);
            }
        }
        data.truncate(len);
        data
    }

    /// Reader returning at most `chunk` bytes per call, with an interruption
    /// before every read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "again"));
            }
            let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_crc_table() {
        assert_eq!(CRC_TABLE[0], 0);
        assert_eq!(CRC_TABLE[1], 0x7707_3096);
        assert_eq!(CRC_TABLE[255], 0x2D02_EF8D);
    }

    #[test]
    fn test_empty_input() {
        let mf = finder(MatchFinderKind::Bt4, b"");
        assert_eq!(mf.num_available_bytes(), 0);
    }

    #[test]
    fn test_repeated_pattern_bt4() {
        let data = b"abcdabcdabcdabcd";
        let mut mf = finder(MatchFinderKind::Bt4, data);
        let mut distances = [0u32; MAX_MATCH_DISTANCES];

        for _ in 0..4 {
            assert_eq!(mf.get_matches(&mut distances).unwrap(), 0);
        }
        let n = mf.get_matches(&mut distances).unwrap();
        assert_eq!(n, 2);
        assert_eq!(distances[0], 12);
        assert_eq!(distances[1], 3);
    }

    #[test]
    fn test_repeated_pattern_bt2() {
        let data = b"xyxyxyxyxy";
        let mut mf = finder(MatchFinderKind::Bt2, data);
        let mut distances = [0u32; MAX_MATCH_DISTANCES];

        assert_eq!(mf.get_matches(&mut distances).unwrap(), 0);
        assert_eq!(mf.get_matches(&mut distances).unwrap(), 0);
        let n = mf.get_matches(&mut distances).unwrap();
        assert_eq!(n, 2);
        assert_eq!(distances[0], 8);
        assert_eq!(distances[1], 1);
    }

    #[test]
    fn test_reported_matches_are_real() {
        let data = sample_data(20_000);
        for kind in [MatchFinderKind::Bt2, MatchFinderKind::Bt4] {
            let mut mf = finder(kind, &data);
            let reported = check_all_matches(&mut mf, &data, 1 << 12);
            assert!(reported > 1000, "{kind}: only {reported} matches");
        }
    }

    #[test]
    fn test_window_slides_with_small_reads() {
        // Several block moves with a 4 KiB dictionary
        let data = sample_data(60_000);
        let reader = Trickle {
            data: data.clone(),
            pos: 0,
            chunk: 777,
            interrupt: false,
        };
        let mut mf = BinTreeMatchFinder::new(MatchFinderKind::Bt4, 1 << 12, 64);
        mf.init(reader).unwrap();
        check_all_matches(&mut mf, &data, 1 << 12);
        assert!(mf.release_stream().is_some());
        assert!(mf.release_stream().is_none());
    }

    #[test]
    fn test_skip_then_match() {
        let data = b"hello world, hello world";
        let mut mf = finder(MatchFinderKind::Bt4, data);
        mf.skip(13).unwrap();
        assert_eq!(mf.num_available_bytes(), 11);
        assert_eq!(mf.get_index_byte(0), b'h');
        assert_eq!(mf.get_index_byte(-1), b' ');

        let mut distances = [0u32; MAX_MATCH_DISTANCES];
        let n = mf.get_matches(&mut distances).unwrap();
        assert!(n >= 2);
        assert_eq!(distances[n - 2], 11);
        assert_eq!(distances[n - 1], 12);
    }

    #[test]
    fn test_get_match_len() {
        let data = b"abcabcabx";
        let mut mf = finder(MatchFinderKind::Bt4, data);
        mf.skip(3).unwrap();
        // Current position 3, distance 3 stored as 2
        assert_eq!(mf.get_match_len(0, 2, 100), 5);
        assert_eq!(mf.get_match_len(0, 2, 4), 4);
        assert_eq!(mf.get_match_len(-1, 0, 10), 0);
        // Distances reaching before the input never match
        assert_eq!(mf.get_match_len(0, 10, 10), 0);
    }

    #[test]
    fn test_match_len_capped_at_fast_bytes() {
        let data = vec![7u8; 1000];
        let mut mf = BinTreeMatchFinder::new(MatchFinderKind::Bt4, 1 << 12, 16);
        mf.init(Cursor::new(data)).unwrap();
        let mut distances = [0u32; MAX_MATCH_DISTANCES];
        mf.get_matches(&mut distances).unwrap();
        let n = mf.get_matches(&mut distances).unwrap();
        assert_eq!(distances[n - 2], 16);
        assert_eq!(distances[n - 1], 0);
    }

    #[test]
    fn test_read_error_propagates() {
        let mut mf = BinTreeMatchFinder::new(MatchFinderKind::Bt2, 1 << 12, 32);
        let err = mf.init(Broken).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_reinit_resets_state() {
        let data = sample_data(5000);
        let mut mf = finder(MatchFinderKind::Bt4, &data);
        check_all_matches(&mut mf, &data, 1 << 12);
        mf.init(Cursor::new(data.clone())).unwrap();
        check_all_matches(&mut mf, &data, 1 << 12);
    }

    #[test]
    fn test_debug_output() {
        let mf = finder(MatchFinderKind::Bt2, b"abc");
        let debug = format!("{mf:?}");
        assert!(debug.contains("BinTreeMatchFinder"));
        assert!(debug.contains("Bt2"));
        assert_eq!(mf.kind(), MatchFinderKind::Bt2);
    }
}
