//! Streaming byte-pair compression tuned for very small machines.
//!
//! The compressed stream is a flat byte sequence with no header, length
//! prefix or trailer. Both sides rebuild the same pair table from the
//! decoded bytes, so nothing about the table is ever transmitted. Input and
//! output are processed through caller-owned buffers which may be as small
//! as a couple dozen bytes; each call consumes a prefix of its input,
//! fills a prefix of its output and reports both counts so the caller can
//! loop at whatever pace its memory budget allows.

#![forbid(unsafe_code)]

pub mod compress;
pub mod decompress;
pub mod table;

pub use compress::Compressor;
pub use decompress::{DecodeError, Decompressor};

/// Highest run marker byte. Markers `0..=8` encode runs of 3 to 11 bytes.
pub(crate) const RLE_MARKER_MAX: u8 = 8;
/// Smallest byte value that is emitted verbatim and fed into the pair table.
pub(crate) const DIRECT_MIN: u8 = 9;
/// Escape prefix for bytes that would collide with markers or pair codes.
pub(crate) const LITERAL_ESCAPE: u8 = 127;
/// First pair code. Codes `128..=254` index the table as `code - 128`.
pub(crate) const PAIR_BASE: u8 = 128;
/// Shortest run worth a marker.
pub(crate) const RLE_MIN_RUN: usize = 3;
/// Longest run a single marker can express.
pub(crate) const RLE_MAX_RUN: usize = RLE_MIN_RUN + RLE_MARKER_MAX as usize;

/// Number of slots in the pair table, one per code in `128..=254`.
pub const TABLE_SIZE: usize = 127;

/// The byte 0xff never appears in compressed output. Storage layers that
/// erase to 0xff (flash) may append it as a terminator and decode with
/// [`Decompressor::with_eof_sentinel`].
pub const EOF_SENTINEL: u8 = 0xff;

/// Bytes in this range pass through untouched and feed the pair table.
/// Everything else costs a two-byte escape sequence.
pub(crate) fn is_direct(byte: u8) -> bool {
    (DIRECT_MIN..LITERAL_ESCAPE).contains(&byte)
}

/// Byte counts reported back from a single streaming call.
///
/// `consumed` and `produced` may both be short of the buffer sizes; that is
/// a normal return, not an error. Supply the unread input and a drained
/// output buffer on the next call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Bytes taken from the front of the input slice.
    pub consumed: usize,
    /// Bytes written to the front of the output slice.
    pub produced: usize,
}

/// Compress an entire buffer in one go, looping the streaming interface
/// through a small scratch buffer.
pub fn compress_to_vec(input: &[u8]) -> Vec<u8> {
    let mut packer = Compressor::new();
    let mut scratch = [0u8; 256];
    let mut compressed = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let step = packer.compress(&input[pos..], &mut scratch);
        compressed.extend_from_slice(&scratch[..step.produced]);
        pos += step.consumed;
    }
    compressed
}

/// Decompress an entire buffer in one go.
///
/// A stream truncated in the middle of an escape or run sequence yields the
/// decodable prefix; streaming callers can detect the dangling marker by
/// watching their own position instead.
pub fn decompress_to_vec(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut unpacker = Decompressor::new();
    let mut scratch = [0u8; 256];
    let mut decompressed = Vec::new();
    let mut pos = 0;
    loop {
        let step = unpacker.decompress(&input[pos..], &mut scratch)?;
        decompressed.extend_from_slice(&scratch[..step.produced]);
        pos += step.consumed;
        if step.consumed == 0 && step.produced == 0 {
            break;
        }
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use std::str;
    use crate::{compress_to_vec, decompress_to_vec};

    /// Test that the compressed string decompresses to the original string.
    fn inverse(s: &str) {
        let compressed = compress_to_vec(s.as_bytes());
        println!("Compressed '{}' into {:?}", s, compressed);
        let decompressed = decompress_to_vec(&compressed).unwrap();
        println!("Decompressed it into {:?}", str::from_utf8(&decompressed).unwrap());
        assert_eq!(decompressed, s.as_bytes());
    }

    #[test]
    fn shakespear() {
        inverse("to live or not to live");
        inverse("Love is a wonderful terrible thing");
        inverse("There is nothing either good or bad, but thinking makes it so.");
        inverse("I burn, I pine, I perish.");
    }

    #[test]
    fn save_the_pandas() {
        inverse("To cute to die! Save the red panda!");
        inverse("You are 60% water. Save 60% of yourself!");
        inverse("Save water, it doesn't grow on trees.");
        inverse("The panda bear has an amazing black-and-white fur.");
        inverse("The average panda eats as much as 9 to 14 kg of bamboo shoots a day.");
        inverse("The Empress Dowager Bo was buried with a panda skull in her vault");
    }

    #[test]
    fn not_compressible() {
        inverse("as6yhol.;jrew5tyuikbfewedfyjltre22459ba");
        inverse("jhflkdjshaf9p8u89ybkvjsdbfkhvg4ut08yfrr");
    }

    #[test]
    fn short() {
        inverse("ahhd");
        inverse("ahd");
        inverse("x-29");
        inverse("x");
        inverse("k");
        inverse(".");
        inverse("ajsdh");
    }

    #[test]
    fn empty_string() {
        inverse("");
    }

    #[test]
    fn nulls() {
        inverse("\0\0\0\0\0\0\0\0\0\0\0\0\0");
    }

    #[test]
    fn compression_works() {
        let s = "The Read trait allows for reading bytes from a source. Implementors of the Read trait are called 'readers'. Readers are defined by one required method, read().";

        inverse(s);

        assert!(compress_to_vec(s.as_bytes()).len() < s.len());
    }

    #[test]
    fn repeated_text_uses_the_table() {
        // a pair code halves two bytes at best, so repetitive text should
        // settle not far above 50%
        let s = "tick tock tick tock tick tock tick tock tick tock tick tock ".repeat(40);
        let compressed = compress_to_vec(s.as_bytes());
        assert!(compressed.len() * 3 < s.len() * 2);
        assert_eq!(decompress_to_vec(&compressed).unwrap(), s.as_bytes());
    }

    #[test]
    fn every_byte_value_survives() {
        let mut s = Vec::with_capacity(512);
        for n in 0..512 {
            s.push((n % 256) as u8);
        }
        let compressed = compress_to_vec(&s);
        // worst case is an escape per byte
        assert!(compressed.len() <= 2 * s.len());
        assert_eq!(decompress_to_vec(&compressed).unwrap(), s);
    }

    #[test]
    fn big_compression() {
        let mut s = Vec::with_capacity(8_000_000);

        for n in 0..8_000_000 {
            s.push((n as u8).wrapping_mul(0xA).wrapping_add(33) ^ 0xA2);
        }

        assert_eq!(&decompress_to_vec(&compress_to_vec(&s)).unwrap(), &s);
    }
}
