//! The decompression side.
//!
//! Every compressed byte is classified by range: run marker, direct byte,
//! escape prefix, pair code or the reserved 0xff. The awkward part is
//! suspension: an input chunk may end between a marker and its payload, and
//! an output chunk may fill in the middle of a run. Both are handled by an
//! explicit pending state that is drained first on the next call, so a
//! marker is consumed exactly once no matter where the buffers end.

use log::debug;
use thiserror::Error;
use fehler::{throw, throws};

use crate::table::PairTable;
use crate::{Progress, EOF_SENTINEL, LITERAL_ESCAPE, PAIR_BASE, RLE_MARKER_MAX, RLE_MIN_RUN};

/// Errors when decoding a compressed stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum DecodeError {
    #[error("found byte 0xff, which the compressor never emits. Either the stream is corrupted or it carries a storage-level end marker and you wanted `Decompressor::with_eof_sentinel`.")]
    ReservedByte,
    #[error("pair code {0:#04x} references an empty table slot. This stream is corrupted, or it was cut from the middle of a longer stream whose earlier bytes built up the table.")]
    EmptyPairSlot(u8),
}
type Error = DecodeError; // do it this way for better docs

/// Expansion state carried across calls when a sequence straddles a buffer
/// boundary.
#[derive(Clone, Copy, Debug)]
enum Pending {
    /// Between whole sequences.
    Idle,
    /// A run marker was consumed but its value byte has not arrived yet.
    AwaitRunValue { len: u8 },
    /// Producing `remaining` more copies of `value`.
    Run { value: u8, remaining: u8 },
    /// An escape prefix was consumed but the escaped byte has not arrived.
    AwaitLiteral,
}

/// A streaming decompressor.
///
/// Pair it with the [`Compressor`](crate::Compressor) that produced the
/// stream, from the first byte: the table is rebuilt incrementally from the
/// decoded output, so starting mid-stream decodes garbage or errors out.
///
/// After any `Err` the internal state is unspecified and the instance must
/// be discarded.
#[derive(Clone)]
pub struct Decompressor {
    table: PairTable,
    pending: Pending,
    sentinel_mode: bool,
    eof: bool,
}

impl Default for Decompressor {
    fn default() -> Self {
        Decompressor::new()
    }
}

impl Decompressor {
    /// A strict decompressor: byte 0xff in the input is an error.
    pub fn new() -> Self {
        Decompressor {
            table: PairTable::default(),
            pending: Pending::Idle,
            sentinel_mode: false,
            eof: false,
        }
    }

    /// A decompressor that treats 0xff as end-of-stream.
    ///
    /// Meant for storage that erases to 0xff (flash): the writer can leave
    /// the compressed stream unterminated and the reader stops at the first
    /// erased byte. The sentinel is consumed from the input but produces no
    /// output, and every later call reports no progress with
    /// [`eof_seen`](Decompressor::eof_seen) still true.
    pub fn with_eof_sentinel() -> Self {
        Decompressor {
            sentinel_mode: true,
            ..Decompressor::new()
        }
    }

    /// Whether the end-of-stream sentinel has been consumed.
    pub fn eof_seen(&self) -> bool {
        self.eof
    }

    /// Decompress a prefix of `input` into a prefix of `output`.
    ///
    /// Returns how much of each was used; a short return just means the
    /// respective buffer ran out. `output` must be at least 2 bytes so a
    /// pair code can always be expanded. Returning `consumed == 0` and
    /// `produced == 0` with non-empty input and a 2-byte-plus output means
    /// the stream ended inside a sequence whose payload never arrived.
    #[throws]
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Progress {
        let mut consumed = 0;
        let mut produced = 0;

        loop {
            // Anything left over from the previous call goes out first.
            match self.pending {
                Pending::Idle => {}
                Pending::Run { value, remaining } => {
                    let step = usize::from(remaining).min(output.len() - produced);
                    for slot in &mut output[produced..produced + step] {
                        *slot = value;
                    }
                    produced += step;
                    let remaining = remaining - step as u8;
                    if remaining > 0 {
                        // output filled up mid-run
                        self.pending = Pending::Run { value, remaining };
                        break;
                    }
                    self.pending = Pending::Idle;
                }
                Pending::AwaitRunValue { len } => {
                    if consumed == input.len() {
                        break;
                    }
                    let value = input[consumed];
                    consumed += 1;
                    self.pending = Pending::Run { value, remaining: len };
                    continue;
                }
                Pending::AwaitLiteral => {
                    if consumed == input.len() || produced == output.len() {
                        break;
                    }
                    output[produced] = input[consumed];
                    produced += 1;
                    consumed += 1;
                    self.pending = Pending::Idle;
                }
            }

            if self.eof || consumed == input.len() || produced == output.len() {
                break;
            }

            let byte = input[consumed];
            match byte {
                0..=RLE_MARKER_MAX => {
                    consumed += 1;
                    self.pending = Pending::AwaitRunValue { len: byte + RLE_MIN_RUN as u8 };
                }
                LITERAL_ESCAPE => {
                    consumed += 1;
                    self.pending = Pending::AwaitLiteral;
                }
                EOF_SENTINEL => {
                    if !self.sentinel_mode {
                        throw!(Error::ReservedByte);
                    }
                    consumed += 1;
                    self.eof = true;
                    debug!("end-of-stream sentinel reached");
                    break;
                }
                code if code >= PAIR_BASE => {
                    if output.len() - produced < 2 {
                        // leave the code for a call with room for the pair
                        break;
                    }
                    let (a, b) = self
                        .table
                        .get(code - PAIR_BASE)
                        .ok_or(Error::EmptyPairSlot(code))?;
                    consumed += 1;
                    output[produced] = a;
                    output[produced + 1] = b;
                    produced += 2;
                    self.table.push(a);
                    self.table.push(b);
                }
                direct => {
                    output[produced] = direct;
                    produced += 1;
                    consumed += 1;
                    self.table.push(direct);
                }
            }
        }

        Progress { consumed, produced }
    }

    /// Occupied slots and summed counts of the internal table.
    pub fn utilization(&self) -> (usize, u64) {
        self.table.utilization()
    }
}
