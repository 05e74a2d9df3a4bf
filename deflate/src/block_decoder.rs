//! Block-type dispatch: stored, fixed-Huffman, and dynamic-Huffman blocks.

use std::sync::OnceLock;

use crate::canonical_code::CanonicalCode;
use crate::error::{Error, Result};
use crate::window::SlidingWindow;
use crate::bitsource::{BitSource, ByteSource};

/// Base length and extra-bit count for length symbols 257..=285
/// (RFC 1951 §3.2.5, table 1).
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];
const LENGTH_EXTRA_BITS: [u32; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance and extra-bit count for distance symbols 0..=29.
const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
const DISTANCE_EXTRA_BITS: [u32; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Order in which code-length code lengths (HCLEN entries) appear in the
/// dynamic-block header, per RFC 1951 §3.2.7.
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

fn fixed_codes() -> &'static (CanonicalCode, CanonicalCode) {
    static FIXED: OnceLock<(CanonicalCode, CanonicalCode)> = OnceLock::new();
    FIXED.get_or_init(|| {
        let mut lit_len_lengths = [0u32; 288];
        for l in lit_len_lengths.iter_mut().take(144) {
            *l = 8;
        }
        for l in lit_len_lengths.iter_mut().take(256).skip(144) {
            *l = 9;
        }
        for l in lit_len_lengths.iter_mut().take(280).skip(256) {
            *l = 7;
        }
        for l in lit_len_lengths.iter_mut().take(288).skip(280) {
            *l = 8;
        }
        let distance_lengths = [5u32; 30];
        (
            CanonicalCode::new(&lit_len_lengths).expect("fixed literal/length code is complete"),
            CanonicalCode::new(&distance_lengths).expect("fixed distance code is complete"),
        )
    })
}

/// Drives the block-type state machine described in RFC 1951 §3.2.3 over a
/// bit source, writing decoded bytes to `out` as they are produced.
pub struct BlockDecoder<'a, R, W> {
    bits: BitSource<&'a mut R>,
    window: SlidingWindow,
    out: &'a mut W,
}

impl<'a, R: std::io::Read, W: std::io::Write> BlockDecoder<'a, R, W> {
    pub fn new(reader: &'a mut R, out: &'a mut W) -> Self {
        Self {
            bits: BitSource::new(reader),
            window: SlidingWindow::new(),
            out,
        }
    }

    /// Decodes blocks until the final block's `BFINAL` bit is set.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let bfinal = self.bits.read_uint(1)? != 0;
            let btype = self.bits.read_uint(2)?;
            match btype {
                0 => self.decode_stored_block()?,
                1 => {
                    let (lit_len, dist) = fixed_codes();
                    self.decode_huffman_block(lit_len, Some(dist))?;
                }
                2 => {
                    let (lit_len, dist) = self.read_dynamic_huffman_header()?;
                    self.decode_huffman_block(&lit_len, dist.as_ref())?;
                }
                _ => return Err(Error::ReservedBlockType),
            }
            if bfinal {
                return Ok(());
            }
        }
    }

    fn decode_stored_block(&mut self) -> Result<()> {
        self.bits.align_to_byte();
        let len_lo = self.bits.read_aligned_byte()? as u16;
        let len_hi = self.bits.read_aligned_byte()? as u16;
        let nlen_lo = self.bits.read_aligned_byte()? as u16;
        let nlen_hi = self.bits.read_aligned_byte()? as u16;
        let len = len_lo | (len_hi << 8);
        let nlen = nlen_lo | (nlen_hi << 8);
        if len != !nlen {
            return Err(Error::CorruptStoredHeader);
        }
        for _ in 0..len {
            let byte = self.bits.read_aligned_byte()?;
            self.window.append(byte);
            self.out.write_all(&[byte])?;
        }
        Ok(())
    }

    /// Reads HLIT/HDIST/HCLEN and the two code-length vectors that follow,
    /// then builds the literal/length and distance codes they describe.
    /// Returns `None` for the distance code when the block declares the
    /// single zero-length "no distances used" placeholder.
    fn read_dynamic_huffman_header(&mut self) -> Result<(CanonicalCode, Option<CanonicalCode>)> {
        let hlit = self.bits.read_uint(5)? as usize + 257;
        let hdist = self.bits.read_uint(5)? as usize + 1;
        let hclen = self.bits.read_uint(4)? as usize + 4;

        let mut code_length_code_lengths = [0u32; 19];
        for i in 0..hclen {
            code_length_code_lengths[CODE_LENGTH_ORDER[i]] = self.bits.read_uint(3)?;
        }
        let code_length_code = CanonicalCode::new(&code_length_code_lengths)?;

        let total = hlit + hdist;
        let mut lengths = Vec::with_capacity(total);
        while lengths.len() < total {
            let symbol = code_length_code.decode(&mut self.bits)?;
            match symbol {
                0..=15 => lengths.push(symbol as u32),
                16 => {
                    let &prev = lengths.last().ok_or(Error::NoPriorLength)?;
                    let repeat = self.bits.read_uint(2)? + 3;
                    for _ in 0..repeat {
                        if lengths.len() >= total {
                            return Err(Error::RunOverflow);
                        }
                        lengths.push(prev);
                    }
                }
                17 => {
                    let repeat = self.bits.read_uint(3)? + 3;
                    for _ in 0..repeat {
                        if lengths.len() >= total {
                            return Err(Error::RunOverflow);
                        }
                        lengths.push(0);
                    }
                }
                18 => {
                    let repeat = self.bits.read_uint(7)? + 11;
                    for _ in 0..repeat {
                        if lengths.len() >= total {
                            return Err(Error::RunOverflow);
                        }
                        lengths.push(0);
                    }
                }
                _ => unreachable!("code-length alphabet only defines symbols 0..=18"),
            }
        }

        let lit_len_lengths = &lengths[..hlit];
        let dist_lengths = &lengths[hlit..];

        let dist_code = if dist_lengths.len() == 1 && dist_lengths[0] == 0 {
            // Block uses no back-references at all: literals (and
            // end-of-block) only.
            None
        } else {
            let one_count = dist_lengths.iter().filter(|&&l| l == 1).count();
            let other_positive = dist_lengths.iter().filter(|&&l| l > 1).count();
            if one_count == 1 && other_positive == 0 {
                // A single real distance code can't be canonical on its own
                // (a complete code needs both codes of its shortest length);
                // pad with one unused length-1 sibling, as the reference
                // decoder does, so construction sees a complete code.
                let mut padded = dist_lengths.to_vec();
                padded.resize(32, 0);
                padded[31] = 1;
                Some(CanonicalCode::new(&padded)?)
            } else {
                Some(CanonicalCode::new(dist_lengths)?)
            }
        };

        Ok((CanonicalCode::new(lit_len_lengths)?, dist_code))
    }

    fn decode_huffman_block(
        &mut self,
        lit_len: &CanonicalCode,
        dist: Option<&CanonicalCode>,
    ) -> Result<()> {
        loop {
            let symbol = lit_len.decode(&mut self.bits)?;
            match symbol {
                0..=255 => {
                    let byte = symbol as u8;
                    self.window.append(byte);
                    self.out.write_all(&[byte])?;
                }
                256 => return Ok(()),
                257..=285 => {
                    let length = self.decode_length(symbol)?;
                    let dist_code = dist.ok_or(Error::LiteralsOnlyViolated)?;
                    let distance = self.decode_distance(dist_code)?;
                    self.window.copy_out(distance, length, self.out)?;
                }
                286 | 287 => return Err(Error::ReservedLengthSymbol),
                _ => unreachable!("literal/length alphabet only defines symbols 0..=287"),
            }
        }
    }

    fn decode_length(&mut self, symbol: u16) -> Result<usize> {
        let index = (symbol - 257) as usize;
        let extra = self.bits.read_uint(LENGTH_EXTRA_BITS[index])?;
        Ok(LENGTH_BASE[index] as usize + extra as usize)
    }

    fn decode_distance(&mut self, dist_code: &CanonicalCode) -> Result<usize> {
        let symbol = dist_code.decode(&mut self.bits)?;
        if symbol >= 30 {
            return Err(Error::ReservedDistanceSymbol);
        }
        let index = symbol as usize;
        let extra = self.bits.read_uint(DISTANCE_EXTRA_BITS[index])?;
        Ok(DISTANCE_BASE[index] as usize + extra as usize)
    }
}
