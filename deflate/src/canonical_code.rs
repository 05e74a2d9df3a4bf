//! Canonical Huffman code reconstruction from a code-length vector.

use std::collections::HashMap;

use crate::bitsource::{BitSource, ByteSource};
use crate::error::{Error, Result};

/// A canonical Huffman code, reconstructed purely from the lengths assigned
/// to each symbol (RFC 1951 §3.2.2).
///
/// Symbols are looked up by a "tagged" key: `(1 << length) | code`, so codes
/// of different lengths never collide even though a short code is a prefix
/// of a longer bit pattern. This mirrors the reference decoder's dictionary
/// exactly and keeps the construction loop a direct transcription of the
/// canonical-code definition rather than a bit-reversed lookup table.
pub struct CanonicalCode {
    code_bits_to_symbol: HashMap<u32, u16>,
    max_length: u32,
}

impl CanonicalCode {
    /// Builds a canonical code from `code_lengths[symbol] = length` (`0`
    /// means the symbol is unused). Validates that the lengths describe a
    /// complete code: neither over-full nor under-full.
    pub fn new(code_lengths: &[u32]) -> Result<Self> {
        let max_length = code_lengths.iter().copied().max().unwrap_or(0);

        // Completeness check, following the canonical-code definition: at
        // each length, the running code must not exceed the codespace that
        // length offers, and must exactly fill it once all lengths are seen.
        let mut current_code: u32 = 0;
        for length in 1..=max_length {
            current_code <<= 1;
            let count_at_length = code_lengths.iter().filter(|&&l| l == length).count() as u32;
            current_code += count_at_length;
            if current_code > (1 << length) {
                return Err(Error::OverfullTree);
            }
        }
        if max_length > 0 && current_code != (1 << max_length) {
            return Err(Error::UnderfullTree);
        }

        let mut code_bits_to_symbol = HashMap::new();
        let mut next_code: u32 = 0;
        for length in 1..=max_length {
            for (symbol, &sym_length) in code_lengths.iter().enumerate() {
                if sym_length == length {
                    let key = (1u32 << length) | next_code;
                    code_bits_to_symbol.insert(key, symbol as u16);
                    next_code += 1;
                }
            }
            next_code <<= 1;
        }

        Ok(Self { code_bits_to_symbol, max_length })
    }

    /// Reads bits one at a time from `bits` until they resolve to a symbol.
    pub fn decode<R: ByteSource>(&self, bits: &mut BitSource<R>) -> Result<u16> {
        let mut code_bits: u32 = 1;
        let mut read = 0u32;
        loop {
            let bit = bits.read_bit()?;
            code_bits = (code_bits << 1) | bit;
            read += 1;
            if let Some(&symbol) = self.code_bits_to_symbol.get(&code_bits) {
                return Ok(symbol);
            }
            if read > self.max_length {
                return Err(Error::UnexpectedEnd);
            }
        }
    }
}
