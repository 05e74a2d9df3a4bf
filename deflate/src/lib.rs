//! A decoder for the DEFLATE compressed data format, RFC 1951.
//!
//! This crate only decompresses. It has no opinion on envelope formats
//! (gzip, zlib, ZIP) — see the sibling `gzip` crate for one of those.

mod bitsource;
mod block_decoder;
mod canonical_code;
mod error;
mod window;

pub use error::{Error, Result};

use block_decoder::BlockDecoder;

/// Decompresses a raw DEFLATE stream from `reader`, writing the decoded
/// bytes to `out`.
///
/// `reader` is taken by mutable reference rather than by value so a caller
/// wrapping this in an envelope format (gzip, zlib) can keep reading
/// trailing bytes off the same underlying reader afterward. The bit source
/// only ever consumes whole bytes from `reader`; any partially-read byte at
/// the time the final block ends is buffered internally and discarded, not
/// pushed back, so callers must treat the stream as byte-aligned again only
/// once DEFLATE's own trailing padding has been accounted for by the
/// envelope format.
pub fn decompress<R: std::io::Read, W: std::io::Write>(reader: &mut R, out: &mut W) -> Result<()> {
    let mut decoder = BlockDecoder::new(reader, out);
    decoder.run()
}

/// Convenience wrapper over [`decompress`] that collects the output into a
/// `Vec<u8>`.
pub fn decompress_to_vec<R: std::io::Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(reader, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn roundtrip_via_flate2(data: &[u8]) -> Vec<u8> {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        decompress_to_vec(&mut compressed.as_slice()).unwrap()
    }

    #[test]
    fn decompresses_empty_fixed_block() {
        // flate2 emits a single empty final fixed block for empty input.
        let out = roundtrip_via_flate2(b"");
        assert_eq!(out, b"");
    }

    #[test]
    fn decompresses_short_literal_run() {
        let out = roundtrip_via_flate2(b"Hi");
        assert_eq!(out, b"Hi");
    }

    #[test]
    fn decompresses_repetitive_data_through_back_references() {
        let data = b"abcabcabcabcabcabcabcabcabcabcabcabc".repeat(20);
        let out = roundtrip_via_flate2(&data);
        assert_eq!(out, data);
    }

    #[test]
    fn decompresses_stored_block_written_directly() {
        // BFINAL=1, BTYPE=00 (stored), then pad to byte, LEN=0x0002, NLEN=0xFFFD, "Hi".
        let stream: &[u8] = &[0b0000_0001, 0x02, 0x00, 0xFD, 0xFF, b'H', b'i'];
        let mut src = stream;
        let out = decompress_to_vec(&mut src).unwrap();
        assert_eq!(out, b"Hi");
    }

    #[test]
    fn rejects_corrupt_stored_header() {
        // LEN/NLEN do not complement each other.
        let stream: &[u8] = &[0b0000_0001, 0x02, 0x00, 0x00, 0x00, b'H', b'i'];
        let mut src = stream;
        assert!(matches!(decompress_to_vec(&mut src), Err(Error::CorruptStoredHeader)));
    }

    #[test]
    fn rejects_reserved_block_type() {
        // BFINAL=1, BTYPE=11 (reserved).
        let stream: &[u8] = &[0b0000_0111];
        let mut src = stream;
        assert!(matches!(decompress_to_vec(&mut src), Err(Error::ReservedBlockType)));
    }

    #[test]
    fn large_round_trip_through_dynamic_blocks() {
        // Enough varied data that flate2 chooses dynamic Huffman blocks.
        let mut data = Vec::new();
        for i in 0..20_000u32 {
            data.push((i % 251) as u8);
        }
        let out = roundtrip_via_flate2(&data);
        assert_eq!(out, data);
    }
}
