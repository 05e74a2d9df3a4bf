//! A reader for the GZIP file format, RFC 1952, layered on top of the
//! `deflate` crate's DEFLATE decoder.

mod error;

pub use error::{Error, Result};

use std::io::Read;

use log::debug;

const FLAG_TEXT: u8 = 0x01;
const FLAG_HCRC: u8 = 0x02;
const FLAG_EXTRA: u8 = 0x04;
const FLAG_NAME: u8 = 0x08;
const FLAG_COMMENT: u8 = 0x10;
const RESERVED_FLAGS: u8 = 0xE0;

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16_le<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32_le<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn skip_null_terminated<R: Read>(reader: &mut R) -> Result<()> {
    loop {
        if read_u8(reader)? == 0 {
            return Ok(());
        }
    }
}

/// Decodes a whole GZIP member from `reader`: header, DEFLATE payload, and
/// trailer (CRC-32 and ISIZE), returning the decompressed bytes.
///
/// Only single-member streams are supported; trailing bytes after the first
/// member's trailer are left unread.
pub fn decompress<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    if read_u8(reader)? != 0x1F || read_u8(reader)? != 0x8B {
        return Err(Error::BadMagic);
    }
    let compression_method = read_u8(reader)?;
    if compression_method != 8 {
        return Err(Error::UnsupportedCompressionMethod(compression_method));
    }
    let flags = read_u8(reader)?;
    if flags & RESERVED_FLAGS != 0 {
        return Err(Error::ReservedFlagsSet);
    }

    let mtime = read_u32_le(reader)?;
    debug!("mtime = {mtime}");
    let _extra_flags = read_u8(reader)?;
    let _os = read_u8(reader)?;

    if flags & FLAG_EXTRA != 0 {
        let mut remaining = read_u16_le(reader)? as usize;
        let mut buf = [0u8; 256];
        while remaining > 0 {
            let chunk = remaining.min(buf.len());
            reader.read_exact(&mut buf[..chunk])?;
            remaining -= chunk;
        }
    }
    if flags & FLAG_NAME != 0 {
        skip_null_terminated(reader)?;
    }
    if flags & FLAG_COMMENT != 0 {
        skip_null_terminated(reader)?;
    }
    if flags & FLAG_HCRC != 0 {
        let _header_crc16 = read_u16_le(reader)?;
    }
    if flags & FLAG_TEXT != 0 {
        debug!("member is flagged as text");
    }

    let decompressed = deflate::decompress_to_vec(reader)?;

    let expected_crc = read_u32_le(reader)?;
    let expected_size = read_u32_le(reader)?;

    let actual_size = decompressed.len() as u32;
    if expected_size != actual_size {
        return Err(Error::SizeMismatch { expected: expected_size, actual: actual_size });
    }
    let actual_crc = crc32fast::hash(&decompressed);
    if expected_crc != actual_crc {
        return Err(Error::CrcMismatch { expected: expected_crc, actual: actual_crc });
    }

    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn gzip_compress(data: &[u8]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decompresses_hello() {
        let gz = gzip_compress(b"hello");
        let mut src = gz.as_slice();
        let out = decompress(&mut src).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut src: &[u8] = &[0x00, 0x00, 0x08, 0x00, 0, 0, 0, 0, 0, 0];
        assert!(matches!(decompress(&mut src), Err(Error::BadMagic)));
    }

    #[test]
    fn rejects_unsupported_compression_method() {
        let mut bytes = gzip_compress(b"hello");
        bytes[2] = 0; // corrupt the compression-method byte
        let mut src = bytes.as_slice();
        assert!(matches!(
            decompress(&mut src),
            Err(Error::UnsupportedCompressionMethod(0))
        ));
    }

    #[test]
    fn detects_crc_mismatch() {
        let mut bytes = gzip_compress(b"hello world");
        let len = bytes.len();
        // Flip a bit in the trailing CRC-32 field.
        bytes[len - 8] ^= 0xFF;
        let mut src = bytes.as_slice();
        assert!(matches!(decompress(&mut src), Err(Error::CrcMismatch { .. })));
    }

    #[test]
    fn round_trips_file_name_flag() {
        use flate2::{Compression, GzBuilder};
        let mut encoder = GzBuilder::new()
            .filename("greeting.txt")
            .write(Vec::new(), Compression::default());
        encoder.write_all(b"hi there").unwrap();
        let bytes = encoder.finish().unwrap();
        let mut src = bytes.as_slice();
        let out = decompress(&mut src).unwrap();
        assert_eq!(out, b"hi there");
    }
}
