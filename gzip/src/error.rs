//! Error taxonomy for the GZIP envelope reader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid GZIP magic number")]
    BadMagic,

    #[error("unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u8),

    #[error("reserved flag bits are set")]
    ReservedFlagsSet,

    #[error("size mismatch: header ISIZE={expected}, actual decoded length={actual}")]
    SizeMismatch { expected: u32, actual: u32 },

    #[error("CRC-32 mismatch: header={expected:08X}, actual={actual:08X}")]
    CrcMismatch { expected: u32, actual: u32 },

    #[error("invalid or corrupt compressed data: {0}")]
    Deflate(#[from] deflate::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
