//! Error taxonomy for the DEFLATE decoder.

use thiserror::Error;

/// Everything that can go wrong while decoding a DEFLATE stream.
///
/// All variants are fatal to the current `decompress` call: there is no
/// local recovery, and any bytes already written to the sink before an
/// error must be treated as an untrusted prefix by the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The bit stream was exhausted in the middle of a token.
    #[error("unexpected end of bit stream")]
    UnexpectedEnd,

    /// `BTYPE == 3`, the reserved block type.
    #[error("reserved block type (BTYPE == 3)")]
    ReservedBlockType,

    /// A stored block's `LEN` did not one's-complement match `NLEN`.
    #[error("corrupt stored block header: LEN ^ NLEN != 0xFFFF")]
    CorruptStoredHeader,

    /// A code-length vector overflows the codespace before full assignment.
    #[error("canonical code produces an over-full Huffman tree")]
    OverfullTree,

    /// A code-length vector does not fill the codespace it claims to use.
    #[error("canonical code produces an under-full Huffman tree")]
    UnderfullTree,

    /// Code-length symbol 16 (repeat previous) appeared with no prior length.
    #[error("code-length repeat symbol with no prior length to repeat")]
    NoPriorLength,

    /// A code-length run (symbols 16/17/18) would exceed the declared count.
    #[error("code-length run overflows the declared number of symbols")]
    RunOverflow,

    /// Literal/length symbol 286 or 287, which the format reserves.
    #[error("reserved length symbol (286 or 287) appeared in the stream")]
    ReservedLengthSymbol,

    /// Distance symbol 30 or 31, which the format reserves.
    #[error("reserved distance symbol (30 or 31) appeared in the stream")]
    ReservedDistanceSymbol,

    /// A length/distance pair appeared in a block whose distance code is
    /// the single-zero "literals only" code.
    #[error("length symbol decoded in a block with no distance code")]
    LiteralsOnlyViolated,

    /// A back-reference distance exceeds how much history the window holds.
    #[error("back-reference distance {distance} exceeds window fill {window_len}")]
    InvalidDistance { distance: usize, window_len: usize },

    /// Propagated failure from the underlying byte sink.
    #[error("output sink error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
