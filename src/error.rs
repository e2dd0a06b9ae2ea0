use thiserror::Error;

use crate::Code;

/// Result type alias for all codec operations.
pub type Result<T> = core::result::Result<T, LzwError>;

/// The error kinds of compression and decompression.
///
/// All of them are terminal for the call that returned them. Nothing is decoded on a best
/// effort basis, so an error also means that no output exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LzwError {
    /// The code width can not be used for a stream.
    #[error("invalid code size {max_bits}, expected a value in 8..=32")]
    InvalidConfiguration {
        /// The rejected code width.
        max_bits: u8,
    },

    /// The data is not a container produced by this crate.
    #[error("malformed container: {0}")]
    MalformedContainer(#[from] Malformed),

    /// The payload ended before the number of codes declared in the header was read.
    #[error("truncated payload: header declares {expected} codes but only {actual} are present")]
    TruncatedPayload {
        /// The code count from the header.
        expected: u32,
        /// The number of complete codes in the payload.
        actual: u32,
    },

    /// A code was neither a known dictionary entry nor the next one to be assigned.
    #[error("corrupt stream: code {code} at position {position}, next free code is {next_code}")]
    CorruptStream {
        /// The offending code value.
        code: Code,
        /// Index of the code within the stream.
        position: usize,
        /// The code the dictionary would have assigned next.
        next_code: u64,
    },

    /// The decoded data does not have the length recorded in the header.
    ///
    /// Decoding stops as soon as the output would exceed the recorded size, in that case
    /// `actual` is the length the next phrase would have reached.
    #[error("length mismatch: header records {expected} bytes, decoded {actual}")]
    LengthMismatch {
        /// The original size from the header.
        expected: u64,
        /// The number of bytes decoded.
        actual: u64,
    },

    /// The input produces more codes than the container can record.
    #[error("input too large: {codes} codes do not fit the 32-bit code count")]
    InputTooLarge {
        /// The number of codes the encoder produced.
        codes: usize,
    },
}

/// Why a container header was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    #[error("{len} bytes are too short for the 18 byte header")]
    TruncatedHeader { len: usize },
    #[error("unrecognized magic {found:02x?}")]
    BadMagic { found: [u8; 4] },
    #[error("unsupported code size {max_bits}")]
    UnsupportedCodeSize { max_bits: u8 },
    #[error("padding of {padding_bits} bits exceeds a byte")]
    BadPadding { padding_bits: u8 },
}
