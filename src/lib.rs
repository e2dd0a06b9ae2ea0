//! # LZW compression with a self-describing container
//!
//! This crate provides an `Encoder` and `Decoder` for byte oriented LZW together with a small
//! container format that makes compressed data self-contained. Codes have a fixed width of
//! `max_bits` for the whole stream and are packed most significant bit first. The dictionary is
//! seeded with all 256 single byte phrases and grows until it holds `2^max_bits` entries, after
//! which it is frozen. There are no clear or end codes; the container header records how many
//! codes the payload holds instead.
//!
//! The container layout, all integers big-endian:
//!
//!  * `0..4`   magic `LZW1`
//!  * `4..12`  original size in bytes
//!  * `12`     code width `max_bits`
//!  * `13`     number of zero padding bits in the final payload byte
//!  * `14..18` number of codes in the payload
//!  * `18..`   packed codes
//!
//! Examplary use:
//!
//! ```
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let compressed = lzwpack::compress(data, lzwpack::DEFAULT_CODESIZE).unwrap();
//! let decompressed = lzwpack::decompress(&compressed).unwrap();
//! assert_eq!(&decompressed[..], &data[..]);
//! ```
#![forbid(unsafe_code)]
use core::convert::TryFrom;

/// Smallest code width that can address all 256 seed phrases.
pub const MIN_CODESIZE: u8 = 8;
/// Largest supported code width.
pub const MAX_CODESIZE: u8 = 32;
/// The canonical code width, a table of 4096 entries.
pub const DEFAULT_CODESIZE: u8 = 12;

/// Number of single byte phrases every dictionary starts with.
pub(crate) const SEED_ENTRIES: usize = 256;

/// Alias for a LZW code point
pub type Code = u32;

pub mod bits;
pub mod container;
pub mod decode;
pub mod encode;
mod error;
pub mod io;

pub use crate::container::{compress, decompress, inspect, Header};
pub use crate::error::{LzwError, Malformed, Result};

/// Check that a code width can be used for a stream.
pub(crate) fn assert_code_size(max_bits: u8) -> Result<()> {
    if (MIN_CODESIZE..=MAX_CODESIZE).contains(&max_bits) {
        Ok(())
    } else {
        Err(LzwError::InvalidConfiguration { max_bits })
    }
}

/// The number of dictionary entries a stream of the given width may hold.
///
/// Both sides of the codec must agree on this exactly. For 32-bit codes the last code point is
/// held back, it doubles as the 'no successor' marker of the encoder's tree.
pub(crate) fn table_capacity(max_bits: u8) -> usize {
    let entries = (1u64 << max_bits).min(u64::from(Code::MAX));
    usize::try_from(entries).unwrap_or(usize::MAX)
}
