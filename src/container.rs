//! The container format wrapping packed codes.
use core::convert::TryFrom;

use crate::bits::{self, Packed};
use crate::error::{LzwError, Malformed, Result};
use crate::{assert_code_size, decode, encode, MAX_CODESIZE, MIN_CODESIZE};

/// The tag every container starts with.
pub const MAGIC: [u8; 4] = *b"LZW1";

/// Size of the fixed header preceding the payload.
pub const HEADER_LEN: usize = 18;

/// The fixed fields of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Length in bytes of the uncompressed data.
    pub original_size: u64,
    /// Width of each code in the payload.
    pub max_bits: u8,
    /// Zero bits appended to the final payload byte.
    pub padding_bits: u8,
    /// Number of codes in the payload.
    pub code_count: u32,
}

/// Compress `input` into a container using codes of `max_bits` bits.
///
/// Fails only for a `max_bits` outside `8..=32`, or for inputs so large that their code count
/// overflows the header.
pub fn compress(input: &[u8], max_bits: u8) -> Result<Vec<u8>> {
    let codes = encode::Encoder::new(max_bits)?.encode(input);
    let code_count = u32::try_from(codes.len())
        .map_err(|_| LzwError::InputTooLarge { codes: codes.len() })?;
    let Packed { bytes, padding_bits } = bits::pack(&codes, max_bits);

    let header = Header {
        original_size: input.len() as u64,
        max_bits,
        padding_bits,
        code_count,
    };

    let mut container = Vec::with_capacity(HEADER_LEN + bytes.len());
    header.write_to(&mut container);
    container.extend_from_slice(&bytes);
    Ok(container)
}

/// Restore the data of a container.
///
/// The header's code count is authoritative, a payload that holds fewer codes is rejected as
/// truncated. Bytes after the last declared code are ignored.
pub fn decompress(container: &[u8]) -> Result<Vec<u8>> {
    let (header, payload) = Header::parse(container)?;

    let expected = header.code_count as usize;
    let codes = bits::unpack(payload, expected, header.max_bits);
    if codes.len() < expected {
        return Err(LzwError::TruncatedPayload {
            expected: header.code_count,
            actual: codes.len() as u32,
        });
    }

    // The original size bounds the output while decoding, a stream of self-referencing codes
    // would otherwise expand quadratically before the final length check.
    let limit = usize::try_from(header.original_size).unwrap_or(usize::MAX);
    let capacity = limit.min(expected.saturating_mul(64));
    let mut decoder = decode::Decoder::new(header.max_bits)?;
    let out = decoder.decode_into(&codes, Vec::with_capacity(capacity), limit)?;

    if out.len() as u64 != header.original_size {
        return Err(LzwError::LengthMismatch {
            expected: header.original_size,
            actual: out.len() as u64,
        });
    }

    Ok(out)
}

/// Read and validate the header of a container without decoding it.
pub fn inspect(container: &[u8]) -> Result<Header> {
    Header::parse(container).map(|(header, _)| header)
}

impl Header {
    /// Split a container into its validated header and the payload.
    pub fn parse(container: &[u8]) -> Result<(Header, &[u8])> {
        if container.len() >= MAGIC.len() && container[..4] != MAGIC {
            let mut found = [0; 4];
            found.copy_from_slice(&container[..4]);
            return Err(Malformed::BadMagic { found }.into());
        }

        if container.len() < HEADER_LEN {
            return Err(Malformed::TruncatedHeader { len: container.len() }.into());
        }

        let (head, payload) = container.split_at(HEADER_LEN);
        let mut original_size = [0; 8];
        original_size.copy_from_slice(&head[4..12]);
        let mut code_count = [0; 4];
        code_count.copy_from_slice(&head[14..18]);

        let header = Header {
            original_size: u64::from_be_bytes(original_size),
            max_bits: head[12],
            padding_bits: head[13],
            code_count: u32::from_be_bytes(code_count),
        };

        if assert_code_size(header.max_bits).is_err() {
            return Err(Malformed::UnsupportedCodeSize { max_bits: header.max_bits }.into());
        }

        if header.padding_bits > 7 {
            return Err(Malformed::BadPadding { padding_bits: header.padding_bits }.into());
        }

        Ok((header, payload))
    }

    /// Append the serialized header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        debug_assert!((MIN_CODESIZE..=MAX_CODESIZE).contains(&self.max_bits));
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.original_size.to_be_bytes());
        out.push(self.max_bits);
        out.push(self.padding_bits);
        out.extend_from_slice(&self.code_count.to_be_bytes());
    }

    /// The payload length implied by the code count and width.
    pub fn payload_len_hint(&self) -> u64 {
        (u64::from(self.code_count) * u64::from(self.max_bits) + 7) / 8
    }

    /// The total container length implied by the header.
    pub fn container_len_hint(&self) -> u64 {
        HEADER_LEN as u64 + self.payload_len_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::{compress, decompress, inspect, Header, HEADER_LEN, MAGIC};
    use crate::{LzwError, Malformed};

    #[test]
    fn header_layout() {
        let container = compress(b"TOBEORNOTTOBEORTOBEORNOT", 12).unwrap();
        assert_eq!(&container[..4], b"LZW1");
        assert_eq!(&container[4..12], &24u64.to_be_bytes());
        assert_eq!(container[12], 12);
        // 16 codes of 12 bits fill whole bytes.
        assert_eq!(container[13], 0);
        assert_eq!(&container[14..18], &16u32.to_be_bytes());
        assert_eq!(container.len(), HEADER_LEN + 24);
    }

    #[test]
    fn header_fields_roundtrip() {
        let header = Header {
            original_size: 0x0102_0304_0506_0708,
            max_bits: 13,
            padding_bits: 5,
            code_count: 0xdead_beef,
        };
        let mut out = vec![];
        header.write_to(&mut out);
        out.push(0x42);
        let (parsed, payload) = Header::parse(&out).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload, [0x42]);
    }

    #[test]
    fn empty_input() {
        let container = compress(b"", 12).unwrap();
        assert_eq!(container.len(), HEADER_LEN);
        let header = inspect(&container).unwrap();
        assert_eq!(header.code_count, 0);
        assert_eq!(header.original_size, 0);
        assert_eq!(header.padding_bits, 0);
        assert!(decompress(&container).unwrap().is_empty());
    }

    #[test]
    fn short_and_foreign_data() {
        assert_eq!(
            decompress(b"LZW1\0\0"),
            Err(LzwError::MalformedContainer(Malformed::TruncatedHeader { len: 6 }))
        );
        assert_eq!(
            decompress(b""),
            Err(LzwError::MalformedContainer(Malformed::TruncatedHeader { len: 0 }))
        );
        assert_eq!(
            decompress(b"GIF89a and then some more bytes"),
            Err(LzwError::MalformedContainer(Malformed::BadMagic { found: *b"GIF8" }))
        );
    }

    #[test]
    fn bad_fields() {
        let mut container = compress(b"abc", 12).unwrap();
        container[12] = 7;
        assert_eq!(
            decompress(&container),
            Err(LzwError::MalformedContainer(Malformed::UnsupportedCodeSize { max_bits: 7 }))
        );
        container[12] = 12;
        container[13] = 8;
        assert_eq!(
            decompress(&container),
            Err(LzwError::MalformedContainer(Malformed::BadPadding { padding_bits: 8 }))
        );
    }

    #[test]
    fn wrong_original_size() {
        let mut container = compress(b"abcabc", 12).unwrap();
        container[4..12].copy_from_slice(&7u64.to_be_bytes());
        assert_eq!(
            decompress(&container),
            Err(LzwError::LengthMismatch { expected: 7, actual: 6 })
        );
    }

    #[test]
    fn self_reference_chain_is_cut_short() {
        let codes: Vec<u32> = core::iter::once(0).chain(256..20_255).collect();
        let packed = crate::bits::pack(&codes, 16);
        let header = Header {
            original_size: 1,
            max_bits: 16,
            padding_bits: packed.padding_bits,
            code_count: codes.len() as u32,
        };
        let mut container = vec![];
        header.write_to(&mut container);
        container.extend_from_slice(&packed.bytes);
        assert_eq!(container.len(), HEADER_LEN + 40_000);

        assert_eq!(
            decompress(&container),
            Err(LzwError::LengthMismatch { expected: 1, actual: 3 })
        );
    }

    #[test]
    fn hostile_counts_do_not_allocate() {
        let mut container = MAGIC.to_vec();
        container.extend_from_slice(&u64::MAX.to_be_bytes());
        container.push(32);
        container.push(0);
        container.extend_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(
            decompress(&container),
            Err(LzwError::TruncatedPayload { expected: u32::MAX, actual: 0 })
        );
    }

    #[test]
    fn size_hints() {
        let container = compress(&[7u8; 1000], 12).unwrap();
        let header = inspect(&container).unwrap();
        assert_eq!(header.container_len_hint(), container.len() as u64);
    }
}
