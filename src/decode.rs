//! A module for all decoding needs.
use crate::error::{LzwError, Result};
use crate::{assert_code_size, table_capacity, Code, SEED_ENTRIES};

/// Turns a sequence of codes back into bytes.
///
/// The dictionary grows in lockstep with the one of the [`Encoder`], so after each code it
/// holds exactly the entries the encoder had when it emitted that code.
///
/// [`Encoder`]: ../encode/struct.Encoder.html
pub struct Decoder {
    /// The configured code size.
    max_bits: u8,
    /// The table of decoded codes.
    table: Table,
}

/// A phrase, stored as the code of its prefix and its final byte.
#[derive(Clone, Copy)]
struct Link {
    prefix: Code,
    byte: u8,
}

struct Table {
    inner: Vec<Link>,
    depths: Vec<u32>,
    capacity: usize,
}

/// Decode `codes` of `max_bits` width.
pub fn decode(codes: &[Code], max_bits: u8) -> Result<Vec<u8>> {
    Decoder::new(max_bits)?.decode(codes)
}

impl Decoder {
    /// Create a decoder for codes of `max_bits` bits, which must be in `8..=32`.
    pub fn new(max_bits: u8) -> Result<Self> {
        assert_code_size(max_bits)?;
        Ok(Decoder {
            max_bits,
            table: Table::new(table_capacity(max_bits)),
        })
    }

    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Decode a complete code sequence.
    pub fn decode(&mut self, codes: &[Code]) -> Result<Vec<u8>> {
        self.decode_into(codes, Vec::new(), usize::MAX)
    }

    /// Decode a complete code sequence, appending to `out`.
    ///
    /// Decoding stops with `LengthMismatch` before `out` would grow beyond `limit` bytes, so a
    /// short stream of self-referencing codes can not expand into an unbounded allocation. On
    /// error the partially decoded buffer is dropped.
    pub fn decode_into(
        &mut self,
        codes: &[Code],
        mut out: Vec<u8>,
        limit: usize,
    ) -> Result<Vec<u8>> {
        self.table.init();

        let mut codes = codes.iter().copied().enumerate();
        let mut last = match codes.next() {
            None => return Ok(out),
            Some((position, code)) => {
                if code as usize >= SEED_ENTRIES {
                    return Err(self.corrupt(code, position));
                }
                check_limit(out.len(), 1, limit)?;
                out.push(code as u8);
                code
            }
        };

        for (position, code) in codes {
            let start = out.len();
            if (code as usize) < self.table.len() {
                check_limit(start, self.table.depth(code), limit)?;
                self.table.reconstruct(code, &mut out);
            } else if code as usize == self.table.len() && !self.table.is_full() {
                // The encoder used the entry it created for this very step, which is only
                // possible if the phrase is the previous one extended by its own first byte.
                check_limit(start, self.table.depth(last) + 1, limit)?;
                self.table.reconstruct(last, &mut out);
                let first = out[start];
                out.push(first);
            } else {
                return Err(self.corrupt(code, position));
            }

            if !self.table.is_full() {
                self.table.derive(last, out[start]);
            }

            last = code;
        }

        Ok(out)
    }

    /// The number of dictionary entries after the last call to `decode`.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    fn corrupt(&self, code: Code, position: usize) -> LzwError {
        LzwError::CorruptStream {
            code,
            position,
            next_code: self.table.len() as u64,
        }
    }
}

fn check_limit(len: usize, phrase: usize, limit: usize) -> Result<()> {
    let reached = len.saturating_add(phrase);
    if reached > limit {
        return Err(LzwError::LengthMismatch {
            expected: limit as u64,
            actual: reached as u64,
        });
    }

    Ok(())
}

impl Table {
    fn new(capacity: usize) -> Self {
        Table {
            inner: Vec::new(),
            depths: Vec::new(),
            capacity,
        }
    }

    fn init(&mut self) {
        self.inner.clear();
        self.depths.clear();
        for byte in 0..=u8::MAX {
            self.inner.push(Link { prefix: 0, byte });
            self.depths.push(1);
        }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_full(&self) -> bool {
        self.inner.len() >= self.capacity
    }

    fn derive(&mut self, prefix: Code, byte: u8) {
        let depth = self.depths[prefix as usize] + 1;
        self.inner.push(Link { prefix, byte });
        self.depths.push(depth);
    }

    fn depth(&self, code: Code) -> usize {
        self.depths[code as usize] as usize
    }

    /// Append the phrase of `code` to `out`, walking its links from the back.
    fn reconstruct(&self, code: Code, out: &mut Vec<u8>) {
        let depth = self.depth(code);
        let start = out.len();
        out.resize(start + depth, 0);

        let mut code = code;
        for slot in out[start..].iter_mut().rev() {
            let link = self.inner[code as usize];
            *slot = link.byte;
            code = link.prefix;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, Decoder};
    use crate::encode::encode;
    use crate::LzwError;

    #[test]
    fn classic_example() {
        let codes = [
            84, 79, 66, 69, 79, 82, 78, 79, 84, 256, 258, 260, 265, 259, 261, 263,
        ];
        let data = decode(&codes, 12).unwrap();
        assert_eq!(&data[..], &b"TOBEORNOTTOBEORTOBEORNOT"[..]);
    }

    #[test]
    fn self_reference() {
        assert_eq!(decode(&[97, 256, 257], 12).unwrap(), b"aaaaaa");
        assert_eq!(
            decode(&[0, 256], 8).unwrap_err(),
            LzwError::CorruptStream {
                code: 256,
                position: 1,
                next_code: 256,
            }
        );
    }

    #[test]
    fn unknown_code_rejected() {
        let err = decode(&[65, 66, 300], 12).unwrap_err();
        assert_eq!(
            err,
            LzwError::CorruptStream {
                code: 300,
                position: 2,
                next_code: 257,
            }
        );
    }

    #[test]
    fn first_code_must_be_a_byte() {
        let err = decode(&[256], 12).unwrap_err();
        assert_eq!(
            err,
            LzwError::CorruptStream {
                code: 256,
                position: 0,
                next_code: 256,
            }
        );
    }

    #[test]
    fn empty_sequence() {
        assert!(decode(&[], 12).unwrap().is_empty());
    }

    #[test]
    fn tables_grow_in_lockstep() {
        let data: Vec<u8> = b"ABABABAABABA".iter().cycle().take(1200).copied().collect();
        for &max_bits in &[8u8, 9, 10, 12, 16] {
            let mut encoder = crate::encode::Encoder::new(max_bits).unwrap();
            let codes = encoder.encode(&data);
            let mut decoder = Decoder::new(max_bits).unwrap();
            assert_eq!(decoder.decode(&codes).unwrap(), data);
            // The decoder adds each entry one code late but the encoder adds none for its
            // final code, so both end on the same table.
            assert_eq!(decoder.table_len(), encoder.table_len(), "{}", max_bits);
            assert!(decoder.table_len() <= 1 << max_bits);
        }
    }

    #[test]
    fn frozen_table_keeps_decoding() {
        let data: Vec<u8> = (0..50_000u32).map(|i| ((i * i) >> 3) as u8).collect();
        let codes = encode(&data, 9).unwrap();
        let mut decoder = Decoder::new(9).unwrap();
        assert_eq!(decoder.decode(&codes).unwrap(), data);
        assert_eq!(decoder.table_len(), 512);
    }

    #[test]
    fn self_reference_chain_stops_at_limit() {
        // Each code names the entry created for it, every phrase one byte longer than the last.
        let codes: Vec<u32> = core::iter::once(0).chain(256..20_255).collect();
        let mut decoder = Decoder::new(16).unwrap();
        let err = decoder.decode_into(&codes, Vec::new(), 1).unwrap_err();
        assert_eq!(
            err,
            LzwError::LengthMismatch {
                expected: 1,
                actual: 3,
            }
        );

        let out = decoder.decode_into(&codes[..4], Vec::new(), 10).unwrap();
        assert_eq!(out, vec![0; 10]);
        assert!(decoder.decode_into(&codes[..4], Vec::new(), 9).is_err());
    }

    #[test]
    fn invalid_size_rejected() {
        assert_eq!(Decoder::new(40).err(), Some(LzwError::InvalidConfiguration { max_bits: 40 }));
    }
}
