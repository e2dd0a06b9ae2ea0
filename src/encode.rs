//! A module for all encoding needs.
use crate::error::Result;
use crate::{assert_code_size, table_capacity, Code, SEED_ENTRIES};

/// Turns bytes into a sequence of codes.
///
/// The encoder owns its dictionary, which is rebuilt for each call to [`encode`]. Independent
/// encoders share nothing and can run on different threads.
///
/// [`encode`]: #method.encode
pub struct Encoder {
    /// The configured code size.
    max_bits: u8,
    /// The current encoding symbol tree.
    tree: Tree,
}

/// One tree node for at most each code.
/// To avoid using too much memory we keep nodes with few successors in optimized form. This form
/// doesn't offer lookup by indexing but instead does a linear search.
#[derive(Default)]
struct Tree {
    simples: Vec<Simple>,
    complex: Vec<Full>,
    keys: Vec<FullKey>,
}

#[derive(Clone, Copy)]
enum FullKey {
    NoSuccessor,
    Simple(u32),
    Full(u32),
}

const SHORT: usize = 16;

/// Marks an empty slot in a full node. Never a valid code, see `table_capacity`.
const NO_SUCCESSOR: Code = Code::MAX;

#[derive(Clone, Copy)]
struct Simple {
    codes: [Code; SHORT],
    chars: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    char_continuation: [Code; 256],
}

/// Encode `data` with codes of `max_bits` width.
pub fn encode(data: &[u8], max_bits: u8) -> Result<Vec<Code>> {
    Ok(Encoder::new(max_bits)?.encode(data))
}

impl Encoder {
    /// Create an encoder for codes of `max_bits` bits, which must be in `8..=32`.
    pub fn new(max_bits: u8) -> Result<Self> {
        assert_code_size(max_bits)?;
        Ok(Encoder {
            max_bits,
            tree: Tree::default(),
        })
    }

    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Greedily match the longest known phrase and emit its code.
    ///
    /// Every emitted code is followed by a new dictionary entry, the matched phrase extended by
    /// the byte that broke the match, until the table reaches its capacity. Empty input gives
    /// an empty sequence.
    pub fn encode(&mut self, data: &[u8]) -> Vec<Code> {
        let capacity = table_capacity(self.max_bits);
        self.tree.init();

        let mut codes = Vec::new();
        let mut bytes = data.iter();
        let mut current_code = match bytes.next() {
            Some(&byte) => Code::from(byte),
            None => return codes,
        };

        for &byte in bytes {
            match self.tree.at_key(current_code, byte) {
                Some(code) => current_code = code,
                None => {
                    codes.push(current_code);
                    if self.tree.len() < capacity {
                        self.tree.append(current_code, byte);
                    }
                    current_code = Code::from(byte);
                }
            }
        }

        codes.push(current_code);
        codes
    }

    /// The number of dictionary entries after the last call to `encode`.
    pub fn table_len(&self) -> usize {
        self.tree.len()
    }
}

impl Tree {
    fn init(&mut self) {
        self.simples.clear();
        self.complex.clear();
        self.keys.clear();
        self.keys.resize(SEED_ENTRIES, FullKey::NoSuccessor);
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn at_key(&self, code: Code, ch: u8) -> Option<Code> {
        let key = self.keys[code as usize];
        match key {
            FullKey::NoSuccessor => None,
            FullKey::Simple(idx) => {
                let nexts = &self.simples[idx as usize];
                let successors = nexts.codes.iter().zip(nexts.chars.iter())
                    .take(usize::from(nexts.count));
                for (&scode, &sch) in successors {
                    if sch == ch {
                        return Some(scode);
                    }
                }

                None
            },
            FullKey::Full(idx) => {
                let full = &self.complex[idx as usize];
                let precode = full.char_continuation[usize::from(ch)];
                if precode != NO_SUCCESSOR {
                    Some(precode)
                } else {
                    None
                }
            },
        }
    }

    /// Add the phrase of `code` extended by `ch`, returning its new code.
    fn append(&mut self, code: Code, ch: u8) -> Code {
        let next = self.keys.len() as Code;
        let key = self.keys[code as usize];
        debug_assert!(self.at_key(code, ch).is_none());
        match key {
            FullKey::NoSuccessor => {
                let new_key = FullKey::Simple(self.simples.len() as u32);
                let mut simple = Simple::default();
                simple.codes[0] = next;
                simple.chars[0] = ch;
                simple.count = 1;
                self.simples.push(simple);
                self.keys[code as usize] = new_key;
            }
            FullKey::Simple(idx) if usize::from(self.simples[idx as usize].count) < SHORT => {
                let nexts = &mut self.simples[idx as usize];
                let nidx = usize::from(nexts.count);
                nexts.chars[nidx] = ch;
                nexts.codes[nidx] = next;
                nexts.count += 1;
            }
            FullKey::Simple(idx) => {
                let new_key = FullKey::Full(self.complex.len() as u32);
                let simples = &self.simples[idx as usize];
                let mut full = Full {
                    char_continuation: [NO_SUCCESSOR; 256],
                };
                for (&pch, &pcont) in simples.chars.iter().zip(simples.codes.iter()) {
                    full.char_continuation[usize::from(pch)] = pcont;
                }
                full.char_continuation[usize::from(ch)] = next;
                self.complex.push(full);
                self.keys[code as usize] = new_key;
            }
            FullKey::Full(idx) => {
                let full = &mut self.complex[idx as usize];
                full.char_continuation[usize::from(ch)] = next;
            }
        }
        self.keys.push(FullKey::NoSuccessor);
        next
    }
}

impl Default for Simple {
    fn default() -> Self {
        Simple {
            codes: [0; SHORT],
            chars: [0; SHORT],
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{encode, Encoder};
    use crate::LzwError;

    #[test]
    fn classic_example() {
        let codes = encode(b"TOBEORNOTTOBEORTOBEORNOT", 12).unwrap();
        let expected = [
            84, 79, 66, 69, 79, 82, 78, 79, 84, 256, 258, 260, 265, 259, 261, 263,
        ];
        assert_eq!(codes, expected);
    }

    #[test]
    fn empty_and_single_byte() {
        assert!(encode(b"", 12).unwrap().is_empty());
        assert_eq!(encode(b"\xff", 12).unwrap(), [255]);
    }

    #[test]
    fn repeated_byte_uses_fresh_codes() {
        // a, aa, aaa: each phrase is emitted right after it was added.
        assert_eq!(encode(b"aaaaaa", 12).unwrap(), [97, 256, 257]);
    }

    #[test]
    fn invalid_size_rejected() {
        for &max_bits in &[0u8, 1, 7, 33, 255] {
            assert_eq!(
                Encoder::new(max_bits).err(),
                Some(LzwError::InvalidConfiguration { max_bits })
            );
        }
    }

    #[test]
    fn table_is_frozen_at_capacity() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7 + i / 13) as u8).collect();
        let mut encoder = Encoder::new(9).unwrap();
        let codes = encoder.encode(&data);
        assert_eq!(encoder.table_len(), 512);
        assert!(codes.iter().all(|&c| c < 512));
    }

    #[test]
    fn promotes_busy_nodes() {
        // Every byte follows 'x' once, forcing the node of 'x' beyond the short form.
        let mut data = vec![];
        for b in 0..=255u8 {
            data.push(b'x');
            data.push(b);
        }
        data.extend_from_slice(&data.clone());
        let codes = encode(&data, 16).unwrap();
        let decoded = crate::decode::decode(&codes, 16).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn encoder_is_reusable() {
        let mut encoder = Encoder::new(12).unwrap();
        let first = encoder.encode(b"ABABABAABABA");
        let second = encoder.encode(b"ABABABAABABA");
        assert_eq!(first, second);
    }
}
