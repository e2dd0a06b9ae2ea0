//! Packing of fixed width codes into bytes, most significant bit first.
use crate::Code;

/// The result of packing a code sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packed {
    /// The packed bytes, the final one possibly partially filled.
    pub bytes: Vec<u8>,
    /// Number of zero bits appended to complete the final byte, in `0..=7`.
    pub padding_bits: u8,
}

/// Writes codes of one width into a growing byte buffer.
pub struct BitWriter {
    /// The current code length.
    code_size: u8,
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
    out: Vec<u8>,
}

/// Reads codes of one width from a byte slice.
pub struct BitReader<'a> {
    /// The current code length.
    code_size: u8,
    /// The bits not yet consumed, aligned to the top.
    bit_buffer: u64,
    /// The number of valid buffer bits.
    bits: u8,
    inp: &'a [u8],
}

/// Pack `codes` with `width` bits each.
///
/// Only the low `width` bits of each code are written, the caller must make sure every code
/// fits.
pub fn pack(codes: &[Code], width: u8) -> Packed {
    let bits = codes.len() as u64 * u64::from(width);
    let mut writer = BitWriter::with_capacity(width, (bits / 8 + 1) as usize);
    for &code in codes {
        writer.buffer_code(code);
    }
    writer.finish()
}

/// Read `code_count` codes of `width` bits each.
///
/// Returns fewer codes if `bytes` ends early. Trailing bits that do not form a whole code are
/// ignored.
pub fn unpack(bytes: &[u8], code_count: usize, width: u8) -> Vec<Code> {
    let available = bytes.len() as u64 * 8 / u64::from(width);
    let capacity = (code_count as u64).min(available) as usize;
    let mut codes = Vec::with_capacity(capacity);
    codes.extend(BitReader::new(bytes, width).take(code_count));
    codes
}

/// The padding a stream of `code_count` codes of `width` bits requires.
pub fn padding_for(code_count: usize, width: u8) -> u8 {
    let tail = (code_count as u64 * u64::from(width)) % 8;
    ((8 - tail) % 8) as u8
}

impl BitWriter {
    pub fn new(code_size: u8) -> Self {
        Self::with_capacity(code_size, 0)
    }

    pub fn with_capacity(code_size: u8, bytes: usize) -> Self {
        debug_assert!((1..=32).contains(&code_size));
        BitWriter {
            code_size,
            buffer: 0,
            bits_in_buffer: 0,
            out: Vec::with_capacity(bytes),
        }
    }

    /// Insert a code into the buffer and push out all full bytes.
    pub fn buffer_code(&mut self, code: Code) {
        let mask = (1u64 << self.code_size) - 1;
        let shift = 64 - self.bits_in_buffer - self.code_size;
        self.buffer |= (u64::from(code) & mask) << shift;
        self.bits_in_buffer += self.code_size;
        self.flush_out();
    }

    fn flush_out(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.out.push((self.buffer >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Pad the buffer to a full byte and return the packed stream.
    pub fn finish(mut self) -> Packed {
        let padding_bits = self.bits_in_buffer.wrapping_neg() & 0x7;
        self.bits_in_buffer += padding_bits;
        self.flush_out();
        Packed {
            bytes: self.out,
            padding_bits,
        }
    }
}

impl<'a> BitReader<'a> {
    pub fn new(inp: &'a [u8], code_size: u8) -> Self {
        debug_assert!((1..=32).contains(&code_size));
        BitReader {
            code_size,
            bit_buffer: 0,
            bits: 0,
            inp,
        }
    }

    fn refill_bits(&mut self) {
        let wish_count = (64 - self.bits) / 8;
        let mut buffer = [0u8; 8];
        let new_bits = match self.inp.get(..usize::from(wish_count)) {
            Some(bytes) => {
                buffer[..usize::from(wish_count)].copy_from_slice(bytes);
                self.inp = &self.inp[usize::from(wish_count)..];
                wish_count * 8
            }
            None => {
                let new_bits = self.inp.len() * 8;
                buffer[..self.inp.len()].copy_from_slice(self.inp);
                self.inp = &[];
                new_bits as u8
            }
        };
        self.bit_buffer |= u64::from_be_bytes(buffer) >> self.bits;
        self.bits += new_bits;
    }

    fn get_bits(&mut self) -> Option<Code> {
        if self.bits < self.code_size {
            return None;
        }

        let mask = (1u64 << self.code_size) - 1;
        let rotbuf = self.bit_buffer.rotate_left(self.code_size.into());
        self.bit_buffer = rotbuf & !mask;
        self.bits -= self.code_size;
        Some((rotbuf & mask) as Code)
    }
}

impl Iterator for BitReader<'_> {
    type Item = Code;

    fn next(&mut self) -> Option<Code> {
        if self.bits < self.code_size {
            self.refill_bits();
        }

        self.get_bits()
    }
}
