//! MSB-first bit streams for the payload body.

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

use super::DecodeError;

/// Bit sink backing the payload body. Bits are packed most significant bit
/// first; the last byte is zero padded.
#[derive(Debug, Default)]
pub struct BitWriter {
    bits: BitVec<u8, Msb0>,
}

impl BitWriter {
    /// Appends a single bit.
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends every bit of `bits` in order.
    pub fn extend_from_bitslice(&mut self, bits: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(bits);
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the packed bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bits.set_uninitialized(false);
        self.bits.into_vec()
    }
}

/// Sequential reader over a bit slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Starts reading at the first bit of `bits`.
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits, position: 0 }
    }

    /// Reads the next bit.
    pub fn read_bit(&mut self) -> Result<bool, DecodeError> {
        let bit = *self.bits.get(self.position).ok_or(DecodeError::BitsExhausted)?;
        self.position += 1;
        Ok(bit)
    }

    /// Number of bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.position
    }
}
