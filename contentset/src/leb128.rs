//! # LEB128 header integers
//!
//! Every count and length in a content-set payload header is written as an
//! unsigned LEB128 integer: seven value bits per byte, least significant group
//! first, with the high bit of each byte signalling that another byte follows.
//! Dictionary sizes, node counts and weight deltas are almost always below
//! 128, so most header fields cost a single byte.
//!
//! For example, decimal 300 encodes as `[0xAC, 0x02]`.

use std::io::Cursor;

/// A `u64` never needs more than ten 7-bit groups.
const MAX_BYTES: usize = 10;

/// Value bits carried by each encoded byte.
const BITS_PER_BYTE: u32 = 7;

/// Mask selecting the value bits of an encoded byte.
const LOWER_BITS_MASK: u8 = 0x7F;

/// Set on every byte except the last one of an encoded integer.
const CONTINUATION_FLAG: u8 = 0x80;

/// Errors that can occur while reading LEB128 integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input ended while the continuation bit was still set.
    #[error("incomplete LEB128 sequence")]
    IncompleteSequence,

    /// The tenth byte carried a continuation bit.
    #[error("invalid LEB128 continuation pattern")]
    InvalidContinuation,

    /// Nothing left to read.
    #[error("empty input")]
    EmptyInput,

    /// The encoded value does not fit in a `u64`.
    #[error("attempted to decode a value exceeding {} bits", u64::BITS)]
    ValueOutOfBounds,
}

/// LEB128 encoding and decoding of `u64` values.
#[derive(Debug, Clone)]
pub struct Leb128;

impl Leb128 {
    /// Appends the LEB128 encoding of `value` to `bytes`.
    pub fn encode_into(mut value: u64, bytes: &mut Vec<u8>) {
        loop {
            let mut byte = (value & LOWER_BITS_MASK as u64) as u8;
            value >>= BITS_PER_BYTE;

            if value != 0 {
                byte |= CONTINUATION_FLAG;
            }
            bytes.push(byte);

            if value == 0 {
                return;
            }
        }
    }

    /// Decodes one value from the start of `bytes`, returning the value and
    /// the number of bytes it occupied. Trailing bytes are left untouched.
    pub fn try_decode(bytes: &[u8]) -> Result<(u64, usize), Error> {
        if bytes.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut result: u64 = 0;

        for (position, &byte) in bytes.iter().enumerate().take(MAX_BYTES) {
            let value = (byte & LOWER_BITS_MASK) as u64;

            if position == MAX_BYTES - 1 {
                // Only the lowest bit of the tenth group is inside u64 range.
                if value > 0x01 {
                    return Err(Error::ValueOutOfBounds);
                }
                if byte & CONTINUATION_FLAG != 0 {
                    return Err(Error::InvalidContinuation);
                }
            }

            result |= value << (BITS_PER_BYTE * position as u32);

            if byte & CONTINUATION_FLAG == 0 {
                return Ok((result, position + 1));
            }
        }

        Err(Error::IncompleteSequence)
    }

    /// Number of bytes `value` occupies once encoded.
    pub fn calculate_size(value: u64) -> usize {
        let significant_bits = u64::BITS - value.leading_zeros();
        (significant_bits.max(1)).div_ceil(BITS_PER_BYTE) as usize
    }
}

/// Sequential reading of LEB128 values from a byte source.
pub trait ReadLeb128 {
    /// Reads the next LEB128 value, advancing past it.
    fn read_leb128(&mut self) -> Result<u64, Error>;
}

impl ReadLeb128 for Cursor<&[u8]> {
    fn read_leb128(&mut self) -> Result<u64, Error> {
        let buffer = *self.get_ref();
        let start = usize::try_from(self.position()).map_err(|_| Error::EmptyInput)?;
        let remaining = buffer.get(start..).unwrap_or_default();

        let (value, bytes_read) = Leb128::try_decode(remaining)?;
        self.set_position((start + bytes_read) as u64);

        Ok(value)
    }
}
