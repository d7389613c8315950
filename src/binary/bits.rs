//! Exact bit access inside the bytes of the physical format.
//! Bits are numbered from the most significant bit (0) to the least significant bit (7).

use crate::{DeserializeError, SerializeError};

/// A contiguous range of bits inside a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub start: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(start: u8, width: u8) -> Self {
        Self { start, width }
    }

    const fn is_valid(&self) -> bool {
        self.width > 0 && self.width <= 8 && self.start < 8 && self.start + self.width <= 8
    }

    const fn shift(&self) -> u8 {
        8 - self.start - self.width
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    pub fn decode(&self, byte: u8) -> Result<u8, DeserializeError> {
        if !self.is_valid() {
            return Err(DeserializeError::OutOfRange(*self));
        }

        Ok((byte >> self.shift()) & self.max_value())
    }

    pub fn encode(&self, byte: &mut u8, value: u8) -> Result<(), SerializeError> {
        if !self.is_valid() || value > self.max_value() {
            return Err(SerializeError::OutOfRange(*self));
        }

        let mask = self.max_value() << self.shift();
        *byte = (*byte & !mask) | (value << self.shift());
        Ok(())
    }
}

/// Extracts `width` bits starting at `start_bit` from the byte.
pub fn decode_field(byte: u8, start_bit: u8, width: u8) -> Result<u8, DeserializeError> {
    BitField::new(start_bit, width).decode(byte)
}

/// Writes the value into `width` bits starting at `start_bit` of the byte at `byte_index`,
/// all the other bits of the byte are preserved.
pub fn encode_field(
    bytes: &mut [u8],
    byte_index: usize,
    start_bit: u8,
    width: u8,
    value: u8,
) -> Result<(), SerializeError> {
    let field = BitField::new(start_bit, width);
    let byte = bytes
        .get_mut(byte_index)
        .ok_or(SerializeError::OutOfRange(field))?;
    field.encode(byte, value)
}

pub(crate) mod fields {
    use super::BitField;

    pub const HEADER_RFU: BitField = BitField::new(0, 1);
    pub const HEADER_ARF1: BitField = BitField::new(1, 1);
    pub const HEADER_POINT_FLAG: BitField = BitField::new(2, 1);
    pub const HEADER_ARF0: BitField = BitField::new(3, 1);
    pub const HEADER_ATTRIBUTE_FLAG: BitField = BitField::new(4, 1);
    pub const HEADER_VERSION: BitField = BitField::new(5, 3);

    pub const ORIENTATION_OR_SIDE: BitField = BitField::new(0, 2);
    pub const FRC: BitField = BitField::new(2, 3);
    pub const FOW: BitField = BitField::new(5, 3);

    pub const LFRCNP_OR_FLAGS: BitField = BitField::new(0, 3);
    pub const POS_OFFSET_FLAG: BitField = BitField::new(1, 1);
    pub const NEG_OFFSET_FLAG: BitField = BitField::new(2, 1);
    pub const BEARING: BitField = BitField::new(3, 5);
}
