//! Byte ↔ bit-array conversion.
//!
//! Bits are kept in display order: index 0 is the most significant bit
//! (value 128), index 7 the least significant (value 1). Every view in the
//! debugger draws bit fields left to right in this order.

/// Number of bits in one GPIO cell.
pub const BITS: usize = 8;

/// Value weight of the bit at display index `i` (0 = MSB).
#[inline(always)]
pub fn bit_mask(i: usize) -> u8 {
    0x80 >> i
}

/// Split a byte into its bits, most significant first.
#[inline]
pub fn decode(value: u8) -> [bool; BITS] {
    let mut bits = [false; BITS];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (value >> (7 - i)) & 1 != 0;
    }
    bits
}

/// Reassemble a byte from bits in display order.
#[inline]
pub fn encode(bits: &[bool; BITS]) -> u8 {
    bits.iter()
        .enumerate()
        .fold(0u8, |acc, (i, &on)| if on { acc | bit_mask(i) } else { acc })
}

/// Render a byte as eight on/off glyphs (■ = set, □ = clear).
pub fn render(value: u8) -> String {
    decode(value).iter().map(|&on| if on { '■' } else { '□' }).collect()
}
