//! Shared test helpers for wizcli crates.
//!
//! The helpers in this module are intended for use from unit and integration
//! tests so repeated working-area boilerplate can live in one place.

pub mod fixtures;

/// Returns a copy of `bytes` with bit `bit` flipped.
///
/// Bits are counted from the most significant bit of the first byte.
///
/// # Panics
///
/// Panics when `bit` lies beyond the end of `bytes`.
///
/// # Examples
///
/// ```
/// use wizcli_common::test_support::flip_bit;
///
/// assert_eq!(flip_bit(&[0b0000_0000], 0), vec![0b1000_0000]);
/// assert_eq!(flip_bit(&[0xff, 0x00], 15), vec![0xff, 0x01]);
/// ```
#[must_use]
pub fn flip_bit(bytes: &[u8], bit: usize) -> Vec<u8> {
    let mut mutated = bytes.to_vec();
    let byte = bit / 8;
    assert!(byte < mutated.len(), "bit {bit} outside {} bytes", bytes.len());
    let mask = 0x80_u8 >> (bit % 8);
    if let Some(target) = mutated.get_mut(byte) {
        *target ^= mask;
    }
    mutated
}
