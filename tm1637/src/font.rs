//! Segment patterns for the 7 segment displays driven by the TM1637, and the rendering of numbers
//! into them.
//!
//! Bit 0 is segment A, bit 6 is segment G, and bit 7 is the decimal point.

/// Segment patterns for the digits `0` to `9` and the hex digits `A` to `F`.
pub const DIGIT_SEGMENTS: [u8; 16] = [
    0x3F, /* 0 */
    0x06, /* 1 */
    0x5B, /* 2 */
    0x4F, /* 3 */
    0x66, /* 4 */
    0x6D, /* 5 */
    0x7D, /* 6 */
    0x07, /* 7 */
    0x7F, /* 8 */
    0x6F, /* 9 */
    0x77, /* A */
    0x7C, /* b */
    0x39, /* C */
    0x5E, /* d */
    0x79, /* E */
    0x71, /* F */
];

/// Only segment G, the middle bar
pub const MINUS_SEGMENTS: u8 = 0x40;

/// The decimal point in the bottom right of each digit
pub const DECIMAL_POINT: u8 = 0x80;

/// Nothing lit
pub const BLANK_SEGMENTS: u8 = 0x00;

/// Pattern for `digit`, which is taken mod 16 so that any value renders something.
pub fn digit_segments(digit: u8) -> u8 {
    DIGIT_SEGMENTS[(digit % 16) as usize]
}

/// Render `magnitude` in base `radix` right-aligned into `bytes`, one segment pattern per byte.
///
/// Digits that don't fit are dropped, so only the low-order digits of `magnitude` are shown.
/// Every position gets a digit, so small numbers are padded with `0`s, unless
/// `blank_leading_zeros` is set in which case the padding is left blank.  The rightmost position
/// always gets a digit either way.
pub(crate) fn render_number(
    magnitude: u32,
    radix: u32,
    blank_leading_zeros: bool,
    bytes: &mut [u8],
) {
    #[cfg(feature = "defmt")]
    defmt::debug_assert!(radix >= 2 && radix <= 16);

    let mut remaining = magnitude;

    for (place, byte) in bytes.iter_mut().rev().enumerate() {
        *byte = if blank_leading_zeros && place > 0 && remaining == 0 {
            BLANK_SEGMENTS
        } else {
            DIGIT_SEGMENTS[(remaining % radix) as usize]
        };

        remaining /= radix;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render<const N: usize>(magnitude: u32, radix: u32, blank_leading_zeros: bool) -> [u8; N] {
        let mut bytes = [0xAA; N];
        render_number(magnitude, radix, blank_leading_zeros, &mut bytes);
        bytes
    }

    #[test]
    fn digits_wrap_mod_16() {
        assert_eq!(digit_segments(0), 0x3F);
        assert_eq!(digit_segments(15), 0x71);
        assert_eq!(digit_segments(16), 0x3F);
        assert_eq!(digit_segments(0xFA), 0x77);
    }

    #[test]
    fn decimal_is_right_aligned_with_leading_zeros() {
        assert_eq!(render::<4>(42, 10, false), [0x3F, 0x3F, 0x66, 0x5B]);
        assert_eq!(render::<4>(0, 10, false), [0x3F; 4]);
    }

    #[test]
    fn leading_zeros_can_be_blanked() {
        assert_eq!(render::<4>(42, 10, true), [0x00, 0x00, 0x66, 0x5B]);
        assert_eq!(render::<4>(0, 10, true), [0x00, 0x00, 0x00, 0x3F]);
        assert_eq!(render::<4>(1002, 10, true), [0x06, 0x3F, 0x3F, 0x5B]);
    }

    #[test]
    fn too_many_digits_keeps_the_low_order_ones() {
        assert_eq!(render::<4>(123_456, 10, false), [0x4F, 0x66, 0x6D, 0x7D]);
        assert_eq!(render::<2>(u32::MAX, 10, false), [0x6F, 0x6D]);
    }

    #[test]
    fn hex_renders_nibbles() {
        assert_eq!(render::<2>(0xFF, 16, false), [0x71, 0x71]);
        assert_eq!(render::<4>(0xBEEF, 16, false), [0x7C, 0x79, 0x79, 0x71]);
        assert_eq!(render::<3>(0x1_2A, 16, true), [0x06, 0x5B, 0x77]);
    }

    #[test]
    fn empty_slice_is_fine() {
        render_number(1234, 10, false, &mut []);
    }
}
