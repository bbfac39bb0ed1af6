//! Prefix integer encoding and decoding.
//!
//! Implements the variable-length integer encoding defined in RFC 7541 Section 5.1,
//! which QPACK reuses unmodified for indexes, string lengths and the header
//! block prefix.
//!
//! ## Format
//!
//! An integer is represented in two parts:
//! - A prefix that fills the low N bits of an octet (1 ≤ N ≤ 8); the high
//!   8 - N bits belong to the surrounding instruction
//! - Optional continuation octets if the value doesn't fit in the prefix
//!
//! If I < 2^N - 1, the integer is encoded in the N-bit prefix.
//! Otherwise, the prefix bits are all set to 1, and I - (2^N - 1) follows
//! in base-128 groups, least significant first, with the high bit of each
//! octet set on all but the last.
//!
//! RFC 9204 requires support for integers up to 62 bits.

use bytes::BufMut;

use crate::error::{Error, Result};

/// Maximum integer value that can be decoded (2^62 - 1).
pub const MAX_INTEGER: u64 = (1u64 << 62) - 1;

#[inline]
fn prefix_max(prefix_bits: u8) -> u64 {
    (1u64 << prefix_bits) - 1
}

/// Encodes an integer with an N-bit prefix.
///
/// `flags` supplies the bits of the first octet that lie outside the prefix
/// (instruction pattern, Huffman flag, ...). They must not overlap the prefix.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use qpack::integer::encode;
///
/// let mut buf = BytesMut::new();
/// // Encode 10 with a 5-bit prefix, preserving the top 3 bits as 011
/// encode(10, 5, 0b011_00000, &mut buf);
/// assert_eq!(&buf[..], &[0x6a]);
/// ```
pub fn encode<B: BufMut>(value: u64, prefix_bits: u8, flags: u8, buf: &mut B) {
    debug_assert!((1..=8).contains(&prefix_bits), "prefix_bits must be 1-8");
    debug_assert!(value <= MAX_INTEGER, "value exceeds maximum");

    let max_prefix = prefix_max(prefix_bits);

    if value < max_prefix {
        buf.put_u8(flags | value as u8);
        return;
    }

    buf.put_u8(flags | max_prefix as u8);
    let mut remaining = value - max_prefix;
    while remaining > 127 {
        buf.put_u8((remaining % 128) as u8 | 0x80);
        remaining /= 128;
    }
    buf.put_u8(remaining as u8);
}

/// Returns the number of octets `encode` writes for `value`.
pub fn encoded_len(value: u64, prefix_bits: u8) -> usize {
    let max_prefix = prefix_max(prefix_bits);
    if value < max_prefix {
        return 1;
    }
    let mut remaining = value - max_prefix;
    let mut len = 2;
    while remaining > 127 {
        remaining /= 128;
        len += 1;
    }
    len
}

/// Decodes an integer with an N-bit prefix.
///
/// Bits of the first octet above the prefix are ignored.
///
/// # Returns
///
/// A tuple of (decoded value, number of octets consumed), or an error.
///
/// # Example
///
/// ```
/// use qpack::integer::decode;
///
/// let data = &[0xff, 0x9a, 0x0a]; // 1337 with 5-bit prefix
/// let (value, consumed) = decode(5, data).unwrap();
/// assert_eq!(value, 1337);
/// assert_eq!(consumed, 3);
/// ```
pub fn decode(prefix_bits: u8, data: &[u8]) -> Result<(u64, usize)> {
    if !(1..=8).contains(&prefix_bits) {
        return Err(Error::IntegerError(format!(
            "prefix of {} bits, must be 1-8",
            prefix_bits
        )));
    }

    let first = *data.first().ok_or(Error::TruncatedInput(1))?;

    let max_prefix = prefix_max(prefix_bits);
    let mut value = first as u64 & max_prefix;

    if value < max_prefix {
        return Ok((value, 1));
    }

    let mut pos = 1;
    let mut shift = 0u32;

    loop {
        let byte = *data.get(pos).ok_or(Error::TruncatedInput(1))?;
        pos += 1;

        // 56 is the last shift at which a 7-bit group can still land below 2^62.
        if shift > 56 {
            return Err(Error::IntegerError("integer encoding too long".into()));
        }

        value += ((byte & 0x7f) as u64) << shift;
        if value > MAX_INTEGER {
            return Err(Error::IntegerError(
                "value exceeds maximum (2^62 - 1)".into(),
            ));
        }

        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }

        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use proptest::prelude::*;

    fn encode_to_vec(value: u64, prefix_bits: u8, flags: u8) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode(value, prefix_bits, flags, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn test_rfc_example_10() {
        // RFC 7541 Appendix C.1.1
        assert_eq!(decode(5, &[0x0a]).unwrap(), (10, 1));
        assert_eq!(encode_to_vec(10, 5, 0x60), vec![0x6a]);
    }

    #[test]
    fn test_rfc_example_1337() {
        // RFC 7541 Appendix C.1.2
        assert_eq!(decode(5, &[0xff, 0x9a, 0x0a]).unwrap(), (1337, 3));
        assert_eq!(encode_to_vec(1337, 5, 0), vec![0x1f, 0x9a, 0x0a]);
    }

    #[test]
    fn test_rfc_example_42() {
        // RFC 7541 Appendix C.1.3
        assert_eq!(decode(8, &[0x2a]).unwrap(), (42, 1));
        assert_eq!(encode_to_vec(42, 8, 0), vec![0x2a]);
    }

    #[test]
    fn test_flag_bits_ignored_on_decode() {
        // 0xd7: indexed field line, static, index 23
        assert_eq!(decode(6, &[0xd7]).unwrap(), (23, 1));
    }

    #[test]
    fn test_prefix_boundary() {
        // 31 with a 5-bit prefix needs a zero continuation octet
        assert_eq!(encode_to_vec(31, 5, 0), vec![0x1f, 0x00]);
        assert_eq!(decode(5, &[0x1f, 0x00]).unwrap(), (31, 2));
    }

    #[test]
    fn test_continuation_boundary() {
        // remainder of exactly 128 must take two continuation octets
        let buf = encode_to_vec(127 + 128, 7, 0);
        assert_eq!(buf, vec![0x7f, 0x80, 0x01]);
        assert_eq!(decode(7, &buf).unwrap(), (255, 3));

        let buf = encode_to_vec(127 + 127, 7, 0);
        assert_eq!(buf, vec![0x7f, 0x7f]);
    }

    #[test]
    fn test_encoded_len() {
        for value in [0u64, 30, 31, 158, 159, 1337, 1 << 20, MAX_INTEGER] {
            for prefix_bits in 3..=8 {
                assert_eq!(
                    encoded_len(value, prefix_bits),
                    encode_to_vec(value, prefix_bits, 0).len()
                );
            }
        }
    }

    #[test]
    fn test_truncated() {
        assert_eq!(decode(5, &[]), Err(Error::TruncatedInput(1)));
        assert_eq!(decode(5, &[0x1f]), Err(Error::TruncatedInput(1)));
        assert_eq!(decode(5, &[0x1f, 0x9a]), Err(Error::TruncatedInput(1)));
    }

    #[test]
    fn test_overflow_detection() {
        let data = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert!(matches!(decode(8, &data), Err(Error::IntegerError(_))));

        // 2^62 exactly
        let buf = {
            let mut buf = BytesMut::new();
            buf.put_u8(0xff);
            let mut remaining = (1u64 << 62) - 255;
            while remaining > 127 {
                buf.put_u8((remaining % 128) as u8 | 0x80);
                remaining /= 128;
            }
            buf.put_u8(remaining as u8);
            buf
        };
        assert!(matches!(decode(8, &buf), Err(Error::IntegerError(_))));
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(matches!(decode(0, &[0x00]), Err(Error::IntegerError(_))));
        assert!(matches!(decode(9, &[0x00]), Err(Error::IntegerError(_))));
    }

    #[test]
    fn test_max_integer() {
        for prefix_bits in 1..=8 {
            let buf = encode_to_vec(MAX_INTEGER, prefix_bits, 0);
            assert_eq!(decode(prefix_bits, &buf).unwrap(), (MAX_INTEGER, buf.len()));
        }
    }

    proptest! {
        #[test]
        fn test_round_trip_property(value in 0u64..=MAX_INTEGER, prefix_bits in 3u8..=8) {
            let flags = !((1u16 << prefix_bits) - 1) as u8;
            let buf = encode_to_vec(value, prefix_bits, flags);
            let (decoded, consumed) = decode(prefix_bits, &buf).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, buf.len());
        }
    }
}
