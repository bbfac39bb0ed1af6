//! QPACK encoder per RFC 9204.
//!
//! A static-table-only compressor. Each field becomes the cheapest
//! representation the static table allows:
//! - Indexed Field Line for an exact (name, value) hit
//! - Literal With Name Reference when only the name is present
//! - Literal With Literal Name otherwise
//!
//! Nothing is inserted into a dynamic table, so the encoder stream stays
//! empty and the field section prefix is always zero. Literals are sent
//! without Huffman coding.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::field_line::FieldLine;
use crate::instructions::{FieldLineRepresentation, HeaderBlockPrefix};
use crate::static_table;

/// QPACK encoder. Stateless; one instance can serve any number of blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode (name, value) pairs into a header block.
    pub fn encode_header_block<N, V>(&self, headers: &[(N, V)]) -> Bytes
    where
        N: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        // Literals dominate the size; integers rarely take more than a few octets.
        let capacity = headers.iter().fold(10, |acc, (name, value)| {
            acc + name.as_ref().len() + value.as_ref().len() + 4
        });
        let mut buf = BytesMut::with_capacity(capacity);

        HeaderBlockPrefix::default().encode(&mut buf);
        for (name, value) in headers {
            representation(name.as_ref(), value.as_ref()).encode(&mut buf);
        }

        debug!(fields = headers.len(), bytes = buf.len(), "encoded header block");
        buf.freeze()
    }

    /// Encode field lines into a header block.
    pub fn encode_fields(&self, fields: &[FieldLine]) -> Bytes {
        let pairs: Vec<(&[u8], &[u8])> = fields
            .iter()
            .map(|field| (&field.name[..], &field.value[..]))
            .collect();
        self.encode_header_block(&pairs)
    }
}

fn representation(name: &[u8], value: &[u8]) -> FieldLineRepresentation {
    if let Some(index) = static_table::find_exact(name, value) {
        trace!(index, "indexed static");
        return FieldLineRepresentation::Indexed {
            is_static: true,
            index: index as u64,
        };
    }

    if let Some(name_index) = static_table::find_name(name) {
        trace!(name_index, "literal with static name reference");
        return FieldLineRepresentation::LiteralWithNameRef {
            name_index: name_index as u64,
            value: Bytes::copy_from_slice(value),
        };
    }

    trace!(name_len = name.len(), "literal with literal name");
    FieldLineRepresentation::LiteralWithLiteralName {
        name: Bytes::copy_from_slice(name),
        value: Bytes::copy_from_slice(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pseudo_headers() {
        let encoded = Encoder::new().encode_header_block(&[
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/"),
        ]);
        assert_eq!(&encoded[..], &[0x00, 0x00, 0xd1, 0xd7, 0xc1]);
    }

    #[test]
    fn test_encode_static_name_ref() {
        let encoded = Encoder::new().encode_header_block(&[(":method", "TRACE")]);
        assert_eq!(
            &encoded[..],
            &[0x00, 0x00, 0x5f, 0x00, 0x05, b'T', b'R', b'A', b'C', b'E']
        );
    }

    #[test]
    fn test_encode_literal_name() {
        let encoded = Encoder::new().encode_header_block(&[("X-Custom-Header", "anyvalue")]);

        let mut expected = vec![0x00, 0x00, 0x27, 0x08];
        expected.extend_from_slice(b"X-Custom-Header");
        expected.push(0x08);
        expected.extend_from_slice(b"anyvalue");
        assert_eq!(&encoded[..], &expected[..]);
    }

    #[test]
    fn test_encode_empty() {
        let headers: &[(&str, &str)] = &[];
        assert_eq!(&Encoder::new().encode_header_block(headers)[..], &[0x00, 0x00]);
    }

    #[test]
    fn test_encode_long_value() {
        // 200 octets: 7-bit prefix saturates at 127, continuation 73
        let value = vec![b'x'; 200];
        let encoded = Encoder::new().encode_header_block(&[(&b"etag"[..], &value[..])]);
        assert_eq!(&encoded[..5], &[0x00, 0x00, 0x57, 0x7f, 0x49]);
        assert_eq!(encoded.len(), 5 + 200);
    }

    #[test]
    fn test_encode_fields() {
        let fields = vec![FieldLine::new(":status", "200"), FieldLine::new("age", "0")];
        let encoded = Encoder::new().encode_fields(&fields);
        // 25 = 0xc0|25, 2 = 0xc2
        assert_eq!(&encoded[..], &[0x00, 0x00, 0xd9, 0xc2]);
    }
}
