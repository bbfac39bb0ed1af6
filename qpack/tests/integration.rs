//! Integration tests for the QPACK encoder and decoder.
//! Covers full round trips and a decoder session fed by an encoder stream.

use bytes::Bytes;
use proptest::prelude::*;
use qpack::{Decoder, Encoder, Error, FieldLine, QpackConfig};

#[test]
fn test_encode_decode_static_headers() {
    let encoder = Encoder::new();
    let decoder = Decoder::new();

    let headers = vec![
        (b":method".as_slice(), b"GET".as_slice()),
        (b":scheme".as_slice(), b"https".as_slice()),
        (b":path".as_slice(), b"/".as_slice()),
    ];

    let encoded = encoder.encode_header_block(&headers);
    let decoded = decoder.decode_header_block(&encoded).unwrap();

    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0].name.as_ref(), b":method");
    assert_eq!(decoded[0].value.as_ref(), b"GET");
    assert_eq!(decoded[2].name.as_ref(), b":path");
    assert_eq!(decoded[2].value.as_ref(), b"/");
}

#[test]
fn test_mixed_representations() {
    let encoder = Encoder::new();
    let decoder = Decoder::new();

    let fields = vec![
        FieldLine::new(":method", "TRACE"),
        FieldLine::new(":status", "201"),
        FieldLine::new("content-type", "text/plain"),
        FieldLine::new("x-request-id", "9f3c"),
        FieldLine::new("empty", ""),
        FieldLine::new("", "nameless"),
    ];

    let encoded = encoder.encode_fields(&fields);
    assert_eq!(decoder.decode_header_block(&encoded).unwrap(), fields);
}

#[test]
fn test_non_ascii_octets_round_trip() {
    let encoder = Encoder::new();
    let decoder = Decoder::new();

    let value: Vec<u8> = (0..=255u8).collect();
    let encoded = encoder.encode_header_block(&[(&b"x-binary"[..], &value[..])]);
    let decoded = decoder.decode_header_block(&encoded).unwrap();
    assert_eq!(decoded[0].value, Bytes::from(value));
}

#[test]
fn test_large_header_set() {
    let encoder = Encoder::new();
    let decoder = Decoder::new();

    let fields: Vec<FieldLine> = (0..500)
        .map(|i| FieldLine::new(format!("x-header-{}", i), "v".repeat(i)))
        .collect();

    let encoded = encoder.encode_fields(&fields);
    assert_eq!(decoder.decode_header_block(&encoded).unwrap(), fields);
}

#[test]
fn test_session_sees_inserts_across_chunks() {
    let mut decoder = Decoder::new();

    // :path=/idx, then etag=Yrg=
    decoder
        .decode_encoder_instructions(&[0xc1, 0x04, b'/', b'i', b'd', b'x'])
        .unwrap();
    decoder
        .decode_encoder_instructions(&[0x44, b'e', b't', b'a', b'g', 0x04, b'Y', b'r', b'g', b'='])
        .unwrap();

    let decoded = decoder
        .decode_header_block(&[0x02, 0x00, 0x81, 0xd1, 0x80])
        .unwrap();
    assert_eq!(
        decoded,
        vec![
            FieldLine::new("etag", "Yrg="),
            FieldLine::new(":method", "GET"),
            FieldLine::new(":path", "/idx"),
        ]
    );
}

#[test]
fn test_failed_block_leaves_session_usable() {
    let mut decoder = Decoder::new();
    decoder
        .decode_encoder_instructions(&[0xc1, 0x04, b'/', b'i', b'd', b'x'])
        .unwrap();

    assert!(decoder.decode_header_block(&[0x01, 0x00, 0x80, 0x85]).is_err());
    assert_eq!(
        decoder.decode_header_block(&[0x01, 0x00, 0x80]).unwrap(),
        vec![FieldLine::new(":path", "/idx")]
    );
}

#[test]
fn test_truncation_at_every_cut() {
    let encoder = Encoder::new();
    let decoder = Decoder::new();

    let encoded = encoder.encode_header_block(&[("x-custom", "value"), (":method", "PATCH")]);

    // Cuts that fall between field lines decode cleanly to fewer fields.
    let boundaries = [2, 2 + 2 + 8 + 1 + 5];
    for cut in 0..encoded.len() {
        let result = decoder.decode_header_block(&encoded[..cut]);
        if boundaries.contains(&cut) {
            assert!(result.is_ok(), "cut at {}", cut);
        } else {
            assert!(
                matches!(result, Err(Error::TruncatedInput(_))),
                "cut at {}: {:?}",
                cut,
                result
            );
        }
    }
}

#[test]
fn test_strict_config_accepts_well_padded_input() {
    let decoder = Decoder::with_config(QpackConfig::strict());
    // "/" is 011000, padded with 11
    let decoded = decoder
        .decode_header_block(&[0x00, 0x00, 0x51, 0x81, 0x63])
        .unwrap();
    assert_eq!(decoded, vec![FieldLine::new(":path", "/")]);
}

fn field_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    let name = prop_oneof![
        Just(b":method".to_vec()),
        Just(b":path".to_vec()),
        Just(b"content-type".to_vec()),
        Just(b"accept".to_vec()),
        prop::collection::vec(any::<u8>(), 0..40),
    ];
    let value = prop_oneof![
        Just(b"GET".to_vec()),
        Just(b"/".to_vec()),
        Just(b"application/json".to_vec()),
        prop::collection::vec(any::<u8>(), 0..300),
    ];
    (name, value)
}

proptest! {
    #[test]
    fn prop_encode_decode_round_trip(headers in prop::collection::vec(field_strategy(), 0..20)) {
        let encoded = Encoder::new().encode_header_block(&headers);
        let decoded = Decoder::new().decode_header_block(&encoded).unwrap();

        let expected: Vec<FieldLine> = headers
            .into_iter()
            .map(|(name, value)| FieldLine::new(name, value))
            .collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut decoder = Decoder::new();
        let _ = decoder.decode_encoder_instructions(&data);
        let _ = decoder.decode_header_block(&data);
    }
}
