//! QPACK decoder session.
//!
//! Decodes header blocks (RFC 9204 Section 4.5) against the static table and
//! a session-owned dynamic table, which is filled by instructions read from
//! the peer's encoder stream (Section 4.3).

use bytes::Bytes;
use tracing::{debug, trace};

use crate::{
    config::QpackConfig,
    dynamic_table::DynamicTable,
    error::{Error, Result},
    field_line::FieldLine,
    huffman::HuffmanDecoder,
    instructions::{EncoderInstruction, FieldLineRepresentation, HeaderBlockPrefix, StringDecoder},
    static_table,
};

/// QPACK decoder.
///
/// One session per connection: header blocks and encoder-stream chunks of
/// that connection must go through the same instance so that dynamic
/// entries inserted by the encoder stream are visible to later blocks.
#[derive(Debug)]
pub struct Decoder {
    dynamic_table: DynamicTable,
    huffman: &'static HuffmanDecoder,
    config: QpackConfig,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with an empty dynamic table and default settings.
    pub fn new() -> Self {
        Self::with_config(QpackConfig::default())
    }

    pub fn with_config(config: QpackConfig) -> Self {
        Self {
            dynamic_table: DynamicTable::new(),
            huffman: HuffmanDecoder::shared(),
            config,
        }
    }

    pub fn config(&self) -> &QpackConfig {
        &self.config
    }

    /// The dynamic table as filled so far by the encoder stream.
    pub fn table(&self) -> &DynamicTable {
        &self.dynamic_table
    }

    /// Gets a dynamic table entry by absolute index.
    pub fn lookup_dynamic(&self, index: u64) -> Option<&FieldLine> {
        self.dynamic_table.lookup(index)
    }

    fn strings(&self) -> StringDecoder<'static> {
        StringDecoder::new(self.huffman, self.config.huffman_padding)
    }

    /// Decodes one complete header block into its field lines, in block order.
    ///
    /// The block must be fully buffered. Ending inside a representation is
    /// `TruncatedInput`; any failure discards the fields decoded so far.
    pub fn decode_header_block(&self, data: &[u8]) -> Result<Vec<FieldLine>> {
        let (prefix, mut pos) = HeaderBlockPrefix::decode(data)?;
        trace!(
            required_insert_count = prefix.required_insert_count,
            delta_base = prefix.delta_base,
            "header block prefix"
        );

        let strings = self.strings();
        let mut fields = Vec::new();
        while pos < data.len() {
            let (repr, consumed) = FieldLineRepresentation::decode(&data[pos..], &strings)?;
            pos += consumed;

            let field = self.resolve(repr)?;
            trace!(field = ?field, "decoded field line");
            fields.push(field);
        }

        debug!(fields = fields.len(), bytes = data.len(), "decoded header block");
        Ok(fields)
    }

    fn resolve(&self, repr: FieldLineRepresentation) -> Result<FieldLine> {
        match repr {
            FieldLineRepresentation::Indexed {
                is_static: true,
                index,
            } => {
                let entry = static_table::lookup_name_value(index)?;
                Ok(FieldLine::new(
                    Bytes::from_static(entry.name),
                    Bytes::from_static(entry.value),
                ))
            }
            FieldLineRepresentation::Indexed {
                is_static: false,
                index,
            } => self.dynamic_table.lookup(index).cloned().ok_or_else(|| {
                Error::DecompressionFailed(format!(
                    "dynamic index {} not in table of {} entries",
                    index,
                    self.dynamic_table.len()
                ))
            }),
            FieldLineRepresentation::LiteralWithNameRef { name_index, value } => {
                let name = static_table::lookup_name(name_index)?;
                Ok(FieldLine::new(Bytes::from_static(name), value))
            }
            FieldLineRepresentation::LiteralWithLiteralName { name, value } => {
                Ok(FieldLine::new(name, value))
            }
        }
    }

    /// Applies a chunk of encoder-stream instructions to the dynamic table.
    ///
    /// The chunk must hold whole instructions. It is applied all or nothing:
    /// if any instruction fails to parse or resolve, the table is unchanged.
    pub fn decode_encoder_instructions(&mut self, data: &[u8]) -> Result<()> {
        let strings = self.strings();
        let mut staged: Vec<FieldLine> = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            let (instruction, consumed) = EncoderInstruction::decode(&data[pos..], &strings)?;
            pos += consumed;

            let field = match instruction {
                EncoderInstruction::InsertWithNameRef {
                    is_static: true,
                    name_index,
                    value,
                } => FieldLine::new(
                    Bytes::from_static(static_table::lookup_name(name_index)?),
                    value,
                ),
                EncoderInstruction::InsertWithNameRef {
                    is_static: false,
                    name_index,
                    value,
                } => {
                    let name = self.staged_lookup(&staged, name_index)?.name.clone();
                    FieldLine::new(name, value)
                }
                EncoderInstruction::InsertLiteral { name, value } => FieldLine::new(name, value),
            };

            trace!(
                index = self.dynamic_table.insert_count() + staged.len() as u64,
                field = ?field,
                "insert"
            );
            staged.push(field);
        }

        debug!(
            inserted = staged.len(),
            insert_count = self.dynamic_table.insert_count() + staged.len() as u64,
            "applied encoder stream chunk"
        );
        self.dynamic_table.extend(staged);
        Ok(())
    }

    /// Looks up an absolute index in the table followed by the staged entries.
    fn staged_lookup<'a>(&'a self, staged: &'a [FieldLine], index: u64) -> Result<&'a FieldLine> {
        let committed = self.dynamic_table.insert_count();
        let found = if index < committed {
            self.dynamic_table.lookup(index)
        } else {
            usize::try_from(index - committed)
                .ok()
                .and_then(|i| staged.get(i))
        };

        found.ok_or_else(|| {
            Error::DecompressionFailed(format!(
                "dynamic name reference {} not in table of {} entries",
                index,
                committed + staged.len() as u64
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaddingPolicy;

    fn field(name: &str, value: &str) -> FieldLine {
        FieldLine::new(name.to_owned(), value.to_owned())
    }

    #[test]
    fn test_decode_indexed_static() {
        let decoder = Decoder::new();
        let fields = decoder.decode_header_block(&[0x00, 0x00, 0xd7]).unwrap();
        assert_eq!(fields, vec![field(":scheme", "https")]);
    }

    #[test]
    fn test_decode_pseudo_headers() {
        let decoder = Decoder::new();
        let fields = decoder
            .decode_header_block(&[0x00, 0x00, 0xd1, 0xd7, 0xc1])
            .unwrap();
        assert_eq!(
            fields,
            vec![
                field(":method", "GET"),
                field(":scheme", "https"),
                field(":path", "/"),
            ]
        );
    }

    #[test]
    fn test_decode_literal_with_static_name_ref_huffman_value() {
        let decoder = Decoder::new();
        let fields = decoder
            .decode_header_block(&[0x00, 0x00, 0x51, 0x81, 0x63])
            .unwrap();
        assert_eq!(fields, vec![field(":path", "/")]);
    }

    #[test]
    fn test_decode_literal_with_literal_name() {
        let decoder = Decoder::new();
        let data = [
            0x00, 0x00, 0x24, b'e', b't', b'a', b'g', 0x04, b'H', b'f', b'k', b'U',
        ];
        let fields = decoder.decode_header_block(&data).unwrap();
        assert_eq!(fields, vec![field("etag", "HfkU")]);
    }

    #[test]
    fn test_decode_non_ascii_value() {
        let decoder = Decoder::new();
        let data = [
            0x00, 0x00, 0x24, b'n', b'a', b'm', b'e', 0x04, 0x42, 0xf6, 0x72, 0x6e,
        ];
        let fields = decoder.decode_header_block(&data).unwrap();
        assert_eq!(&fields[0].value[..], &[0x42, 0xf6, 0x72, 0x6e]);
        assert_eq!(fields[0].value_latin1(), "Börn");
    }

    #[test]
    fn test_decode_prefix_only_block() {
        let decoder = Decoder::new();
        assert!(decoder.decode_header_block(&[0x00, 0x00]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_empty_block_is_truncated() {
        let decoder = Decoder::new();
        assert!(matches!(
            decoder.decode_header_block(&[]),
            Err(Error::TruncatedInput(_))
        ));
    }

    #[test]
    fn test_decode_truncated_literal() {
        let decoder = Decoder::new();
        let data = [0x00, 0x00, 0x24, b'e', b't', b'a', b'g', 0x04, b'H'];
        assert_eq!(
            decoder.decode_header_block(&data),
            Err(Error::TruncatedInput(3))
        );
    }

    #[test]
    fn test_decode_static_index_out_of_range() {
        let decoder = Decoder::new();
        // index 99 = 0xc0 | 63, then 36
        let err = decoder
            .decode_header_block(&[0x00, 0x00, 0xff, 0x24])
            .unwrap_err();
        assert!(matches!(err, Error::DecompressionFailed(_)));
        assert_eq!(err.error_code(), 0x0200);
    }

    #[test]
    fn test_decode_dynamic_miss() {
        let decoder = Decoder::new();
        assert!(matches!(
            decoder.decode_header_block(&[0x00, 0x00, 0x80]),
            Err(Error::DecompressionFailed(_))
        ));
    }

    #[test]
    fn test_decode_unsupported_representation() {
        let decoder = Decoder::new();
        assert!(matches!(
            decoder.decode_header_block(&[0x00, 0x00, 0x10]),
            Err(Error::UnsupportedInstruction(_))
        ));
    }

    #[test]
    fn test_insert_with_static_name_ref() {
        let mut decoder = Decoder::new();
        decoder
            .decode_encoder_instructions(&[0xc1, 0x04, b'/', b'i', b'd', b'x'])
            .unwrap();

        assert_eq!(decoder.table().len(), 1);
        assert_eq!(decoder.lookup_dynamic(0), Some(&field(":path", "/idx")));

        let fields = decoder.decode_header_block(&[0x01, 0x00, 0x80]).unwrap();
        assert_eq!(fields, vec![field(":path", "/idx")]);
    }

    #[test]
    fn test_insert_literal_name() {
        let mut decoder = Decoder::new();
        decoder
            .decode_encoder_instructions(&[0x44, b'e', b't', b'a', b'g', 0x04, b'Y', b'r', b'g', b'='])
            .unwrap();
        assert_eq!(decoder.lookup_dynamic(0), Some(&field("etag", "Yrg=")));
    }

    #[test]
    fn test_insert_dynamic_name_ref_within_chunk() {
        let mut decoder = Decoder::new();
        let data = [
            0x44, b'e', b't', b'a', b'g', 0x01, b'a', // etag: a -> 0
            0x80, 0x01, b'b', // name of 0 -> 1
        ];
        decoder.decode_encoder_instructions(&data).unwrap();
        assert_eq!(decoder.lookup_dynamic(1), Some(&field("etag", "b")));

        // name of 1 in a later chunk -> 2
        decoder.decode_encoder_instructions(&[0x81, 0x01, b'c']).unwrap();
        assert_eq!(decoder.lookup_dynamic(2), Some(&field("etag", "c")));
        assert_eq!(decoder.table().insert_count(), 3);
    }

    #[test]
    fn test_insert_dynamic_name_ref_miss() {
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.decode_encoder_instructions(&[0x80, 0x01, b'x']),
            Err(Error::DecompressionFailed(_))
        ));
    }

    #[test]
    fn test_encoder_chunk_is_atomic() {
        let mut decoder = Decoder::new();
        let data = [
            0xc1, 0x04, b'/', b'i', b'd', b'x', // complete insert
            0xc1, 0x04, b'/', b'i', // truncated insert
        ];
        assert_eq!(
            decoder.decode_encoder_instructions(&data),
            Err(Error::TruncatedInput(2))
        );
        assert!(decoder.table().is_empty());
    }

    #[test]
    fn test_encoder_unsupported_instruction() {
        let mut decoder = Decoder::new();
        // Set Dynamic Table Capacity
        assert!(matches!(
            decoder.decode_encoder_instructions(&[0x3f, 0xe1, 0x1f]),
            Err(Error::UnsupportedInstruction(_))
        ));
    }

    #[test]
    fn test_encoder_empty_chunk() {
        let mut decoder = Decoder::new();
        decoder.decode_encoder_instructions(&[]).unwrap();
        assert!(decoder.table().is_empty());
    }

    #[test]
    fn test_strict_padding_config() {
        // "a" is 00011; 0x18 pads with zeros
        let data = [0x00, 0x00, 0x51, 0x81, 0x18];

        let lenient = Decoder::new();
        assert_eq!(
            lenient.decode_header_block(&data).unwrap(),
            vec![field(":path", "a")]
        );

        let strict = Decoder::with_config(QpackConfig::strict());
        assert_eq!(strict.config().huffman_padding, PaddingPolicy::Strict);
        assert!(matches!(
            strict.decode_header_block(&data),
            Err(Error::HuffmanError(_))
        ));
    }
}
