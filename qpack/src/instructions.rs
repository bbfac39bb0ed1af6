//! QPACK wire representations per RFC 9204 Section 4.
//!
//! Header block (Section 4.5):
//! - Encoded Field Section Prefix
//! - Indexed Field Line
//! - Literal Field Line With Name Reference
//! - Literal Field Line With Literal Name
//!
//! Encoder stream (Section 4.3):
//! - Insert With Name Reference
//! - Insert With Literal Name
//!
//! Each representation is recognised by the high bits of its first octet.
//! This module only parses and serialises; resolving indexes against the
//! static and dynamic tables is left to the decoder.

use bytes::{BufMut, Bytes};

use crate::config::PaddingPolicy;
use crate::error::{Error, Result};
use crate::huffman::HuffmanDecoder;
use crate::integer;

/// Decodes string literals (RFC 9204 Section 4.1.2).
///
/// A literal is a length with an N-bit prefix, the Huffman flag in the bit
/// just above that prefix, then `length` octets.
#[derive(Debug, Clone, Copy)]
pub struct StringDecoder<'a> {
    huffman: &'a HuffmanDecoder,
    padding: PaddingPolicy,
}

impl<'a> StringDecoder<'a> {
    pub fn new(huffman: &'a HuffmanDecoder, padding: PaddingPolicy) -> Self {
        Self { huffman, padding }
    }

    /// Decodes a literal whose length uses a `prefix_bits`-bit prefix (at most 7).
    ///
    /// Returns the literal's octets and the number of input octets consumed.
    pub fn decode(&self, prefix_bits: u8, data: &[u8]) -> Result<(Bytes, usize)> {
        debug_assert!(prefix_bits < 8);

        let first = *data.first().ok_or(Error::TruncatedInput(1))?;
        let huffman = first & (1 << prefix_bits) != 0;

        let (len, consumed) = integer::decode(prefix_bits, data)?;
        let available = data.len() - consumed;
        let len = match usize::try_from(len) {
            Ok(len) if len <= available => len,
            _ => {
                let missing = usize::try_from(len).unwrap_or(usize::MAX) - available;
                return Err(Error::TruncatedInput(missing));
            }
        };

        let raw = &data[consumed..consumed + len];
        let value = if huffman {
            self.huffman.decode(raw, self.padding)?
        } else {
            Bytes::copy_from_slice(raw)
        };

        Ok((value, consumed + len))
    }
}

/// Writes a literal as raw octets; this codec never Huffman-codes what it sends.
pub fn encode_string<B: BufMut>(value: &[u8], prefix_bits: u8, flags: u8, buf: &mut B) {
    integer::encode(value.len() as u64, prefix_bits, flags, buf);
    buf.put_slice(value);
}

/// Encoded Field Section Prefix (RFC 9204 Section 4.5.1).
///
/// Both fields are carried through as read. The sign bit of the Delta Base
/// is ignored, as is everything else that relative dynamic indexing needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderBlockPrefix {
    pub required_insert_count: u64,
    pub delta_base: u64,
}

impl HeaderBlockPrefix {
    /// Decodes the prefix. Returns (prefix, bytes_consumed).
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let (required_insert_count, mut pos) = integer::decode(8, data)?;
        let (delta_base, consumed) = integer::decode(7, &data[pos..])?;
        pos += consumed;

        Ok((
            Self {
                required_insert_count,
                delta_base,
            },
            pos,
        ))
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        integer::encode(self.required_insert_count, 8, 0x00, buf);
        integer::encode(self.delta_base, 7, 0x00, buf);
    }
}

/// One field line of a header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLineRepresentation {
    /// Indexed Field Line.
    /// Pattern: 1Txxxxxx (T=1 static, T=0 dynamic, index with 6-bit prefix)
    Indexed { is_static: bool, index: u64 },

    /// Literal Field Line With Name Reference, static table only.
    /// Pattern: 01N1xxxx (name index with 4-bit prefix), then the value
    LiteralWithNameRef { name_index: u64, value: Bytes },

    /// Literal Field Line With Literal Name.
    /// Pattern: 001NHxxx (H=Huffman flag, name length with 3-bit prefix),
    /// then the value
    LiteralWithLiteralName { name: Bytes, value: Bytes },
}

impl FieldLineRepresentation {
    /// Decode one field line. Returns (representation, bytes_consumed).
    pub fn decode(data: &[u8], strings: &StringDecoder<'_>) -> Result<(Self, usize)> {
        let first = *data.first().ok_or(Error::TruncatedInput(1))?;

        if first & 0x80 == 0x80 {
            // 1T | Index (6+)
            let is_static = first & 0x40 == 0x40;
            let (index, consumed) = integer::decode(6, data)?;

            Ok((Self::Indexed { is_static, index }, consumed))
        } else if first & 0xc0 == 0x40 {
            // 01NT | Name Index (4+)
            if first & 0x10 == 0 {
                return Err(Error::UnsupportedInstruction(
                    "literal field line with dynamic name reference".into(),
                ));
            }
            let (name_index, mut pos) = integer::decode(4, data)?;

            // H | Value Length (7+) | Value
            let (value, consumed) = strings.decode(7, &data[pos..])?;
            pos += consumed;

            Ok((Self::LiteralWithNameRef { name_index, value }, pos))
        } else if first & 0xe0 == 0x20 {
            // 001NH | Name Length (3+) | Name
            let (name, mut pos) = strings.decode(3, data)?;

            // H | Value Length (7+) | Value
            let (value, consumed) = strings.decode(7, &data[pos..])?;
            pos += consumed;

            Ok((Self::LiteralWithLiteralName { name, value }, pos))
        } else {
            Err(Error::UnsupportedInstruction(format!(
                "field line pattern {:#010b}",
                first
            )))
        }
    }

    /// Encode this field line.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            Self::Indexed { is_static, index } => {
                let flags = if *is_static { 0xc0 } else { 0x80 };
                integer::encode(*index, 6, flags, buf);
            }
            Self::LiteralWithNameRef { name_index, value } => {
                integer::encode(*name_index, 4, 0x50, buf);
                encode_string(value, 7, 0x00, buf);
            }
            Self::LiteralWithLiteralName { name, value } => {
                encode_string(name, 3, 0x20, buf);
                encode_string(value, 7, 0x00, buf);
            }
        }
    }
}

/// Encoder stream instruction types this codec understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderInstruction {
    /// Insert With Name Reference.
    /// Pattern: 1Txxxxxx (T=0 dynamic, T=1 static, name index with 6-bit prefix)
    InsertWithNameRef {
        is_static: bool,
        name_index: u64,
        value: Bytes,
    },

    /// Insert With Literal Name.
    /// Pattern: 01Hxxxxx (H=Huffman flag, name length with 5-bit prefix)
    InsertLiteral { name: Bytes, value: Bytes },
}

impl EncoderInstruction {
    /// Decode one instruction. Returns (instruction, bytes_consumed).
    ///
    /// Set Dynamic Table Capacity (001xxxxx) and Duplicate (000xxxxx) are
    /// reported as unsupported.
    pub fn decode(data: &[u8], strings: &StringDecoder<'_>) -> Result<(Self, usize)> {
        let first = *data.first().ok_or(Error::TruncatedInput(1))?;

        if first & 0x80 == 0x80 {
            // 1T | Name Index (6+)
            let is_static = first & 0x40 == 0x40;
            let (name_index, mut pos) = integer::decode(6, data)?;

            let (value, consumed) = strings.decode(7, &data[pos..])?;
            pos += consumed;

            Ok((
                Self::InsertWithNameRef {
                    is_static,
                    name_index,
                    value,
                },
                pos,
            ))
        } else if first & 0xc0 == 0x40 {
            // 01H | Name Length (5+)
            let (name, mut pos) = strings.decode(5, data)?;

            let (value, consumed) = strings.decode(7, &data[pos..])?;
            pos += consumed;

            Ok((Self::InsertLiteral { name, value }, pos))
        } else {
            Err(Error::UnsupportedInstruction(format!(
                "encoder stream pattern {:#010b}",
                first
            )))
        }
    }
}
