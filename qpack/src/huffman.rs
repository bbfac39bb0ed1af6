//! Huffman decoding for QPACK string literals.
//!
//! Implements the static Huffman code defined in RFC 7541 Appendix B, which
//! QPACK reuses without modification. Codes are 5 to 30 bits long.
//!
//! Decoding walks a tree of 256-entry lookup layers keyed 8 bits at a time:
//! a cell either completes a code (`Leaf`) or hands the next 8 bits to a
//! nested layer (`Branch`). Since the longest code is 30 bits, no path is
//! deeper than 4 layers. The tree is built once per process and shared.

use bytes::Bytes;
use std::sync::OnceLock;

use crate::bit_cursor::BitCursor;
use crate::config::PaddingPolicy;
use crate::error::{Error, Result};

/// Huffman code entry: (code, code_length_in_bits)
struct HuffmanEntry {
    code: u32,
    len: u8,
}

// Huffman code table (RFC 7541 Appendix B)
// Each entry is (code, bit_length) for symbols 0-255, plus EOS (256)
static CODE_TABLE: [HuffmanEntry; 257] = include!("huffman_table.inc");

/// Symbol value of the end-of-string marker.
pub const EOS: u16 = 256;

/// Upper bound on layer nesting: ⌈30 / 8⌉.
pub const MAX_LAYERS: usize = 4;

enum Cell {
    /// `len` is the number of bits of this layer's 8-bit key the code uses.
    Leaf { symbol: u16, len: u8 },
    Branch(Box<Layer>),
}

struct Layer {
    cells: Vec<Cell>,
}

/// A code, or the part of it below the layers already walked.
#[derive(Clone, Copy)]
struct PartialCode {
    symbol: u16,
    code: u32,
    len: u8,
}

impl Layer {
    /// Builds the layer that decodes `codes`. The code is complete (its Kraft
    /// sum is exactly 1), so every 8-bit key either finishes a code or is the
    /// prefix of at least one longer code.
    fn build(codes: &[PartialCode], depth: usize) -> Self {
        assert!(depth < MAX_LAYERS, "huffman code longer than {} bits", MAX_LAYERS * 8);

        let cells = (0..=255u32)
            .map(|key| {
                let leaf = codes
                    .iter()
                    .find(|c| c.len <= 8 && key >> (8 - c.len) == c.code);
                if let Some(c) = leaf {
                    return Cell::Leaf {
                        symbol: c.symbol,
                        len: c.len,
                    };
                }

                let rest: Vec<PartialCode> = codes
                    .iter()
                    .filter(|c| c.len > 8 && c.code >> (c.len - 8) == key)
                    .map(|c| PartialCode {
                        symbol: c.symbol,
                        code: c.code & ((1 << (c.len - 8)) - 1),
                        len: c.len - 8,
                    })
                    .collect();
                assert!(!rest.is_empty(), "huffman code is not complete");

                Cell::Branch(Box::new(Layer::build(&rest, depth + 1)))
            })
            .collect();

        Self { cells }
    }

    #[inline]
    fn get(&self, key: u8) -> &Cell {
        &self.cells[key as usize]
    }
}

/// Layered lookup table for the HPACK/QPACK Huffman code.
pub struct HuffmanDecoder {
    root: Layer,
}

static SHARED: OnceLock<HuffmanDecoder> = OnceLock::new();

impl HuffmanDecoder {
    /// Builds the lookup layers from the static code table.
    pub fn new() -> Self {
        let codes: Vec<PartialCode> = CODE_TABLE
            .iter()
            .enumerate()
            .map(|(symbol, entry)| PartialCode {
                symbol: symbol as u16,
                code: entry.code,
                len: entry.len,
            })
            .collect();

        Self {
            root: Layer::build(&codes, 0),
        }
    }

    /// Returns the process-wide decoder, building it on first use.
    pub fn shared() -> &'static HuffmanDecoder {
        SHARED.get_or_init(HuffmanDecoder::new)
    }

    /// Decodes a Huffman-coded string literal into its octets.
    ///
    /// Decoding stops once the bits left over cannot hold another symbol;
    /// `padding` decides whether those bits are checked against the EOS
    /// prefix (RFC 7541 Section 5.2) or dropped unchecked.
    pub fn decode(&self, data: &[u8], padding: PaddingPolicy) -> Result<Bytes> {
        let mut cursor = BitCursor::new(data);
        // Shortest code is 5 bits.
        let mut output = Vec::with_capacity(data.len() * 8 / 5);
        let mut layer = &self.root;
        let mut depth = 0;

        while cursor.remaining_real_bits() > 0 {
            let remaining = cursor.remaining_real_bits();

            match layer.get(cursor.peek_byte()) {
                Cell::Leaf { symbol, len } if *len as usize <= remaining => {
                    if *symbol == EOS {
                        return Err(Error::HuffmanError("EOS symbol in string literal".into()));
                    }
                    output.push(*symbol as u8);
                    cursor.shift(*len as u32);
                    layer = &self.root;
                    depth = 0;
                }
                Cell::Branch(next) if remaining >= 8 => {
                    cursor.shift(8);
                    layer = next;
                    depth += 1;
                }
                _ => {
                    // Fewer than 8 bits left and no symbol fits: padding.
                    if padding == PaddingPolicy::Strict {
                        check_padding(cursor.peek_byte(), remaining, depth)?;
                    }
                    cursor.shift(remaining as u32);
                    depth = 0;
                }
            }
        }

        if depth > 0 && padding == PaddingPolicy::Strict {
            return Err(Error::HuffmanError(format!(
                "input ends inside a code after {} bits",
                depth * 8
            )));
        }

        Ok(Bytes::from(output))
    }
}

impl Default for HuffmanDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HuffmanDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuffmanDecoder").finish_non_exhaustive()
    }
}

/// Padding is valid when it is shorter than 8 bits, belongs to no partially
/// walked code, and consists of the most significant bits of EOS (all ones).
fn check_padding(peeked: u8, remaining: usize, depth: usize) -> Result<()> {
    if depth > 0 {
        return Err(Error::HuffmanError(format!(
            "padding of {} bits",
            depth * 8 + remaining
        )));
    }
    let ones = (1u16 << remaining) - 1;
    if (peeked >> (8 - remaining)) as u16 != ones {
        return Err(Error::HuffmanError("padding is not a prefix of EOS".into()));
    }
    Ok(())
}

/// Decodes a Huffman-coded literal with the shared table and lenient padding.
pub fn decode(data: &[u8]) -> Result<Bytes> {
    HuffmanDecoder::shared().decode(data, PaddingPolicy::Lenient)
}
