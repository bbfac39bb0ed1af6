//! QPACK: Header Compression for HTTP/3 (RFC 9204)
//!
//! A header block codec built around a session-owned, append-only dynamic
//! table:
//!
//! - **Decoder**: header blocks using the static table, the dynamic table,
//!   literal names and Huffman-coded literals; encoder-stream inserts with
//!   static, dynamic or literal names.
//! - **Encoder**: static-table-only compression with plain literals.
//! - **Huffman**: the HPACK code (RFC 7541 Appendix B) decoded through
//!   layered 256-entry lookup tables, built once and shared.
//!
//! Dynamic table capacity, eviction, relative indexing, blocked streams and
//! the decoder stream are not implemented.
//!
//! # Example
//!
//! ```rust
//! use qpack::{Decoder, Encoder, FieldLine};
//!
//! let encoder = Encoder::new();
//! let decoder = Decoder::new();
//!
//! let encoded = encoder.encode_header_block(&[(":method", "GET"), (":path", "/")]);
//! let decoded = decoder.decode_header_block(&encoded).unwrap();
//!
//! assert_eq!(
//!     decoded,
//!     vec![FieldLine::new(":method", "GET"), FieldLine::new(":path", "/")]
//! );
//! ```

pub mod bit_cursor;
pub mod config;
pub mod decoder;
pub mod dynamic_table;
pub mod encoder;
pub mod error;
pub mod field_line;
pub mod huffman;
pub mod instructions;
pub mod integer;
pub mod static_table;

// Re-export main types
pub use config::{PaddingPolicy, QpackConfig};
pub use decoder::Decoder;
pub use dynamic_table::DynamicTable;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use field_line::FieldLine;
pub use huffman::HuffmanDecoder;
pub use instructions::HeaderBlockPrefix;
