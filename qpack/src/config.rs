//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// How the bits left over at the end of a Huffman-coded literal are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingPolicy {
    /// Drop trailing bits without looking at them.
    #[default]
    Lenient,
    /// Require fewer than 8 trailing bits, all set to 1 (RFC 7541 Section 5.2).
    Strict,
}

/// Tunables for a QPACK decoder session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QpackConfig {
    /// Treatment of Huffman padding in string literals.
    pub huffman_padding: PaddingPolicy,
}

impl QpackConfig {
    /// Configuration that rejects malformed Huffman padding.
    pub fn strict() -> Self {
        Self {
            huffman_padding: PaddingPolicy::Strict,
        }
    }
}
