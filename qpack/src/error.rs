//! Error types for QPACK operations.
//!
//! Every failure aborts the header block or encoder-stream chunk being
//! decoded; nothing partially decoded is handed back to the caller. Error
//! kinds map onto the HTTP/3 error codes of RFC 9204 Section 6 so that a
//! transport can close the stream or connection with the right code.

use thiserror::Error;

/// Result type for QPACK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during QPACK operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input ended before an instruction, a prefixed integer or a string
    /// literal was complete. Carries the number of octets still missing
    /// (a lower bound when the shortfall is inside an integer).
    #[error("input truncated: need {0} more bytes")]
    TruncatedInput(usize),

    /// Decoding of a field section failed.
    ///
    /// Maps to HTTP/3 error code `QPACK_DECOMPRESSION_FAILED` (0x0200).
    /// Raised for a static table index out of range and for references to
    /// dynamic table entries that do not exist.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// An instruction whose bit pattern this codec does not handle, including
    /// literal field lines that reference the dynamic table for their name.
    #[error("unsupported instruction: {0}")]
    UnsupportedInstruction(String),

    /// Prefixed integer exceeding 62 bits.
    #[error("integer encoding error: {0}")]
    IntegerError(String),

    /// Huffman-coded literal that cannot be decoded.
    #[error("huffman decoding error: {0}")]
    HuffmanError(String),
}

impl Error {
    /// Returns the HTTP/3 error code for this error.
    ///
    /// Everything but an unsupported instruction is a malformed or
    /// inconsistent field section from the peer's point of view.
    pub fn error_code(&self) -> u64 {
        match self {
            Error::UnsupportedInstruction(_) => 0x0102, // H3_INTERNAL_ERROR
            _ => 0x0200,
        }
    }

    /// Returns true if more input could have completed the instruction.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::TruncatedInput(_))
    }
}
