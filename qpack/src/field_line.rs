//! Field line representation.
//!
//! Represents an HTTP header or trailer field as a name-value pair. QPACK
//! does not interpret field octets, so names and values are kept as raw
//! bytes. Where text is needed (logging, tooling) the mapping is ISO-8859-1:
//! octet `n` is code point U+00nn and back, which never loses an octet the
//! way a UTF-8 conversion would.

use bytes::Bytes;
use std::fmt;

/// An HTTP field line (name-value pair).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldLine {
    pub name: Bytes,
    pub value: Bytes,
}

impl FieldLine {
    /// Creates a new field line.
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a field line from Latin-1 text.
    ///
    /// Returns `None` if either string holds a character above U+00FF.
    pub fn from_latin1(name: &str, value: &str) -> Option<Self> {
        Some(Self::new(latin1_encode(name)?, latin1_encode(value)?))
    }

    /// The name as Latin-1 text.
    pub fn name_latin1(&self) -> String {
        latin1_decode(&self.name)
    }

    /// The value as Latin-1 text.
    pub fn value_latin1(&self) -> String {
        latin1_decode(&self.value)
    }
}

impl fmt::Debug for FieldLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldLine({:?}: {:?})",
            self.name_latin1(),
            self.value_latin1()
        )
    }
}

impl From<(&'static str, &'static str)> for FieldLine {
    fn from((name, value): (&'static str, &'static str)) -> Self {
        Self::new(name, value)
    }
}

impl From<(Bytes, Bytes)> for FieldLine {
    fn from((name, value): (Bytes, Bytes)) -> Self {
        Self::new(name, value)
    }
}

/// Maps each octet to the code point of the same value.
pub fn latin1_decode(octets: &[u8]) -> String {
    octets.iter().map(|&b| char::from(b)).collect()
}

/// Maps each character back to its octet, failing above U+00FF.
pub fn latin1_encode(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}
