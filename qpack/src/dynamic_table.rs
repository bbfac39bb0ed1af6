//! Dynamic table implementation.
//!
//! Entries are appended in arrival order and addressed by absolute index,
//! oldest first. The table is never evicted and has no capacity limit:
//! the Required Insert Count / Base machinery of RFC 9204 Section 3.2 is not
//! modelled, so indexes on the wire are taken to be absolute.

use bytes::Bytes;

use crate::field_line::FieldLine;

/// The dynamic table of one decoder session.
#[derive(Debug, Default, Clone)]
pub struct DynamicTable {
    entries: Vec<FieldLine>,
}

impl DynamicTable {
    /// Creates an empty dynamic table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its absolute index.
    pub fn insert(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) -> u64 {
        self.entries.push(FieldLine::new(name, value));
        self.entries.len() as u64 - 1
    }

    /// Gets an entry by absolute index.
    pub fn lookup(&self, index: u64) -> Option<&FieldLine> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }

    /// Total number of insertions, which is also the next absolute index.
    pub fn insert_count(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FieldLine> {
        self.entries.iter()
    }

    pub(crate) fn extend(&mut self, fields: impl IntoIterator<Item = FieldLine>) {
        self.entries.extend(fields);
    }
}
