//! Bit-level reader used by the Huffman decoder.
//!
//! The cursor keeps a window of upcoming bits, most significant first. Past
//! the end of the input the window is filled with 1-bits, which is exactly the
//! shape of the EOS-prefix padding a Huffman string ends with. Callers use
//! [`BitCursor::remaining_real_bits`] to tell real input from that padding.

/// Number of bits guaranteed to be ready in the window after every operation.
const WINDOW_BITS: u32 = 32;

/// Sliding bit window over a byte slice.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    /// Next byte of `data` to load into the window.
    pos: usize,
    /// Upcoming bits, left-aligned. Only the top `loaded` bits are meaningful.
    head: u64,
    loaded: u32,
    real_bits: usize,
}

impl<'a> BitCursor<'a> {
    /// Creates a cursor positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        let mut cursor = Self {
            data,
            pos: 0,
            head: 0,
            loaded: 0,
            real_bits: data.len() * 8,
        };
        cursor.refill();
        cursor
    }

    /// Returns the next 8 bits without consuming them.
    #[inline]
    pub fn peek_byte(&self) -> u8 {
        (self.head >> 56) as u8
    }

    /// Returns the next 32 bits without consuming them.
    #[inline]
    pub fn window(&self) -> u32 {
        (self.head >> 32) as u32
    }

    /// Consumes `n` bits (1 to 32).
    #[inline]
    pub fn shift(&mut self, n: u32) {
        debug_assert!((1..=WINDOW_BITS).contains(&n), "shift of {} bits", n);

        self.head <<= n;
        self.loaded -= n;
        self.real_bits = self.real_bits.saturating_sub(n as usize);
        self.refill();
    }

    /// Number of bits left that come from the input rather than padding.
    #[inline]
    pub fn remaining_real_bits(&self) -> usize {
        self.real_bits
    }

    fn refill(&mut self) {
        while self.loaded < WINDOW_BITS {
            let byte = match self.data.get(self.pos) {
                Some(&b) => {
                    self.pos += 1;
                    b
                }
                None => 0xff,
            };
            self.head |= (byte as u64) << (56 - self.loaded);
            self.loaded += 8;
        }
    }
}
