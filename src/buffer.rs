//! Growable byte store backing the builder

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use log::trace;

use crate::constants::MAX_BUFFER_SIZE;

/// Contiguous byte buffer with power-of-two growth
///
/// The builder writes forward; the document's root ends up at the high end.
/// Capacity doubles until a write fits and never exceeds
/// [`MAX_BUFFER_SIZE`](crate::constants::MAX_BUFFER_SIZE), because offsets
/// past 2^31 misbehave on 32-bit targets.
#[derive(Debug)]
pub(crate) struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    /// Create a buffer with the given initial capacity, rounded up to a
    /// power of two
    pub(crate) fn with_capacity(initial: usize) -> Self {
        ByteBuffer {
            bytes: Vec::with_capacity(initial.next_power_of_two()),
        }
    }

    /// Current write position
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The bytes written so far
    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Grow capacity so that `extra` more bytes fit
    pub(crate) fn ensure_space(&mut self, extra: usize) {
        let needed = self.bytes.len() + extra;
        if needed <= self.bytes.capacity() {
            return;
        }
        assert!(
            needed <= MAX_BUFFER_SIZE,
            "buffer capacity exhausted: {needed} bytes exceeds the {MAX_BUFFER_SIZE} ceiling"
        );
        let mut cap = self.bytes.capacity().max(1);
        while cap < needed {
            cap = cap.saturating_mul(2);
        }
        trace!(
            "growing buffer {} -> {} bytes",
            self.bytes.capacity(),
            cap
        );
        self.bytes.reserve_exact(cap - self.bytes.len());
    }

    /// Append one byte
    #[inline]
    pub(crate) fn push(&mut self, b: u8) {
        self.ensure_space(1);
        self.bytes.push(b);
    }

    /// Append a slice
    #[inline]
    pub(crate) fn write_bytes(&mut self, src: &[u8]) {
        self.ensure_space(src.len());
        self.bytes.extend_from_slice(src);
    }

    /// Append the low `byte_width` bytes of `v`, little-endian
    ///
    /// Two's complement means this also writes sign-truncated signed values;
    /// width election guarantees the dropped bytes are redundant.
    #[inline]
    pub(crate) fn write_uint(&mut self, v: u64, byte_width: usize) {
        self.write_bytes(&v.to_le_bytes()[..byte_width]);
    }

    /// Append a float at the given slot width
    pub(crate) fn write_float(&mut self, v: f64, byte_width: usize) {
        match byte_width {
            4 => self.write_bytes(&(v as f32).to_le_bytes()),
            8 => self.write_bytes(&v.to_le_bytes()),
            // floats elect at least W32, so narrower slots cannot occur
            _ => unreachable!("float slots are 4 or 8 bytes"),
        }
    }

    /// Append `n` zero bytes
    pub(crate) fn fill_zeros(&mut self, n: usize) {
        self.ensure_space(n);
        for _ in 0..n {
            self.bytes.push(0);
        }
    }

    /// Forget the contents but keep the allocation
    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Give up ownership of the written bytes
    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}
