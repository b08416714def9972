//! Document builder: a stack-based two-pass layout engine
//!
//! Children are serialized before their parents. Scalars and strings append
//! concrete bytes immediately (or stage an inline payload); vectors and maps
//! are framed with [`Builder::start_vector`]/[`Builder::start_map`] and
//! closed with the matching `end_*` call, which elects one slot width wide
//! enough for every back-reference in the frame, writes the payload, and
//! replaces the frame's stack entries with a single ticket for the enclosing
//! frame to reference.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
use std::{collections::BTreeMap, vec::Vec};

use log::debug;
use xxhash_rust::xxh64::xxh64;

use crate::{
    buffer::ByteBuffer,
    primitives::{padding, width_f, width_i, width_u, BitWidth, FlexType},
    value::Value,
};

/// Sharing configuration for a [`Builder`]
///
/// The variants are ordered so comparisons make sense: key sharing is
/// enabled by any flag at or above [`BuilderFlags::ShareKeys`], string
/// sharing by [`BuilderFlags::ShareKeysAndStrings`] and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BuilderFlags {
    /// No interning
    None = 0,
    /// Identical keys collapse to one serialization
    ShareKeys = 1,
    /// Reserved rung below combined sharing; on its own it still enables
    /// key sharing through the ordering
    ShareStrings = 2,
    /// Identical keys and identical strings collapse
    ShareKeysAndStrings = 3,
    /// Maps with identical sorted key sets reuse one keys vector
    ShareKeyVectors = 4,
    /// Everything above
    ShareAll = 7,
}

/// Scalar types with a fixed serialized width, usable with
/// [`Builder::create_typed_vector`]
pub trait FixedScalar: Copy {
    /// Element type tag
    const TYPE: FlexType;
    /// Serialized width of one element
    const WIDTH: BitWidth;
    /// Bit pattern of the value, sign-extended to 64 bits
    fn to_raw(self) -> u64;
}

macro_rules! impl_fixed_scalar {
    ($ty:ty, $flex:ident, $width:ident, |$v:ident| $raw:expr) => {
        impl FixedScalar for $ty {
            const TYPE: FlexType = FlexType::$flex;
            const WIDTH: BitWidth = BitWidth::$width;
            #[inline]
            fn to_raw(self) -> u64 {
                let $v = self;
                $raw
            }
        }
    };
}

impl_fixed_scalar!(i8, Int, W8, |v| v as i64 as u64);
impl_fixed_scalar!(i16, Int, W16, |v| v as i64 as u64);
impl_fixed_scalar!(i32, Int, W32, |v| v as i64 as u64);
impl_fixed_scalar!(i64, Int, W64, |v| v as u64);
impl_fixed_scalar!(u8, UInt, W8, |v| v as u64);
impl_fixed_scalar!(u16, UInt, W16, |v| v as u64);
impl_fixed_scalar!(u32, UInt, W32, |v| v as u64);
impl_fixed_scalar!(u64, UInt, W64, |v| v);
impl_fixed_scalar!(f32, Float, W32, |v| v.to_bits() as u64);
impl_fixed_scalar!(f64, Float, W64, |v| v.to_bits());
impl_fixed_scalar!(bool, Bool, W8, |v| v as u64);

/// Builder for flexbuf documents
///
/// A builder is a single-threaded mutating state machine: push children,
/// close frames, call [`finish`](Builder::finish) exactly once, then take
/// the bytes. [`reset`](Builder::reset) returns it to empty while keeping
/// the allocation and flags.
#[derive(Debug)]
pub struct Builder {
    buf: ByteBuffer,
    stack: Vec<Value>,
    flags: BuilderFlags,
    min_bit_width: BitWidth,
    finished: bool,
    has_duplicate_keys: bool,
    // interning pools: content hash -> serialized location, confirmed by
    // byte equality on every hit so collisions can never alias
    key_pool: BTreeMap<u64, usize>,
    string_pool: BTreeMap<u64, (usize, usize)>,
    key_vector_pool: BTreeMap<u64, (Value, Vec<usize>)>,
}

impl Builder {
    /// Create a builder with key sharing enabled
    pub fn new(initial_size: usize) -> Self {
        Self::with_flags(initial_size, BuilderFlags::ShareKeys)
    }

    /// Create a builder with explicit sharing flags
    pub fn with_flags(initial_size: usize, flags: BuilderFlags) -> Self {
        Builder {
            buf: ByteBuffer::with_capacity(initial_size),
            stack: Vec::new(),
            flags,
            min_bit_width: BitWidth::W8,
            finished: false,
            has_duplicate_keys: false,
            key_pool: BTreeMap::new(),
            string_pool: BTreeMap::new(),
            key_vector_pool: BTreeMap::new(),
        }
    }

    /// Raise the floor of every subsequent width election
    pub fn force_min_bit_width(&mut self, width: BitWidth) {
        self.min_bit_width = width;
    }

    /// The sharing flags this builder was created with
    pub fn flags(&self) -> BuilderFlags {
        self.flags
    }

    /// Current write position; useful to observe sharing
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Whether the last `end_map` saw two pairs with equal key bytes
    ///
    /// Non-fatal: the document is still emitted, with the duplicate entries
    /// adjacent after the sort.
    pub fn has_duplicate_keys(&self) -> bool {
        self.has_duplicate_keys
    }

    fn share_keys(&self) -> bool {
        self.flags >= BuilderFlags::ShareKeys
    }

    fn share_strings(&self) -> bool {
        self.flags >= BuilderFlags::ShareKeysAndStrings
    }

    fn share_key_vectors(&self) -> bool {
        self.flags >= BuilderFlags::ShareKeyVectors
    }

    #[inline]
    fn push(&mut self, v: Value) {
        assert!(!self.finished, "builder already finished");
        self.stack.push(v);
    }

    // ─── scalar adders ───────────────────────────────────────────────

    /// Stage a null
    pub fn add_null(&mut self) {
        self.push(Value::null());
    }

    /// Stage a boolean
    pub fn add_bool(&mut self, b: bool) {
        self.push(Value::bool(b));
    }

    /// Stage a signed integer at the narrowest width that holds it
    pub fn add_int(&mut self, i: i64) {
        self.push(Value::int(i));
    }

    /// Stage an unsigned integer
    pub fn add_uint(&mut self, u: u64) {
        self.push(Value::uint(u));
    }

    /// Stage a single-precision float
    pub fn add_float(&mut self, f: f32) {
        self.push(Value::float32(f));
    }

    /// Stage a double; narrows to four bytes when the value survives the
    /// round trip through `f32`
    pub fn add_double(&mut self, d: f64) {
        self.push(Value::float64(d));
    }

    // ─── strings, keys, blobs ────────────────────────────────────────

    /// Serialize a length-prefixed, NUL-terminated UTF-8 string
    ///
    /// With string sharing enabled an identical earlier string is reused and
    /// nothing is written. Returns the string's location in the buffer.
    pub fn add_string(&mut self, s: &str) -> usize {
        assert!(!self.finished, "builder already finished");
        let bytes = s.as_bytes();
        let bit_width = width_u(bytes.len() as u64);
        if self.share_strings() {
            let hash = xxh64(bytes, 0);
            if let Some(&(loc, len)) = self.string_pool.get(&hash) {
                if len == bytes.len() && &self.buf.as_slice()[loc..loc + len] == bytes {
                    self.stack.push(Value::offset(loc, FlexType::String, bit_width));
                    return loc;
                }
            }
            let sloc = self.create_blob(bytes, 1, FlexType::String);
            self.string_pool.entry(hash).or_insert((sloc, bytes.len()));
            sloc
        } else {
            self.create_blob(bytes, 1, FlexType::String)
        }
    }

    /// Serialize a map key: NUL-terminated bytes with no length prefix
    ///
    /// Keys must not contain interior NULs. With key sharing enabled an
    /// identical earlier key is reused. Returns the key's location.
    pub fn add_key(&mut self, key: &str) -> usize {
        assert!(!self.finished, "builder already finished");
        let bytes = key.as_bytes();
        debug_assert!(!bytes.contains(&0), "keys must not contain NUL");
        if self.share_keys() {
            let hash = xxh64(bytes, 0);
            if let Some(&loc) = self.key_pool.get(&hash) {
                if key_at(self.buf.as_slice(), loc) == bytes {
                    self.stack.push(Value::offset(loc, FlexType::Key, BitWidth::W8));
                    return loc;
                }
            }
            let sloc = self.write_key_bytes(bytes);
            self.key_pool.entry(hash).or_insert(sloc);
            sloc
        } else {
            self.write_key_bytes(bytes)
        }
    }

    fn write_key_bytes(&mut self, bytes: &[u8]) -> usize {
        let sloc = self.buf.len();
        self.buf.ensure_space(bytes.len() + 1);
        self.buf.write_bytes(bytes);
        self.buf.push(0);
        self.stack.push(Value::offset(sloc, FlexType::Key, BitWidth::W8));
        sloc
    }

    /// Serialize length-prefixed raw bytes
    pub fn add_blob(&mut self, data: &[u8]) -> usize {
        assert!(!self.finished, "builder already finished");
        self.create_blob(data, 0, FlexType::Blob)
    }

    fn create_blob(&mut self, data: &[u8], trailing: usize, ty: FlexType) -> usize {
        let bit_width = width_u(data.len() as u64);
        self.buf.ensure_space(data.len() + trailing + 8);
        let byte_width = self.align(bit_width);
        self.buf.write_uint(data.len() as u64, byte_width);
        let sloc = self.buf.len();
        self.buf.write_bytes(data);
        self.buf.fill_zeros(trailing);
        self.stack.push(Value::offset(sloc, ty, bit_width));
        sloc
    }

    // ─── indirect scalars ────────────────────────────────────────────

    /// Serialize a signed integer out of line at its own width
    ///
    /// The containing frame then stores a back-offset instead of the value,
    /// so one wide outlier does not widen every sibling slot.
    pub fn add_indirect_int(&mut self, i: i64) -> usize {
        assert!(!self.finished, "builder already finished");
        let bit_width = width_i(i);
        let byte_width = self.align(bit_width);
        let sloc = self.buf.len();
        self.buf.write_uint(i as u64, byte_width);
        self.stack.push(Value::offset(sloc, FlexType::IndirectInt, bit_width));
        sloc
    }

    /// Serialize an unsigned integer out of line
    pub fn add_indirect_uint(&mut self, u: u64) -> usize {
        assert!(!self.finished, "builder already finished");
        let bit_width = width_u(u);
        let byte_width = self.align(bit_width);
        let sloc = self.buf.len();
        self.buf.write_uint(u, byte_width);
        self.stack.push(Value::offset(sloc, FlexType::IndirectUInt, bit_width));
        sloc
    }

    /// Serialize a double out of line
    pub fn add_indirect_float(&mut self, d: f64) -> usize {
        assert!(!self.finished, "builder already finished");
        let bit_width = width_f(d);
        let byte_width = self.align(bit_width);
        let sloc = self.buf.len();
        self.buf.write_float(d, byte_width);
        self.stack.push(Value::offset(sloc, FlexType::IndirectFloat, bit_width));
        sloc
    }

    // ─── keyed adders ────────────────────────────────────────────────

    /// Stage a key followed by a null
    pub fn add_null_with_key(&mut self, key: &str) {
        self.add_key(key);
        self.add_null();
    }

    /// Stage a key followed by a boolean
    pub fn add_bool_with_key(&mut self, b: bool, key: &str) {
        self.add_key(key);
        self.add_bool(b);
    }

    /// Stage a key followed by a signed integer
    pub fn add_int_with_key(&mut self, i: i64, key: &str) {
        self.add_key(key);
        self.add_int(i);
    }

    /// Stage a key followed by an unsigned integer
    pub fn add_uint_with_key(&mut self, u: u64, key: &str) {
        self.add_key(key);
        self.add_uint(u);
    }

    /// Stage a key followed by a single-precision float
    pub fn add_float_with_key(&mut self, f: f32, key: &str) {
        self.add_key(key);
        self.add_float(f);
    }

    /// Stage a key followed by a double
    pub fn add_double_with_key(&mut self, d: f64, key: &str) {
        self.add_key(key);
        self.add_double(d);
    }

    /// Stage a key followed by a string
    pub fn add_string_with_key(&mut self, s: &str, key: &str) -> usize {
        self.add_key(key);
        self.add_string(s)
    }

    /// Stage a key followed by a blob
    pub fn add_blob_with_key(&mut self, data: &[u8], key: &str) -> usize {
        self.add_key(key);
        self.add_blob(data)
    }

    /// Stage a key followed by an indirect signed integer
    pub fn add_indirect_int_with_key(&mut self, i: i64, key: &str) -> usize {
        self.add_key(key);
        self.add_indirect_int(i)
    }

    /// Stage a key followed by an indirect unsigned integer
    pub fn add_indirect_uint_with_key(&mut self, u: u64, key: &str) -> usize {
        self.add_key(key);
        self.add_indirect_uint(u)
    }

    /// Stage a key followed by an indirect double
    pub fn add_indirect_float_with_key(&mut self, d: f64, key: &str) -> usize {
        self.add_key(key);
        self.add_indirect_float(d)
    }

    // ─── vector and map framing ──────────────────────────────────────

    /// Open a vector frame; pass the marker to [`end_vector`](Builder::end_vector)
    pub fn start_vector(&mut self) -> usize {
        assert!(!self.finished, "builder already finished");
        self.stack.len()
    }

    /// Open a vector frame as a map entry under `key`
    pub fn start_vector_with_key(&mut self, key: &str) -> usize {
        self.add_key(key);
        self.stack.len()
    }

    /// Open a map frame; pass the marker to [`end_map`](Builder::end_map)
    pub fn start_map(&mut self) -> usize {
        assert!(!self.finished, "builder already finished");
        self.stack.len()
    }

    /// Open a map frame as a map entry under `key`
    pub fn start_map_with_key(&mut self, key: &str) -> usize {
        self.add_key(key);
        self.stack.len()
    }

    /// Close a vector frame opened at `start`
    ///
    /// A `typed` vector requires every element to share one element type and
    /// drops the per-element type bytes; `fixed` additionally folds the
    /// length (2 to 4) into the type tag. Returns the vector's location.
    pub fn end_vector(&mut self, start: usize, typed: bool, fixed: bool) -> usize {
        assert!(!self.finished, "builder already finished");
        assert!(!fixed || typed, "fixed vectors must be typed");
        let len = self.stack.len() - start;
        let vec = self.create_vector(start, len, 1, typed, fixed, None);
        self.stack.truncate(start);
        self.stack.push(vec);
        vec.sloc()
    }

    /// Close a map frame opened at `start`
    ///
    /// The frame must hold alternating key/value pairs. Pairs are sorted by
    /// key bytes, the keys go out as a typed vector, and the value vector is
    /// prefixed with the keys' location and slot width. Returns the map's
    /// location.
    pub fn end_map(&mut self, start: usize) -> usize {
        assert!(!self.finished, "builder already finished");
        assert!(
            (self.stack.len() - start) % 2 == 0,
            "unbalanced map frame: keys and values must alternate"
        );
        for i in (start..self.stack.len()).step_by(2) {
            assert!(
                self.stack[i].ty() == FlexType::Key,
                "map entries must be added through the keyed adders"
            );
        }
        let len = (self.stack.len() - start) / 2;
        self.sort_map_range(start);
        let keys = self.create_keys_vector(start, len);
        let map = self.create_vector(start + 1, len, 2, false, false, Some(keys));
        self.stack.truncate(start);
        self.stack.push(map);
        map.sloc()
    }

    /// Sort the pairs in `[start..]` by key bytes and record duplicates
    fn sort_map_range(&mut self, start: usize) {
        let mut pairs: Vec<(Value, Value)> = self.stack[start..]
            .chunks_exact(2)
            .map(|c| (c[0], c[1]))
            .collect();
        {
            let buf = self.buf.as_slice();
            pairs.sort_by(|a, b| key_at(buf, a.0.sloc()).cmp(key_at(buf, b.0.sloc())));
            for w in pairs.windows(2) {
                if key_at(buf, w[0].0.sloc()) == key_at(buf, w[1].0.sloc()) {
                    self.has_duplicate_keys = true;
                }
            }
        }
        for (i, (k, v)) in pairs.into_iter().enumerate() {
            self.stack[start + 2 * i] = k;
            self.stack[start + 2 * i + 1] = v;
        }
    }

    /// Emit the typed keys vector for a sorted map frame, reusing an
    /// identical earlier one when key-vector sharing is on
    fn create_keys_vector(&mut self, start: usize, len: usize) -> Value {
        if !self.share_key_vectors() {
            return self.create_vector(start, len, 2, true, false, None);
        }
        let slocs: Vec<usize> = (0..len).map(|i| self.stack[start + 2 * i].sloc()).collect();
        let mut digest = Vec::with_capacity(slocs.len() * 8);
        for s in &slocs {
            digest.extend_from_slice(&(*s as u64).to_le_bytes());
        }
        let hash = xxh64(&digest, 0);
        if let Some((value, pooled)) = self.key_vector_pool.get(&hash) {
            if *pooled == slocs {
                return *value;
            }
        }
        let keys = self.create_vector(start, len, 2, true, false, None);
        self.key_vector_pool.entry(hash).or_insert((keys, slocs));
        keys
    }

    /// Serialize a contiguous scalar slice as a typed vector
    ///
    /// Fast path: the slot width comes from the element type (widened only
    /// if the length demands it), so no per-element election runs.
    pub fn create_typed_vector<T: FixedScalar>(&mut self, elems: &[T]) -> usize {
        assert!(!self.finished, "builder already finished");
        let len = elems.len();
        let bit_width = self
            .min_bit_width
            .max(T::WIDTH)
            .max(width_u(len as u64));
        let byte_width = self.align(bit_width);
        self.buf.ensure_space((len + 1) * byte_width);
        self.buf.write_uint(len as u64, byte_width);
        let vloc = self.buf.len();
        for e in elems {
            if T::TYPE == FlexType::Float {
                let d = if T::WIDTH == BitWidth::W32 {
                    f32::from_bits(e.to_raw() as u32) as f64
                } else {
                    f64::from_bits(e.to_raw())
                };
                self.buf.write_float(d, byte_width);
            } else {
                self.buf.write_uint(e.to_raw(), byte_width);
            }
        }
        self.stack
            .push(Value::offset(vloc, T::TYPE.to_typed_vector(0), bit_width));
        vloc
    }

    /// Serialize a scalar slice as a typed vector under `key`
    pub fn create_typed_vector_with_key<T: FixedScalar>(
        &mut self,
        key: &str,
        elems: &[T],
    ) -> usize {
        self.add_key(key);
        self.create_typed_vector(elems)
    }

    /// Write a vector frame: width election, optional keys prefix, length,
    /// payload slots, and per-element type bytes for untyped vectors
    fn create_vector(
        &mut self,
        start: usize,
        len: usize,
        step: usize,
        typed: bool,
        fixed: bool,
        keys: Option<Value>,
    ) -> Value {
        let mut bit_width = self.min_bit_width.max(width_u(len as u64));
        let mut prefix_elems = 1usize;
        if let Some(keys) = &keys {
            // the keys offset and keys width words sit before the length
            bit_width = bit_width.max(keys.element_width(self.buf.len(), 0));
            prefix_elems += 2;
        }
        let mut vector_type = FlexType::Key;
        let mut i = start;
        while i < self.stack.len() {
            let elem_width = self.stack[i].element_width(self.buf.len(), i - start + prefix_elems);
            bit_width = bit_width.max(elem_width);
            if typed {
                if i == start {
                    vector_type = self.stack[i].ty();
                    assert!(
                        vector_type.is_typed_vector_element(),
                        "{vector_type:?} cannot be a typed vector element"
                    );
                } else {
                    assert!(
                        vector_type == self.stack[i].ty(),
                        "typed vectors hold a single element type"
                    );
                }
            }
            i += step;
        }
        if fixed {
            assert!(
                matches!(
                    vector_type,
                    FlexType::Int | FlexType::UInt | FlexType::Float
                ),
                "fixed vectors hold int, uint, or float elements"
            );
        }
        let byte_width = self.align(bit_width);
        if let Some(keys) = &keys {
            self.write_offset(keys.sloc(), byte_width);
            self.buf.write_uint(1u64 << keys.bit_width() as u32, byte_width);
        }
        if !fixed {
            self.buf.write_uint(len as u64, byte_width);
        }
        let vloc = self.buf.len();
        let mut i = start;
        while i < self.stack.len() {
            let elem = self.stack[i];
            self.write_any(elem, byte_width);
            i += step;
        }
        if !typed {
            let mut i = start;
            while i < self.stack.len() {
                let packed = self.stack[i].stored_packed_type(bit_width);
                self.buf.push(packed);
                i += step;
            }
        }
        let ty = if keys.is_some() {
            FlexType::Map
        } else if typed {
            vector_type.to_typed_vector(if fixed { len } else { 0 })
        } else {
            FlexType::Vector
        };
        Value::offset(vloc, ty, bit_width)
    }

    /// Write one staged value into a slot of `byte_width` bytes
    fn write_any(&mut self, value: Value, byte_width: usize) {
        match value.ty() {
            FlexType::Int => self.buf.write_uint(value.i() as u64, byte_width),
            FlexType::Null | FlexType::UInt | FlexType::Bool => {
                self.buf.write_uint(value.u(), byte_width)
            }
            FlexType::Float => self.buf.write_float(value.f(), byte_width),
            _ => self.write_offset(value.sloc(), byte_width),
        }
    }

    /// Write the relative back-offset from the current position to `sloc`
    fn write_offset(&mut self, sloc: usize, byte_width: usize) {
        let reloff = (self.buf.len() - sloc) as u64;
        assert!(
            byte_width == 8 || reloff < 1u64 << (byte_width * 8),
            "back-offset does not fit its slot"
        );
        self.buf.write_uint(reloff, byte_width);
    }

    /// Pad the buffer to a multiple of the given width; returns the width in
    /// bytes
    fn align(&mut self, width: BitWidth) -> usize {
        let byte_width = width.byte_width();
        let pad = padding(self.buf.len(), byte_width);
        self.buf.fill_zeros(pad);
        byte_width
    }

    // ─── lifecycle ───────────────────────────────────────────────────

    /// Write the root slot and the two trailer bytes
    ///
    /// The root is emitted exactly as if it were the only element of an
    /// enclosing vector, followed by its packed type and its slot width.
    pub fn finish(&mut self) {
        assert!(!self.finished, "finish called twice");
        assert!(
            self.stack.len() == 1,
            "unbalanced document: expected exactly one root value, found {}",
            self.stack.len()
        );
        let root = self.stack[0];
        let byte_width = self.align(root.element_width(self.buf.len(), 0));
        self.write_any(root, byte_width);
        self.buf.push(root.stored_packed_type(BitWidth::W8));
        self.buf.push(byte_width as u8);
        self.finished = true;
        debug!("finished document: {} bytes", self.buf.len());
    }

    /// The serialized document; only valid after [`finish`](Builder::finish)
    pub fn bytes(&self) -> &[u8] {
        assert!(self.finished, "document not finished");
        self.buf.as_slice()
    }

    /// Take ownership of the serialized document
    pub fn into_bytes(self) -> Vec<u8> {
        assert!(self.finished, "document not finished");
        self.buf.into_vec()
    }

    /// Return to the empty state, keeping the allocation and flags
    pub fn reset(&mut self) {
        self.buf.clear();
        self.stack.clear();
        self.key_pool.clear();
        self.string_pool.clear();
        self.key_vector_pool.clear();
        self.finished = false;
        self.has_duplicate_keys = false;
        debug!("builder reset");
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_INITIAL_SIZE)
    }
}

/// Key bytes at `sloc`, up to but excluding the NUL terminator
fn key_at(buf: &[u8], sloc: usize) -> &[u8] {
    let tail = &buf[sloc..];
    match tail.iter().position(|&b| b == 0) {
        Some(n) => &tail[..n],
        None => tail,
    }
}
