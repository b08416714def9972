//! In-place document readers
//!
//! Nothing here parses ahead of time: [`get_root`] decodes the two trailer
//! bytes and every access after that reads exactly the slots it needs,
//! resolving back-offsets on the fly. All reads are bounds-checked; an
//! accessor that cannot resolve returns the null/zero/empty sentinel
//! instead of reading out of bounds.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(feature = "std")]
use std::boxed::Box;

use crate::{
    errors::{Error, Result},
    primitives::{read_float, read_int, read_uint, FlexType},
};

/// Most deeply nested document `get_root_checked` will walk
const MAX_CHECK_DEPTH: usize = 64;

/// Decode the trailer and return a reference to the document root
///
/// The last byte is the root's slot width, the penultimate byte its packed
/// type; the root slot ends right before them.
pub fn get_root(buffer: &[u8]) -> Result<Reference<'_>> {
    if buffer.len() < 3 {
        return Err(Error::BufferTooSmall);
    }
    let end = buffer.len();
    let root_byte_width = buffer[end - 1];
    if !matches!(root_byte_width, 1 | 2 | 4 | 8) {
        return Err(Error::InvalidWidth(root_byte_width));
    }
    let packed = buffer[end - 2];
    let ty = FlexType::from_u8(packed >> 2).ok_or(Error::UnknownType(packed >> 2))?;
    let root_byte_width = root_byte_width as usize;
    if end - 2 < root_byte_width {
        return Err(Error::BufferTooSmall);
    }
    Ok(Reference {
        buffer,
        offset: end - 2 - root_byte_width,
        parent_width: root_byte_width,
        byte_width: 1usize << (packed & 3),
        ty,
    })
}

/// Like [`get_root`], but validate every reachable offset first
///
/// Walks the whole document: every back-offset and length must stay inside
/// the buffer, counts must fit the remaining bytes, strings must be
/// NUL-terminated UTF-8. A depth cap and a work budget proportional to the
/// buffer size bound the walk on adversarial input. After this returns
/// `Ok`, plain accessors cannot hit a sentinel for structural reasons.
pub fn get_root_checked(buffer: &[u8]) -> Result<Reference<'_>> {
    let root = get_root(buffer)?;
    let mut work = buffer.len().saturating_mul(2).max(1024);
    validate(&root, 0, &mut work)?;
    Ok(root)
}

/// A typed view of one slot in a document
///
/// Holds the slot position, the width of the slot (`parent_width`), and the
/// width used inside the referent (`byte_width`, from the packed type
/// byte). References are plain copies over a shared immutable buffer; any
/// number may exist concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    buffer: &'a [u8],
    offset: usize,
    parent_width: usize,
    byte_width: usize,
    ty: FlexType,
}

impl<'a> Reference<'a> {
    fn null(buffer: &'a [u8]) -> Self {
        Reference {
            buffer,
            offset: 0,
            parent_width: 1,
            byte_width: 1,
            ty: FlexType::Null,
        }
    }

    /// Type tag of the referenced value
    pub fn flex_type(&self) -> FlexType {
        self.ty
    }

    /// Whether this reference is a null (including every sentinel)
    pub fn is_null(&self) -> bool {
        self.ty == FlexType::Null
    }

    /// Resolve the back-offset stored in this slot
    fn indirect(&self) -> Option<usize> {
        let up = read_uint(self.buffer, self.offset, self.parent_width)? as usize;
        self.offset.checked_sub(up)
    }

    /// The value as a signed integer, coerced across widths; 0 on mismatch
    pub fn as_int(&self) -> i64 {
        match self.ty {
            FlexType::Int => read_int(self.buffer, self.offset, self.parent_width).unwrap_or(0),
            FlexType::UInt => self.as_uint() as i64,
            FlexType::Float => self.as_double() as i64,
            FlexType::Bool => self.as_bool() as i64,
            FlexType::IndirectInt => self
                .indirect()
                .and_then(|loc| read_int(self.buffer, loc, self.byte_width))
                .unwrap_or(0),
            FlexType::IndirectUInt | FlexType::IndirectFloat => self.as_uint() as i64,
            _ => 0,
        }
    }

    /// The value as an unsigned integer; 0 on mismatch
    pub fn as_uint(&self) -> u64 {
        match self.ty {
            FlexType::UInt | FlexType::Bool => {
                read_uint(self.buffer, self.offset, self.parent_width).unwrap_or(0)
            }
            FlexType::Int => {
                read_int(self.buffer, self.offset, self.parent_width).unwrap_or(0) as u64
            }
            FlexType::Float => self.as_double() as u64,
            FlexType::IndirectUInt => self
                .indirect()
                .and_then(|loc| read_uint(self.buffer, loc, self.byte_width))
                .unwrap_or(0),
            FlexType::IndirectInt => self
                .indirect()
                .and_then(|loc| read_int(self.buffer, loc, self.byte_width))
                .unwrap_or(0) as u64,
            FlexType::IndirectFloat => self.as_double() as u64,
            _ => 0,
        }
    }

    /// The value as a double; 0.0 on mismatch
    pub fn as_double(&self) -> f64 {
        match self.ty {
            FlexType::Float => {
                read_float(self.buffer, self.offset, self.parent_width).unwrap_or(0.0)
            }
            FlexType::Int => {
                read_int(self.buffer, self.offset, self.parent_width).unwrap_or(0) as f64
            }
            FlexType::UInt | FlexType::Bool => {
                read_uint(self.buffer, self.offset, self.parent_width).unwrap_or(0) as f64
            }
            FlexType::IndirectFloat => self
                .indirect()
                .and_then(|loc| read_float(self.buffer, loc, self.byte_width))
                .unwrap_or(0.0),
            FlexType::IndirectInt | FlexType::IndirectUInt => self.as_int() as f64,
            _ => 0.0,
        }
    }

    /// The value as a boolean; non-zero numerics read as true
    pub fn as_bool(&self) -> bool {
        match self.ty {
            FlexType::Bool => {
                read_uint(self.buffer, self.offset, self.parent_width).unwrap_or(0) != 0
            }
            FlexType::Null => false,
            _ => self.as_uint() != 0,
        }
    }

    /// The value as a string slice; empty on mismatch or invalid UTF-8
    pub fn as_str(&self) -> &'a str {
        self.try_str().unwrap_or("")
    }

    fn try_str(&self) -> Option<&'a str> {
        match self.ty {
            FlexType::String => {
                let loc = self.indirect()?;
                let len =
                    read_uint(self.buffer, loc.checked_sub(self.byte_width)?, self.byte_width)?;
                let end = loc.checked_add(len as usize)?;
                let bytes = self.buffer.get(loc..end)?;
                core::str::from_utf8(bytes).ok()
            }
            FlexType::Key => {
                let loc = self.indirect()?;
                let tail = self.buffer.get(loc..)?;
                let end = tail.iter().position(|&b| b == 0)?;
                core::str::from_utf8(&tail[..end]).ok()
            }
            _ => None,
        }
    }

    /// Raw bytes of a blob (or the bytes of a string); empty on mismatch
    pub fn as_blob(&self) -> &'a [u8] {
        match self.ty {
            FlexType::Blob | FlexType::String => (|| {
                let loc = self.indirect()?;
                let len =
                    read_uint(self.buffer, loc.checked_sub(self.byte_width)?, self.byte_width)?;
                self.buffer.get(loc..loc.checked_add(len as usize)?)
            })()
            .unwrap_or(&[]),
            _ => &[],
        }
    }

    /// NUL-terminated bytes of a key or string, without the terminator
    pub fn c_string(&self) -> &'a [u8] {
        match self.ty {
            FlexType::Key | FlexType::String => (|| {
                let loc = self.indirect()?;
                let tail = self.buffer.get(loc..)?;
                let end = tail.iter().position(|&b| b == 0)?;
                Some(&tail[..end])
            })()
            .unwrap_or(&[]),
            _ => &[],
        }
    }

    /// The value as a vector view; empty on mismatch
    ///
    /// Maps also answer here, exposing their value column.
    pub fn as_vector(&self) -> VectorReader<'a> {
        if !self.ty.is_any_vector() {
            return VectorReader::empty(self.buffer);
        }
        match self.indirect() {
            Some(loc) => VectorReader {
                buffer: self.buffer,
                offset: loc,
                byte_width: self.byte_width,
                ty: self.ty,
            },
            None => VectorReader::empty(self.buffer),
        }
    }

    /// The value as a map view; empty on mismatch
    pub fn as_map(&self) -> MapReader<'a> {
        if self.ty != FlexType::Map {
            return MapReader {
                values: VectorReader::empty(self.buffer),
            };
        }
        MapReader {
            values: self.as_vector(),
        }
    }
}

/// Counted, indexable view over a vector payload
#[derive(Debug, Clone, Copy)]
pub struct VectorReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    byte_width: usize,
    ty: FlexType,
}

impl<'a> VectorReader<'a> {
    fn empty(buffer: &'a [u8]) -> Self {
        VectorReader {
            buffer,
            offset: 0,
            byte_width: 1,
            ty: FlexType::Null,
        }
    }

    /// Number of elements
    ///
    /// Fixed-length typed vectors carry their length in the type tag;
    /// everything else reads the count word before the payload.
    pub fn len(&self) -> usize {
        if self.ty.is_fixed_typed_vector() {
            return self.ty.fixed_typed_vector_element().1;
        }
        if self.ty == FlexType::Null {
            return 0;
        }
        self.offset
            .checked_sub(self.byte_width)
            .and_then(|o| read_uint(self.buffer, o, self.byte_width))
            .unwrap_or(0) as usize
    }

    /// Whether the vector holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reference to element `i`; a null reference when out of range
    pub fn index(&self, i: usize) -> Reference<'a> {
        let len = self.len();
        if i >= len {
            return Reference::null(self.buffer);
        }
        let elem_offset = match i
            .checked_mul(self.byte_width)
            .and_then(|o| o.checked_add(self.offset))
        {
            Some(o) => o,
            None => return Reference::null(self.buffer),
        };
        match self.ty {
            FlexType::Vector | FlexType::Map => {
                // packed type bytes trail the payload, one per element
                let packed = match len
                    .checked_mul(self.byte_width)
                    .and_then(|p| p.checked_add(self.offset))
                    .and_then(|p| p.checked_add(i))
                    .and_then(|p| self.buffer.get(p).copied())
                {
                    Some(p) => p,
                    None => return Reference::null(self.buffer),
                };
                match FlexType::from_u8(packed >> 2) {
                    Some(ty) => Reference {
                        buffer: self.buffer,
                        offset: elem_offset,
                        parent_width: self.byte_width,
                        byte_width: 1usize << (packed & 3),
                        ty,
                    },
                    None => Reference::null(self.buffer),
                }
            }
            _ => {
                let elem_ty = if self.ty.is_fixed_typed_vector() {
                    self.ty.fixed_typed_vector_element().0
                } else {
                    self.ty.typed_vector_element()
                };
                Reference {
                    buffer: self.buffer,
                    offset: elem_offset,
                    parent_width: self.byte_width,
                    byte_width: 1,
                    ty: elem_ty,
                }
            }
        }
    }

    /// Iterate over the elements
    pub fn iter(&self) -> Box<dyn Iterator<Item = Reference<'a>> + 'a> {
        let v = *self;
        Box::new((0..v.len()).map(move |i| v.index(i)))
    }
}

/// Counted, keyed view over a map
///
/// The value column is an untyped vector; the sorted key vector sits behind
/// the two prefix words before the count.
#[derive(Debug, Clone, Copy)]
pub struct MapReader<'a> {
    values: VectorReader<'a>,
}

impl<'a> MapReader<'a> {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The sorted keys as a typed vector view
    pub fn keys(&self) -> VectorReader<'a> {
        (|| {
            let prefix = self.values.offset.checked_sub(self.values.byte_width * 3)?;
            let back = read_uint(self.values.buffer, prefix, self.values.byte_width)? as usize;
            let keys_loc = prefix.checked_sub(back)?;
            let keys_bw = read_uint(
                self.values.buffer,
                prefix + self.values.byte_width,
                self.values.byte_width,
            )? as usize;
            if !matches!(keys_bw, 1 | 2 | 4 | 8) {
                return None;
            }
            Some(VectorReader {
                buffer: self.values.buffer,
                offset: keys_loc,
                byte_width: keys_bw,
                ty: FlexType::VectorKey,
            })
        })()
        .unwrap_or_else(|| VectorReader::empty(self.values.buffer))
    }

    /// Value reference at entry `i` (entries are sorted by key bytes)
    pub fn index(&self, i: usize) -> Reference<'a> {
        self.values.index(i)
    }

    /// Key bytes at entry `i`, without the NUL terminator
    pub fn key_at(&self, i: usize) -> &'a [u8] {
        self.keys().index(i).c_string()
    }

    /// Look up a value by key
    ///
    /// Binary search over the sorted key vector; small maps fall back to a
    /// linear scan where cache locality wins.
    pub fn get(&self, key: &str) -> Option<Reference<'a>> {
        let keys = self.keys();
        let n = keys.len();
        let wanted = key.as_bytes();

        if n <= 4 {
            for i in 0..n {
                if keys.index(i).c_string() == wanted {
                    return Some(self.index(i));
                }
            }
            return None;
        }

        let mut lo = 0usize;
        let mut hi = n;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match keys.index(mid).c_string().cmp(wanted) {
                core::cmp::Ordering::Equal => return Some(self.index(mid)),
                core::cmp::Ordering::Less => lo = mid + 1,
                core::cmp::Ordering::Greater => hi = mid,
            }
        }
        None
    }

    /// Iterate over `(key bytes, value)` entries in key order
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&'a [u8], Reference<'a>)> + 'a> {
        let m = *self;
        Box::new((0..m.len()).map(move |i| (m.key_at(i), m.index(i))))
    }
}

/// Validate one reference and everything reachable from it
fn validate(r: &Reference<'_>, depth: usize, work: &mut usize) -> Result<()> {
    if depth > MAX_CHECK_DEPTH {
        return Err(Error::NestingTooDeep);
    }
    *work = work.checked_sub(1).ok_or(Error::NestingTooDeep)?;

    match r.ty {
        FlexType::Null => Ok(()),
        FlexType::Int | FlexType::UInt | FlexType::Bool => {
            read_uint(r.buffer, r.offset, r.parent_width)
                .map(|_| ())
                .ok_or(Error::OffsetOutOfRange)
        }
        FlexType::Float => {
            if !matches!(r.parent_width, 4 | 8) {
                return Err(Error::InvalidWidth(r.parent_width as u8));
            }
            read_float(r.buffer, r.offset, r.parent_width)
                .map(|_| ())
                .ok_or(Error::OffsetOutOfRange)
        }
        FlexType::IndirectInt | FlexType::IndirectUInt | FlexType::IndirectFloat => {
            let loc = checked_indirect(r)?;
            if r.ty == FlexType::IndirectFloat && !matches!(r.byte_width, 4 | 8) {
                return Err(Error::InvalidWidth(r.byte_width as u8));
            }
            read_uint(r.buffer, loc, r.byte_width)
                .map(|_| ())
                .ok_or(Error::OffsetOutOfRange)
        }
        FlexType::Key => {
            let loc = checked_indirect(r)?;
            let tail = r.buffer.get(loc..).ok_or(Error::OffsetOutOfRange)?;
            if !tail.contains(&0) {
                return Err(Error::OffsetOutOfRange);
            }
            Ok(())
        }
        FlexType::String => {
            let loc = checked_indirect(r)?;
            let len = read_uint(
                r.buffer,
                loc.checked_sub(r.byte_width).ok_or(Error::OffsetOutOfRange)?,
                r.byte_width,
            )
            .ok_or(Error::OffsetOutOfRange)? as usize;
            let end = loc.checked_add(len).ok_or(Error::OffsetOutOfRange)?;
            // the NUL terminator must also be inside the buffer
            if end >= r.buffer.len() {
                return Err(Error::OffsetOutOfRange);
            }
            core::str::from_utf8(&r.buffer[loc..end])?;
            Ok(())
        }
        FlexType::Blob => {
            let loc = checked_indirect(r)?;
            let len = read_uint(
                r.buffer,
                loc.checked_sub(r.byte_width).ok_or(Error::OffsetOutOfRange)?,
                r.byte_width,
            )
            .ok_or(Error::OffsetOutOfRange)? as usize;
            let end = loc.checked_add(len).ok_or(Error::OffsetOutOfRange)?;
            if end > r.buffer.len() {
                return Err(Error::OffsetOutOfRange);
            }
            Ok(())
        }
        _ => validate_vector(r, depth, work),
    }
}

fn validate_vector(r: &Reference<'_>, depth: usize, work: &mut usize) -> Result<()> {
    checked_indirect(r)?;
    let vec = r.as_vector();
    let len = vec.len();
    // the payload (and type bytes, for untyped vectors) must fit
    let payload = len
        .checked_mul(vec.byte_width)
        .ok_or(Error::OffsetOutOfRange)?;
    let mut end = vec
        .offset
        .checked_add(payload)
        .ok_or(Error::OffsetOutOfRange)?;
    if matches!(r.ty, FlexType::Vector | FlexType::Map) {
        end = end.checked_add(len).ok_or(Error::OffsetOutOfRange)?;
    }
    if end > r.buffer.len() {
        return Err(Error::OffsetOutOfRange);
    }
    if r.ty == FlexType::Map {
        let map = r.as_map();
        let keys = map.keys();
        if keys.ty == FlexType::Null || keys.len() != len {
            return Err(Error::OffsetOutOfRange);
        }
        for i in 0..len {
            validate(&keys.index(i), depth + 1, work)?;
        }
    }
    if matches!(r.ty, FlexType::Vector | FlexType::Map) {
        // reject unknown tags in the trailing type bytes outright; index()
        // would silently hand back null sentinels for them
        for i in 0..len {
            let packed = r.buffer[vec.offset + len * vec.byte_width + i];
            if FlexType::from_u8(packed >> 2).is_none() {
                return Err(Error::UnknownType(packed >> 2));
            }
        }
    }
    for i in 0..len {
        validate(&vec.index(i), depth + 1, work)?;
    }
    Ok(())
}

/// Resolve a back-offset, rejecting any that underflows the buffer
///
/// Zero offsets are legal (an empty payload sits flush against its slot);
/// cycles a zero offset could form are cut off by the depth and work limits.
fn checked_indirect(r: &Reference<'_>) -> Result<usize> {
    let up = read_uint(r.buffer, r.offset, r.parent_width).ok_or(Error::OffsetOutOfRange)? as usize;
    r.offset.checked_sub(up).ok_or(Error::OffsetOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[cfg(feature = "std")]
    use std::vec;

    #[test]
    fn test_get_root_rejects_short_buffers() {
        assert!(matches!(get_root(&[]), Err(Error::BufferTooSmall)));
        assert!(matches!(get_root(&[1]), Err(Error::BufferTooSmall)));
        assert!(matches!(get_root(&[0, 1]), Err(Error::BufferTooSmall)));
    }

    #[test]
    fn test_get_root_rejects_bad_width() {
        // root byte width 3 is not a power of two
        assert!(matches!(
            get_root(&[0, 0x04, 3]),
            Err(Error::InvalidWidth(3))
        ));
    }

    #[test]
    fn test_get_root_rejects_unknown_tag() {
        // tag 37 is outside the enum
        let packed = 37u8 << 2;
        assert!(matches!(
            get_root(&[0, packed, 1]),
            Err(Error::UnknownType(37))
        ));
    }

    #[test]
    fn test_null_sentinels_on_mismatch() {
        let mut b = Builder::new(64);
        b.add_int(42);
        b.finish();
        let root = get_root(b.bytes()).unwrap();
        assert_eq!(root.as_int(), 42);
        assert_eq!(root.as_str(), "");
        assert_eq!(root.as_blob(), &[] as &[u8]);
        assert!(root.as_vector().is_empty());
        assert!(root.as_map().is_empty());
        assert!(root.as_map().get("anything").is_none());
    }

    #[test]
    fn test_numeric_coercions() {
        let mut b = Builder::new(64);
        let v = b.start_vector();
        b.add_int(-3);
        b.add_uint(7);
        b.add_double(2.5);
        b.add_bool(true);
        b.end_vector(v, false, false);
        b.finish();
        let root = get_root(b.bytes()).unwrap().as_vector();
        assert_eq!(root.index(0).as_double(), -3.0);
        assert_eq!(root.index(1).as_int(), 7);
        assert_eq!(root.index(2).as_int(), 2);
        assert_eq!(root.index(2).as_uint(), 2);
        assert_eq!(root.index(3).as_int(), 1);
        assert!(root.index(1).as_bool());
    }

    #[test]
    fn test_vector_index_out_of_range_is_null() {
        let mut b = Builder::new(64);
        let v = b.start_vector();
        b.add_int(1);
        b.end_vector(v, false, false);
        b.finish();
        let root = get_root(b.bytes()).unwrap().as_vector();
        assert_eq!(root.len(), 1);
        assert!(root.index(1).is_null());
        assert!(root.index(usize::MAX).is_null());
    }

    #[test]
    fn test_map_binary_search_path() {
        let mut b = Builder::new(256);
        let m = b.start_map();
        for i in 0..12 {
            // zero-padded so byte order and numeric order agree
            let key = std::format!("key{i:02}");
            b.add_int_with_key(i, &key);
        }
        b.end_map(m);
        b.finish();
        let map = get_root(b.bytes()).unwrap().as_map();
        assert_eq!(map.len(), 12);
        for i in 0..12 {
            let key = std::format!("key{i:02}");
            assert_eq!(map.get(&key).unwrap().as_int(), i);
        }
        assert!(map.get("key99").is_none());
        assert!(map.get("").is_none());
    }

    #[test]
    fn test_map_iteration_in_key_order() {
        let mut b = Builder::new(64);
        let m = b.start_map();
        b.add_int_with_key(2, "b");
        b.add_int_with_key(1, "a");
        b.add_int_with_key(3, "c");
        b.end_map(m);
        b.finish();
        let map = get_root(b.bytes()).unwrap().as_map();
        let entries: std::vec::Vec<_> = map.iter().map(|(k, v)| (k.to_vec(), v.as_int())).collect();
        assert_eq!(
            entries,
            vec![(b"a".to_vec(), 1), (b"b".to_vec(), 2), (b"c".to_vec(), 3)]
        );
    }

    #[test]
    fn test_checked_root_accepts_builder_output() {
        let mut b = Builder::new(256);
        let m = b.start_map();
        b.add_string_with_key("v", "s");
        let inner = b.start_vector_with_key("list");
        b.add_int(1);
        b.add_blob(b"xy");
        b.add_null();
        b.end_vector(inner, false, false);
        b.add_double_with_key(0.5, "d");
        b.end_map(m);
        b.finish();
        assert!(get_root_checked(b.bytes()).is_ok());
    }

    #[test]
    fn test_checked_root_rejects_underflowing_offset() {
        // the root slot claims a back-offset past the start of the buffer
        let bytes = [2u8, 0x28, 1];
        assert!(matches!(
            get_root_checked(&bytes),
            Err(Error::OffsetOutOfRange)
        ));
    }

    #[test]
    fn test_checked_root_cuts_off_crafted_cycles() {
        // count 1, element slot pointing back into itself via a zero offset
        let bytes = [1u8, 0, 0x28, 1];
        assert!(matches!(
            get_root_checked(&bytes),
            Err(Error::NestingTooDeep)
        ));
    }

    #[test]
    fn test_checked_root_rejects_truncated_string() {
        let mut b = Builder::new(64);
        b.add_string("hello");
        b.finish();
        let mut bytes = b.bytes().to_vec();
        // corrupt the length prefix so the string runs past the buffer
        bytes[0] = 200;
        assert!(matches!(
            get_root_checked(&bytes),
            Err(Error::OffsetOutOfRange)
        ));
    }

    #[test]
    fn test_accessors_survive_adversarial_input() {
        // every 3-byte buffer with a valid trailer must not panic or read
        // out of bounds, whatever the accessors return
        for first in 0..=255u8 {
            for packed in 0..=255u8 {
                let bytes = [first, packed, 1];
                if let Ok(root) = get_root(&bytes) {
                    let _ = root.as_int();
                    let _ = root.as_str();
                    let _ = root.as_blob();
                    let v = root.as_vector();
                    let _ = v.index(0);
                    let m = root.as_map();
                    let _ = m.get("k");
                    let _ = get_root_checked(&bytes);
                }
            }
        }
    }
}
