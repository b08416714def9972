//! flexbuf - schema-less zero-copy binary documents
//!
//! This crate provides both halves of the format:
//! - A [`Builder`] that serializes an arbitrary tree of scalars, strings,
//!   blobs, vectors, and string-keyed maps into one contiguous buffer
//! - Reader types that resolve values in place, with no parsing pass and no
//!   allocation at read time
//!
//! Slots are stored at the narrowest byte width (1, 2, 4, or 8) that holds
//! every value and back-reference in their frame, so small documents stay
//! small; the document root and its type sit in the last bytes of the
//! buffer and everything is reached by walking offsets backward from there.
//!
//! # Quick Start
//!
//! ```rust
//! use flexbuf::{Builder, get_root};
//!
//! // Serialize
//! let mut builder = Builder::new(256);
//! let m = builder.start_map();
//! builder.add_int_with_key(7, "answer");
//! builder.add_string_with_key("hi", "greeting");
//! builder.end_map(m);
//! builder.finish();
//!
//! // Deserialize (zero-copy)
//! let root = get_root(builder.bytes())?;
//! let map = root.as_map();
//! assert_eq!(map.get("answer").unwrap().as_int(), 7);
//! assert_eq!(map.get("greeting").unwrap().as_str(), "hi");
//! # Ok::<(), flexbuf::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod buffer;
mod builder;
mod errors;
mod primitives;
mod reader;
mod value;

pub use builder::{Builder, BuilderFlags, FixedScalar};
pub use errors::{Error, Result};
pub use primitives::{packed_type, width_i, width_u, BitWidth, FlexType};
pub use reader::{get_root, get_root_checked, MapReader, Reference, VectorReader};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        builder::{Builder, BuilderFlags, FixedScalar},
        errors::{Error, Result},
        primitives::{BitWidth, FlexType},
        reader::{get_root, get_root_checked, MapReader, Reference, VectorReader},
    };
}

/// Core constants of the flexbuf format
pub mod constants {
    /// Bytes past the root slot: the packed type byte and the width byte
    pub const TRAILER_SIZE: usize = 2;

    /// Default initial buffer capacity for [`Builder::default`](crate::Builder)
    pub const DEFAULT_INITIAL_SIZE: usize = 256;

    /// Hard ceiling on buffer growth; offsets past 2^31 misbehave on 32-bit
    /// targets, so the builder aborts instead of producing such a document
    pub const MAX_BUFFER_SIZE: usize = 1 << 31;
}
