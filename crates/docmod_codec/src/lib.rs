//! # docmod Codec
//!
//! Document values and their wire encoding for docmod.
//!
//! This crate provides:
//! - [`Value`], the dynamic document value that field descriptors encode into
//! - `serde` integration for [`Value`], so it renders to JSON as easily as CBOR
//! - CBOR wire encoding with canonical map-key order
//!
//! ## Usage
//!
//! ```
//! use docmod_codec::{from_cbor, to_cbor, Value};
//!
//! let doc = Value::map([("$inc", Value::map([("count", Value::Integer(1))]))]);
//! let bytes = to_cbor(&doc).unwrap();
//!
//! let decoded = from_cbor(&bytes).unwrap();
//! assert_eq!(doc, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod value;
mod wire;

pub use error::{CodecError, CodecResult};
pub use value::Value;
pub use wire::{from_cbor, to_cbor};
