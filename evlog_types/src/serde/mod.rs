//! # Serialization format
//!
//! A record payload is a flat sequence of fields. Nested messages (an array, a curve, ...)
//! are themselves a flat sequence of fields, carried as the body of a length-delimited field.
//!
//! Every field starts with a `field_id`, encoded in `u16`, and a `wire_kind`, encoded in `u8`.
//! Field ids identify a field regardless of its position; a reader that does not know an id
//! skips the field and continues.
//!
//! Some wire kinds have fixed body lengths; these lengths are not encoded.
//! The length-delimited wire kind encodes its body length following `wire_kind`.
//! Either way, a reader can skip the body without interpreting it.
//! The set of wire kinds is frozen per stream format version; an unknown wire kind means
//! the reader cannot find the next field, and the record is malformed.
//!
//! All integers and floats are little-endian.
//!
//! ```text
//! struct Field::Fixed32 {
//!     field_id:       u16,
//!     wire_kind:      u8,
//!     field_body:     [u8; 4],
//! }
//!
//! struct Field::Fixed64 {
//!     field_id:       u16,
//!     wire_kind:      u8,
//!     field_body:     [u8; 8],
//! }
//!
//! struct Field::LengthDelimited {
//!     field_id:           u16,
//!     wire_kind:          u8,
//!     field_body_len:     u32,
//!     field_body:         [u8; field_body_len],
//!         // Either opaque bytes, UTF-8 text, packed i64s,
//!         // or a nested message, i.e. more Fields.
//! }
//! ```

mod field;
mod lengths;
mod wire_kind;

pub use field::*;
pub use lengths::*;
pub use wire_kind::*;
