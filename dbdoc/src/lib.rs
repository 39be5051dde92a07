//! `dbdoc` is a self-describing binary document format. Values form a tree of scalars, arrays and documents (maps
//! from string keys to values) and are written as a single frame. A frame can carry a schema describing the shape of
//! its value; if it does, document keys are replaced by small attribute ids, which makes long lists of uniform
//! records considerably smaller.
//!
//! Every value on wire is prefixed by a serial type: one [`VarInt`] packing the type and, for strings, blobs,
//! arrays and documents, the length. All fixed-width numbers are little-endian.
//!
//! # Examples
//!
//! ```
//! use dbdoc::*;
//!
//! let mut doc = Document::new();
//! doc.insert("a", "b");
//! let value = Value::from(doc);
//! let bytes = Encoder::encode(&value, None).unwrap();
//! assert_eq!(bytes, [
//!     0xdb, // magic
//!     0x64, // no schema
//!     0x1c, // Document of length 1
//!     0x64, // keys are strings
//!     0x1b, // String of length 1
//!     0x61, // 'a'
//!     0x1b, // String of length 1
//!     0x62, // 'b'
//!     0xdb, // magic
//! ]);
//! assert_eq!(value, Decoder::decode(&bytes).unwrap());
//! ```
//!
//! With a schema, keys become attribute ids:
//!
//! ```
//! use dbdoc::*;
//!
//! let rows: Vec<Value> = (0..10).map(|i| {
//!     let mut row = Document::new();
//!     row.insert("id", i);
//!     row.insert("name", format!("row {}", i));
//!     Value::from(row)
//! }).collect();
//! let rows = Value::from(rows);
//! let schema = SchemaElement::parse(&rows).unwrap();
//! assert!(schema.is_tabular());
//!
//! let bytes = Encoder::encode(&rows, Some(&schema)).unwrap();
//! let (decoded, embedded) = Decoder::default().deserialize(&bytes).unwrap();
//! assert_eq!(rows, decoded);
//! assert_eq!(Some(schema), embedded);
//! ```
//!
//! # A note on `usize`
//!
//! Lengths on wire are limited to `i64::MAX` by the `VarInt` encoding, while Rust indexes containers with the
//! architecture-dependent `usize`. Lengths which cannot be represented on either side fail with a
//! `SerialTypeError::Length` when encoding and are rejected as unknown tags when decoding.

mod array;
mod buffer;
mod collation;
mod document;
mod error;
mod ops;
mod options;
mod schema;
mod serial_type;
mod serializer;
mod types;
mod value;
mod varint;

pub use array::Array;
pub use buffer::{Buffer, TextEncoding};
pub use collation::{Binary, Collation, IgnoreCase};
pub use document::{Document, Iter, ID_KEY};
pub use error::*;
pub use options::Options;
pub use schema::{SchemaAttribute, SchemaElement};
pub use serial_type::SerialType;
pub use serializer::{Decoder, Encoder, MAGIC};
pub use types::DocType;
pub use value::Value;
pub use varint::VarInt;

pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
