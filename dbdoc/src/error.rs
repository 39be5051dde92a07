use crate::types::DocType;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum VarIntError {
    #[error("VarInt value {0} exceeds maximum {max}", max = i64::MAX)]
    Range(i128),
    #[error("Unexpected end of buffer while decoding VarInt")]
    Eof,
    #[error("VarInt is longer than 9 bytes")]
    TooLong,
    #[error("VarInt has a redundant leading group")]
    NonCanonical,
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum SerialTypeError {
    #[error("{} requires a length", .0.name())]
    MissingLength(DocType),
    #[error("{} is fixed-width and takes no length", .0.name())]
    UnexpectedLength(DocType),
    #[error("Unknown serial type {0}")]
    UnknownTag(u64),
    #[error("Length {0} does not fit into a serial type")]
    Length(usize),
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum ValueError {
    #[error("Cannot {op} on a value of type {}", .found.name())]
    InvalidOperation { op: &'static str, found: DocType },
    #[error("Index {index} out of range for array of length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("Value of type {} cannot be cast to {to}", .from.name())]
    Cast { from: DocType, to: &'static str },
}

/// A schema violation. `path` points at the offending node, starting at `$` for the root.
#[derive(Debug, PartialEq, Clone)]
pub struct SchemaError {
    pub path: String,
    pub kind: SchemaErrorKind,
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum SchemaErrorKind {
    #[error("expected {}, found {}", .expected.name(), .found.name())]
    Type { expected: DocType, found: DocType },
    #[error("null is not allowed")]
    Null,
    #[error("key `{0}` is not defined in the schema")]
    UnknownKey(String),
    #[error("required attribute `{0}` is missing")]
    MissingAttribute(String),
    #[error("invalid schema: {0}")]
    Invalid(&'static str),
    #[error("malformed schema document: {0}")]
    Malformed(String),
}

impl SchemaError {
    pub(crate) fn new(kind: SchemaErrorKind) -> Self {
        SchemaError { path: String::new(), kind }
    }

    /// Prefixes the path with the segment of the parent node while the error bubbles up.
    pub(crate) fn within(mut self, segment: &str) -> Self {
        self.path.insert_str(0, segment);
        self
    }

    pub(crate) fn rooted(self) -> Self {
        self.within("$")
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Schema violation at {}: {}", self.path, self.kind)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct DecoderError {
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn position(&self) -> usize {
        self.at
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for DecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum DecodeError {
    #[error("Unexpected end of buffer while decoding")]
    Eof,
    #[error("Expected magic byte {:#04x}, found {:#04x}", crate::serializer::MAGIC, .0)]
    Magic(u8),
    #[error("Invalid schema flag {0:#04x}")]
    SchemaFlag(u8),
    #[error("Invalid key mode {0:#04x}")]
    KeyMode(u8),
    #[error("Expected {expected}, found {}", .found.name())]
    UnexpectedType { expected: &'static str, found: DocType },
    #[error("Key mode requires a document schema but none is in scope")]
    MissingSchema,
    #[error("Attribute id {0} is not defined in the schema")]
    UnknownAttribute(i16),
    #[error("Key {0} appears more than once")]
    DuplicateKey(String),
    #[error("String slice was not valid Utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("String slice was not valid Utf-16")]
    Utf16,
    #[error("Code unit {0:#06x} is not a valid char")]
    Char(u16),
    #[error("Decimal scale {0} exceeds 28")]
    Decimal(u32),
    #[error("Tick count {0} is not a valid date")]
    DateTime(i64),
    #[error("Boolean byte {0:#04x} is neither 0 nor 1")]
    Bool(u8),
    #[error("{} has no scalar payload", .0.name())]
    Unsupported(DocType),
    #[error("Nesting exceeds the maximum depth of {0}")]
    Depth(usize),
    #[error("{0} trailing bytes after the closing magic byte")]
    Trailing(usize),
    #[error(transparent)]
    VarInt(#[from] VarIntError),
    #[error(transparent)]
    SerialType(#[from] SerialTypeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EncodeError {
    #[error("Fixed buffer of {0} bytes is full")]
    Capacity(usize),
    #[error("Char {0:?} lies outside the basic multilingual plane")]
    Char(char),
    #[error("Char {0:?} cannot be represented in Latin-1")]
    Latin1(char),
    #[error("Date {0} lies outside the representable tick range")]
    DateTime(String),
    #[error("Key `{0}` has no attribute id in the schema")]
    UnknownAttribute(String),
    #[error("{} has no scalar payload", .0.name())]
    Unsupported(DocType),
    #[error("Nesting exceeds the maximum depth of {0}")]
    Depth(usize),
    #[error(transparent)]
    VarInt(#[from] VarIntError),
    #[error(transparent)]
    SerialType(#[from] SerialTypeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
