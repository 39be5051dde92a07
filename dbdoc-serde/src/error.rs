use std::fmt::Display;
use serde::{de, ser};
use dbdoc::{DecoderError, DocType, EncodeError, SchemaError, ValueError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Decode
    #[error("Decoding error: {0}")]
    Decode(#[from] DecoderError),
    #[error("Unexpected value: expected {expected}, found {}", .found.name())]
    UnexpectedType { expected: &'static str, found: DocType },
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("Key `{0}` could not be parsed as {1}")]
    Key(String, &'static str),
    // Encode
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Map key must be convertible to a string. Maybe use crate `serde_with` to transform the map into a vec of tuples")]
    KeyType,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    // Both
    #[error("{0}")]
    Message(String),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
