//! A serial type packs the type of a value and, for variable-length types, its length into one `VarInt` so that every
//! value on wire is prefixed by exactly one tag. Fixed-width types use their type id directly, which is always below
//! `VARIABLE_START`. Variable-length types are tagged with `VARIABLE_START + length * 5 + offset` where `offset`
//! distinguishes the five variable-length types. The length counts bytes for `Blob`, `String` and `VarInt` and
//! elements for `Array` and `Document`.

use crate::error::SerialTypeError;
use crate::types::DocType;
use crate::varint::VarInt;
use std::convert::TryFrom;

const VARIABLE_START: u64 = DocType::VARIABLE_START as u64;
const VARIABLE_KINDS: u64 = 5;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SerialType {
    doc_type: DocType,
    length: Option<usize>,
}

impl SerialType {

    /// Fails if a variable-length type comes without a length or a fixed-width type comes with one.
    pub fn new(doc_type: DocType, length: Option<usize>) -> Result<Self, SerialTypeError> {
        match (doc_type.is_variable(), length) {
            (true, None)     => Err(SerialTypeError::MissingLength(doc_type)),
            (false, Some(_)) => Err(SerialTypeError::UnexpectedLength(doc_type)),
            (_, length)      => Ok(SerialType { doc_type, length }),
        }
    }

    pub fn fixed(doc_type: DocType) -> Result<Self, SerialTypeError> {
        Self::new(doc_type, None)
    }

    pub fn variable(doc_type: DocType, length: usize) -> Result<Self, SerialTypeError> {
        Self::new(doc_type, Some(length))
    }

    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// The packed tag. Fails if the length is too large to be represented.
    pub fn value(&self) -> Result<VarInt, SerialTypeError> {
        let tag = match (self.doc_type.variable_offset(), self.length) {
            (Some(offset), Some(length)) => u64::try_from(length).ok()
                .and_then(|l| l.checked_mul(VARIABLE_KINDS))
                .and_then(|l| l.checked_add(VARIABLE_START + offset as u64))
                .ok_or(SerialTypeError::Length(length))?,
            (None, _) => self.doc_type.id() as u64,
            (Some(_), None) => return Err(SerialTypeError::MissingLength(self.doc_type)),
        };
        VarInt::new(tag).map_err(|_| SerialTypeError::Length(self.length.unwrap_or_default()))
    }

    /// Unpacks a tag read from wire.
    pub fn from_value(tag: VarInt) -> Result<Self, SerialTypeError> {
        let tag = tag.value();
        if tag < VARIABLE_START {
            let doc_type = u8::try_from(tag).ok()
                .and_then(|id| DocType::try_from(id).ok())
                .ok_or(SerialTypeError::UnknownTag(tag))?;
            Ok(SerialType { doc_type, length: None })
        } else {
            let offset = (tag - VARIABLE_START) % VARIABLE_KINDS;
            let length = (tag - VARIABLE_START - offset) / VARIABLE_KINDS;
            let doc_type = DocType::try_from(DocType::VARIABLE_START + offset as u8)
                .map_err(|_| SerialTypeError::UnknownTag(tag))?;
            let length = usize::try_from(length).map_err(|_| SerialTypeError::UnknownTag(tag))?;
            Ok(SerialType { doc_type, length: Some(length) })
        }
    }

    /// Number of bytes the tag occupies on wire.
    pub fn size(&self) -> Result<usize, SerialTypeError> {
        self.value().map(|v| v.size())
    }

}

impl TryFrom<VarInt> for SerialType {
    type Error = SerialTypeError;

    fn try_from(tag: VarInt) -> Result<Self, Self::Error> {
        SerialType::from_value(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::SerialType;
    use crate::error::SerialTypeError;
    use crate::types::DocType;
    use crate::varint::VarInt;

    const TAGS: &[(DocType, Option<usize>, u64)] = &[
        (DocType::Null, None, 0),
        (DocType::Boolean, None, 1),
        (DocType::Byte, None, 2),
        (DocType::SByte, None, 3),
        (DocType::Char, None, 4),
        (DocType::Decimal, None, 5),
        (DocType::Double, None, 6),
        (DocType::Single, None, 7),
        (DocType::Int16, None, 8),
        (DocType::UInt16, None, 9),
        (DocType::Int32, None, 10),
        (DocType::UInt32, None, 11),
        (DocType::Int64, None, 12),
        (DocType::UInt64, None, 13),
        (DocType::DateTime, None, 14),
        (DocType::Guid, None, 15),
        (DocType::Array, Some(10), 70),
        (DocType::Blob, Some(10), 71),
        (DocType::String, Some(10), 72),
        (DocType::Document, Some(10), 73),
        (DocType::VarInt, Some(10), 74),
        (DocType::Array, Some(0), 20),
        (DocType::VarInt, Some(0), 24),
    ];

    #[test]
    fn known_tags() {
        for (doc_type, length, tag) in TAGS {
            let st = SerialType::new(*doc_type, *length).unwrap();
            assert_eq!(*tag, st.value().unwrap().value());
            let back = SerialType::from_value(VarInt::new(*tag).unwrap()).unwrap();
            assert_eq!(*doc_type, back.doc_type());
            assert_eq!(*length, back.length());
        }
    }

    #[test]
    fn roundtrip_lengths() {
        let variable = [DocType::Array, DocType::Blob, DocType::String, DocType::Document, DocType::VarInt];
        for length in (0..usize::MAX / 16).step_by(7_919_000_000_013).chain(0..1000) {
            for doc_type in variable.iter() {
                let st = SerialType::variable(*doc_type, length).unwrap();
                assert_eq!(st, SerialType::from_value(st.value().unwrap()).unwrap());
            }
        }
    }

    #[test]
    fn missing_length() {
        for doc_type in [DocType::Array, DocType::Blob, DocType::String, DocType::Document, DocType::VarInt] {
            assert_eq!(Err(SerialTypeError::MissingLength(doc_type)), SerialType::new(doc_type, None));
        }
        assert_eq!(Err(SerialTypeError::UnexpectedLength(DocType::Int32)), SerialType::new(DocType::Int32, Some(4)));
    }

    #[test]
    fn unknown_tags() {
        for tag in 16..20 {
            assert_eq!(Err(SerialTypeError::UnknownTag(tag)), SerialType::from_value(VarInt::new(tag).unwrap()));
        }
    }

    #[test]
    fn length_overflow() {
        let st = SerialType::variable(DocType::Blob, usize::MAX).unwrap();
        assert_eq!(Err(SerialTypeError::Length(usize::MAX)), st.value());
    }
}
