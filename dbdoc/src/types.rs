//! The closed set of types a `Value` can take. The numeric ids are part of the wire format: fixed-width types use
//! their id directly as serial type, variable-length types derive their offset from it.

use std::convert::TryFrom;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocType {
    Null = 0,
    Boolean = 1,
    Byte = 2,
    SByte = 3,
    /// A single UTF-16 code unit
    Char = 4,
    /// 96 bit mantissa with a decimal scale of up to 28
    Decimal = 5,
    Double = 6,
    Single = 7,
    Int16 = 8,
    UInt16 = 9,
    Int32 = 10,
    UInt32 = 11,
    Int64 = 12,
    UInt64 = 13,
    DateTime = 14,
    Guid = 15,
    Array = 20,
    Blob = 21,
    String = 22,
    Document = 23,
    VarInt = 24,
}

impl DocType {

    /// First id of the variable-length types
    pub const VARIABLE_START: u8 = 20;

    /// Returns the mnemonic of the type. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            DocType::Null     => "Null",
            DocType::Boolean  => "Boolean",
            DocType::Byte     => "Byte",
            DocType::SByte    => "SByte",
            DocType::Char     => "Char",
            DocType::Decimal  => "Decimal",
            DocType::Double   => "Double",
            DocType::Single   => "Single",
            DocType::Int16    => "Int16",
            DocType::UInt16   => "UInt16",
            DocType::Int32    => "Int32",
            DocType::UInt32   => "UInt32",
            DocType::Int64    => "Int64",
            DocType::UInt64   => "UInt64",
            DocType::DateTime => "DateTime",
            DocType::Guid     => "Guid",
            DocType::Array    => "Array",
            DocType::Blob     => "Blob",
            DocType::String   => "String",
            DocType::Document => "Document",
            DocType::VarInt   => "VarInt",
        }
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Whether the serial type of this type carries a length.
    pub fn is_variable(&self) -> bool {
        self.id() >= Self::VARIABLE_START
    }

    /// The offset in `0..5` that distinguishes the variable-length types within a serial type.
    pub fn variable_offset(&self) -> Option<u8> {
        if self.is_variable() {
            Some(self.id() - Self::VARIABLE_START)
        } else {
            None
        }
    }

    /// Payload size in bytes of fixed-width types.
    pub fn fixed_size(&self) -> Option<usize> {
        match *self {
            DocType::Null                                         => Some(0),
            DocType::Boolean | DocType::Byte | DocType::SByte     => Some(1),
            DocType::Char | DocType::Int16 | DocType::UInt16      => Some(2),
            DocType::Int32 | DocType::UInt32 | DocType::Single    => Some(4),
            DocType::Int64 | DocType::UInt64 | DocType::Double
                | DocType::DateTime                               => Some(8),
            DocType::Decimal | DocType::Guid                      => Some(16),
            _                                                     => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_container(&self) -> bool {
        matches!(self, DocType::Array | DocType::Document)
    }

    /// Position when ordering values of different types. Numbers share one rank since they compare by value.
    pub(crate) fn sort_rank(&self) -> u8 {
        if self.is_number() { DocType::Byte.id() } else { self.id() }
    }

    /// Width ordering used to pick the result type of mixed arithmetic. Higher is wider.
    pub(crate) fn numeric_rank(&self) -> Option<u8> {
        match *self {
            DocType::Byte    => Some(1),
            DocType::SByte   => Some(2),
            DocType::Int16   => Some(3),
            DocType::UInt16  => Some(4),
            DocType::Int32   => Some(5),
            DocType::UInt32  => Some(6),
            DocType::Int64   => Some(7),
            DocType::UInt64  => Some(8),
            DocType::VarInt  => Some(9),
            DocType::Single  => Some(10),
            DocType::Double  => Some(11),
            DocType::Decimal => Some(12),
            _                => None,
        }
    }

}

impl TryFrom<u8> for DocType {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Ok(match v {
            0  => DocType::Null,
            1  => DocType::Boolean,
            2  => DocType::Byte,
            3  => DocType::SByte,
            4  => DocType::Char,
            5  => DocType::Decimal,
            6  => DocType::Double,
            7  => DocType::Single,
            8  => DocType::Int16,
            9  => DocType::UInt16,
            10 => DocType::Int32,
            11 => DocType::UInt32,
            12 => DocType::Int64,
            13 => DocType::UInt64,
            14 => DocType::DateTime,
            15 => DocType::Guid,
            20 => DocType::Array,
            21 => DocType::Blob,
            22 => DocType::String,
            23 => DocType::Document,
            24 => DocType::VarInt,
            x  => return Err(x),
        })
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
