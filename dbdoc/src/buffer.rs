//! A linear byte store with a cursor. All typed reads and writes start at the cursor and advance it by exactly the
//! number of bytes consumed or produced. Fixed-width numbers are little-endian.
//!
//! A buffer is either fixed, in which case writes past the end fail, or growable, in which case it extends itself
//! (zero-filling any gap left by seeking past the end).

use crate::error::{DecodeError, EncodeError, SerialTypeError, VarIntError};
use crate::types::DocType;
use crate::value::Value;
use crate::varint::VarInt;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::convert::TryInto;
use uuid::Uuid;

/// Text encoding of `String` payloads and string keys. It is not recorded on wire, so both sides need to agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Little-endian code units
    Utf16,
    /// ISO-8859-1
    Latin1,
}

impl TextEncoding {

    pub fn encode(&self, s: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            TextEncoding::Utf8   => Ok(s.as_bytes().to_vec()),
            TextEncoding::Utf16  => Ok(s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()),
            TextEncoding::Latin1 => s.chars()
                .map(|c| u8::try_from(c as u32).map_err(|_| EncodeError::Latin1(c)))
                .collect(),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            TextEncoding::Utf8   => Ok(std::str::from_utf8(bytes)?.to_owned()),
            TextEncoding::Utf16  => {
                if bytes.len() % 2 != 0 {
                    return Err(DecodeError::Utf16);
                }
                let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
                String::from_utf16(&units).map_err(|_| DecodeError::Utf16)
            },
            TextEncoding::Latin1 => Ok(bytes.iter().map(|b| *b as char).collect()),
        }
    }

}

const TICKS_PER_SECOND: i64 = 10_000_000;
/// Ticks between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
/// Ticks of 9999-12-31T23:59:59.9999999
const MAX_TICKS: i64 = 3_155_378_975_999_999_999;
const TICKS_MASK: i64 = 0x3fff_ffff_ffff_ffff;
const MAX_SUBSEC_NANOS: u32 = 999_999_999;
const KIND_UTC: i64 = 0x4000_0000_0000_0000;

const DECIMAL_SIGN: u32 = 0x8000_0000;

pub(crate) fn datetime_to_binary(value: &DateTime<Utc>) -> Result<i64, EncodeError> {
    // leap seconds carry nanos beyond one second and are pinned to the last tick of their second
    let sub = value.timestamp_subsec_nanos().min(MAX_SUBSEC_NANOS) as i64 / 100;
    value.timestamp().checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS))
        .and_then(|t| t.checked_add(sub))
        .filter(|t| (0..=MAX_TICKS).contains(t))
        .map(|t| t | KIND_UTC)
        .ok_or_else(|| EncodeError::DateTime(value.to_rfc3339()))
}

pub(crate) fn datetime_from_binary(binary: i64) -> Result<DateTime<Utc>, DecodeError> {
    let ticks = binary & TICKS_MASK;
    if ticks > MAX_TICKS {
        return Err(DecodeError::DateTime(binary));
    }
    let relative = ticks - UNIX_EPOCH_TICKS;
    let nanos = (relative.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(relative.div_euclid(TICKS_PER_SECOND), nanos).ok_or(DecodeError::DateTime(binary))
}

macro_rules! fixed_width {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            pub fn $read(&mut self) -> Result<$ty, DecodeError> {
                let bytes = self.take(std::mem::size_of::<$ty>())?;
                Ok(<$ty>::from_le_bytes(bytes.try_into().map_err(|_| DecodeError::Eof)?))
            }

            pub fn $write(&mut self, value: $ty) -> Result<usize, EncodeError> {
                self.write_bytes(&value.to_le_bytes())
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    data: Vec<u8>,
    pos: usize,
    resizeable: bool,
}

impl Buffer {

    /// An empty buffer which grows on write.
    pub fn growable() -> Self {
        Buffer { data: Vec::new(), pos: 0, resizeable: true }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Buffer { data: Vec::with_capacity(capacity), pos: 0, resizeable: true }
    }

    /// A zeroed buffer of exactly `len` bytes.
    pub fn fixed(len: usize) -> Self {
        Buffer { data: vec![0; len], pos: 0, resizeable: false }
    }

    /// Wraps existing bytes without allowing the buffer to grow. Used for reading.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Buffer { data, pos: 0, resizeable: false }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_resizeable(&self) -> bool {
        self.resizeable
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Copies `len` bytes starting at `index` without moving the cursor.
    pub fn slice(&self, index: usize, len: usize) -> Result<Vec<u8>, DecodeError> {
        self.range(index, len).map(|r| self.data[r].to_vec())
    }

    /// Zeroes `len` bytes starting at `index`.
    pub fn clear(&mut self, index: usize, len: usize) -> Result<(), DecodeError> {
        self.fill(index, len, 0)
    }

    pub fn fill(&mut self, index: usize, len: usize, value: u8) -> Result<(), DecodeError> {
        let range = self.range(index, len)?;
        self.data[range].iter_mut().for_each(|b| *b = value);
        Ok(())
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.data.get(self.pos).copied().ok_or(DecodeError::Eof)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        self.take(len).map(|b| b.to_vec())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, EncodeError> {
        let end = self.pos.checked_add(bytes.len()).ok_or(EncodeError::Capacity(self.data.len()))?;
        if end > self.data.len() {
            if !self.resizeable {
                return Err(EncodeError::Capacity(self.data.len()));
            }
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(bytes.len())
    }

    fixed_width! {
        u8 => read_u8, write_u8;
        i8 => read_i8, write_i8;
        i16 => read_i16, write_i16;
        u16 => read_u16, write_u16;
        i32 => read_i32, write_i32;
        u32 => read_u32, write_u32;
        i64 => read_i64, write_i64;
        u64 => read_u64, write_u64;
        f32 => read_f32, write_f32;
        f64 => read_f64, write_f64;
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(DecodeError::Bool(b)),
        }
    }

    pub fn write_bool(&mut self, value: bool) -> Result<usize, EncodeError> {
        self.write_u8(value as u8)
    }

    pub fn read_char(&mut self) -> Result<char, DecodeError> {
        let unit = self.read_u16()?;
        char::from_u32(unit as u32).ok_or(DecodeError::Char(unit))
    }

    /// Chars are stored as a single UTF-16 code unit, so only the basic multilingual plane is representable.
    pub fn write_char(&mut self, value: char) -> Result<usize, EncodeError> {
        let unit = u16::try_from(value as u32).map_err(|_| EncodeError::Char(value))?;
        self.write_u16(unit)
    }

    /// Four 32 bit words: the low, middle and high part of the mantissa followed by the flags, which hold the scale in
    /// bits 16 to 23 and the sign in bit 31.
    pub fn read_decimal(&mut self) -> Result<Decimal, DecodeError> {
        let lo = self.read_u32()? as i128;
        let mid = self.read_u32()? as i128;
        let hi = self.read_u32()? as i128;
        let flags = self.read_u32()?;
        let scale = (flags >> 16) & 0xff;
        let mantissa = hi << 64 | mid << 32 | lo;
        let mantissa = if flags & DECIMAL_SIGN != 0 { -mantissa } else { mantissa };
        Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| DecodeError::Decimal(scale))
    }

    pub fn write_decimal(&mut self, value: Decimal) -> Result<usize, EncodeError> {
        let mantissa = value.mantissa().unsigned_abs();
        let sign = if value.is_sign_negative() { DECIMAL_SIGN } else { 0 };
        let mut c = self.write_u32(mantissa as u32)?;
        c += self.write_u32((mantissa >> 32) as u32)?;
        c += self.write_u32((mantissa >> 64) as u32)?;
        c += self.write_u32(value.scale() << 16 | sign)?;
        Ok(c)
    }

    pub fn read_guid(&mut self) -> Result<Uuid, DecodeError> {
        let bytes = self.take(16)?;
        Uuid::from_slice(bytes).map_err(|_| DecodeError::Eof)
    }

    pub fn write_guid(&mut self, value: Uuid) -> Result<usize, EncodeError> {
        self.write_bytes(value.as_bytes())
    }

    /// A signed 64 bit integer: the tick count (100ns since 0001-01-01) in the lower 62 bits and the kind in the upper
    /// two. Kinds are accepted on read but the ticks are always taken as UTC.
    pub fn read_datetime(&mut self) -> Result<DateTime<Utc>, DecodeError> {
        datetime_from_binary(self.read_i64()?)
    }

    pub fn write_datetime(&mut self, value: &DateTime<Utc>) -> Result<usize, EncodeError> {
        self.write_i64(datetime_to_binary(value)?)
    }

    pub fn read_string(&mut self, len: usize, encoding: TextEncoding) -> Result<String, DecodeError> {
        let bytes = self.take(len)?;
        encoding.decode(bytes)
    }

    /// Returns the number of written bytes, which is the length to announce in the serial type.
    pub fn write_string(&mut self, value: &str, encoding: TextEncoding) -> Result<usize, EncodeError> {
        let bytes = encoding.encode(value)?;
        self.write_bytes(&bytes)
    }

    pub fn read_varint(&mut self) -> Result<VarInt, DecodeError> {
        let (v, c) = VarInt::decode(&self.data[self.pos.min(self.data.len())..]).map_err(|e| match e {
            VarIntError::Eof => DecodeError::Eof,
            e                => DecodeError::VarInt(e),
        })?;
        self.pos += c;
        Ok(v)
    }

    pub fn write_varint(&mut self, value: VarInt) -> Result<usize, EncodeError> {
        self.write_bytes(&value.bytes())
    }

    /// Writes the payload of a scalar value. Containers have no payload of their own and are rejected.
    pub fn write_value(&mut self, value: &Value, encoding: TextEncoding) -> Result<usize, EncodeError> {
        match value {
            Value::Null        => Ok(0),
            Value::Boolean(v)  => self.write_bool(*v),
            Value::Byte(v)     => self.write_u8(*v),
            Value::SByte(v)    => self.write_i8(*v),
            Value::Char(v)     => self.write_char(*v),
            Value::Decimal(v)  => self.write_decimal(*v),
            Value::Double(v)   => self.write_f64(*v),
            Value::Single(v)   => self.write_f32(*v),
            Value::Int16(v)    => self.write_i16(*v),
            Value::UInt16(v)   => self.write_u16(*v),
            Value::Int32(v)    => self.write_i32(*v),
            Value::UInt32(v)   => self.write_u32(*v),
            Value::Int64(v)    => self.write_i64(*v),
            Value::UInt64(v)   => self.write_u64(*v),
            Value::DateTime(v) => self.write_datetime(v),
            Value::Guid(v)     => self.write_guid(*v),
            Value::Blob(v)     => self.write_bytes(v),
            Value::String(v)   => self.write_string(v, encoding),
            Value::VarInt(v)   => self.write_varint(*v),
            Value::Array(_)    => Err(EncodeError::Unsupported(DocType::Array)),
            Value::Document(_) => Err(EncodeError::Unsupported(DocType::Document)),
        }
    }

    /// Reads the payload of a scalar value. `length` is the length from the serial type of variable-length types.
    pub fn read_value(&mut self, doc_type: DocType, length: Option<usize>, encoding: TextEncoding) -> Result<Value, DecodeError> {
        Ok(match doc_type {
            DocType::Null     => Value::Null,
            DocType::Boolean  => Value::Boolean(self.read_bool()?),
            DocType::Byte     => Value::Byte(self.read_u8()?),
            DocType::SByte    => Value::SByte(self.read_i8()?),
            DocType::Char     => Value::Char(self.read_char()?),
            DocType::Decimal  => Value::Decimal(self.read_decimal()?),
            DocType::Double   => Value::Double(self.read_f64()?),
            DocType::Single   => Value::Single(self.read_f32()?),
            DocType::Int16    => Value::Int16(self.read_i16()?),
            DocType::UInt16   => Value::UInt16(self.read_u16()?),
            DocType::Int32    => Value::Int32(self.read_i32()?),
            DocType::UInt32   => Value::UInt32(self.read_u32()?),
            DocType::Int64    => Value::Int64(self.read_i64()?),
            DocType::UInt64   => Value::UInt64(self.read_u64()?),
            DocType::DateTime => Value::DateTime(self.read_datetime()?),
            DocType::Guid     => Value::Guid(self.read_guid()?),
            DocType::Blob     => Value::Blob(self.read_bytes(Self::require(doc_type, length)?)?),
            DocType::String   => Value::String(self.read_string(Self::require(doc_type, length)?, encoding)?),
            DocType::VarInt   => {
                let start = self.pos;
                let v = self.read_varint()?;
                if Some(self.pos - start) != length {
                    return Err(DecodeError::UnexpectedType { expected: "VarInt of announced length", found: DocType::VarInt });
                }
                Value::VarInt(v)
            },
            DocType::Array | DocType::Document => return Err(DecodeError::Unsupported(doc_type)),
        })
    }

    #[inline]
    fn require(doc_type: DocType, length: Option<usize>) -> Result<usize, DecodeError> {
        length.ok_or(DecodeError::SerialType(SerialTypeError::MissingLength(doc_type)))
    }

    #[inline]
    fn range(&self, index: usize, len: usize) -> Result<std::ops::Range<usize>, DecodeError> {
        match index.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(index..end),
            _ => Err(DecodeError::Eof),
        }
    }

    #[inline]
    fn take(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        let range = self.range(self.pos, len)?;
        self.pos = range.end;
        Ok(&self.data[range])
    }

}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::growable()
    }
}
