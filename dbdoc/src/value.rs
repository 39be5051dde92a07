use crate::array::Array;
use crate::document::Document;
use crate::error::{SerialTypeError, ValueError};
use crate::serial_type::SerialType;
use crate::types::DocType;
use crate::varint::VarInt;
use base64::Engine;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// A single node of a document tree. Equality and ordering are defined in terms of [`Value::compare`], so numbers of
/// different types compare by their numeric value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Char(char),
    Decimal(Decimal),
    Double(f64),
    Single(f32),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    Array(Array),
    Blob(Vec<u8>),
    String(String),
    Document(Document),
    VarInt(VarInt),
}

/// A number lifted out of its discriminant.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i128),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
}

impl Number {

    pub(crate) fn to_i128(self) -> Option<i128> {
        match self {
            Number::Int(i)     => Some(i),
            Number::Single(f)  => float_to_i128(f as f64),
            Number::Double(f)  => float_to_i128(f),
            Number::Decimal(d) => {
                let d = d.normalize();
                if d.scale() == 0 { Some(d.mantissa()) } else { None }
            },
        }
    }

    pub(crate) fn to_f64(self) -> Option<f64> {
        match self {
            Number::Int(i)     => Some(i as f64),
            Number::Single(f)  => Some(f as f64),
            Number::Double(f)  => Some(f),
            Number::Decimal(d) => d.to_f64(),
        }
    }

    /// Fails for non-finite floats and magnitudes beyond the decimal range.
    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        match self {
            Number::Int(i)     => Decimal::try_from_i128_with_scale(i, 0).ok(),
            Number::Single(f)  => Decimal::from_f32(f),
            Number::Double(f)  => Decimal::from_f64(f),
            Number::Decimal(d) => Some(d),
        }
    }

}

fn float_to_i128(f: f64) -> Option<i128> {
    // 2^127, exclusive
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if f.is_finite() && f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i128)
    } else {
        None
    }
}

macro_rules! int_accessors {
    ($($ty:ty => $as:ident, $try_as:ident;)*) => {
        $(
            /// Converts any numeric value exactly. Fractions and out of range values yield `None`.
            pub fn $as(&self) -> Option<$ty> {
                self.number()?.to_i128().and_then(|i| <$ty>::try_from(i).ok())
            }

            pub fn $try_as(&self) -> Result<$ty, ValueError> {
                self.$as().ok_or(ValueError::Cast { from: self.doc_type(), to: stringify!($ty) })
            }
        )*
    };
}

impl Value {

    pub fn doc_type(&self) -> DocType {
        match self {
            Value::Null        => DocType::Null,
            Value::Boolean(_)  => DocType::Boolean,
            Value::Byte(_)     => DocType::Byte,
            Value::SByte(_)    => DocType::SByte,
            Value::Char(_)     => DocType::Char,
            Value::Decimal(_)  => DocType::Decimal,
            Value::Double(_)   => DocType::Double,
            Value::Single(_)   => DocType::Single,
            Value::Int16(_)    => DocType::Int16,
            Value::UInt16(_)   => DocType::UInt16,
            Value::Int32(_)    => DocType::Int32,
            Value::UInt32(_)   => DocType::UInt32,
            Value::Int64(_)    => DocType::Int64,
            Value::UInt64(_)   => DocType::UInt64,
            Value::DateTime(_) => DocType::DateTime,
            Value::Guid(_)     => DocType::Guid,
            Value::Array(_)    => DocType::Array,
            Value::Blob(_)     => DocType::Blob,
            Value::String(_)   => DocType::String,
            Value::Document(_) => DocType::Document,
            Value::VarInt(_)   => DocType::VarInt,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        self.doc_type().is_number()
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    pub(crate) fn number(&self) -> Option<Number> {
        Some(match *self {
            Value::Byte(v)    => Number::Int(v as i128),
            Value::SByte(v)   => Number::Int(v as i128),
            Value::Int16(v)   => Number::Int(v as i128),
            Value::UInt16(v)  => Number::Int(v as i128),
            Value::Int32(v)   => Number::Int(v as i128),
            Value::UInt32(v)  => Number::Int(v as i128),
            Value::Int64(v)   => Number::Int(v as i128),
            Value::UInt64(v)  => Number::Int(v as i128),
            Value::VarInt(v)  => Number::Int(v.value() as i128),
            Value::Single(v)  => Number::Single(v),
            Value::Double(v)  => Number::Double(v),
            Value::Decimal(v) => Number::Decimal(v),
            _                 => return None,
        })
    }

    int_accessors! {
        u8 => as_u8, try_as_u8;
        i8 => as_i8, try_as_i8;
        i16 => as_i16, try_as_i16;
        u16 => as_u16, try_as_u16;
        i32 => as_i32, try_as_i32;
        u32 => as_u32, try_as_u32;
        i64 => as_i64, try_as_i64;
        u64 => as_u64, try_as_u64;
    }

    /// Converts any numeric value. Conversions to floating point round to the nearest representable value.
    pub fn as_f64(&self) -> Option<f64> {
        self.number()?.to_f64()
    }

    pub fn try_as_f64(&self) -> Result<f64, ValueError> {
        self.as_f64().ok_or(ValueError::Cast { from: self.doc_type(), to: "f64" })
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Single(v) => Some(*v),
            _                => self.as_f64().map(|f| f as f32),
        }
    }

    pub fn try_as_f32(&self) -> Result<f32, ValueError> {
        self.as_f32().ok_or(ValueError::Cast { from: self.doc_type(), to: "f32" })
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        self.number()?.to_decimal()
    }

    pub fn try_as_decimal(&self) -> Result<Decimal, ValueError> {
        self.as_decimal().ok_or(ValueError::Cast { from: self.doc_type(), to: "Decimal" })
    }

    pub fn as_varint(&self) -> Option<VarInt> {
        match self {
            Value::VarInt(v) => Some(*v),
            _                => self.as_u64().and_then(|v| VarInt::new(v).ok()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _                 => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _              => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _                => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _              => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(d) => Some(*d),
            _                  => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _              => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _               => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(a) => Some(a),
            _               => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _                  => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(d) => Some(d),
            _                  => None,
        }
    }

    /// Looks up `key`. Only documents can be indexed by key.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, ValueError> {
        match self {
            Value::Document(d) => Ok(d.get(key)),
            _                  => Err(ValueError::InvalidOperation { op: "index by key", found: self.doc_type() }),
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Result<Option<&mut Value>, ValueError> {
        match self {
            Value::Document(d) => Ok(d.get_mut(key)),
            _                  => Err(ValueError::InvalidOperation { op: "index by key", found: self.doc_type() }),
        }
    }

    /// Looks up the element at `index`. Only arrays can be indexed by position.
    pub fn at(&self, index: usize) -> Result<&Value, ValueError> {
        match self {
            Value::Array(a) => a.get(index).ok_or(ValueError::OutOfRange { index, len: a.len() }),
            _               => Err(ValueError::InvalidOperation { op: "index by position", found: self.doc_type() }),
        }
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Value, ValueError> {
        let found = self.doc_type();
        match self {
            Value::Array(a) => {
                let len = a.len();
                a.get_mut(index).ok_or(ValueError::OutOfRange { index, len })
            },
            _ => Err(ValueError::InvalidOperation { op: "index by position", found }),
        }
    }

    /// The serial type announcing this value on wire, with string lengths counted in UTF-8.
    pub fn serial_type(&self) -> Result<SerialType, SerialTypeError> {
        let length = match self {
            Value::Array(a)    => Some(a.len()),
            Value::Document(d) => Some(d.len()),
            Value::String(s)   => Some(s.len()),
            Value::Blob(b)     => Some(b.len()),
            Value::VarInt(v)   => Some(v.size()),
            _                  => None,
        };
        SerialType::new(self.doc_type(), length)
    }

    /// Number of payload bytes, excluding the serial type. Containers use their cached count if present.
    pub fn bytes_count(&self) -> usize {
        match self {
            Value::Array(a)    => a.payload_len(),
            Value::Document(d) => d.payload_len(),
            Value::String(s)   => s.len(),
            Value::Blob(b)     => b.len(),
            Value::VarInt(v)   => v.size(),
            other              => other.doc_type().fixed_size().unwrap_or_default(),
        }
    }

    /// Number of bytes including the serial type.
    pub fn encoded_len(&self) -> usize {
        self.serial_type().and_then(|st| st.size()).unwrap_or(VarInt::MAX_SIZE) + self.bytes_count()
    }

    /// Recomputes the cached counts of all containers in this tree. Returns the payload length.
    pub fn refresh_bytes_count(&mut self) -> usize {
        match self {
            Value::Array(a)    => a.refresh_bytes_count(),
            Value::Document(d) => d.refresh_bytes_count(),
            other              => other.bytes_count(),
        }
    }

}

macro_rules! from_impls {
    ($($ty:ty => $variant:ident,)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

from_impls! {
    bool => Boolean,
    u8 => Byte,
    i8 => SByte,
    char => Char,
    Decimal => Decimal,
    f64 => Double,
    f32 => Single,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    DateTime<Utc> => DateTime,
    Uuid => Guid,
    Array => Array,
    Vec<Value> => Array,
    Vec<u8> => Blob,
    &[u8] => Blob,
    String => String,
    &str => String,
    Document => Document,
    BTreeMap<String, Value> => Document,
    VarInt => VarInt,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Value::Null        => f.write_str("null"),
            Value::Boolean(v)  => write!(f, "{}", v),
            Value::Byte(v)     => write!(f, "{}", v),
            Value::SByte(v)    => write!(f, "{}", v),
            Value::Char(v)     => write!(f, "{:?}", v.to_string()),
            Value::Decimal(v)  => write!(f, "{}", v),
            Value::Double(v)   => write!(f, "{}", v),
            Value::Single(v)   => write!(f, "{}", v),
            Value::Int16(v)    => write!(f, "{}", v),
            Value::UInt16(v)   => write!(f, "{}", v),
            Value::Int32(v)    => write!(f, "{}", v),
            Value::UInt32(v)   => write!(f, "{}", v),
            Value::Int64(v)    => write!(f, "{}", v),
            Value::UInt64(v)   => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "\"{}\"", v.to_rfc3339()),
            Value::Guid(v)     => write!(f, "\"{}\"", v),
            Value::Blob(v)     => write!(f, "\"{}\"", base64::engine::general_purpose::STANDARD.encode(v)),
            Value::String(v)   => write!(f, "{:?}", v),
            Value::VarInt(v)   => write!(f, "{}", v),
            Value::Array(a)    => {
                f.write_str("[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            },
            Value::Document(d) => {
                f.write_str("{")?;
                for (i, (k, v)) in d.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::array::Array;
    use crate::document::Document;
    use crate::error::ValueError;
    use crate::types::DocType;
    use crate::varint::VarInt;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn discriminant_follows_construction() {
        let cases = vec![
            (Value::from(true), DocType::Boolean),
            (Value::from(1u8), DocType::Byte),
            (Value::from(-1i8), DocType::SByte),
            (Value::from('x'), DocType::Char),
            (Value::from(Decimal::new(1, 1)), DocType::Decimal),
            (Value::from(1.0f64), DocType::Double),
            (Value::from(1.0f32), DocType::Single),
            (Value::from(1i16), DocType::Int16),
            (Value::from(1u16), DocType::UInt16),
            (Value::from(1i32), DocType::Int32),
            (Value::from(1u32), DocType::UInt32),
            (Value::from(1i64), DocType::Int64),
            (Value::from(1u64), DocType::UInt64),
            (Value::from(Utc::now()), DocType::DateTime),
            (Value::from(uuid::Uuid::nil()), DocType::Guid),
            (Value::from(vec![Value::Null]), DocType::Array),
            (Value::from(vec![1u8, 2]), DocType::Blob),
            (Value::from("s"), DocType::String),
            (Value::from(Document::new()), DocType::Document),
            (Value::from(VarInt::from(5u32)), DocType::VarInt),
            (Value::from(None::<i32>), DocType::Null),
            (Value::from(Some(3i32)), DocType::Int32),
        ];
        for (value, doc_type) in cases {
            assert_eq!(doc_type, value.doc_type());
        }
    }

    #[test]
    fn numeric_accessors() {
        assert_eq!(Some(300), Value::Int64(300).as_i16());
        assert_eq!(None, Value::Int64(300).as_u8());
        assert_eq!(None, Value::Int32(-1).as_u32());
        assert_eq!(Some(4), Value::Double(4.0).as_i32());
        assert_eq!(None, Value::Double(4.5).as_i32());
        assert_eq!(None, Value::Double(f64::NAN).as_i64());
        assert_eq!(Some(12), Value::Decimal(Decimal::from_str("12.000").unwrap()).as_u8());
        assert_eq!(None, Value::Decimal(Decimal::from_str("12.5").unwrap()).as_u8());
        assert_eq!(Some(4.0), Value::Int32(4).as_f64());
        assert_eq!(Some(Decimal::from(7)), Value::VarInt(VarInt::from(7u32)).as_decimal());
        assert_eq!(None, Value::Double(f64::INFINITY).as_decimal());
        assert_eq!(Some(u64::MAX), Value::UInt64(u64::MAX).as_u64());
        assert_eq!(None, Value::String("1".to_string()).as_i32());
        assert_eq!(None, Value::Char('1').as_i32());
    }

    #[test]
    fn try_accessors() {
        assert_eq!(Ok(3), Value::Byte(3).try_as_i64());
        assert_eq!(Err(ValueError::Cast { from: DocType::String, to: "i32" }), Value::from("x").try_as_i32());
        assert_eq!(Err(ValueError::Cast { from: DocType::Int32, to: "u8" }), Value::Int32(256).try_as_u8());
        assert_eq!(Err(ValueError::Cast { from: DocType::Null, to: "Decimal" }), Value::Null.try_as_decimal());
    }

    #[test]
    fn borrowing_accessors() {
        assert_eq!(Some("abc"), Value::from("abc").as_str());
        assert_eq!(Some(&[1u8, 2][..]), Value::from(vec![1u8, 2]).as_blob());
        assert_eq!(Some(true), Value::from(true).as_bool());
        assert_eq!(None, Value::Int32(1).as_bool());
        assert!(Value::from(Array::new()).as_array().is_some());
        assert!(Value::from(Array::new()).as_document().is_none());
    }

    #[test]
    fn indexing() {
        let mut doc = Document::new();
        doc.insert("a", 1);
        let mut value = Value::from(doc);
        assert_eq!(Ok(Some(&Value::Int32(1))), value.get("a"));
        assert_eq!(Ok(None), value.get("b"));
        assert_eq!(Err(ValueError::InvalidOperation { op: "index by position", found: DocType::Document }), value.at(0));
        if let Ok(Some(v)) = value.get_mut("a") {
            *v = Value::from("changed");
        }
        assert_eq!(Ok(Some(&Value::from("changed"))), value.get("a"));

        let mut array = Value::from(vec![Value::Int32(1), Value::Int32(2)]);
        assert_eq!(Ok(&Value::Int32(2)), array.at(1));
        assert_eq!(Err(ValueError::OutOfRange { index: 2, len: 2 }), array.at(2));
        assert_eq!(Err(ValueError::InvalidOperation { op: "index by key", found: DocType::Array }), array.get("a"));
        *array.at_mut(0).unwrap() = Value::Null;
        assert_eq!(Ok(&Value::Null), array.at(0));
        assert!(Value::Int32(1).at_mut(0).is_err());
    }

    #[test]
    fn bytes_counts() {
        assert_eq!(0, Value::Null.bytes_count());
        assert_eq!(16, Value::Decimal(Decimal::ONE).bytes_count());
        assert_eq!(3, Value::from("abc").bytes_count());
        assert_eq!(4, Value::from("abc").encoded_len());
        assert_eq!(2, Value::VarInt(VarInt::from(200u32)).bytes_count());
        let long = "x".repeat(100);
        // tag 20 + 100 * 5 + 2 needs two bytes
        assert_eq!(102, Value::from(long.as_str()).encoded_len());
    }

    #[test]
    fn nested_refresh() {
        let mut doc = Document::new();
        doc.insert("list", vec![Value::Int32(1), Value::Int32(2)]);
        let mut value = Value::from(doc);
        // key mode 1, key tag 1, "list" 4, array tag 1, two Int32 10
        assert_eq!(17, value.refresh_bytes_count());
        let list = value.get("list").unwrap().unwrap().as_array().unwrap();
        assert_eq!(Some(10), list.cached_bytes_count());
        assert_eq!(Some(17), value.as_document().unwrap().cached_bytes_count());
    }

    #[test]
    fn display() {
        let mut doc = Document::new();
        doc.insert("name", "Foo \"Bar\"");
        doc.insert("_id", 1);
        doc.insert("data", vec![1u8, 2, 3]);
        doc.insert("list", vec![Value::Null, Value::Boolean(false), Value::Double(1.5)]);
        doc.insert("when", Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap());
        assert_eq!(
            r#"{"_id": 1, "data": "AQID", "list": [null, false, 1.5], "name": "Foo \"Bar\"", "when": "2020-02-29T12:00:00+00:00"}"#,
            Value::from(doc).to_string()
        );
    }
}
